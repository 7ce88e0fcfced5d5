//! 履約最佳化協調器
//!
//! 五個階段：請求驗證 → 庫存解析 → 候選產生（或自訂配置檢核）→
//! 逐候選評估（承重探測、分批、裝箱、詢價）→ 擇優選擇。
//! 業務拒絕與非預期失敗在邊界分流為不同的結果訊息。

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use fulfill_calc::{
    AllocationPlanner, InventoryResolver, PackingPlanner, PlanError, PlanResult, RateProber,
    ResolvedInventory, ShipmentSplitter,
};
use fulfill_core::{
    CatalogStore, FulfillmentRequest, OptimizationResult, OptimizerConfig, PickupLocation,
    ProductAllocation, RateSource, Rejection, Shipment, TieBreakPolicy,
};

use crate::candidate::{AllocationCandidate, CandidateGenerator};

/// 評估完成的候選
struct EvaluatedCandidate {
    shipments: Vec<Shipment>,
    can_fulfill: bool,
    shortfall: u32,
    total_cost: Decimal,
    all_couriers_available: bool,
    unavailability_reason: Option<String>,
}

/// 履約最佳化引擎
pub struct Optimizer<'a> {
    catalog: &'a dyn CatalogStore,
    rates: &'a dyn RateSource,
    config: OptimizerConfig,
}

impl<'a> Optimizer<'a> {
    pub fn new(catalog: &'a dyn CatalogStore, rates: &'a dyn RateSource) -> Self {
        Self {
            catalog,
            rates,
            config: OptimizerConfig::default(),
        }
    }

    /// 建構器模式：設置引擎配置
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// 執行最佳化
    ///
    /// 業務拒絕以拒絕訊息回報；非預期失敗包上
    /// `Optimization failed:` 前綴。兩者皆為 `success = false`
    /// 的結果，不向呼叫端拋錯。
    pub fn optimize(&self, request: &FulfillmentRequest) -> OptimizationResult {
        match self.run(request) {
            Ok(result) => result,
            Err(PlanError::Rejected(rejection)) => {
                tracing::info!(%rejection, "請求被業務規則拒絕");
                OptimizationResult::rejected(rejection.to_string())
            }
            Err(PlanError::Internal(error)) => {
                tracing::warn!(%error, "最佳化非預期失敗");
                OptimizationResult::rejected(format!("Optimization failed: {error}"))
            }
        }
    }

    fn run(&self, request: &FulfillmentRequest) -> PlanResult<OptimizationResult> {
        // Step 1: 請求驗證
        let requested: BTreeMap<i64, u32> = request
            .product_quantities
            .iter()
            .filter(|(_, &qty)| qty > 0)
            .map(|(&id, &qty)| (id, qty))
            .collect();
        if requested.is_empty() {
            return Err(Rejection::NoProductsSpecified.into());
        }
        let delivery_postcode = request.delivery_postcode.trim();
        if delivery_postcode.is_empty() {
            return Err(Rejection::DeliveryPostcodeRequired.into());
        }
        tracing::debug!(
            products = requested.len(),
            quantity = requested.values().sum::<u32>(),
            "Step 1: 請求驗證通過"
        );

        // Step 2: 庫存解析
        let inventory = InventoryResolver::resolve(self.catalog, &requested)?;

        // Step 3: 候選產生
        let is_custom = request.custom_allocations.is_some();
        let candidates = match &request.custom_allocations {
            Some(custom) => {
                let allocation = AllocationPlanner::validate_custom(custom, &inventory)?;
                vec![AllocationCandidate::from_custom(allocation)]
            }
            None => {
                AllocationPlanner::check_feasibility(&inventory, &requested)?;
                CandidateGenerator::generate(&inventory, &requested)
            }
        };
        if candidates.is_empty() {
            return Err(Rejection::NoValidAllocationStrategies.into());
        }
        tracing::debug!(candidates = candidates.len(), "Step 3: 候選產生完成");

        // Step 4: 逐候選評估
        let evaluated = self.evaluate_candidates(
            candidates,
            &inventory,
            delivery_postcode,
            request.cash_on_delivery,
            is_custom,
        )?;

        // Step 5: 擇優選擇
        self.select(evaluated)
    }

    fn evaluate_candidates(
        &self,
        mut candidates: Vec<AllocationCandidate>,
        inventory: &ResolvedInventory,
        delivery_postcode: &str,
        cash_on_delivery: bool,
        is_custom: bool,
    ) -> PlanResult<Vec<EvaluatedCandidate>> {
        let prober = RateProber::new(self.rates, &self.config);
        prober.prepare();

        // 每條路線的承重上限只探測一次
        let mut route_max_by_postcode: BTreeMap<String, Decimal> = BTreeMap::new();
        for resolved_location in inventory.locations.values() {
            let location = &resolved_location.location;
            if let Some(postcode) = location.postcode.as_deref() {
                let postcode = postcode.trim();
                if !postcode.is_empty() && !route_max_by_postcode.contains_key(postcode) {
                    let max =
                        prober.max_route_weight(postcode, delivery_postcode, cash_on_delivery);
                    route_max_by_postcode.insert(postcode.to_string(), max);
                }
            }
        }

        let route_max_for = |location: &PickupLocation| -> Decimal {
            match location.postcode.as_deref().map(str::trim) {
                Some(postcode) if !postcode.is_empty() => route_max_by_postcode
                    .get(postcode)
                    .copied()
                    .unwrap_or(Decimal::ZERO),
                // 郵遞區號缺漏：無從探測，採後備上限
                _ => self.config.fallback_max_weight_kgs,
            }
        };

        let mut serviceable: BTreeSet<i64> = BTreeSet::new();
        let mut unserviceable: BTreeSet<i64> = BTreeSet::new();
        for (&location_id, resolved_location) in &inventory.locations {
            if route_max_for(&resolved_location.location) > Decimal::ZERO {
                serviceable.insert(location_id);
            } else {
                unserviceable.insert(location_id);
            }
        }

        // 自動模式下，不可服務出貨點的配置先轉移
        if !is_custom {
            for candidate in candidates.iter_mut() {
                candidate.reallocate_unserviceable(inventory, &serviceable, &unserviceable);
            }
        }

        let mut evaluated: Vec<EvaluatedCandidate> = Vec::new();
        for candidate in &candidates {
            let mut shipments: Vec<Shipment> = Vec::new();
            let mut can_fulfill = candidate.can_fulfill;
            let mut shortfall = candidate.shortfall;
            let mut all_couriers_available = true;
            let mut reasons: Vec<String> = Vec::new();
            let mut sequence: u32 = 0;

            // 各出貨點的包材庫存為本候選內共用的預算
            for (&location_id, quantities) in &candidate.allocation {
                let Some(resolved_location) = inventory.locations.get(&location_id) else {
                    continue;
                };
                let location = &resolved_location.location;

                // 路線不可服務時仍分批裝箱（採後備上限），
                // 批次以無貨運商的狀態出貨
                let probed_max = route_max_for(location);
                let route_serviceable = probed_max > Decimal::ZERO;
                let route_max = if route_serviceable {
                    probed_max
                } else {
                    self.config.fallback_max_weight_kgs
                };
                if !route_serviceable {
                    let postcode = location.postcode.as_deref().unwrap_or("");
                    reasons.push(format!(
                        "No courier options available between pickup location {} [{}] and \
                         delivery postcode [{}] (no alternative locations available)",
                        location.name, postcode, delivery_postcode
                    ));
                    all_couriers_available = false;
                }

                let items: Vec<_> = quantities
                    .iter()
                    .filter_map(|(product_id, &qty)| {
                        inventory
                            .products
                            .get(product_id)
                            .map(|resolved| (resolved.product.clone(), qty))
                    })
                    .collect();

                let mut package_budget = resolved_location.packages.clone();
                for group in ShipmentSplitter::split(&items, route_max) {
                    let group_items: Vec<_> = items
                        .iter()
                        .filter_map(|(product, _)| {
                            group
                                .get(&product.id)
                                .map(|&qty| (product.clone(), qty))
                        })
                        .collect();

                    let plan = PackingPlanner::pack(&group_items, &package_budget);
                    if plan.is_empty() || !plan.fully_packed() {
                        reasons.push(format!(
                            "No packages available at {} to fit products (skipped)",
                            location.name
                        ));
                        all_couriers_available = false;
                        // 整批略過：全數計入缺口以維持件數守恆
                        shortfall += group_items.iter().map(|(_, qty)| *qty).sum::<u32>();
                        can_fulfill = false;
                        continue;
                    }

                    // 扣減已耗用的包材預算
                    for usage in &plan.usages {
                        for (spec, remaining) in package_budget.iter_mut() {
                            if spec.id == usage.package.id {
                                *remaining = remaining.saturating_sub(usage.quantity_used);
                            }
                        }
                    }

                    let mut total_weight = Decimal::ZERO;
                    let mut products: Vec<ProductAllocation> = Vec::new();
                    for (product, qty) in &group_items {
                        let weight = product.unit_weight_kgs() * Decimal::from(*qty);
                        total_weight += weight;
                        products.push(ProductAllocation {
                            product_id: product.id,
                            title: product.title.clone(),
                            quantity: *qty,
                            total_weight_kgs: weight,
                        });
                    }

                    let mut shipment = Shipment::new(
                        location_id,
                        location.name.clone(),
                        location.postcode.clone(),
                        products,
                        plan.usages.clone(),
                        total_weight,
                        sequence,
                    );
                    sequence += 1;

                    if !route_serviceable {
                        // 原因已記錄於出貨點層級，不再逐批詢價
                    } else if location.has_postcode() {
                        let postcode = location.postcode.as_deref().unwrap_or("");
                        match prober.probe(
                            postcode,
                            delivery_postcode,
                            total_weight,
                            cash_on_delivery,
                        ) {
                            Ok(quotes) if !quotes.is_empty() => {
                                shipment.shipping_cost = quotes[0].rate;
                                shipment.selected_courier = Some(quotes[0].courier.clone());
                                shipment.available_couriers = quotes;
                            }
                            Ok(_) => {
                                all_couriers_available = false;
                                reasons.push(format!(
                                    "No courier options available between pickup location {} \
                                     [{}] and delivery postcode [{}]",
                                    location.name, postcode, delivery_postcode
                                ));
                            }
                            Err(error) => {
                                tracing::debug!(%error, location = %location.name, "詢價失敗");
                                all_couriers_available = false;
                                reasons.push(format!(
                                    "No courier options available between pickup location {} \
                                     [{}] and delivery postcode [{}]",
                                    location.name, postcode, delivery_postcode
                                ));
                            }
                        }
                    } else {
                        all_couriers_available = false;
                        reasons.push(format!(
                            "Missing postal code for shipment from {}",
                            location.name
                        ));
                    }

                    shipments.push(shipment);
                }
            }

            if shipments.is_empty() {
                reasons.push(
                    "No valid shipments - all locations lack suitable packaging".to_string(),
                );
            }

            // 成本高的批次在前
            shipments.sort_by(|a, b| {
                b.total_cost()
                    .cmp(&a.total_cost())
                    .then(a.location_id.cmp(&b.location_id))
            });
            let total_cost: Decimal = shipments.iter().map(|s| s.total_cost()).sum();

            evaluated.push(EvaluatedCandidate {
                shipments,
                can_fulfill,
                shortfall,
                total_cost,
                all_couriers_available,
                unavailability_reason: if reasons.is_empty() {
                    None
                } else {
                    Some(reasons.join("; "))
                },
            });
        }

        tracing::debug!(evaluated = evaluated.len(), "Step 4: 候選評估完成");
        Ok(evaluated)
    }

    /// 擇優：優先取全程有貨運商的候選，否則退而求其次取
    /// 部分可運的候選；兩者皆無即拒絕。
    fn select(&self, evaluated: Vec<EvaluatedCandidate>) -> PlanResult<OptimizationResult> {
        let tie_break = self.config.tie_break;
        let compare = |a: &EvaluatedCandidate, b: &EvaluatedCandidate| -> Ordering {
            // 可足量出貨者恆優先
            b.can_fulfill.cmp(&a.can_fulfill).then(match tie_break {
                TieBreakPolicy::FewestShipmentsThenCost => a
                    .shipments
                    .len()
                    .cmp(&b.shipments.len())
                    .then(a.total_cost.cmp(&b.total_cost)),
                TieBreakPolicy::LowestCost => a
                    .total_cost
                    .cmp(&b.total_cost)
                    .then(a.shipments.len().cmp(&b.shipments.len())),
            })
        };

        let (mut available, mut partial): (Vec<_>, Vec<_>) = evaluated
            .into_iter()
            .filter(|e| !e.shipments.is_empty())
            .partition(|e| e.all_couriers_available);
        available.sort_by(compare);
        partial.sort_by(compare);

        if let Some(best) = available.into_iter().next() {
            let description = Self::describe(&best.shipments);
            return Ok(OptimizationResult::fulfilled(
                best.shipments,
                description,
                None,
                best.can_fulfill,
                best.shortfall,
                true,
                None,
            ));
        }

        // 退而求其次：批次仍可出貨，但部分無可用貨運商。
        // 結果維持成功，降級說明放在 message 與 unavailability_reason
        if let Some(best) = partial.into_iter().next() {
            let description = Self::describe(&best.shipments);
            return Ok(OptimizationResult::fulfilled(
                best.shipments,
                description,
                Some(Rejection::NoShippingOptions.to_string()),
                best.can_fulfill,
                best.shortfall,
                false,
                best.unavailability_reason,
            ));
        }

        Err(Rejection::NoShippingOptions.into())
    }

    /// 計畫摘要：單點為「All from X」，多點為「Split: A + B」，
    /// 同點多批次時標註批次數
    fn describe(shipments: &[Shipment]) -> String {
        let mut by_location: BTreeMap<i64, Vec<&Shipment>> = BTreeMap::new();
        for shipment in shipments {
            by_location
                .entry(shipment.location_id)
                .or_default()
                .push(shipment);
        }

        if by_location.len() == 1 {
            if let Some(group) = by_location.values().next() {
                let name = group
                    .first()
                    .map(|s| s.location_name.as_str())
                    .unwrap_or("");
                return if group.len() > 1 {
                    format!("All from {} ({} shipments)", name, group.len())
                } else {
                    format!("All from {name}")
                };
            }
        }

        let parts: Vec<String> = by_location
            .values()
            .map(|group| {
                let name = group
                    .first()
                    .map(|s| s.location_name.as_str())
                    .unwrap_or("");
                let items: u32 = group.iter().map(|s| s.total_quantity).sum();
                if group.len() > 1 {
                    format!("{} ({} items, {} shipments)", name, items, group.len())
                } else {
                    format!("{name} ({items} items)")
                }
            })
            .collect();
        format!("Split: {}", parts.join(" + "))
    }
}
