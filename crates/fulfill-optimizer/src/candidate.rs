//! 配置候選產生
//!
//! 自動模式下的三種策略：單點全量、貪婪合併（覆蓋品項多的
//! 出貨點優先）、貪婪庫存（各商品取可用量大的出貨點）。
//! 相同配置的候選去重。

use std::collections::{BTreeMap, BTreeSet};

use fulfill_calc::{Allocation, ResolvedInventory};

/// 配置候選
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationCandidate {
    /// 出貨點ID → 商品ID → 數量
    pub allocation: Allocation,

    /// 是否可足量出貨
    pub can_fulfill: bool,

    /// 缺口件數
    pub shortfall: u32,
}

impl AllocationCandidate {
    pub fn new(allocation: Allocation, can_fulfill: bool, shortfall: u32) -> Self {
        Self {
            allocation,
            can_fulfill,
            shortfall,
        }
    }

    /// 由已檢核的自訂配置建立候選
    pub fn from_custom(allocation: Allocation) -> Self {
        Self::new(allocation, true, 0)
    }

    /// 將不可服務出貨點的配置轉移到可服務出貨點
    ///
    /// 轉移目標依可配置量由大到小；轉不走的數量留在原出貨點，
    /// 由評估階段以無貨運商的批次出貨。沒有可服務出貨點時
    /// 整個配置原地保留。
    pub fn reallocate_unserviceable(
        &mut self,
        inventory: &ResolvedInventory,
        serviceable: &BTreeSet<i64>,
        unserviceable: &BTreeSet<i64>,
    ) {
        if unserviceable.is_empty() || serviceable.is_empty() {
            return;
        }

        let stranded: Vec<i64> = self
            .allocation
            .keys()
            .filter(|location_id| unserviceable.contains(location_id))
            .copied()
            .collect();

        for source_id in stranded {
            let products: Vec<(i64, u32)> = self
                .allocation
                .get(&source_id)
                .map(|p| p.iter().map(|(&id, &qty)| (id, qty)).collect())
                .unwrap_or_default();

            for (product_id, qty) in products {
                let Some(resolved) = inventory.products.get(&product_id) else {
                    continue;
                };

                let mut targets: Vec<(i64, u32)> = resolved
                    .stock_by_location
                    .iter()
                    .filter(|(location_id, _)| serviceable.contains(location_id))
                    .map(|(&location_id, availability)| (location_id, availability.usable()))
                    .collect();
                targets.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

                let mut remaining = qty;
                for (target_id, usable) in targets {
                    if remaining == 0 {
                        break;
                    }
                    let already = self
                        .allocation
                        .get(&target_id)
                        .and_then(|products| products.get(&product_id))
                        .copied()
                        .unwrap_or(0);
                    let room = usable.saturating_sub(already);
                    if room > 0 {
                        let moved = remaining.min(room);
                        *self
                            .allocation
                            .entry(target_id)
                            .or_default()
                            .entry(product_id)
                            .or_insert(0) += moved;
                        remaining -= moved;
                    }
                }

                if let Some(source) = self.allocation.get_mut(&source_id) {
                    if remaining == 0 {
                        source.remove(&product_id);
                    } else {
                        source.insert(product_id, remaining);
                    }
                }
            }

            if self
                .allocation
                .get(&source_id)
                .map(|p| p.is_empty())
                .unwrap_or(false)
            {
                self.allocation.remove(&source_id);
            }
        }
    }
}

/// 候選產生器
pub struct CandidateGenerator;

impl CandidateGenerator {
    /// 由解析後庫存產生自動模式候選
    pub fn generate(
        inventory: &ResolvedInventory,
        requested: &BTreeMap<i64, u32>,
    ) -> Vec<AllocationCandidate> {
        let mut candidates: Vec<AllocationCandidate> = Vec::new();

        // 策略一：可獨力出貨的單點候選
        for (&location_id, resolved_location) in &inventory.locations {
            if !resolved_location.has_packages_configured() {
                continue;
            }
            if Self::location_can_fulfill(inventory, location_id, requested) {
                let mut allocation: Allocation = BTreeMap::new();
                allocation.insert(location_id, requested.clone());
                Self::push_unique(&mut candidates, AllocationCandidate::new(allocation, true, 0));
            }
        }

        // 策略二：貪婪合併
        Self::push_unique(
            &mut candidates,
            Self::greedy_consolidation(inventory, requested),
        );

        // 策略三：貪婪庫存
        Self::push_unique(&mut candidates, Self::greedy_stock(inventory, requested));

        candidates
    }

    fn location_can_fulfill(
        inventory: &ResolvedInventory,
        location_id: i64,
        requested: &BTreeMap<i64, u32>,
    ) -> bool {
        requested.iter().all(|(product_id, &qty)| {
            inventory
                .products
                .get(product_id)
                .and_then(|resolved| resolved.stock_by_location.get(&location_id))
                .map(|availability| availability.usable() >= qty)
                .unwrap_or(false)
        })
    }

    /// 覆蓋品項多的出貨點優先，集中配置以減少批次數
    fn greedy_consolidation(
        inventory: &ResolvedInventory,
        requested: &BTreeMap<i64, u32>,
    ) -> AllocationCandidate {
        let mut ordered: Vec<(i64, usize)> = inventory
            .locations
            .iter()
            .filter(|(_, resolved_location)| resolved_location.has_packages_configured())
            .map(|(&location_id, _)| {
                let coverage = requested
                    .keys()
                    .filter(|product_id| {
                        inventory
                            .products
                            .get(product_id)
                            .and_then(|resolved| resolved.stock_by_location.get(&location_id))
                            .map(|availability| availability.usable() > 0)
                            .unwrap_or(false)
                    })
                    .count();
                (location_id, coverage)
            })
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut remaining: BTreeMap<i64, u32> = requested.clone();
        let mut allocation: Allocation = BTreeMap::new();

        for (location_id, _) in ordered {
            for (&product_id, qty_remaining) in remaining.iter_mut() {
                if *qty_remaining == 0 {
                    continue;
                }
                let usable = inventory
                    .products
                    .get(&product_id)
                    .and_then(|resolved| resolved.stock_by_location.get(&location_id))
                    .map(|availability| availability.usable())
                    .unwrap_or(0);
                let take = (*qty_remaining).min(usable);
                if take > 0 {
                    *allocation
                        .entry(location_id)
                        .or_default()
                        .entry(product_id)
                        .or_insert(0) += take;
                    *qty_remaining -= take;
                }
            }
        }

        let shortfall: u32 = remaining.values().sum();
        AllocationCandidate::new(allocation, shortfall == 0, shortfall)
    }

    /// 各商品取可用量大的出貨點
    fn greedy_stock(
        inventory: &ResolvedInventory,
        requested: &BTreeMap<i64, u32>,
    ) -> AllocationCandidate {
        let mut allocation: Allocation = BTreeMap::new();
        let mut shortfall: u32 = 0;

        for (&product_id, &qty) in requested {
            let Some(resolved) = inventory.products.get(&product_id) else {
                shortfall += qty;
                continue;
            };

            let mut targets: Vec<(i64, u32)> = resolved
                .stock_by_location
                .iter()
                .filter(|(location_id, _)| {
                    inventory
                        .locations
                        .get(location_id)
                        .map(|l| l.has_packages_configured())
                        .unwrap_or(false)
                })
                .map(|(&location_id, availability)| (location_id, availability.usable()))
                .collect();
            targets.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

            let mut remaining = qty;
            for (location_id, usable) in targets {
                if remaining == 0 {
                    break;
                }
                let take = remaining.min(usable);
                if take > 0 {
                    *allocation
                        .entry(location_id)
                        .or_default()
                        .entry(product_id)
                        .or_insert(0) += take;
                    remaining -= take;
                }
            }
            shortfall += remaining;
        }

        AllocationCandidate::new(allocation, shortfall == 0, shortfall)
    }

    fn push_unique(candidates: &mut Vec<AllocationCandidate>, candidate: AllocationCandidate) {
        if candidate.allocation.is_empty() {
            return;
        }
        if candidates
            .iter()
            .any(|existing| existing.allocation == candidate.allocation)
        {
            return;
        }
        candidates.push(candidate);
    }
}
