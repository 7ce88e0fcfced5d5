//! 多商品裝箱規劃
//!
//! 單一出貨點內的裝箱：把商品件數攤平為單件（體積大者先裝），
//! 優先填入剩餘容量最大的既開包材，裝不下才依成本效率開新包材。
//! 包材庫存用罄時剩餘件數回報為 leftover，不拋錯。

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use fulfill_core::{PackageSpec, PackageUsage, Product};

/// 裝箱規劃結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct PackingPlan {
    /// 各包材規格的使用情況（依包材名稱排序）
    pub usages: Vec<PackageUsage>,

    /// 裝不下的件數（商品ID → 數量）
    pub leftover: BTreeMap<i64, u32>,
}

impl PackingPlan {
    /// 完全無法裝箱（可區分的結果，非錯誤）
    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// 全數裝箱完成
    pub fn fully_packed(&self) -> bool {
        self.leftover.is_empty()
    }

    /// 包材總成本
    pub fn packaging_cost(&self) -> Decimal {
        self.usages.iter().map(|u| u.total_cost).sum()
    }

    /// 已裝箱件數
    pub fn packed_quantity(&self) -> u32 {
        self.usages
            .iter()
            .map(|u| u.product_quantities.values().sum::<u32>())
            .sum()
    }

    /// 未裝箱件數
    pub fn leftover_quantity(&self) -> u32 {
        self.leftover.values().sum()
    }
}

/// 開箱中的包材實體
struct OpenPackage {
    spec_index: usize,
    remaining_volume: Decimal,
    remaining_weight: Option<Decimal>,
    contents: BTreeMap<i64, u32>,
}

/// 裝箱規劃器
pub struct PackingPlanner;

impl PackingPlanner {
    /// 將商品件數組裝入出貨點的可用包材
    pub fn pack(items: &[(Product, u32)], packages: &[(PackageSpec, u32)]) -> PackingPlan {
        // 攤平為單件，體積大者先裝（first-fit decreasing）
        let mut units: Vec<&Product> = Vec::new();
        for (product, qty) in items {
            for _ in 0..*qty {
                units.push(product);
            }
        }
        units.sort_by(|a, b| b.volume_cm3().cmp(&a.volume_cm3()).then(a.id.cmp(&b.id)));

        let mut remaining_stock: Vec<u32> = packages.iter().map(|(_, qty)| *qty).collect();
        let mut open: Vec<OpenPackage> = Vec::new();
        let mut leftover: BTreeMap<i64, u32> = BTreeMap::new();

        for product in units {
            let volume = product.volume_cm3();
            let weight = product.unit_weight_kgs();

            // 既開包材中剩餘容量最大者優先
            let slot = open
                .iter_mut()
                .filter(|p| {
                    let spec = &packages[p.spec_index].0;
                    spec.can_hold(product)
                        && p.remaining_volume >= volume
                        && p.remaining_weight.map_or(true, |rw| rw >= weight)
                })
                .max_by(|a, b| {
                    a.remaining_volume
                        .cmp(&b.remaining_volume)
                        .then(b.spec_index.cmp(&a.spec_index))
                });

            if let Some(slot) = slot {
                slot.remaining_volume -= volume;
                if let Some(rw) = slot.remaining_weight.as_mut() {
                    *rw -= weight;
                }
                *slot.contents.entry(product.id).or_insert(0) += 1;
                continue;
            }

            // 開新包材：可容納者中取成本/容積比最低
            let best = (0..packages.len())
                .filter(|&i| remaining_stock[i] > 0)
                .filter(|&i| {
                    let spec = &packages[i].0;
                    spec.can_hold(product) && spec.volume_cm3() >= volume
                })
                .min_by(|&a, &b| {
                    let (sa, sb) = (&packages[a].0, &packages[b].0);
                    (sa.cost_per_unit * sb.volume_cm3())
                        .cmp(&(sb.cost_per_unit * sa.volume_cm3()))
                        .then(sb.volume_cm3().cmp(&sa.volume_cm3()))
                        .then(sa.id.cmp(&sb.id))
                });

            match best {
                Some(index) => {
                    remaining_stock[index] -= 1;
                    let spec = &packages[index].0;
                    let mut contents = BTreeMap::new();
                    contents.insert(product.id, 1);
                    open.push(OpenPackage {
                        spec_index: index,
                        remaining_volume: spec.volume_cm3() - volume,
                        remaining_weight: spec.max_weight_kgs.map(|m| m - weight),
                        contents,
                    });
                }
                None => {
                    *leftover.entry(product.id).or_insert(0) += 1;
                }
            }
        }

        // 依包材規格彙總
        let mut by_spec: BTreeMap<i64, PackageUsage> = BTreeMap::new();
        for instance in open {
            let spec = &packages[instance.spec_index].0;
            let usage = by_spec.entry(spec.id).or_insert_with(|| PackageUsage {
                package: spec.clone(),
                quantity_used: 0,
                product_quantities: BTreeMap::new(),
                total_cost: Decimal::ZERO,
            });
            usage.quantity_used += 1;
            usage.total_cost += spec.cost_per_unit;
            for (product_id, qty) in instance.contents {
                *usage.product_quantities.entry(product_id).or_insert(0) += qty;
            }
        }

        let mut usages: Vec<PackageUsage> = by_spec.into_values().collect();
        usages.sort_by(|a, b| {
            a.package
                .name
                .cmp(&b.package.name)
                .then(a.package.id.cmp(&b.package.id))
        });

        PackingPlan { usages, leftover }
    }

    /// 商品在此包材組合下的最大可裝箱件數
    ///
    /// 假設出貨點全部包材庫存都用於該商品。
    pub fn max_packable(product: &Product, packages: &[(PackageSpec, u32)]) -> u32 {
        let item_volume = product.volume_cm3();
        let unit_weight = product.unit_weight_kgs();

        let mut total: u64 = 0;
        for (spec, qty) in packages {
            if *qty == 0 || !spec.can_hold(product) {
                continue;
            }

            let by_volume = if item_volume > Decimal::ZERO {
                (spec.volume_cm3() / item_volume)
                    .floor()
                    .to_u64()
                    .unwrap_or(u64::MAX)
            } else {
                u64::MAX
            };

            let by_weight = match spec.max_weight_kgs {
                Some(max) if unit_weight > Decimal::ZERO => {
                    (max / unit_weight).floor().to_u64().unwrap_or(u64::MAX)
                }
                _ => u64::MAX,
            };

            let per_instance = by_volume.min(by_weight);
            total = total.saturating_add(per_instance.saturating_mul(*qty as u64));
        }

        total.min(u32::MAX as u64) as u32
    }
}
