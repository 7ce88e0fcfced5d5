//! 配置規劃與檢核
//!
//! 自動模式的前置可行性檢查，以及自訂配置的逐項檢核。

use std::collections::BTreeMap;

use fulfill_core::Rejection;

use crate::inventory::{PackagingShortfall, ResolvedInventory};
use crate::PlanResult;

/// 配置：出貨點ID → 商品ID → 數量
pub type Allocation = BTreeMap<i64, BTreeMap<i64, u32>>;

/// 配置規劃器
pub struct AllocationPlanner;

impl AllocationPlanner {
    /// 自動模式前置可行性檢查
    ///
    /// 逐商品檢查（依請求順序，首個違規即中止）：
    /// 1. 全出貨點庫存為零；
    /// 2. 有庫存但完全無法裝箱（依出貨點缺包裝原因分類訊息）；
    /// 3. 可配置量不足請求量。
    pub fn check_feasibility(
        inventory: &ResolvedInventory,
        requested: &BTreeMap<i64, u32>,
    ) -> PlanResult<()> {
        for (&product_id, &requested_qty) in requested {
            let Some(resolved) = inventory.products.get(&product_id) else {
                return Err(Rejection::ProductNotFound(product_id).into());
            };
            let title = resolved.product.title.clone();

            let total_available = resolved.total_available();
            if total_available == 0 {
                return Err(Rejection::InsufficientStock {
                    product: title,
                    requested: requested_qty,
                }
                .into());
            }

            let total_usable = resolved.total_usable();
            if total_usable == 0 {
                let shortfalls: Vec<PackagingShortfall> = resolved
                    .stock_by_location
                    .values()
                    .filter(|a| a.available_stock > 0)
                    .filter_map(|a| a.shortfall)
                    .collect();

                let rejection = if shortfalls
                    .iter()
                    .all(|s| *s == PackagingShortfall::NoPackagesConfigured)
                {
                    Rejection::NoPackagesConfigured {
                        product: title,
                        available: total_available,
                        requested: requested_qty,
                    }
                } else if shortfalls
                    .iter()
                    .any(|s| *s == PackagingShortfall::NoPackagesAvailable)
                {
                    Rejection::NoPackagesAvailable {
                        product: title,
                        available: total_available,
                        requested: requested_qty,
                    }
                } else {
                    Rejection::ExceedsPackageLimits {
                        product: title,
                        available: total_available,
                        requested: requested_qty,
                    }
                };
                return Err(rejection.into());
            }

            if total_usable < requested_qty {
                return Err(Rejection::InsufficientPackaging {
                    product: title,
                    requested: requested_qty,
                    available: total_available,
                    packable: total_usable,
                }
                .into());
            }
        }

        Ok(())
    }

    /// 自訂配置檢核（按序短路）
    ///
    /// 逐配置項檢查：商品存在 → 出貨點存在且有庫存對應 →
    /// 數量不超過庫存 → 出貨點有包材且裝得下。零數量項過濾後
    /// 若無任何配置則拒絕。
    pub fn validate_custom(
        custom: &BTreeMap<i64, BTreeMap<i64, u32>>,
        inventory: &ResolvedInventory,
    ) -> PlanResult<Allocation> {
        let mut allocation: Allocation = BTreeMap::new();

        for (&product_id, location_quantities) in custom {
            let Some(resolved) = inventory.products.get(&product_id) else {
                return Err(Rejection::ProductNotFound(product_id)
                    .into_custom_failure()
                    .into());
            };

            for (&location_id, &qty) in location_quantities {
                if qty == 0 {
                    continue;
                }
                let title = resolved.product.title.clone();

                let Some(resolved_location) = inventory.locations.get(&location_id) else {
                    return Err(Rejection::LocationNotFound {
                        product: title,
                        location_id,
                    }
                    .into_custom_failure()
                    .into());
                };
                let location_name = resolved_location.location.name.clone();

                let Some(availability) = resolved.stock_by_location.get(&location_id) else {
                    return Err(Rejection::NotAvailableAtLocation {
                        product: title,
                        location: location_name,
                    }
                    .into_custom_failure()
                    .into());
                };

                if availability.available_stock < qty {
                    return Err(Rejection::InsufficientStockAtLocation {
                        product: title,
                        location: location_name,
                        requested: qty,
                        available: availability.available_stock,
                    }
                    .into_custom_failure()
                    .into());
                }

                if !resolved_location.has_packages_configured() {
                    return Err(Rejection::NoPackagesAtLocation {
                        product: title,
                        location: location_name,
                    }
                    .into_custom_failure()
                    .into());
                }

                if availability.usable() < qty {
                    return Err(Rejection::CannotPackageAtLocation {
                        product: title,
                        location: location_name,
                        requested: qty,
                        packable: availability.usable(),
                    }
                    .into_custom_failure()
                    .into());
                }

                allocation
                    .entry(location_id)
                    .or_default()
                    .insert(product_id, qty);
            }
        }

        if allocation.is_empty() {
            return Err(Rejection::NoValidAllocationsSpecified.into());
        }

        Ok(allocation)
    }
}
