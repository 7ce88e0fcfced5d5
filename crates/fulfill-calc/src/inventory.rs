//! 庫存解析
//!
//! 把請求的商品ID解析為完整的規劃輸入：商品主檔、各出貨點的
//! 可用庫存與可裝箱量、出貨點主檔與包材配置。逐商品封閉失敗：
//! 任一請求商品查無庫存即中止整個請求。

use std::collections::BTreeMap;

use fulfill_core::{CatalogStore, PackageSpec, PickupLocation, Product, Rejection};

use crate::packing::PackingPlanner;
use crate::PlanResult;

/// 某出貨點對某商品缺乏包裝能力的分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingShortfall {
    /// 出貨點未配置任何包材
    NoPackagesConfigured,
    /// 包材庫存皆為零
    NoPackagesAvailable,
    /// 商品尺寸/重量超出所有包材限制
    ExceedsLimits,
}

/// 商品在單一出貨點的可用性
#[derive(Debug, Clone)]
pub struct LocationAvailability {
    /// 可用庫存
    pub available_stock: u32,

    /// 包裝能力上限（假設包材庫存全數用於該商品）
    pub max_packable: u32,

    /// 無法裝箱時的原因分類
    pub shortfall: Option<PackagingShortfall>,
}

impl LocationAvailability {
    /// 實際可配置上限：庫存與可裝箱量取小
    pub fn usable(&self) -> u32 {
        self.available_stock.min(self.max_packable)
    }
}

/// 解析後的商品
#[derive(Debug, Clone)]
pub struct ResolvedProduct {
    pub product: Product,

    /// 出貨點ID → 可用性
    pub stock_by_location: BTreeMap<i64, LocationAvailability>,
}

impl ResolvedProduct {
    /// 全出貨點可用庫存總和
    pub fn total_available(&self) -> u32 {
        self.stock_by_location
            .values()
            .fold(0u32, |acc, a| acc.saturating_add(a.available_stock))
    }

    /// 全出貨點可配置（含包裝限制）總和
    pub fn total_usable(&self) -> u32 {
        self.stock_by_location
            .values()
            .fold(0u32, |acc, a| acc.saturating_add(a.usable()))
    }
}

/// 解析後的出貨點
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    pub location: PickupLocation,

    /// 配置的包材規格與可用數量
    pub packages: Vec<(PackageSpec, u32)>,
}

impl ResolvedLocation {
    pub fn has_packages_configured(&self) -> bool {
        !self.packages.is_empty()
    }

    pub fn has_packages_available(&self) -> bool {
        self.packages.iter().any(|(_, qty)| *qty > 0)
    }
}

/// 解析完成的規劃輸入
#[derive(Debug, Clone)]
pub struct ResolvedInventory {
    /// 商品ID → 解析後商品
    pub products: BTreeMap<i64, ResolvedProduct>,

    /// 出貨點ID → 解析後出貨點
    pub locations: BTreeMap<i64, ResolvedLocation>,
}

/// 庫存解析器
pub struct InventoryResolver;

impl InventoryResolver {
    /// 解析請求的商品集合
    pub fn resolve(
        catalog: &dyn CatalogStore,
        requested: &BTreeMap<i64, u32>,
    ) -> PlanResult<ResolvedInventory> {
        let ids: Vec<i64> = requested.keys().copied().collect();

        let products = catalog.find_products(&ids)?;
        if products.is_empty() {
            return Err(Rejection::NoValidProducts.into());
        }
        let product_map: BTreeMap<i64, Product> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let stock_rows = catalog.find_product_stock(&ids)?;

        // 出貨點主檔與包材配置（每個出貨點只查一次）
        let mut locations: BTreeMap<i64, ResolvedLocation> = BTreeMap::new();
        for row in &stock_rows {
            if locations.contains_key(&row.location_id) {
                continue;
            }
            if let Some(location) = catalog.find_location(row.location_id)? {
                let packages = catalog.find_packages_at(row.location_id)?;
                locations.insert(row.location_id, ResolvedLocation { location, packages });
            }
        }

        let mut resolved_products: BTreeMap<i64, ResolvedProduct> = BTreeMap::new();
        for &product_id in requested.keys() {
            let Some(product) = product_map.get(&product_id).cloned() else {
                return Err(Rejection::ProductNotFound(product_id).into());
            };

            let mut stock_by_location: BTreeMap<i64, LocationAvailability> = BTreeMap::new();
            for row in stock_rows.iter().filter(|r| r.product_id == product_id) {
                let Some(resolved_location) = locations.get(&row.location_id) else {
                    continue;
                };

                let max_packable =
                    PackingPlanner::max_packable(&product, &resolved_location.packages);
                let shortfall = if !resolved_location.has_packages_configured() {
                    Some(PackagingShortfall::NoPackagesConfigured)
                } else if !resolved_location
                    .packages
                    .iter()
                    .any(|(spec, _)| spec.can_hold(&product))
                {
                    Some(PackagingShortfall::ExceedsLimits)
                } else if !resolved_location.has_packages_available() {
                    Some(PackagingShortfall::NoPackagesAvailable)
                } else if max_packable == 0 {
                    Some(PackagingShortfall::NoPackagesAvailable)
                } else {
                    None
                };

                stock_by_location.insert(
                    row.location_id,
                    LocationAvailability {
                        available_stock: row.available_stock,
                        max_packable,
                        shortfall,
                    },
                );
            }

            // 逐商品封閉失敗：查無庫存列即中止
            if stock_by_location.is_empty() {
                return Err(Rejection::ProductNotFound(product_id).into());
            }

            resolved_products.insert(
                product_id,
                ResolvedProduct {
                    product,
                    stock_by_location,
                },
            );
        }

        tracing::debug!(
            products = resolved_products.len(),
            locations = locations.len(),
            "庫存解析完成"
        );

        Ok(ResolvedInventory {
            products: resolved_products,
            locations,
        })
    }
}
