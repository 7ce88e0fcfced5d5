//! 外部資料來源介面
//!
//! 目錄（商品、出貨點、庫存、包材）與費率聚合服務都隔離在
//! trait 之後，規劃器只依賴介面，不依賴任何持久層或 HTTP 客戶端。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::inventory::{PackageStock, ProductStock};
use crate::location::PickupLocation;
use crate::package::PackageSpec;
use crate::product::Product;
use crate::Result;

/// 目錄資料來源
pub trait CatalogStore {
    /// 查詢商品主檔。不存在的ID靜默略過，由呼叫端判定缺漏。
    fn find_products(&self, ids: &[i64]) -> Result<Vec<Product>>;

    /// 查詢商品在各出貨點的庫存列
    fn find_product_stock(&self, product_ids: &[i64]) -> Result<Vec<ProductStock>>;

    /// 查詢出貨點主檔
    fn find_location(&self, id: i64) -> Result<Option<PickupLocation>>;

    /// 查詢出貨點配置的包材規格與可用數量
    fn find_packages_at(&self, location_id: i64) -> Result<Vec<(PackageSpec, u32)>>;
}

/// 單一貨運選項報價
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    /// 貨運商名稱
    pub courier: String,

    /// 運費
    pub rate: Decimal,

    /// 預估送達天數
    pub estimated_delivery_days: Option<u32>,
}

impl RateQuote {
    pub fn new(courier: impl Into<String>, rate: Decimal) -> Self {
        Self {
            courier: courier.into(),
            rate,
            estimated_delivery_days: None,
        }
    }

    /// 建構器模式：設置預估送達天數
    pub fn with_estimated_delivery_days(mut self, days: u32) -> Self {
        self.estimated_delivery_days = Some(days);
        self
    }
}

/// 費率聚合服務
pub trait RateSource {
    /// 取得/刷新認證權杖。失敗不得中止探測流程。
    fn acquire_token(&self) -> Result<()>;

    /// 查詢指定路線與重量下的可用貨運選項
    fn available_options(
        &self,
        pickup_postcode: &str,
        delivery_postcode: &str,
        weight_kgs: Decimal,
        cash_on_delivery: bool,
    ) -> Result<Vec<RateQuote>>;
}

/// 記憶體目錄，供測試與內嵌呼叫端使用
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: BTreeMap<i64, Product>,
    locations: BTreeMap<i64, PickupLocation>,
    product_stock: Vec<ProductStock>,
    package_specs: BTreeMap<i64, PackageSpec>,
    package_stock: Vec<PackageStock>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：登錄商品
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.id, product);
        self
    }

    /// 建構器模式：登錄出貨點
    pub fn with_location(mut self, location: PickupLocation) -> Self {
        self.locations.insert(location.id, location);
        self
    }

    /// 建構器模式：登錄商品庫存
    pub fn with_product_stock(mut self, product_id: i64, location_id: i64, qty: u32) -> Self {
        self.product_stock
            .push(ProductStock::new(product_id, location_id, qty));
        self
    }

    /// 建構器模式：登錄包材規格
    pub fn with_package(mut self, spec: PackageSpec) -> Self {
        self.package_specs.insert(spec.id, spec);
        self
    }

    /// 建構器模式：登錄包材庫存
    pub fn with_package_stock(mut self, package_id: i64, location_id: i64, qty: u32) -> Self {
        self.package_stock
            .push(PackageStock::new(package_id, location_id, qty));
        self
    }
}

impl CatalogStore for InMemoryCatalog {
    fn find_products(&self, ids: &[i64]) -> Result<Vec<Product>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).cloned())
            .collect())
    }

    fn find_product_stock(&self, product_ids: &[i64]) -> Result<Vec<ProductStock>> {
        Ok(self
            .product_stock
            .iter()
            .filter(|row| product_ids.contains(&row.product_id))
            .cloned()
            .collect())
    }

    fn find_location(&self, id: i64) -> Result<Option<PickupLocation>> {
        Ok(self.locations.get(&id).cloned())
    }

    fn find_packages_at(&self, location_id: i64) -> Result<Vec<(PackageSpec, u32)>> {
        Ok(self
            .package_stock
            .iter()
            .filter(|row| row.location_id == location_id)
            .filter_map(|row| {
                self.package_specs
                    .get(&row.package_id)
                    .map(|spec| (spec.clone(), row.available_quantity))
            })
            .collect())
    }
}
