//! 業務拒絕原因
//!
//! 對外回應使用的英文訊息字串是既定介面，不可改寫。

/// 業務規則拒絕（封閉枚舉，`Display` 輸出即對外訊息）
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("No products specified")]
    NoProductsSpecified,

    #[error("Delivery postcode required")]
    DeliveryPostcodeRequired,

    #[error("Product ID {0} not found")]
    ProductNotFound(i64),

    #[error("No valid products found")]
    NoValidProducts,

    #[error("No valid allocation strategies found")]
    NoValidAllocationStrategies,

    #[error("No shipping options available for any fulfillment strategy. This may be due to weight limits or route restrictions.")]
    NoShippingOptions,

    #[error("Insufficient stock for product '{product}'. Requested: {requested}, Available stock: 0")]
    InsufficientStock { product: String, requested: u32 },

    #[error("Insufficient stock/packaging for product '{product}'. Requested: {requested}, Available stock: {available}, Packable (considering packaging constraints): {packable}")]
    InsufficientPackaging {
        product: String,
        requested: u32,
        available: u32,
        packable: u32,
    },

    #[error("Product '{product}' cannot be packaged. Stock available: {available}, but no packages are configured at pickup locations. Requested: {requested}")]
    NoPackagesConfigured {
        product: String,
        available: u32,
        requested: u32,
    },

    #[error("Product '{product}' cannot be packaged. Stock available: {available}, but no packages are available at pickup locations (all packages have 0 quantity). Requested: {requested}")]
    NoPackagesAvailable {
        product: String,
        available: u32,
        requested: u32,
    },

    #[error("Product '{product}' cannot be packaged. Stock available: {available}, but product dimensions/weight exceed all available package limits. Requested: {requested}")]
    ExceedsPackageLimits {
        product: String,
        available: u32,
        requested: u32,
    },

    // 自訂配置逐項檢核的違規明細
    #[error("Product '{product}': Location ID {location_id} not found")]
    LocationNotFound { product: String, location_id: i64 },

    #[error("Product '{product}': Not available at location '{location}' (no stock mapping exists)")]
    NotAvailableAtLocation { product: String, location: String },

    #[error("Product '{product}': Insufficient stock at '{location}'. Requested: {requested}, Available: {available}")]
    InsufficientStockAtLocation {
        product: String,
        location: String,
        requested: u32,
        available: u32,
    },

    #[error("Product '{product}': No packages available at '{location}'")]
    NoPackagesAtLocation { product: String, location: String },

    #[error("Product '{product}': Cannot package {requested} units at '{location}'. Max packable: {packable}")]
    CannotPackageAtLocation {
        product: String,
        location: String,
        requested: u32,
        packable: u32,
    },

    #[error("Custom allocation validation failed:\n {0}")]
    CustomAllocationFailed(Box<Rejection>),

    #[error("No valid allocations specified")]
    NoValidAllocationsSpecified,
}

impl Rejection {
    /// 包裝為自訂配置檢核失敗
    pub fn into_custom_failure(self) -> Self {
        Rejection::CustomAllocationFailed(Box::new(self))
    }
}
