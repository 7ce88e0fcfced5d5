//! # Fulfill Core
//!
//! 履約引擎核心資料模型與類型定義

pub mod catalog;
pub mod config;
pub mod inventory;
pub mod location;
pub mod package;
pub mod product;
pub mod rejection;
pub mod request;
pub mod shipment;

// Re-export 主要類型
pub use catalog::{CatalogStore, InMemoryCatalog, RateQuote, RateSource};
pub use config::{OptimizerConfig, TieBreakPolicy};
pub use inventory::{PackageStock, ProductStock};
pub use location::PickupLocation;
pub use package::PackageSpec;
pub use product::Product;
pub use rejection::Rejection;
pub use request::FulfillmentRequest;
pub use shipment::{OptimizationResult, PackageUsage, ProductAllocation, Shipment};

/// 履約引擎錯誤類型（非預期失敗通道，業務拒絕見 [`Rejection`]）
#[derive(Debug, thiserror::Error)]
pub enum FulfillError {
    #[error("費率來源錯誤: {0}")]
    RateSource(String),

    #[error("目錄資料來源錯誤: {0}")]
    Catalog(String),

    #[error("計算錯誤: {0}")]
    Calculation(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FulfillError>;
