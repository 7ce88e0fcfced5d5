//! # Fulfill Calculation Engine
//!
//! 履約規劃核心計算：庫存解析、配置檢核、裝箱、分批與運費探測

pub mod allocation;
pub mod inventory;
pub mod packing;
pub mod rates;
pub mod splitting;

// Re-export 主要類型
pub use allocation::{Allocation, AllocationPlanner};
pub use inventory::{
    InventoryResolver, LocationAvailability, PackagingShortfall, ResolvedInventory,
    ResolvedLocation, ResolvedProduct,
};
pub use packing::{PackingPlan, PackingPlanner};
pub use rates::RateProber;
pub use splitting::ShipmentSplitter;

use fulfill_core::{FulfillError, Rejection};

/// 規劃階段錯誤：業務拒絕與非預期失敗在型別上區分，
/// 不共用同一條例外通道
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// 業務規則拒絕（對外轉為 `success=false` 回應）
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// 非預期的內部錯誤
    #[error(transparent)]
    Internal(#[from] FulfillError),
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;
