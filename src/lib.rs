//! # Fulfill
//!
//! 多出貨點履約最佳化引擎：解析庫存、產生配置候選、分批裝箱、
//! 探測運費並擇優產出履約計畫。
//!
//! 各子 crate 的分工：
//! - `fulfill-core`：領域模型、錯誤類型、目錄與費率介面
//! - `fulfill-calc`：庫存解析、配置檢核、裝箱、分批與運費探測
//! - `fulfill-optimizer`：候選產生與最佳化協調器

pub use fulfill_core::*;

pub use fulfill_calc::{
    Allocation, AllocationPlanner, InventoryResolver, PackingPlan, PackingPlanner, PlanError,
    PlanResult, RateProber, ResolvedInventory, ShipmentSplitter,
};

pub use fulfill_optimizer::{AllocationCandidate, CandidateGenerator, Optimizer};
