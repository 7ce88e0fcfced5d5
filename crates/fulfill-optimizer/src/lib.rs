//! # Fulfill Optimizer
//!
//! 履約最佳化：配置候選產生、逐候選評估（分批、裝箱、詢價）
//! 與擇優選擇

pub mod candidate;
pub mod orchestrator;

// Re-export 主要類型
pub use candidate::{AllocationCandidate, CandidateGenerator};
pub use orchestrator::Optimizer;
