//! 最佳化引擎配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 同分決勝策略：多個候選皆可全程出貨時如何挑選
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreakPolicy {
    /// 先比出貨批次數（越少越好），再比總成本
    FewestShipmentsThenCost,
    /// 只比總成本
    LowestCost,
}

/// 最佳化引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// 路線承重探測階梯（公斤，由大到小）
    pub weight_ladder_kgs: Vec<Decimal>,

    /// 郵遞區號缺漏時的單批次重量上限（公斤）
    pub fallback_max_weight_kgs: Decimal,

    /// 詢價最低計費重量（公斤）
    pub min_billable_weight_kgs: Decimal,

    /// 同分決勝策略
    pub tie_break: TieBreakPolicy,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            weight_ladder_kgs: [500, 400, 300, 200, 100]
                .into_iter()
                .map(Decimal::from)
                .collect(),
            fallback_max_weight_kgs: Decimal::from(150),
            min_billable_weight_kgs: Decimal::new(5, 1),
            tie_break: TieBreakPolicy::FewestShipmentsThenCost,
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置承重探測階梯
    pub fn with_weight_ladder(mut self, ladder: Vec<Decimal>) -> Self {
        self.weight_ladder_kgs = ladder;
        self
    }

    /// 建構器模式：設置後備重量上限
    pub fn with_fallback_max_weight(mut self, max_weight_kgs: Decimal) -> Self {
        self.fallback_max_weight_kgs = max_weight_kgs;
        self
    }

    /// 建構器模式：設置同分決勝策略
    pub fn with_tie_break(mut self, tie_break: TieBreakPolicy) -> Self {
        self.tie_break = tie_break;
        self
    }
}
