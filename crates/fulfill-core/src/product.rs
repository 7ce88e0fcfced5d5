//! 商品模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 商品主檔
///
/// 尺寸與重量允許缺漏：缺重量時以預設單件重量計費，
/// 缺尺寸時視為零體積（可放入任何包材）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 商品ID
    pub id: i64,

    /// 商品名稱
    pub title: String,

    /// 長（公分）
    pub length_cm: Option<Decimal>,

    /// 寬（公分）
    pub breadth_cm: Option<Decimal>,

    /// 高（公分）
    pub height_cm: Option<Decimal>,

    /// 單件重量（公斤）
    pub weight_kgs: Option<Decimal>,
}

impl Product {
    /// 創建新的商品
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            length_cm: None,
            breadth_cm: None,
            height_cm: None,
            weight_kgs: None,
        }
    }

    /// 建構器模式：設置尺寸（公分）
    pub fn with_dimensions(mut self, length: Decimal, breadth: Decimal, height: Decimal) -> Self {
        self.length_cm = Some(length);
        self.breadth_cm = Some(breadth);
        self.height_cm = Some(height);
        self
    }

    /// 建構器模式：設置單件重量（公斤）
    pub fn with_weight(mut self, weight_kgs: Decimal) -> Self {
        self.weight_kgs = Some(weight_kgs);
        self
    }

    /// 預設單件重量（0.5 公斤）
    pub fn default_unit_weight() -> Decimal {
        Decimal::new(5, 1)
    }

    /// 單件重量，缺漏時回退為預設值
    pub fn unit_weight_kgs(&self) -> Decimal {
        self.weight_kgs.unwrap_or_else(Self::default_unit_weight)
    }

    /// 單件體積（立方公分），缺尺寸視為零
    pub fn volume_cm3(&self) -> Decimal {
        match (self.length_cm, self.breadth_cm, self.height_cm) {
            (Some(l), Some(b), Some(h)) => l * b * h,
            _ => Decimal::ZERO,
        }
    }

    /// 由小到大排序的三邊尺寸，用於旋轉不敏感的裝箱判斷
    pub fn sorted_dims(&self) -> [Decimal; 3] {
        let mut dims = [
            self.length_cm.unwrap_or(Decimal::ZERO),
            self.breadth_cm.unwrap_or(Decimal::ZERO),
            self.height_cm.unwrap_or(Decimal::ZERO),
        ];
        dims.sort();
        dims
    }
}
