//! 包材模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// 包材規格（紙箱、信封袋等）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// 包材ID
    pub id: i64,

    /// 包材名稱
    pub name: String,

    /// 內部長（公分）
    pub length_cm: Decimal,

    /// 內部寬（公分）
    pub breadth_cm: Decimal,

    /// 內部高（公分）
    pub height_cm: Decimal,

    /// 承重上限（公斤），無上限時為 None
    pub max_weight_kgs: Option<Decimal>,

    /// 單個包材成本
    pub cost_per_unit: Decimal,
}

impl PackageSpec {
    /// 創建新的包材規格
    pub fn new(
        id: i64,
        name: impl Into<String>,
        length_cm: Decimal,
        breadth_cm: Decimal,
        height_cm: Decimal,
        cost_per_unit: Decimal,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            length_cm,
            breadth_cm,
            height_cm,
            max_weight_kgs: None,
            cost_per_unit,
        }
    }

    /// 建構器模式：設置承重上限
    pub fn with_max_weight(mut self, max_weight_kgs: Decimal) -> Self {
        self.max_weight_kgs = Some(max_weight_kgs);
        self
    }

    /// 內容積（立方公分）
    pub fn volume_cm3(&self) -> Decimal {
        self.length_cm * self.breadth_cm * self.height_cm
    }

    /// 由小到大排序的三邊尺寸
    pub fn sorted_dims(&self) -> [Decimal; 3] {
        let mut dims = [self.length_cm, self.breadth_cm, self.height_cm];
        dims.sort();
        dims
    }

    /// 單件商品是否放得進此包材
    ///
    /// 三邊各自排序後逐一比較（允許旋轉擺放），並檢查承重上限。
    pub fn can_hold(&self, product: &Product) -> bool {
        let item = product.sorted_dims();
        let inner = self.sorted_dims();
        if item.iter().zip(inner.iter()).any(|(i, p)| i > p) {
            return false;
        }

        match self.max_weight_kgs {
            Some(max) => product.unit_weight_kgs() <= max,
            None => true,
        }
    }
}
