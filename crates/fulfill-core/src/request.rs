//! 履約請求模型

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 履約最佳化請求
///
/// `custom_allocations` 為 `商品ID → 出貨點ID → 數量`，
/// 指定時引擎只檢核並評估這一組配置，不另行產生候選。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    /// 請求的商品與數量
    pub product_quantities: BTreeMap<i64, u32>,

    /// 收件郵遞區號
    pub delivery_postcode: String,

    /// 是否貨到付款
    pub cash_on_delivery: bool,

    /// 自訂配置（可選）
    pub custom_allocations: Option<BTreeMap<i64, BTreeMap<i64, u32>>>,
}

impl FulfillmentRequest {
    /// 創建新的履約請求
    pub fn new(
        product_quantities: BTreeMap<i64, u32>,
        delivery_postcode: impl Into<String>,
    ) -> Self {
        Self {
            product_quantities,
            delivery_postcode: delivery_postcode.into(),
            cash_on_delivery: false,
            custom_allocations: None,
        }
    }

    /// 建構器模式：設置貨到付款
    pub fn with_cash_on_delivery(mut self, cash_on_delivery: bool) -> Self {
        self.cash_on_delivery = cash_on_delivery;
        self
    }

    /// 建構器模式：設置自訂配置
    pub fn with_custom_allocations(
        mut self,
        custom_allocations: BTreeMap<i64, BTreeMap<i64, u32>>,
    ) -> Self {
        self.custom_allocations = Some(custom_allocations);
        self
    }

    /// 請求的總件數
    pub fn total_quantity(&self) -> u32 {
        self.product_quantities.values().sum()
    }
}
