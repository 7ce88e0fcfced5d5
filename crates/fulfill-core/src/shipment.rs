//! 出貨批次與最佳化結果模型
//!
//! 結果由各階段的純輸出組裝而成，組裝後不再變動。

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::RateQuote;
use crate::package::PackageSpec;

/// 單一商品在某批次中的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAllocation {
    /// 商品ID
    pub product_id: i64,

    /// 商品名稱
    pub title: String,

    /// 配置數量
    pub quantity: u32,

    /// 配置總重（公斤）
    pub total_weight_kgs: Decimal,
}

/// 某包材規格的使用情況
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageUsage {
    /// 包材規格
    pub package: PackageSpec,

    /// 使用的包材個數
    pub quantity_used: u32,

    /// 各商品裝入此規格的數量
    pub product_quantities: BTreeMap<i64, u32>,

    /// 包材總成本
    pub total_cost: Decimal,
}

/// 出貨批次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// 批次ID
    pub id: Uuid,

    /// 出貨點ID
    pub location_id: i64,

    /// 出貨點名稱
    pub location_name: String,

    /// 出貨點郵遞區號
    pub pickup_postcode: Option<String>,

    /// 批次內商品配置
    pub products: Vec<ProductAllocation>,

    /// 批次使用的包材
    pub packages: Vec<PackageUsage>,

    /// 批次總重（公斤）
    pub total_weight_kgs: Decimal,

    /// 批次總件數
    pub total_quantity: u32,

    /// 包材成本
    pub packaging_cost: Decimal,

    /// 運費（無可用貨運商時為零）
    pub shipping_cost: Decimal,

    /// 可用貨運選項（運費由低到高）
    pub available_couriers: Vec<RateQuote>,

    /// 選定的貨運商
    pub selected_courier: Option<String>,
}

impl Shipment {
    /// 創建新的出貨批次
    ///
    /// 批次ID由出貨點與結果內的批次序號導出：相同輸入重算
    /// 必得相同結果。
    pub fn new(
        location_id: i64,
        location_name: impl Into<String>,
        pickup_postcode: Option<String>,
        products: Vec<ProductAllocation>,
        packages: Vec<PackageUsage>,
        total_weight_kgs: Decimal,
        sequence: u32,
    ) -> Self {
        let total_quantity = products.iter().map(|p| p.quantity).sum();
        let packaging_cost = packages.iter().map(|p| p.total_cost).sum();
        let id = Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("shipment/{location_id}/{sequence}").as_bytes(),
        );
        Self {
            id,
            location_id,
            location_name: location_name.into(),
            pickup_postcode,
            products,
            packages,
            total_weight_kgs,
            total_quantity,
            packaging_cost,
            shipping_cost: Decimal::ZERO,
            available_couriers: Vec::new(),
            selected_courier: None,
        }
    }

    /// 批次總成本（包材 + 運費）
    pub fn total_cost(&self) -> Decimal {
        self.packaging_cost + self.shipping_cost
    }
}

/// 最佳化結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// 是否成功產出可執行的履約計畫
    pub success: bool,

    /// 失敗時的業務訊息
    pub message: Option<String>,

    /// 計畫摘要描述
    pub description: Option<String>,

    /// 出貨批次
    pub shipments: Vec<Shipment>,

    /// 批次數
    pub shipment_count: usize,

    /// 是否可足量出貨
    pub can_fulfill_order: bool,

    /// 缺口件數
    pub shortfall: u32,

    /// 包材總成本
    pub total_packaging_cost: Decimal,

    /// 運費總成本
    pub total_shipping_cost: Decimal,

    /// 總成本
    pub total_cost: Decimal,

    /// 所有批次皆有可用貨運商
    pub all_couriers_available: bool,

    /// 貨運不可用的原因
    pub unavailability_reason: Option<String>,
}

impl OptimizationResult {
    /// 由評估完成的批次組裝成功結果
    ///
    /// 部分批次無可用貨運商時，`message` 攜帶降級說明。
    #[allow(clippy::too_many_arguments)]
    pub fn fulfilled(
        shipments: Vec<Shipment>,
        description: impl Into<String>,
        message: Option<String>,
        can_fulfill_order: bool,
        shortfall: u32,
        all_couriers_available: bool,
        unavailability_reason: Option<String>,
    ) -> Self {
        let total_packaging_cost: Decimal = shipments.iter().map(|s| s.packaging_cost).sum();
        let total_shipping_cost: Decimal = shipments.iter().map(|s| s.shipping_cost).sum();
        Self {
            success: true,
            message,
            description: Some(description.into()),
            shipment_count: shipments.len(),
            can_fulfill_order,
            shortfall,
            total_packaging_cost,
            total_shipping_cost,
            total_cost: total_packaging_cost + total_shipping_cost,
            all_couriers_available,
            unavailability_reason,
            shipments,
        }
    }

    /// 業務拒絕或非預期失敗的結果
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            description: None,
            shipments: Vec::new(),
            shipment_count: 0,
            can_fulfill_order: false,
            shortfall: 0,
            total_packaging_cost: Decimal::ZERO,
            total_shipping_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            all_couriers_available: false,
            unavailability_reason: None,
        }
    }
}
