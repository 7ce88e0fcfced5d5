//! 庫存對應模型

use serde::{Deserialize, Serialize};

/// 商品在某出貨點的可用庫存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStock {
    /// 商品ID
    pub product_id: i64,

    /// 出貨點ID
    pub location_id: i64,

    /// 可用庫存數量
    pub available_stock: u32,
}

impl ProductStock {
    pub fn new(product_id: i64, location_id: i64, available_stock: u32) -> Self {
        Self {
            product_id,
            location_id,
            available_stock,
        }
    }
}

/// 包材在某出貨點的可用數量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageStock {
    /// 包材ID
    pub package_id: i64,

    /// 出貨點ID
    pub location_id: i64,

    /// 可用包材數量
    pub available_quantity: u32,
}

impl PackageStock {
    pub fn new(package_id: i64, location_id: i64, available_quantity: u32) -> Self {
        Self {
            package_id,
            location_id,
            available_quantity,
        }
    }
}
