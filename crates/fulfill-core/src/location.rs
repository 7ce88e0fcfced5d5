//! 出貨點模型

use serde::{Deserialize, Serialize};

/// 出貨點（倉庫）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupLocation {
    /// 出貨點ID
    pub id: i64,

    /// 出貨點名稱
    pub name: String,

    /// 郵遞區號。缺漏時無法向費率來源詢價，
    /// 但不阻止配置與裝箱規劃。
    pub postcode: Option<String>,
}

impl PickupLocation {
    /// 創建新的出貨點
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            postcode: None,
        }
    }

    /// 建構器模式：設置郵遞區號
    pub fn with_postcode(mut self, postcode: impl Into<String>) -> Self {
        self.postcode = Some(postcode.into());
        self
    }

    /// 是否具有可詢價的郵遞區號
    pub fn has_postcode(&self) -> bool {
        self.postcode
            .as_deref()
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false)
    }
}
