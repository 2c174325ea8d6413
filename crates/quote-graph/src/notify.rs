//! 重算結果與通知

use quote_core::QuoteError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 單一欄位的計算失敗記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub field: String,
    pub message: String,
}

impl StageFailure {
    /// 由計算函數回傳的錯誤建立記錄
    pub fn new(field: impl Into<String>, cause: &QuoteError) -> Self {
        Self {
            field: field.into(),
            message: cause.to_string(),
        }
    }

    /// 轉成 `QuoteError::StageComputeFailure`
    pub fn to_error(&self) -> QuoteError {
        QuoteError::StageComputeFailure {
            field: self.field.clone(),
            message: self.message.clone(),
        }
    }
}

/// 一輪重算的結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// 值有變動的欄位（依重算順序）
    pub changed: Vec<String>,

    /// 計算失敗的欄位
    pub failures: Vec<StageFailure>,

    /// 實際重算的衍生欄位數
    pub recomputed: usize,
}

impl PassReport {
    /// 本輪是否有欄位計算失敗
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 欄位是否在本輪變動
    pub fn changed(&self, field: &str) -> bool {
        self.changed.iter().any(|f| f == field)
    }
}

/// 重算完成通知（每次 `set_value` 一則）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassNotification {
    pub changed_field_ids: Vec<String>,
}

/// 訂閱ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

type Listener = Box<dyn FnMut(&PassNotification)>;

/// 通知訂閱者清單
#[derive(Default)]
pub struct Subscribers {
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.listeners.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, notification: &PassNotification) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(notification);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.listeners.len())
            .finish()
    }
}
