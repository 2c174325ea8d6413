//! 來源欄位快照

use chrono::{DateTime, Utc};
use quote_core::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 所有來源欄位值的快照，供外部持久化後重播
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    /// 快照ID
    pub id: Uuid,

    /// 擷取時間
    pub captured_at: DateTime<Utc>,

    /// 欄位值（`None` 表示尚未填寫）
    pub values: BTreeMap<String, Option<FieldValue>>,
}

impl SourceSnapshot {
    /// 創建新的快照
    pub fn new(values: BTreeMap<String, Option<FieldValue>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            captured_at: Utc::now(),
            values,
        }
    }

    /// 取得單一欄位值
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field).and_then(|v| v.as_ref())
    }
}
