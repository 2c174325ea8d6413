//! 非同步查詢的請求序號

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::notify::PassReport;

/// 查詢請求憑證
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchTicket {
    pub field: String,
    pub seq: u64,
}

/// 查詢回應的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 回應已寫入欄位
    Applied(PassReport),
    /// 同一欄位已有較新的請求，回應被丟棄
    Superseded { latest: u64 },
}

/// 每個欄位各自遞增的請求序號
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: HashMap<String, u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 發出新的請求憑證
    pub fn issue(&mut self, field: &str) -> FetchTicket {
        let seq = self.latest.entry(field.to_string()).or_insert(0);
        *seq += 1;
        FetchTicket {
            field: field.to_string(),
            seq: *seq,
        }
    }

    /// 欄位目前最新的序號
    pub fn latest(&self, field: &str) -> u64 {
        self.latest.get(field).copied().unwrap_or(0)
    }

    /// 憑證是否仍是最新的請求
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest(&ticket.field) == ticket.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_per_field() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue("stock.unit_price");
        let second = sequencer.issue("stock.unit_price");
        let other = sequencer.issue("press.unit_price");

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(other.seq, 1);

        assert!(!sequencer.is_current(&first));
        assert!(sequencer.is_current(&second));
        assert!(sequencer.is_current(&other));
    }
}
