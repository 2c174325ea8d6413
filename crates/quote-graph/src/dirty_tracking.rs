//! 髒標記追蹤

use serde::{Deserialize, Serialize};

/// 欄位狀態：Clean → Dirty → Recomputing → Clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldState {
    #[default]
    Clean,
    Dirty,
    Recomputing,
}

/// 髒標記追蹤器（以欄位索引為鍵）
#[derive(Debug, Default)]
pub struct DirtyTracker {
    states: Vec<FieldState>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    fn slot(&mut self, field: usize) -> &mut FieldState {
        if field >= self.states.len() {
            self.states.resize(field + 1, FieldState::Clean);
        }
        &mut self.states[field]
    }

    /// 標記欄位為髒
    pub fn mark_dirty(&mut self, field: usize) {
        *self.slot(field) = FieldState::Dirty;
    }

    /// 開始重算：Dirty → Recomputing，不是 Dirty 時回傳 false
    pub fn begin(&mut self, field: usize) -> bool {
        let state = self.slot(field);
        if *state != FieldState::Dirty {
            return false;
        }
        *state = FieldState::Recomputing;
        true
    }

    /// 完成重算：Recomputing → Clean
    pub fn finish(&mut self, field: usize) {
        *self.slot(field) = FieldState::Clean;
    }

    /// 欄位目前狀態
    pub fn state(&self, field: usize) -> FieldState {
        self.states.get(field).copied().unwrap_or_default()
    }
}
