//! 拼版結果模型

use serde::{Deserialize, Serialize};

/// 拼版（montage）結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// 單張可拼的設計稿數量（兩種方向中的最大值）
    pub count: u32,

    /// 是否採用旋轉方向
    pub orientation_rotated: bool,

    /// 紙張類別標籤
    pub sheet_label: String,
}

impl LayoutResult {
    /// 創建拼版結果
    pub fn new(count: u32, orientation_rotated: bool, sheet_label: impl Into<String>) -> Self {
        Self {
            count,
            orientation_rotated,
            sheet_label: sheet_label.into(),
        }
    }

    /// 設計稿是否放得下
    pub fn fits(&self) -> bool {
        self.count > 0
    }

    /// 顯示摘要，格式為 `"<count> / <label>"`
    pub fn summary(&self) -> String {
        format!("{} / {}", self.count, self.sheet_label)
    }
}
