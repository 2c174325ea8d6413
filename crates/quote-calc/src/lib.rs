//! # Quote Calculation Engine
//!
//! 報價成本計算：用紙張數、印刷趟數、成本彙總管線與報價表單

pub mod fields;
pub mod form;
pub mod pipeline;
pub mod runs;
pub mod sheets;

// Re-export 主要類型
pub use form::{QuoteForm, QuoteSnapshot};
pub use pipeline::CostPipeline;
pub use runs::RunCalculator;
pub use sheets::{LayoutSummary, SheetRequirementCalculator};

use quote_core::{CostStage, LayoutResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 報價明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    /// 各階段小計
    pub stages: Vec<StageLine>,

    /// 總計（輸入不完整時不可用）
    pub grand_total: Option<Decimal>,

    /// 拼版結果
    pub layout: Option<LayoutResult>,

    /// 用紙張數
    pub required_sheets: Option<Decimal>,

    /// 警告信息
    pub warnings: Vec<QuoteWarning>,
}

impl QuoteBreakdown {
    /// 創建空的明細
    pub fn empty() -> Self {
        Self {
            stages: Vec::new(),
            grand_total: None,
            layout: None,
            required_sheets: None,
            warnings: Vec::new(),
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: QuoteWarning) {
        self.warnings.push(warning);
    }

    /// 啟用中且已算出的階段小計合計
    pub fn enabled_sum(&self) -> Decimal {
        self.stages
            .iter()
            .filter(|l| l.enabled)
            .filter_map(|l| l.total)
            .sum()
    }

    /// 是否有錯誤等級的警告
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Error)
    }
}

/// 單一階段的小計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageLine {
    pub stage: CostStage,
    pub enabled: bool,
    pub total: Option<Decimal>,
}

/// 報價警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl QuoteWarning {
    pub fn new(field: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            field,
            message,
            severity,
        }
    }

    pub fn info(field: String, message: String) -> Self {
        Self::new(field, message, WarningSeverity::Info)
    }

    pub fn warning(field: String, message: String) -> Self {
        Self::new(field, message, WarningSeverity::Warning)
    }

    pub fn error(field: String, message: String) -> Self {
        Self::new(field, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
