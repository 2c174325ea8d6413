//! # Print Quote
//!
//! 印刷報價引擎：拼版最佳化、用紙計算與增量成本彙總

pub use quote_calc;
pub use quote_core;
pub use quote_graph;
pub use quote_optimizer;

pub use quote_calc::{fields, QuoteBreakdown, QuoteForm, QuoteSnapshot, QuoteWarning, WarningSeverity};
pub use quote_core::{
    CostStage, FieldValue, LayoutResult, QuoteConfig, QuoteError, Rectangle, Result, RunPolicy,
};
pub use quote_graph::RecalcEngine;
pub use quote_optimizer::{compute_layout, plan_layout, LayoutOptimizer, SheetClassifier};

/// 版本資訊
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
