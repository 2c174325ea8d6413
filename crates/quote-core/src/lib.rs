//! # Quote Core
//!
//! 印刷報價的核心資料模型與類型定義

pub mod catalog;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod sheet;
pub mod stage;
pub mod value;

// Re-export 主要類型
pub use catalog::{Catalog, StaticCatalog};
pub use config::{QuoteConfig, RunPolicy};
pub use geometry::Rectangle;
pub use layout::LayoutResult;
pub use sheet::{AreaOverride, SheetClassificationTable, SheetKind, SheetThreshold};
pub use stage::{CostStage, StageCost};
pub use value::FieldValue;

use rust_decimal::Decimal;

/// 報價錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("無效的幾何尺寸: {width} x {height}")]
    InvalidGeometry { width: Decimal, height: Decimal },

    #[error("循環相依: 欄位 {field} 經由 {via} 回到自身")]
    CyclicDependency { field: String, via: String },

    #[error("拼版資料不足: 拼版數 {layout_count}，紙張倍數 {multiplier}")]
    InsufficientLayoutData { layout_count: i64, multiplier: i64 },

    #[error("欄位 {field} 計算失敗: {message}")]
    StageComputeFailure { field: String, message: String },

    #[error("解析錯誤: {0}")]
    ParseFailure(String),

    #[error("欄位 {0} 是衍生欄位，不可直接寫入")]
    NotASourceField(String),

    #[error("找不到欄位: {0}")]
    UnknownField(String),

    #[error("欄位 {field} 類型不符，預期 {expected}")]
    TypeMismatch { field: String, expected: String },

    #[error("型錄查詢錯誤: {0}")]
    Catalog(String),

    #[error("配置錯誤: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
