//! # Quote Optimizer
//!
//! 拼版優化模組（可用版面判定、拼版計算、候選預覽）

pub mod classifier;
pub mod montage;
pub mod preview;

// Re-export 主要類型
pub use classifier::SheetClassifier;
pub use montage::{compute_layout, LayoutOptimizer};
pub use preview::{PressCandidate, PressPreview};

use quote_core::{LayoutResult, Rectangle};

/// 拼版規劃結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    /// 實際可用版面（套用覆寫之後）
    pub usable: Rectangle,

    /// 在可用版面上的拼版結果
    pub layout: LayoutResult,
}

/// 完整拼版流程：先判定可用版面，再計算拼版
pub fn plan_layout(
    optimizer: &LayoutOptimizer,
    stock: &Rectangle,
    press: &Rectangle,
    stock_class: &str,
    press_class: &str,
    piece: &Rectangle,
) -> quote_core::Result<LayoutPlan> {
    let usable = optimizer
        .classifier()
        .resolve_usable_area(stock, press, stock_class, press_class)?;
    let layout = optimizer.compute_layout(&usable, piece)?;

    Ok(LayoutPlan { usable, layout })
}
