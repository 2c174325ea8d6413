//! # Quote Graph
//!
//! 欄位相依圖與增量重算模組

pub mod dirty_tracking;
pub mod incremental;
pub mod inputs;
pub mod notify;
pub mod registry;
pub mod sequence;
pub mod snapshot;

// Re-export 主要類型
pub use dirty_tracking::FieldState;
pub use incremental::{ComputeFn, FieldKind, RecalcEngine};
pub use inputs::ComputeInputs;
pub use notify::{PassNotification, PassReport, StageFailure, SubscriptionId};
pub use sequence::{FetchOutcome, FetchTicket};
pub use snapshot::SourceSnapshot;
