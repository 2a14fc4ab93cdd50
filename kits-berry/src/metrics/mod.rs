//! 分割评估指标.
//!
//! 自底向上: 独立 Dice 系数, 单个 HEC 的 `(Dice, 表面 Dice)`, 单个病例的指标表,
//! 以及多病例的批量评估与汇总.

mod batch;
mod case;
mod dice;
mod label;
mod summary;

pub use batch::{evaluate_cases, CaseOutcome};
pub use case::{compute_metrics_for_case, CaseMetrics};
pub use dice::dice;
pub use label::{compute_metrics_for_label, HecMetrics};
pub use summary::{HecSummary, Summary};

#[cfg(feature = "rayon")]
pub use batch::par_evaluate_cases;
