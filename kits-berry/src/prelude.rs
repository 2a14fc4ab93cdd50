//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Spacing3d};

pub use crate::{EvalError, EvalResult, NiftiHeaderAttr, SegVolume, VolumeSource};

pub use crate::consts::gray::{KITS_BACKGROUND, KITS_CYST, KITS_KIDNEY, KITS_TUMOR};
pub use crate::consts::{LABEL_AGGREGATION_ORDER, METRIC_NAME_LIST};

pub use crate::hec::{build_mask, Hec, LabelSet, LabelSpec, HEC_NAME_LIST};

pub use crate::metrics::{
    compute_metrics_for_case, compute_metrics_for_label, dice, CaseMetrics, HecMetrics, Summary,
};

pub use crate::surface::{compute_surface_dice_at_tolerance, compute_surface_distances};

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{self, kits};
