use log::debug;
use ndarray::{ArrayBase, Data, Ix3};

use super::dice;
use crate::hec::{build_mask, count_foreground, tolerance_for, LabelSpec};
use crate::surface::{compute_surface_dice_at_tolerance, compute_surface_distances};
use crate::{EvalResult, Spacing3d};

/// 单个 HEC 的评估结果.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HecMetrics {
    /// Dice 系数, 越大越好.
    pub dice: f64,

    /// 表面 Dice, 越大越好.
    pub surface_dice: f64,
}

impl HecMetrics {
    /// 预测与真值均为空时的结果.
    pub const PERFECT: Self = Self {
        dice: 1.0,
        surface_dice: 1.0,
    };

    /// 预测与真值恰有一方为空时的结果.
    pub const MISSED: Self = Self {
        dice: 0.0,
        surface_dice: 0.0,
    };

    /// 按 [`crate::consts::METRIC_NAME_LIST`] 的列顺序转换为数组.
    #[inline]
    pub const fn to_array(self) -> [f64; 2] {
        [self.dice, self.surface_dice]
    }
}

/// 计算单个标签 (或标签集合) 所选区域的 `(Dice, 表面 Dice)`.
///
/// # 参数
///
/// 1. `prediction`, `reference`: 预测与真值整数标签图, 形状必须一致, 否则程序 panic.
/// 2. `label`: 单个标签或标签集合. 集合中的标签会被合并为一个区域.
/// 3. `spacing`: 按 \[z, y, x\] 顺序的体素间距, 用于表面距离计算.
/// 4. `sd_tolerance_mm`: 表面 Dice 的容差. 为 `None` 时由标签集合反查 HEC 得到;
///   若标签集合不是已知 HEC, 返回 `Err(EvalError::UnknownHec)`.
///
/// # 返回值
///
/// - 预测与真值均为空: `(1, 1)`. 注意这与独立 [`dice`] 函数在双空时返回 `NaN` 不同.
/// - 恰有一方为空: `(0, 0)`, 与容差无关.
/// - 其他情况: 按重叠公式计算 Dice, 并以 `(真值掩码, 预测掩码)` 的顺序计算表面距离,
///   再以容差求表面 Dice.
pub fn compute_metrics_for_label<S1, S2>(
    prediction: &ArrayBase<S1, Ix3>,
    reference: &ArrayBase<S2, Ix3>,
    label: impl Into<LabelSpec>,
    spacing: &Spacing3d,
    sd_tolerance_mm: Option<f64>,
) -> EvalResult<HecMetrics>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
{
    assert_eq!(
        prediction.dim(),
        reference.dim(),
        "预测分割与真值分割形状不一致"
    );

    // 统一为标签集合, 以便在未给出容差时反查.
    let labels = label.into().into_label_set();

    let mask_pred = build_mask(prediction, &labels);
    let mask_gt = build_mask(reference, &labels);
    let gt_empty = count_foreground(&mask_gt) == 0;
    let pred_empty = count_foreground(&mask_pred) == 0;

    let sd_tolerance_mm = match sd_tolerance_mm {
        Some(t) => t,
        None => tolerance_for(&labels)?,
    };

    let ans = if gt_empty && pred_empty {
        HecMetrics::PERFECT
    } else if gt_empty || pred_empty {
        HecMetrics::MISSED
    } else {
        let dist = compute_surface_distances(mask_gt.view(), mask_pred.view(), spacing);
        HecMetrics {
            dice: dice(&mask_pred, &mask_gt),
            surface_dice: compute_surface_dice_at_tolerance(&dist, sd_tolerance_mm),
        }
    };

    debug!(
        "标签 {labels}: 预测为空 = {pred_empty}, 真值为空 = {gt_empty}, 容差 = {sd_tolerance_mm} mm, {ans:?}"
    );
    Ok(ans)
}
