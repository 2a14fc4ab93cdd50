use std::fmt;
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};
use ndarray::{aview1, Array2, ArrayView2};

use super::{compute_metrics_for_label, HecMetrics};
use crate::consts::METRIC_NAME_LIST;
use crate::hec::Hec;
use crate::{EvalError, EvalResult, NiftiHeaderAttr, VolumeSource};

/// 单个病例的评估结果: `HEC 个数 x 2` 的指标表.
///
/// 行顺序为 [`Hec::ALL`], 列顺序为 [`METRIC_NAME_LIST`] (Dice, 表面 Dice).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseMetrics {
    data: Array2<f64>,
}

/// 由逐 HEC 结果构建. 未出现的 HEC 以 `NaN` 填充, 重复出现时以最后一次为准.
impl FromIterator<(Hec, HecMetrics)> for CaseMetrics {
    fn from_iter<I: IntoIterator<Item = (Hec, HecMetrics)>>(it: I) -> Self {
        let mut data = Array2::from_elem((Hec::ALL.len(), METRIC_NAME_LIST.len()), f64::NAN);
        for (hec, m) in it {
            data.row_mut(hec.index()).assign(&aview1(&m.to_array()));
        }
        Self { data }
    }
}

impl CaseMetrics {
    /// 获取某个 HEC 的结果.
    #[inline]
    pub fn get(&self, hec: Hec) -> HecMetrics {
        let row = self.data.row(hec.index());
        HecMetrics {
            dice: row[0],
            surface_dice: row[1],
        }
    }

    /// 按行顺序迭代所有 HEC 的结果.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Hec, HecMetrics)> + '_ {
        Hec::ALL.into_iter().map(move |h| (h, self.get(h)))
    }

    /// 获得指标表的一份不可变 shallow copy.
    #[inline]
    pub fn table(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// 消费自我, 获得底层指标表.
    #[inline]
    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// 将指标表保存为 npy 文件.
    pub fn write_npy<P: AsRef<Path>>(&self, path: P) -> EvalResult<()> {
        ndarray_npy::write_npy(path, &self.data)?;
        Ok(())
    }
}

/// 以表格形式输出, 每行一个 HEC.
impl fmt::Display for CaseMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16}", "HEC")?;
        for name in METRIC_NAME_LIST {
            write!(f, "{name:>10}")?;
        }
        for (hec, m) in self.iter() {
            writeln!(f)?;
            write!(f, "{:<16}{:>10.6}{:>10.6}", hec.name(), m.dice, m.surface_dice)?;
        }
        Ok(())
    }
}

/// 对一个病例计算所有 HEC 的 `(Dice, 表面 Dice)`.
///
/// `prediction` 和 `reference` 可以是文件路径, 也可以是已加载的 [`crate::SegVolume`].
///
/// # 注意
///
/// 1. 体素间距取自预测分割, 并已从文件头原生顺序逆序为数组顺序.
/// 2. 两者间距不一致时仅输出警告, 评估继续进行; 形状不一致则返回
///   `Err(EvalError::ShapeMismatch)`.
/// 3. 任一文件读取失败时直接返回错误, 不重试, 也不返回部分结果.
pub fn compute_metrics_for_case<'a, 'b>(
    prediction: impl Into<VolumeSource<'a>>,
    reference: impl Into<VolumeSource<'b>>,
) -> EvalResult<CaseMetrics> {
    let pred = prediction.into().resolve()?;
    let gt = reference.into().resolve()?;

    let spacing_pred = pred.spacing();
    let spacing_gt = gt.spacing();
    if spacing_pred.iter().zip(spacing_gt.iter()).any(|(p, g)| p != g) {
        // 只要形状一致即可评估, 不必视为错误.
        warn!("预测分割与真值分割的体素间距不一致: {spacing_pred:?} vs {spacing_gt:?}");
    }

    if pred.shape() != gt.shape() {
        return Err(EvalError::ShapeMismatch {
            prediction: pred.shape(),
            reference: gt.shape(),
        });
    }

    let (data_pred, data_gt) = (pred.data(), gt.data());
    let mut data = Array2::zeros((Hec::ALL.len(), METRIC_NAME_LIST.len()));
    for (hec, mut row) in Hec::ALL.into_iter().zip_eq(data.rows_mut()) {
        let m = compute_metrics_for_label(
            &data_pred,
            &data_gt,
            hec,
            &spacing_pred,
            Some(hec.tolerance_mm()),
        )?;
        debug!("{hec}: {m:?}");
        row.assign(&aview1(&m.to_array()));
    }
    Ok(CaseMetrics { data })
}
