//! 运行时错误.

use crate::hec::LabelSet;
use crate::{Idx3d, Spacing3d};

/// 评估过程中可能出现的错误.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// 读写 nifti 文件错误.
    #[error("nifti 读写错误: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 写出 npy 文件错误.
    #[error("npy 写入错误: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// 其他底层 I/O 错误.
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 体数据维度不是 3.
    #[error("体数据形状错误: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// 标签集合不对应任何已知 HEC, 因而无法推断表面距离容差.
    #[error("标签集合 {0} 不是已知的 HEC")]
    UnknownHec(LabelSet),

    /// 预测分割与真值分割形状不一致.
    #[error("预测分割形状 {prediction:?} 与真值分割形状 {reference:?} 不一致")]
    ShapeMismatch {
        /// 预测分割形状.
        prediction: Idx3d,
        /// 真值分割形状.
        reference: Idx3d,
    },

    /// 体素间距必须为有限正数.
    #[error("非法体素间距 {0:?}")]
    InvalidSpacing(Spacing3d),

    /// 体素值无法表示为 `u8` 标签.
    #[error("位于 {0:?} 的体素值无法表示为标签")]
    InvalidLabel(Idx3d),

    /// 体数据某一维超出 nifti 文件头可表示的范围 (`u16`).
    #[error("体数据形状 {0:?} 超出 nifti 文件头可表示的范围")]
    VolumeTooLarge(Idx3d),
}

/// 评估结果.
pub type EvalResult<T> = Result<T, EvalError>;
