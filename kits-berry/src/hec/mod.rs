//! 层级评估类 (HEC) 及其标签集合.
//!
//! 一个 HEC 由若干原始标签合并而成, 合并后的区域作为一个整体参与评估.
//! HEC 名称与标签集合一一对应, 因此也可以由标签集合反查 HEC 及其容差.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::consts::gray::*;
use crate::consts::tolerance;
use crate::{EvalError, EvalResult};

mod mask;

pub use mask::{build_mask, compose_segmentation, count_foreground};

/// 排序且去重后的原始标签集合. 作为标签集合的规范形式参与比较与查表.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelSet(Vec<u8>);

impl LabelSet {
    /// 由任意标签序列构建规范标签集合.
    pub fn new<I: IntoIterator<Item = u8>>(labels: I) -> Self {
        let mut v: Vec<u8> = labels.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    /// 升序排列的标签.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// 标签个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否不含任何标签.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 是否包含 `label`.
    #[inline]
    pub fn contains(&self, label: u8) -> bool {
        self.0.binary_search(&label).is_ok()
    }

    /// 反查对应的 HEC. 不对应任何 HEC 时返回 `None`.
    #[inline]
    pub fn hec(&self) -> Option<Hec> {
        LABEL_TO_HEC.get(self).copied()
    }
}

/// 以 `(1, 2, 3)` 的形式输出.
impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, l) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{l}")?;
        }
        write!(f, ")")
    }
}

impl From<u8> for LabelSet {
    #[inline]
    fn from(label: u8) -> Self {
        Self(vec![label])
    }
}

impl From<&[u8]> for LabelSet {
    #[inline]
    fn from(labels: &[u8]) -> Self {
        Self::new(labels.iter().copied())
    }
}

impl<const N: usize> From<[u8; N]> for LabelSet {
    #[inline]
    fn from(labels: [u8; N]) -> Self {
        Self::new(labels)
    }
}

impl FromIterator<u8> for LabelSet {
    #[inline]
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// 掩码构建与指标计算接受的标签参数: 单个标签, 或一个标签集合.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelSpec {
    /// 单个原始标签.
    Single(u8),

    /// 多个原始标签合并成的集合.
    Set(LabelSet),
}

impl LabelSpec {
    /// 转换为规范标签集合.
    pub fn into_label_set(self) -> LabelSet {
        match self {
            Self::Single(l) => LabelSet::from(l),
            Self::Set(s) => s,
        }
    }
}

impl From<u8> for LabelSpec {
    #[inline]
    fn from(label: u8) -> Self {
        Self::Single(label)
    }
}

impl From<LabelSet> for LabelSpec {
    #[inline]
    fn from(set: LabelSet) -> Self {
        Self::Set(set)
    }
}

impl From<&LabelSet> for LabelSpec {
    #[inline]
    fn from(set: &LabelSet) -> Self {
        Self::Set(set.clone())
    }
}

impl From<&[u8]> for LabelSpec {
    #[inline]
    fn from(labels: &[u8]) -> Self {
        Self::Set(LabelSet::from(labels))
    }
}

impl<const N: usize> From<[u8; N]> for LabelSpec {
    #[inline]
    fn from(labels: [u8; N]) -> Self {
        Self::Set(LabelSet::from(labels))
    }
}

impl From<Hec> for LabelSpec {
    #[inline]
    fn from(hec: Hec) -> Self {
        Self::Set(hec.label_set())
    }
}

/// KiTS 层级评估类.
///
/// 变体顺序即指标表的行顺序.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Hec {
    /// 肾脏 + 肿瘤 + 囊肿.
    KidneyAndMass,

    /// 肿瘤 + 囊肿.
    Mass,

    /// 仅肿瘤.
    Tumor,
}

/// 按评估顺序排列的 HEC 名称.
pub const HEC_NAME_LIST: [&str; 3] = [
    Hec::KidneyAndMass.name(),
    Hec::Mass.name(),
    Hec::Tumor.name(),
];

/// 规范标签集合 -> HEC 的反查表. 首次访问时初始化, 之后只读.
static LABEL_TO_HEC: Lazy<BTreeMap<LabelSet, Hec>> =
    Lazy::new(|| Hec::ALL.into_iter().map(|h| (h.label_set(), h)).collect());

impl Hec {
    /// 全部 HEC, 按评估顺序排列.
    pub const ALL: [Hec; 3] = [Hec::KidneyAndMass, Hec::Mass, Hec::Tumor];

    /// HEC 名称.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Hec::KidneyAndMass => "kidney_and_mass",
            Hec::Mass => "mass",
            Hec::Tumor => "tumor",
        }
    }

    /// 组成该 HEC 的原始标签, 升序排列.
    #[inline]
    pub const fn labels(self) -> &'static [u8] {
        match self {
            Hec::KidneyAndMass => &[KITS_KIDNEY, KITS_TUMOR, KITS_CYST],
            Hec::Mass => &[KITS_TUMOR, KITS_CYST],
            Hec::Tumor => &[KITS_TUMOR],
        }
    }

    /// 组成该 HEC 的规范标签集合.
    #[inline]
    pub fn label_set(self) -> LabelSet {
        LabelSet::from(self.labels())
    }

    /// 该 HEC 的表面距离容差 (毫米).
    #[inline]
    pub const fn tolerance_mm(self) -> f64 {
        match self {
            Hec::KidneyAndMass => tolerance::KIDNEY_AND_MASS_MM,
            Hec::Mass => tolerance::MASS_MM,
            Hec::Tumor => tolerance::TUMOR_MM,
        }
    }

    /// 该 HEC 在指标表中的行号.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 由名称获取 HEC.
    pub fn from_name(name: &str) -> Option<Hec> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    /// 由标签集合反查 HEC.
    #[inline]
    pub fn from_labels(labels: &LabelSet) -> Option<Hec> {
        labels.hec()
    }
}

impl fmt::Display for Hec {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 由标签集合反查 HEC, 再取其表面距离容差.
///
/// 标签集合不对应任何 HEC 时返回 `Err(EvalError::UnknownHec)`.
pub fn tolerance_for(labels: &LabelSet) -> EvalResult<f64> {
    labels
        .hec()
        .map(Hec::tolerance_mm)
        .ok_or_else(|| EvalError::UnknownHec(labels.clone()))
}
