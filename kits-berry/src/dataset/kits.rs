//! KiTS 预测/真值病例加载器.
//!
//! 提供迭代器风格的数据集获取模式. 与直接加载体数据不同, 加载器只产出文件路径,
//! 真正的读取推迟到评估时进行, 以便在多线程间分发.

use std::path::{Path, PathBuf};

use crate::metrics::{compute_metrics_for_case, CaseMetrics};
use crate::EvalResult;

/// 文件名构造器. 接受数据集索引数, 获得 (相对于数据目录的) 文件名.
pub type FilenameBuilder = fn(u32) -> String;

/// KiTS 病例名, 形如 `case_00042`.
#[inline]
pub fn case_name(idx: u32) -> String {
    format!("case_{idx:05}")
}

/// KiTS 官方数据集中真值分割的相对路径, 形如 `case_00042/segmentation.nii.gz`.
#[inline]
pub fn reference_filename(idx: u32) -> String {
    format!("case_{idx:05}/segmentation.nii.gz")
}

/// 参赛提交中预测分割的相对路径, 形如 `case_00042.nii.gz`.
#[inline]
pub fn prediction_filename(idx: u32) -> String {
    format!("case_{idx:05}.nii.gz")
}

/// 由病例名解析病例索引. 例如 `case_00042` 得到 `Some(42)`.
pub fn parse_case_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("case_")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// 列出真值目录下所有形如 `case_XXXXX` 的子目录对应的病例索引, 升序排列.
pub fn discover_cases<P: AsRef<Path>>(reference_dir: P) -> std::io::Result<Vec<u32>> {
    let mut ans = Vec::new();
    for entry in std::fs::read_dir(reference_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(idx) = entry.file_name().to_str().and_then(parse_case_name) {
            ans.push(idx);
        }
    }
    ans.sort_unstable();
    Ok(ans)
}

/// 一个待评估的病例.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseEntry {
    /// 病例索引.
    pub index: u32,

    /// 预测分割文件路径.
    pub prediction: PathBuf,

    /// 真值分割文件路径.
    pub reference: PathBuf,
}

impl CaseEntry {
    /// 读取两份分割并计算指标表.
    #[inline]
    pub fn evaluate(&self) -> EvalResult<CaseMetrics> {
        compute_metrics_for_case(self.prediction.as_path(), self.reference.as_path())
    }
}

/// 从指定索引、路径、文件名构造器来创建病例加载器.
///
/// # 注意
///
/// 1. `prediction_dir` 和 `reference_dir` 必须是目录, 否则程序 panic.
/// 2. 加载器不检查文件是否存在. 缺失的文件会在评估时以 `Err` 形式返回.
pub fn case_loader<I: IntoIterator<Item = u32>, P: AsRef<Path>, Q: AsRef<Path>>(
    data: I,
    prediction_dir: P,
    prediction_builder: FilenameBuilder,
    reference_dir: Q,
    reference_builder: FilenameBuilder,
) -> CaseLoader {
    let prediction_dir = prediction_dir.as_ref().to_owned();
    let reference_dir = reference_dir.as_ref().to_owned();
    assert!(prediction_dir.is_dir());
    assert!(reference_dir.is_dir());

    let mut data: Vec<u32> = data.into_iter().collect();
    data.reverse();

    CaseLoader {
        prediction_dir,
        prediction_builder,
        reference_dir,
        reference_builder,
        data_rev: data,
    }
}

/// 按 KiTS 默认命名规则创建病例加载器.
#[inline]
pub fn kits_case_loader<I: IntoIterator<Item = u32>, P: AsRef<Path>, Q: AsRef<Path>>(
    data: I,
    prediction_dir: P,
    reference_dir: Q,
) -> CaseLoader {
    case_loader(
        data,
        prediction_dir,
        prediction_filename,
        reference_dir,
        reference_filename,
    )
}

/// 病例加载器, 并在内部自动转换文件名.
#[derive(Debug)]
pub struct CaseLoader {
    prediction_dir: PathBuf,
    prediction_builder: FilenameBuilder,
    reference_dir: PathBuf,
    reference_builder: FilenameBuilder,
    data_rev: Vec<u32>,
}

impl Iterator for CaseLoader {
    type Item = CaseEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.data_rev.pop()?;
        Some(CaseEntry {
            index,
            prediction: self.prediction_dir.join((self.prediction_builder)(index)),
            reference: self.reference_dir.join((self.reference_builder)(index)),
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.data_rev.len(), Some(self.data_rev.len()))
    }
}

impl ExactSizeIterator for CaseLoader {
    #[inline]
    fn len(&self) -> usize {
        self.data_rev.len()
    }
}
