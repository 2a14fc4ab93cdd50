//! 对 `kits-berry::dataset` 的更一层封装. 提供更直接的病例加载器.

use kits_berry::dataset::{self, kits_case_loader, CaseLoader};
use std::env;
use std::path::{Path, PathBuf};

/// 由环境变量 `var` 获取目录. 若未设置或为空, 则返回 `$HOME/dataset/{fallback...}`.
fn dir_from_env_or_home(var: &str, fallback: &[&str]) -> Option<PathBuf> {
    match env::var(var) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dataset::home_dataset_dir_with(fallback),
    }
}

/// 获取 KiTS 真值分割基本路径.
///
/// 1. 若环境变量 `$KITS_REF_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/kits/reference`.
pub fn reference_dir_from_env_or_home() -> Option<PathBuf> {
    dir_from_env_or_home("KITS_REF_DIR", &["kits", "reference"])
}

/// 获取预测分割基本路径.
///
/// 1. 若环境变量 `$KITS_PRED_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/kits/prediction`.
pub fn prediction_dir_from_env_or_home() -> Option<PathBuf> {
    dir_from_env_or_home("KITS_PRED_DIR", &["kits", "prediction"])
}

/// 获取结果输出路径. 仅当环境变量 `$KITS_OUT_DIR` 非空时返回.
pub fn output_dir_from_env() -> Option<PathBuf> {
    env::var("KITS_OUT_DIR")
        .ok()
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
}

/// 对真值目录下能找到的所有病例, 创建 KiTS 命名规则的病例加载器.
pub fn case_loader<P: AsRef<Path>, Q: AsRef<Path>>(
    prediction_dir: P,
    reference_dir: Q,
) -> std::io::Result<CaseLoader> {
    let cases = dataset::discover_cases(reference_dir.as_ref())?;
    Ok(kits_case_loader(cases, prediction_dir, reference_dir))
}
