use log::{error, info};

use super::CaseMetrics;
use crate::dataset::CaseEntry;
use crate::EvalResult;

/// 单个病例的评估结果, 附带病例索引.
pub type CaseOutcome = (u32, EvalResult<CaseMetrics>);

/// 评估单个病例并记录日志.
fn evaluate_entry(entry: &CaseEntry) -> CaseOutcome {
    let r = entry.evaluate();
    match &r {
        Ok(_) => info!("case {} 评估完成", entry.index),
        Err(e) => error!("case {} 评估失败: {e}", entry.index),
    }
    (entry.index, r)
}

/// 依次评估所有病例. 单个病例失败不影响其他病例, 结果按输入顺序返回.
pub fn evaluate_cases<I: IntoIterator<Item = CaseEntry>>(entries: I) -> Vec<CaseOutcome> {
    entries.into_iter().map(|e| evaluate_entry(&e)).collect()
}

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// 借助 `rayon`, 并行地评估所有病例. 结果按输入顺序返回.
///
/// 各病例之间不存在共享的可变状态.
#[cfg(feature = "rayon")]
pub fn par_evaluate_cases(entries: Vec<CaseEntry>) -> Vec<CaseOutcome> {
    entries
        .into_par_iter()
        .map(|e| evaluate_entry(&e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::gray::*;
    use crate::dataset::CaseEntry;
    use crate::hec::Hec;
    use crate::metrics::HecMetrics;
    use crate::{EvalError, SegVolume};
    use ndarray::{s, Array3};
    use std::path::PathBuf;

    fn write_case(dir: &std::path::Path, name: &str, data: Array3<u8>) -> PathBuf {
        let path = dir.join(name);
        SegVolume::from_array(data, [2.0, 1.0, 1.0])
            .unwrap()
            .save(&path)
            .unwrap();
        path
    }

    fn fixture(tag: &str) -> (PathBuf, Vec<CaseEntry>) {
        let dir =
            std::env::temp_dir().join(format!("kits-berry-{}-batch-{tag}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut seg = Array3::zeros((4, 6, 6));
        seg.slice_mut(s![1..3, 1..5, 1..5]).fill(KITS_KIDNEY);
        seg.slice_mut(s![1..3, 2..4, 2..4]).fill(KITS_TUMOR);

        let good = write_case(&dir, "good.nii", seg);
        let empty = write_case(&dir, "empty.nii", Array3::zeros((4, 6, 6)));

        let entries = vec![
            CaseEntry {
                index: 0,
                prediction: good.clone(),
                reference: good.clone(),
            },
            CaseEntry {
                index: 1,
                prediction: empty,
                reference: good,
            },
            CaseEntry {
                index: 2,
                prediction: dir.join("missing.nii"),
                reference: dir.join("missing.nii"),
            },
        ];
        (dir, entries)
    }

    fn init_logger() {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Info)
            .init();
    }

    fn check(outcomes: &[CaseOutcome]) {
        assert_eq!(
            outcomes.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        let m0 = outcomes[0].1.as_ref().unwrap();
        assert!(m0.iter().all(|(_, m)| m == HecMetrics::PERFECT));
        let m1 = outcomes[1].1.as_ref().unwrap();
        assert_eq!(m1.get(Hec::Tumor), HecMetrics::MISSED);
        assert!(matches!(outcomes[2].1, Err(EvalError::Nifti(_))));
    }

    #[test]
    fn test_evaluate_cases() {
        init_logger();
        let (dir, entries) = fixture("seq");
        let outcomes = evaluate_cases(entries);
        std::fs::remove_dir_all(dir).unwrap();
        check(&outcomes);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_evaluate_cases() {
        init_logger();
        let (dir, entries) = fixture("par");
        let outcomes = par_evaluate_cases(entries);
        std::fs::remove_dir_all(dir).unwrap();
        check(&outcomes);
    }
}
