//! 由整数标签图构建 HEC 布尔掩码.

use ndarray::{Array, Array3, ArrayBase, ArrayView3, Data, Dimension, Zip};

use super::LabelSpec;
use crate::consts::gray::KITS_BACKGROUND;
use crate::consts::LABEL_AGGREGATION_ORDER;
use crate::Idx3d;

/// 由标签图 `segmentation` 构建 `label` 所选区域的布尔掩码, 形状与输入一致.
///
/// - `label` 为单个标签时, 体素值等于该标签的位置为 `true`;
/// - `label` 为只含一个标签的集合时, 与单标签情况等价;
/// - `label` 为多标签集合时, 体素值等于其中任意一个标签的位置为 `true`.
pub fn build_mask<S, D>(
    segmentation: &ArrayBase<S, D>,
    label: impl Into<LabelSpec>,
) -> Array<bool, D>
where
    S: Data<Elem = u8>,
    D: Dimension,
{
    match label.into() {
        LabelSpec::Single(l) => segmentation.mapv(|p| p == l),
        LabelSpec::Set(set) => match set.as_slice() {
            [l] => {
                let l = *l;
                segmentation.mapv(|p| p == l)
            }
            labels => segmentation.mapv(|p| labels.contains(&p)),
        },
    }
}

/// 统计掩码中前景 (`true`) 体素个数.
#[inline]
pub fn count_foreground<S, D>(mask: &ArrayBase<S, D>) -> usize
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    mask.iter().filter(|p| **p).count()
}

/// 由多个单结构掩码合成一张标签图.
///
/// 各掩码按 [`LABEL_AGGREGATION_ORDER`] 依次放置, 不在该顺序表中的标签最后放置
/// (彼此之间保持输入顺序). 后放置的标签会覆盖重叠区域中先放置的标签.
/// 未被任何掩码覆盖的位置为背景.
///
/// 掩码形状与 `shape` 不一致时 panic.
pub fn compose_segmentation<'a, I>(shape: Idx3d, masks: I) -> Array3<u8>
where
    I: IntoIterator<Item = (u8, ArrayView3<'a, bool>)>,
{
    let mut masks: Vec<(u8, ArrayView3<'a, bool>)> = masks.into_iter().collect();
    masks.sort_by_key(|(label, _)| {
        LABEL_AGGREGATION_ORDER
            .iter()
            .position(|l| l == label)
            .unwrap_or(LABEL_AGGREGATION_ORDER.len())
    });

    let mut ans = Array3::from_elem(shape, KITS_BACKGROUND);
    for (label, mask) in masks {
        Zip::from(&mut ans).and(&mask).for_each(|p, &m| {
            if m {
                *p = label;
            }
        });
    }
    ans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::gray::*;
    use crate::hec::{Hec, LabelSet};
    use ndarray::{array, Array3};

    fn sample_segmentation() -> Array3<u8> {
        array![
            [[0, 1, 1], [2, 2, 3]],
            [[3, 0, 1], [1, 2, 0]],
        ]
    }

    #[test]
    fn test_single_label() {
        let seg = sample_segmentation();
        let mask = build_mask(&seg, KITS_TUMOR);
        assert_eq!(
            mask,
            array![
                [[false, false, false], [true, true, false]],
                [[false, false, false], [false, true, false]],
            ]
        );
        assert_eq!(count_foreground(&mask), 3);
    }

    /// `(a,)` 与 `a` 等价.
    #[test]
    fn test_singleton_set_equals_single() {
        let seg = sample_segmentation();
        for a in 0..=4u8 {
            assert_eq!(build_mask(&seg, [a]), build_mask(&seg, a));
            assert_eq!(build_mask(&seg, LabelSet::from(a)), build_mask(&seg, a));
        }
    }

    /// `(a, b)` 等于 `a` 与 `b` 掩码的逻辑或.
    #[test]
    fn test_pair_is_logical_or() {
        let seg = sample_segmentation();
        for a in 0..=3u8 {
            for b in 0..=3u8 {
                let expected = &build_mask(&seg, a) | &build_mask(&seg, b);
                assert_eq!(build_mask(&seg, [a, b]), expected);
            }
        }
    }

    #[test]
    fn test_hec_masks() {
        let seg = sample_segmentation();
        assert_eq!(count_foreground(&build_mask(&seg, Hec::KidneyAndMass)), 9);
        assert_eq!(count_foreground(&build_mask(&seg, Hec::Mass)), 5);
        assert_eq!(count_foreground(&build_mask(&seg, Hec::Tumor)), 3);
        assert_eq!(count_foreground(&build_mask(&seg, LabelSet::default())), 0);
    }

    #[test]
    fn test_mask_2d() {
        let seg = array![[0u8, 2], [3, 1]];
        assert_eq!(build_mask(&seg.view(), [2, 3]), array![[false, true], [true, false]]);
    }

    /// 肿瘤最后放置, 覆盖重叠的肾脏与囊肿.
    #[test]
    fn test_compose_segmentation_order() {
        let shape = (1, 1, 4);
        let kidney = Array3::from_shape_vec(shape, vec![true, true, true, false]).unwrap();
        let cyst = Array3::from_shape_vec(shape, vec![false, true, true, false]).unwrap();
        let tumor = Array3::from_shape_vec(shape, vec![false, false, true, false]).unwrap();

        let seg = compose_segmentation(
            shape,
            [
                (KITS_TUMOR, tumor.view()),
                (KITS_KIDNEY, kidney.view()),
                (KITS_CYST, cyst.view()),
            ],
        );
        assert_eq!(seg.into_raw_vec(), vec![1, 3, 2, 0]);
    }
}
