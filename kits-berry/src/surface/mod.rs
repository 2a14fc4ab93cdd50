//! 表面距离.
//!
//! 给定两个布尔掩码和体素间距, 计算双方边界体素到对方边界的最近距离,
//! 以及由这些距离导出的表面 Dice, 平均表面距离与鲁棒 Hausdorff 距离.
//!
//! # 注意
//!
//! 1. 每个边界体素携带一个表面面积权重 (见 `border` 子模块), 所有统计量均按面积加权.
//! 2. 一侧掩码为空时, 另一侧到它的距离均为 `f64::INFINITY`.
//! 3. 表面元素是边界体素 (中心点 + 暴露面面积), 而不是基于体素角点的
//!   marching-cubes 面元. 因此对于不完全重合的掩码, 表面 Dice 等数值与 DeepMind
//!   `surface_distance` (即 KiTS 官方排行榜) 的结果存在差异; 完全重合,
//!   完全不相交以及空掩码的情况与之一致.
//! 4. 计算只在两掩码并集的包围盒 (向外扩一个体素) 内进行, 开销与结构大小相关,
//!   而与整个体数据的大小无关.

use ndarray::{s, Array3, ArrayView3, Zip};
use ordered_float::OrderedFloat;

use crate::{Idx3d, Spacing3d};

mod border;
mod edt;

/// 两个掩码边界之间的表面距离, 均按距离升序排列.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceDistances {
    /// 真值边界体素到预测边界的距离 (毫米).
    pub distances_gt_to_pred: Vec<f64>,

    /// 预测边界体素到真值边界的距离 (毫米).
    pub distances_pred_to_gt: Vec<f64>,

    /// 与 `distances_gt_to_pred` 一一对应的真值边界面积 (平方毫米).
    pub surfel_areas_gt: Vec<f64>,

    /// 与 `distances_pred_to_gt` 一一对应的预测边界面积 (平方毫米).
    pub surfel_areas_pred: Vec<f64>,
}

/// 计算 `mask_gt` 与 `mask_pred` 的表面距离.
///
/// 两个掩码形状必须一致, 否则程序 panic.
pub fn compute_surface_distances(
    mask_gt: ArrayView3<bool>,
    mask_pred: ArrayView3<bool>,
    spacing: &Spacing3d,
) -> SurfaceDistances {
    assert_eq!(mask_gt.dim(), mask_pred.dim(), "两个掩码形状不一致");

    let Some([(z0, z1), (y0, y1), (x0, x1)]) = union_bounding_box(&mask_gt, &mask_pred) else {
        return SurfaceDistances::default();
    };
    // 外扩一个体素, 保证包围盒内的边界判定与整个体数据上一致.
    let (z0, y0, x0) = (z0.saturating_sub(1), y0.saturating_sub(1), x0.saturating_sub(1));
    let (dz, dy, dx) = mask_gt.dim();
    let (z1, y1, x1) = ((z1 + 1).min(dz), (y1 + 1).min(dy), (x1 + 1).min(dx));
    let mask_gt = mask_gt.slice_move(s![z0..z1, y0..y1, x0..x1]);
    let mask_pred = mask_pred.slice_move(s![z0..z1, y0..y1, x0..x1]);

    let border_gt = border::extract_border(mask_gt, spacing);
    let border_pred = border::extract_border(mask_pred, spacing);

    let dt_gt = edt::squared_edt(border_gt.mask.view(), spacing);
    let dt_pred = edt::squared_edt(border_pred.mask.view(), spacing);

    let (distances_gt_to_pred, surfel_areas_gt) = sorted_distances(border_gt.surfels, &dt_pred);
    let (distances_pred_to_gt, surfel_areas_pred) = sorted_distances(border_pred.surfels, &dt_gt);

    SurfaceDistances {
        distances_gt_to_pred,
        distances_pred_to_gt,
        surfel_areas_gt,
        surfel_areas_pred,
    }
}

/// 两掩码并集的包围盒, 每轴为左闭右开区间 `(lo, hi)`. 并集为空时返回 `None`.
fn union_bounding_box(a: &ArrayView3<bool>, b: &ArrayView3<bool>) -> Option<[(usize, usize); 3]> {
    let mut lo = [usize::MAX; 3];
    let mut hi = [0usize; 3];
    Zip::indexed(a).and(b).for_each(|(z, y, x), &p, &q| {
        if p || q {
            for (k, i) in [z, y, x].into_iter().enumerate() {
                lo[k] = lo[k].min(i);
                hi[k] = hi[k].max(i + 1);
            }
        }
    });
    if lo[0] == usize::MAX {
        return None;
    }
    Some([(lo[0], hi[0]), (lo[1], hi[1]), (lo[2], hi[2])])
}

/// 在平方距离图 `dt` 上查询每个边界体素的距离, 返回按距离升序排列的 (距离, 面积).
fn sorted_distances(surfels: Vec<(Idx3d, f64)>, dt: &Array3<f64>) -> (Vec<f64>, Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = surfels
        .into_iter()
        .map(|(pos, area)| (dt[pos].sqrt(), area))
        .collect();
    pairs.sort_by_key(|&(d, _)| OrderedFloat(d));
    pairs.into_iter().unzip()
}

/// 距离不超过 `tolerance_mm` 的表面面积之和.
#[inline]
fn area_within(distances: &[f64], areas: &[f64], tolerance_mm: f64) -> f64 {
    distances
        .iter()
        .zip(areas)
        .filter(|(d, _)| **d <= tolerance_mm)
        .map(|(_, a)| a)
        .sum()
}

/// 计算给定容差下的表面 Dice: 双方边界中, 与对方距离不超过 `tolerance_mm`
/// 的表面面积之和, 占双方表面总面积的比例. 取值为 `[0, 1]`.
///
/// 双方表面均为空时返回 `NaN`.
pub fn compute_surface_dice_at_tolerance(d: &SurfaceDistances, tolerance_mm: f64) -> f64 {
    let overlap_gt = area_within(&d.distances_gt_to_pred, &d.surfel_areas_gt, tolerance_mm);
    let overlap_pred = area_within(&d.distances_pred_to_gt, &d.surfel_areas_pred, tolerance_mm);
    let total = d.surfel_areas_gt.iter().sum::<f64>() + d.surfel_areas_pred.iter().sum::<f64>();
    (overlap_gt + overlap_pred) / total
}

/// 计算给定容差下, 双方各自 "被对方覆盖" 的表面面积比例.
///
/// 返回值为 `(真值表面被覆盖比例, 预测表面被覆盖比例)`. 某一侧表面为空时该分量为 `NaN`.
pub fn compute_surface_overlap_at_tolerance(d: &SurfaceDistances, tolerance_mm: f64) -> (f64, f64) {
    let overlap_gt = area_within(&d.distances_gt_to_pred, &d.surfel_areas_gt, tolerance_mm);
    let overlap_pred = area_within(&d.distances_pred_to_gt, &d.surfel_areas_pred, tolerance_mm);
    (
        overlap_gt / d.surfel_areas_gt.iter().sum::<f64>(),
        overlap_pred / d.surfel_areas_pred.iter().sum::<f64>(),
    )
}

/// 计算面积加权的平均表面距离.
///
/// 返回值为 `(真值到预测的平均距离, 预测到真值的平均距离)`.
pub fn compute_average_surface_distance(d: &SurfaceDistances) -> (f64, f64) {
    #[inline]
    fn weighted_mean(distances: &[f64], areas: &[f64]) -> f64 {
        let total: f64 = areas.iter().sum();
        let weighted: f64 = distances.iter().zip(areas).map(|(d, a)| d * a).sum();
        weighted / total
    }

    (
        weighted_mean(&d.distances_gt_to_pred, &d.surfel_areas_gt),
        weighted_mean(&d.distances_pred_to_gt, &d.surfel_areas_pred),
    )
}

/// 计算鲁棒 Hausdorff 距离: 双方向的 `percent` 百分位 (按面积累积) 距离中的较大者.
///
/// `percent` 为 100 时即为标准 Hausdorff 距离. 某一侧表面为空时返回 `f64::INFINITY`.
pub fn compute_robust_hausdorff(d: &SurfaceDistances, percent: f64) -> f64 {
    fn percentile(distances: &[f64], areas: &[f64], percent: f64) -> f64 {
        if distances.is_empty() {
            return f64::INFINITY;
        }
        let total: f64 = areas.iter().sum();
        let target = percent / 100.0;
        let mut cum = 0.0;
        let idx = areas
            .iter()
            .position(|a| {
                cum += a;
                cum / total >= target
            })
            .unwrap_or(distances.len() - 1);
        distances[idx]
    }

    let gt_to_pred = percentile(&d.distances_gt_to_pred, &d.surfel_areas_gt, percent);
    let pred_to_gt = percentile(&d.distances_pred_to_gt, &d.surfel_areas_pred, percent);
    gt_to_pred.max(pred_to_gt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn cube(shape: (usize, usize, usize), lo: usize, hi: usize) -> Array3<bool> {
        let mut m = Array3::from_elem(shape, false);
        m.slice_mut(s![lo..hi, lo..hi, lo..hi]).fill(true);
        m
    }

    #[test]
    fn test_identical_masks() {
        let m = cube((6, 6, 6), 1, 4);
        let d = compute_surface_distances(m.view(), m.view(), &[1.0, 0.8, 0.8]);
        assert!(d.distances_gt_to_pred.iter().all(|v| *v == 0.0));
        assert!(d.distances_pred_to_gt.iter().all(|v| *v == 0.0));
        assert_eq!(compute_surface_dice_at_tolerance(&d, 0.0), 1.0);
        assert_eq!(compute_robust_hausdorff(&d, 95.0), 0.0);
        assert_eq!(compute_average_surface_distance(&d), (0.0, 0.0));
        assert_eq!(compute_surface_overlap_at_tolerance(&d, 1.0), (1.0, 1.0));
    }

    /// 沿 x 轴平移一个体素, 所有距离均不超过一个体素间距.
    #[test]
    fn test_shifted_masks() {
        let mut gt = Array3::from_elem((5, 5, 6), false);
        gt.slice_mut(s![1..4, 1..4, 1..4]).fill(true);
        let mut pred = Array3::from_elem((5, 5, 6), false);
        pred.slice_mut(s![1..4, 1..4, 2..5]).fill(true);

        let spacing = [1.0, 1.0, 2.0];
        let d = compute_surface_distances(gt.view(), pred.view(), &spacing);

        assert!(d.distances_gt_to_pred.windows(2).all(|w| w[0] <= w[1]));
        assert!(d.distances_gt_to_pred.iter().all(|v| *v <= 2.0 + 1e-9));
        assert!(d.distances_pred_to_gt.iter().all(|v| *v <= 2.0 + 1e-9));

        assert!(f64_eq(compute_surface_dice_at_tolerance(&d, 2.0), 1.0));
        let sd = compute_surface_dice_at_tolerance(&d, 1.0);
        assert!(sd > 0.0 && sd < 1.0);
        assert!(f64_eq(compute_robust_hausdorff(&d, 100.0), 2.0));
    }

    #[test]
    fn test_far_apart_masks() {
        let mut gt = Array3::from_elem((1, 1, 20), false);
        gt[(0, 0, 0)] = true;
        let mut pred = Array3::from_elem((1, 1, 20), false);
        pred[(0, 0, 19)] = true;

        let d = compute_surface_distances(gt.view(), pred.view(), &[1.0, 1.0, 0.5]);
        assert_eq!(d.distances_gt_to_pred, vec![9.5]);
        assert_eq!(d.distances_pred_to_gt, vec![9.5]);
        assert_eq!(compute_surface_dice_at_tolerance(&d, 1.0), 0.0);
        assert!(f64_eq(compute_average_surface_distance(&d).0, 9.5));
    }

    #[test]
    fn test_one_side_empty() {
        let gt = cube((4, 4, 4), 1, 3);
        let pred = Array3::from_elem((4, 4, 4), false);
        let d = compute_surface_distances(gt.view(), pred.view(), &[1.0; 3]);
        assert!(d.distances_pred_to_gt.is_empty());
        assert!(d.distances_gt_to_pred.iter().all(|v| v.is_infinite()));
        assert_eq!(compute_surface_dice_at_tolerance(&d, 5.0), 0.0);
        assert!(compute_robust_hausdorff(&d, 95.0).is_infinite());
    }

    #[test]
    fn test_union_bounding_box() {
        let mut a = Array3::from_elem((6, 7, 8), false);
        let mut b = a.clone();
        assert_eq!(union_bounding_box(&a.view(), &b.view()), None);

        a[(1, 2, 3)] = true;
        b[(4, 5, 3)] = true;
        b[(2, 0, 7)] = true;
        assert_eq!(
            union_bounding_box(&a.view(), &b.view()),
            Some([(1, 5), (0, 6), (3, 8)])
        );
    }

    /// 小结构放在大体数据中, 与放在紧凑体数据中结果一致.
    #[test]
    fn test_crop_invariance() {
        let spacing = [2.5, 0.8, 0.7];
        let place = |shape: (usize, usize, usize), (oz, oy, ox): (usize, usize, usize)| {
            let mut gt = Array3::from_elem(shape, false);
            gt.slice_mut(s![oz + 1..oz + 5, oy + 1..oy + 4, ox + 1..ox + 6]).fill(true);
            let mut pred = Array3::from_elem(shape, false);
            pred.slice_mut(s![oz + 2..oz + 5, oy + 1..oy + 5, ox..ox + 5]).fill(true);
            (gt, pred)
        };

        let (gt, pred) = place((6, 6, 7), (0, 0, 0));
        let tight = compute_surface_distances(gt.view(), pred.view(), &spacing);
        let (gt, pred) = place((40, 64, 64), (17, 30, 21));
        let large = compute_surface_distances(gt.view(), pred.view(), &spacing);

        let all_eq = |a: &[f64], b: &[f64]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| f64_eq(*x, *y))
        };
        assert!(!large.distances_gt_to_pred.is_empty());
        assert!(all_eq(&tight.distances_gt_to_pred, &large.distances_gt_to_pred));
        assert!(all_eq(&tight.distances_pred_to_gt, &large.distances_pred_to_gt));
        assert_eq!(tight.surfel_areas_gt.len(), large.surfel_areas_gt.len());
        for tol in [0.5, 1.0, 2.6, 5.0] {
            assert!(f64_eq(
                compute_surface_dice_at_tolerance(&tight, tol),
                compute_surface_dice_at_tolerance(&large, tol)
            ));
        }
        let (a, b) = (
            compute_average_surface_distance(&tight),
            compute_average_surface_distance(&large),
        );
        assert!(f64_eq(a.0, b.0) && f64_eq(a.1, b.1));
    }

    /// 贴着体数据边缘的结构, 裁剪后边缘之外仍视为背景.
    #[test]
    fn test_crop_keeps_volume_edge() {
        let spacing = [1.0, 1.0, 1.0];
        let mut gt = Array3::from_elem((3, 3, 30), false);
        gt.slice_mut(s![.., .., 0..2]).fill(true);
        let mut pred = Array3::from_elem((3, 3, 30), false);
        pred.slice_mut(s![.., .., 0..3]).fill(true);
        let d = compute_surface_distances(gt.view(), pred.view(), &spacing);

        let gt_small = gt.slice(s![.., .., 0..4]).to_owned();
        let pred_small = pred.slice(s![.., .., 0..4]).to_owned();
        let expected = compute_surface_distances(gt_small.view(), pred_small.view(), &spacing);
        assert_eq!(d, expected);
        // 3x3 截面全部位于边缘, 每个体素都是边界体素.
        assert_eq!(d.surfel_areas_gt.len(), 18);
    }

    #[test]
    fn test_both_empty_is_nan() {
        let m = Array3::from_elem((2, 2, 2), false);
        let d = compute_surface_distances(m.view(), m.view(), &[1.0; 3]);
        assert!(compute_surface_dice_at_tolerance(&d, 1.0).is_nan());
    }
}
