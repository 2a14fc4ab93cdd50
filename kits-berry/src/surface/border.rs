//! 边界体素 (surfel) 提取.

use ndarray::{Array3, ArrayView3};

use crate::{Idx3d, Spacing3d};

/// 边界体素集合.
pub(crate) struct Border {
    /// 与原掩码同形状, 边界体素处为 `true`.
    pub mask: Array3<bool>,

    /// 每个边界体素的坐标及其表面面积 (平方毫米), 按行优先序排列.
    pub surfels: Vec<(Idx3d, f64)>,
}

/// 沿 `axis` 轴向前 (`forward == true`) 或向后移动一格后的邻居是否为背景.
/// 体数据范围以外视为背景.
#[inline]
fn is_background_neighbour(
    mask: &ArrayView3<bool>,
    (z, y, x): Idx3d,
    axis: usize,
    forward: bool,
) -> bool {
    let shape = mask.dim();
    let pos = match (axis, forward) {
        (0, true) => (z + 1 < shape.0).then(|| (z + 1, y, x)),
        (0, false) => z.checked_sub(1).map(|z| (z, y, x)),
        (1, true) => (y + 1 < shape.1).then(|| (z, y + 1, x)),
        (1, false) => y.checked_sub(1).map(|y| (z, y, x)),
        (2, true) => (x + 1 < shape.2).then(|| (z, y, x + 1)),
        (2, false) => x.checked_sub(1).map(|x| (z, y, x)),
        _ => unreachable!(),
    };
    pos.map_or(true, |p| !mask[p])
}

/// 提取 `mask` 的边界体素.
///
/// 边界体素是至少有一个 6-邻居 (前后上下左右) 为背景的前景体素.
/// 其表面面积为所有与背景相邻的面的面积之和, 垂直于第 `k` 轴的面面积为另外两轴间距之积.
pub(crate) fn extract_border(mask: ArrayView3<bool>, spacing: &Spacing3d) -> Border {
    let [sz, sy, sx] = *spacing;
    let face_area = [sy * sx, sz * sx, sz * sy];

    let mut border = Array3::from_elem(mask.dim(), false);
    let mut surfels = Vec::new();
    for (pos, _) in mask.indexed_iter().filter(|(_, p)| **p) {
        let mut area = 0.0;
        for (axis, a) in face_area.iter().enumerate() {
            for forward in [false, true] {
                if is_background_neighbour(&mask, pos, axis, forward) {
                    area += a;
                }
            }
        }
        if area > 0.0 {
            border[pos] = true;
            surfels.push((pos, area));
        }
    }

    Border {
        mask: border,
        surfels,
    }
}
