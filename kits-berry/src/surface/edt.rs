//! 各向异性欧氏距离变换.
//!
//! 逐轴进行一维平方距离变换 (抛物线下包络), 三轴合成后即为精确的三维平方欧氏距离.

use ndarray::{Array3, ArrayView3, Axis};

use crate::Spacing3d;

/// 计算每个体素到最近特征体素 (`features` 中为 `true` 的位置) 的 **平方** 物理距离.
///
/// 不存在任何特征体素时, 所有位置均为 `f64::INFINITY`.
pub(crate) fn squared_edt(features: ArrayView3<bool>, spacing: &Spacing3d) -> Array3<f64> {
    let mut dt = features.mapv(|f| if f { 0.0 } else { f64::INFINITY });
    for (axis, s) in spacing.iter().enumerate() {
        transform_axis(&mut dt, Axis(axis), s * s);
    }
    dt
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::Zip;

        /// 沿 `axis` 对每条 lane 并行地做一维变换.
        fn transform_axis(dt: &mut Array3<f64>, axis: Axis, s2: f64) {
            Zip::from(dt.lanes_mut(axis)).par_for_each(|mut lane| {
                let mut hull = Vec::new();
                let f: Vec<f64> = lane.iter().map(|v| v / s2).collect();
                let mut d = vec![0.0; f.len()];
                lower_envelope_1d(&f, &mut d, &mut hull);
                lane.iter_mut().zip(d.iter()).for_each(|(dst, src)| *dst = src * s2);
            });
        }
    } else {
        /// 沿 `axis` 对每条 lane 做一维变换, 缓存在 lane 之间复用.
        fn transform_axis(dt: &mut Array3<f64>, axis: Axis, s2: f64) {
            let mut f = Vec::new();
            let mut d = Vec::new();
            let mut hull = Vec::new();
            for mut lane in dt.lanes_mut(axis) {
                // 以体素为单位求解, 再乘回物理尺度.
                f.clear();
                f.extend(lane.iter().map(|v| v / s2));
                d.resize(f.len(), 0.0);
                lower_envelope_1d(&f, &mut d, &mut hull);
                lane.iter_mut().zip(d.iter()).for_each(|(dst, src)| *dst = src * s2);
            }
        }
    }
}

/// 一维平方距离变换: `d[p] = min_q (p - q)^2 + f[q]`.
///
/// `hull` 为复用的缓存, 保存下包络上的抛物线顶点及其左边界.
/// 非有限的 `f[q]` 不参与包络.
fn lower_envelope_1d(f: &[f64], d: &mut [f64], hull: &mut Vec<(usize, f64)>) {
    debug_assert_eq!(f.len(), d.len());
    hull.clear();

    for (q, &fq) in f.iter().enumerate().filter(|(_, v)| v.is_finite()) {
        let mut left = f64::NEG_INFINITY;
        while let Some(&(p, p_left)) = hull.last() {
            // 以 `p` 和 `q` 为顶点的两条抛物线的交点横坐标.
            let s = ((fq + (q * q) as f64) - (f[p] + (p * p) as f64)) / (2 * (q - p)) as f64;
            if s <= p_left {
                hull.pop();
            } else {
                left = s;
                break;
            }
        }
        hull.push((q, left));
    }

    if hull.is_empty() {
        d.fill(f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (p, out) in d.iter_mut().enumerate() {
        while k + 1 < hull.len() && hull[k + 1].1 < p as f64 {
            k += 1;
        }
        let (site, _) = hull[k];
        let diff = p as f64 - site as f64;
        *out = diff * diff + f[site];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 暴力求解, 作为对照.
    fn brute_force(features: &Array3<bool>, spacing: &Spacing3d) -> Array3<f64> {
        let sites: Vec<_> = features
            .indexed_iter()
            .filter_map(|(pos, &f)| f.then_some(pos))
            .collect();
        Array3::from_shape_fn(features.dim(), |(z, y, x)| {
            sites
                .iter()
                .map(|&(sz, sy, sx)| {
                    let dz = (z as f64 - sz as f64) * spacing[0];
                    let dy = (y as f64 - sy as f64) * spacing[1];
                    let dx = (x as f64 - sx as f64) * spacing[2];
                    dz * dz + dy * dy + dx * dx
                })
                .fold(f64::INFINITY, f64::min)
        })
    }

    #[test]
    fn test_lower_envelope_1d() {
        let inf = f64::INFINITY;
        let f = [inf, 0.0, inf, inf, inf, 0.0, inf];
        let mut d = [0.0; 7];
        let mut hull = Vec::new();
        lower_envelope_1d(&f, &mut d, &mut hull);
        assert_eq!(d, [1.0, 0.0, 1.0, 4.0, 1.0, 0.0, 1.0]);

        let f = [inf; 3];
        let mut d = [0.0; 3];
        lower_envelope_1d(&f, &mut d, &mut hull);
        assert!(d.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn test_edt_matches_brute_force() {
        let spacing = [2.5, 0.7, 1.3];
        let features =
            Array3::from_shape_fn((5, 6, 7), |(z, y, x)| (z * 7 + y * 3 + x * 5) % 11 == 0);
        let fast = squared_edt(features.view(), &spacing);
        let slow = brute_force(&features, &spacing);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!(f64_eq(*a, *b), "{a} != {b}");
        }
    }

    #[test]
    fn test_edt_single_site_anisotropic() {
        let mut features = Array3::from_elem((3, 3, 3), false);
        features[(1, 1, 1)] = true;
        let dt = squared_edt(features.view(), &[2.0, 1.0, 0.5]);
        assert!(f64_eq(dt[(1, 1, 1)], 0.0));
        assert!(f64_eq(dt[(0, 1, 1)], 4.0));
        assert!(f64_eq(dt[(1, 0, 1)], 1.0));
        assert!(f64_eq(dt[(1, 1, 0)], 0.25));
        assert!(f64_eq(dt[(0, 0, 0)], 5.25));
    }

    #[test]
    fn test_edt_no_features() {
        let features = Array3::from_elem((2, 2, 2), false);
        let dt = squared_edt(features.view(), &[1.0; 3]);
        assert!(dt.iter().all(|v| v.is_infinite()));
    }
}
