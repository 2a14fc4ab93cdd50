use ndarray::{ArrayBase, Data, Dimension, Zip};

/// 计算两个布尔掩码的 Dice 系数 `2 * |A ∩ B| / (|A| + |B|)`. `true` 视为前景.
///
/// 两个掩码均为空时结果无定义, 返回 `NaN` (而不是虚假的 0 或 1).
/// 形状不一致时 panic.
pub fn dice<S1, S2, D>(prediction: &ArrayBase<S1, D>, reference: &ArrayBase<S2, D>) -> f64
where
    S1: Data<Elem = bool>,
    S2: Data<Elem = bool>,
    D: Dimension,
{
    let (mut intersection, mut numel_pred, mut numel_ref) = (0usize, 0usize, 0usize);
    Zip::from(prediction).and(reference).for_each(|&p, &r| {
        intersection += (p && r) as usize;
        numel_pred += p as usize;
        numel_ref += r as usize;
    });

    if numel_pred == 0 && numel_ref == 0 {
        f64::NAN
    } else {
        2.0 * intersection as f64 / (numel_pred + numel_ref) as f64
    }
}
