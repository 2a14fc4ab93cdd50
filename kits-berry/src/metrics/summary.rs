use std::fmt;

use super::CaseMetrics;
use crate::consts::METRIC_NAME_LIST;
use crate::hec::Hec;

/// 单个 HEC 在多病例上的汇总.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HecSummary {
    /// 平均 Dice. 没有有效值时为 `NaN`.
    pub mean_dice: f64,

    /// 平均表面 Dice. 没有有效值时为 `NaN`.
    pub mean_surface_dice: f64,

    /// 参与 Dice 平均的病例数 (`NaN` 不计入).
    pub dice_count: usize,

    /// 参与表面 Dice 平均的病例数 (`NaN` 不计入).
    pub surface_dice_count: usize,
}

/// 多病例评估汇总, 按 [`Hec::ALL`] 顺序给出每个 HEC 的平均值.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    cases: usize,
    hecs: [HecSummary; 3],
}

/// 忽略 `NaN` 的增量平均.
#[derive(Default)]
struct NanMean {
    sum: f64,
    count: usize,
}

impl NanMean {
    #[inline]
    fn push(&mut self, v: f64) {
        if !v.is_nan() {
            self.sum += v;
            self.count += 1;
        }
    }

    #[inline]
    fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

impl Summary {
    /// 汇总多个病例的结果.
    pub fn from_cases<'a, I: IntoIterator<Item = &'a CaseMetrics>>(it: I) -> Self {
        let mut acc: [(NanMean, NanMean); 3] = Default::default();
        let mut cases = 0usize;
        for case in it {
            cases += 1;
            for (hec, m) in case.iter() {
                let (d, sd) = &mut acc[hec.index()];
                d.push(m.dice);
                sd.push(m.surface_dice);
            }
        }

        let hecs = acc.map(|(d, sd)| HecSummary {
            mean_dice: d.mean(),
            mean_surface_dice: sd.mean(),
            dice_count: d.count,
            surface_dice_count: sd.count,
        });
        Self { cases, hecs }
    }

    /// 参与汇总的病例数.
    #[inline]
    pub fn cases(&self) -> usize {
        self.cases
    }

    /// 获取某个 HEC 的汇总.
    #[inline]
    pub fn get(&self, hec: Hec) -> HecSummary {
        self.hecs[hec.index()]
    }

    /// 所有 HEC 的平均 Dice 与平均表面 Dice 再取平均, 即排行榜上的综合得分.
    pub fn overall(&self) -> (f64, f64) {
        let n = self.hecs.len() as f64;
        let dice = self.hecs.iter().map(|h| h.mean_dice).sum::<f64>() / n;
        let sd = self.hecs.iter().map(|h| h.mean_surface_dice).sum::<f64>() / n;
        (dice, sd)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary over {} case(s):", self.cases)?;
        write!(f, "{:<16}", "HEC")?;
        for name in METRIC_NAME_LIST {
            write!(f, "{name:>10}")?;
        }
        for hec in Hec::ALL {
            let s = self.get(hec);
            write!(
                f,
                "\n{:<16}{:>10.6}{:>10.6}",
                hec.name(),
                s.mean_dice,
                s.mean_surface_dice
            )?;
        }
        let (dice, sd) = self.overall();
        write!(f, "\n{:<16}{dice:>10.6}{sd:>10.6}", "overall")
    }
}
