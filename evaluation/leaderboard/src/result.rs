//! 评估结果.

use kits_berry::dataset::kits::case_name;
use kits_berry::metrics::{CaseMetrics, CaseOutcome, Summary};
use kits_berry::EvalResult;
use log::{error, info};
use std::io::{self, Write};
use std::path::Path;

/// 将单个病例的结果写进 `w` 中.
fn describe_into<W: Write>(idx: u32, r: &EvalResult<CaseMetrics>, w: &mut W) -> io::Result<()> {
    writeln!(w, "Case `{}`:", case_name(idx))?;
    match r {
        Ok(m) => write!(w, "{m}"),
        Err(e) => write!(w, "    failed: {e}"),
    }
}

/// 排行榜评估最终结果.
pub struct LeaderboardResult {
    data: Vec<CaseOutcome>,
}

/// 按病例索引升序收集.
impl FromIterator<CaseOutcome> for LeaderboardResult {
    fn from_iter<I: IntoIterator<Item = CaseOutcome>>(it: I) -> Self {
        let mut data: Vec<_> = it.into_iter().collect();
        data.sort_by_key(|(idx, _)| *idx);
        Self { data }
    }
}

impl LeaderboardResult {
    /// 成功评估的病例数.
    pub fn succeeded(&self) -> usize {
        self.data.iter().filter(|(_, r)| r.is_ok()).count()
    }

    /// 对所有成功评估的病例做汇总.
    pub fn summary(&self) -> Summary {
        Summary::from_cases(self.data.iter().filter_map(|(_, r)| r.as_ref().ok()))
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (idx, r) in self.data.iter() {
            describe_into(*idx, r, &mut buf).unwrap();
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }

        let failed = self.data.len() - self.succeeded();
        if failed > 0 {
            error!("{failed} case(s) failed to evaluate");
        }
        println!("{}", self.summary());
        utils::sep();
    }

    /// 将每个成功病例的指标表写为 `{dir}/case_XXXXX/metrics.npy`.
    pub fn save_to<P: AsRef<Path>>(&self, dir: P) -> EvalResult<()> {
        for (idx, r) in self.data.iter() {
            let Ok(m) = r else {
                continue;
            };
            let case_dir = dir.as_ref().join(case_name(*idx));
            std::fs::create_dir_all(&case_dir)?;
            m.write_npy(case_dir.join("metrics.npy"))?;
        }
        info!("metrics saved to {}", dir.as_ref().display());
        Ok(())
    }
}
