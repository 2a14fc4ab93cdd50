//! 程序运行函数.

use crate::result::LeaderboardResult;
use kits_berry::dataset::CaseEntry;
use kits_berry::metrics::evaluate_cases;
use log::info;
use std::thread;
use utils::loader;

/// 实际运行.
pub fn run() -> LeaderboardResult {
    let pred_dir = loader::prediction_dir_from_env_or_home().expect("Cannot locate home directory");
    let ref_dir = loader::reference_dir_from_env_or_home().expect("Cannot locate home directory");
    assert!(pred_dir.is_dir(), "{} is not a directory", pred_dir.display());
    assert!(ref_dir.is_dir(), "{} is not a directory", ref_dir.display());

    let entries: Vec<CaseEntry> = loader::case_loader(&pred_dir, &ref_dir)
        .expect("Loading dataset config error")
        .collect();
    assert!(!entries.is_empty(), "No `case_XXXXX` found under {}", ref_dir.display());

    let workers = utils::cpus().min(entries.len());
    let chunk = entries.len().div_ceil(workers);
    info!("Evaluating {} case(s) with {workers} thread(s)...", entries.len());

    thread::scope(|s| {
        let handles: Vec<_> = entries
            .chunks(chunk)
            .map(|c| s.spawn(move || evaluate_cases(c.iter().cloned())))
            .collect();

        handles
            .into_iter()
            .flat_map(|th| th.join().expect("Thread joining error"))
            .collect()
    })
}
