//! KiTS 排行榜评估.
//!
//! 从 `$KITS_PRED_DIR` 与 `$KITS_REF_DIR` (默认 `$HOME/dataset/kits/{prediction,reference}`)
//! 读取所有病例, 逐 HEC 计算 Dice 与表面 Dice 并输出汇总. 若设置了 `$KITS_OUT_DIR`,
//! 还会把每个病例的指标表保存为 npy 文件.

mod result;
mod runner;

fn main() {
    utils::init_logger();

    let result = runner::run();
    result.analyze();

    if let Some(dir) = utils::loader::output_dir_from_env() {
        if let Err(e) = result.save_to(&dir) {
            log::error!("Saving metrics to {} failed: {e}", dir.display());
            std::process::exit(1);
        }
    }
}
