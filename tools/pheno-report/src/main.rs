//! 计算肺实质表型, 并写出 CSV 报告.
//!
//! 用法:
//!
//! 1. `pheno-report --in_ct <CT> --in_lm <标签图> [--cid <病例编号>] [--out_csv <输出>]`:
//!   单病例模式;
//! 2. `pheno-report [数据目录] [--out_csv <输出>]`: 处理目录下全部病例.
//!   数据目录缺省时使用 `$LUNG_PHENO_DATA_DIR` 或 `$HOME/dataset/lung`.
//!
//! 输出文件缺省为 `$LUNG_PHENO_OUT` 或 `./phenotypes.csv`.
//! 日志级别为 `$LUNG_PHENO_LOG`, 默认 `info`.

use std::process::ExitCode;

use clap::Parser;
use log::error;

mod cli;
mod result;
mod runner;

use cli::{Cli, Mode};

fn main() -> ExitCode {
    let cli = Cli::parse();
    utils::init_logger();

    let res = match cli.mode() {
        Mode::Single { ct, lm, cid } => runner::run_single(&ct, &lm, &cid),
        Mode::Batch(dir) => runner::run(dir),
    };
    let report = match res {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let out = cli.output_path();
    if let Err(e) = result::save(&report, &out) {
        error!("failed to write {}: {e}", out.display());
        return ExitCode::FAILURE;
    }

    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
