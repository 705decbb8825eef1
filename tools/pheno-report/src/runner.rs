//! 程序运行函数.

use std::path::{Path, PathBuf};

use log::info;
use lung_berry::batch::{self, BatchReport};
use lung_berry::region_type::Selection;
use lung_berry::{CtData3d, PhenoResult};
use utils::loader;

/// 批处理模式. `data_dir` 为空时使用 `$LUNG_PHENO_DATA_DIR` 或 `$HOME/dataset/lung`.
pub fn run(data_dir: Option<PathBuf>) -> PhenoResult<BatchReport> {
    let dir = data_dir.unwrap_or_else(loader::data_dir_from_env_or_home);
    let p: &Path = dir.as_path();

    let cids = loader::case_ids(p)?;
    info!("found {} cases under {}", cids.len(), p.display());

    info!("running with {} cpus", utils::cpus());
    batch::par_run_cases(&cids, |cid| loader::load_case(p, cid), &Selection::new(), None)
}

/// 单病例模式: 直接读取 `ct` 与 `lm` 两个文件.
pub fn run_single(ct: &Path, lm: &Path, cid: &str) -> PhenoResult<BatchReport> {
    info!("[{cid}] {} + {}", ct.display(), lm.display());
    batch::run_cases(&[cid], |_| CtData3d::open(ct, lm), &Selection::new(), None)
}
