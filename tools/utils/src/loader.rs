//! 对 `lung_berry::dataset` 的更一层封装. 提供更直接的病例加载方式和运行配置.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use lung_berry::dataset::generic::{self, LABEL_SUFFIX};
use lung_berry::{CtData3d, PhenoResult};

/// 数据目录环境变量.
pub const DATA_DIR_ENV: &str = "LUNG_PHENO_DATA_DIR";

/// 输出文件环境变量.
pub const OUT_ENV: &str = "LUNG_PHENO_OUT";

/// 日志级别环境变量.
pub const LOG_ENV: &str = "LUNG_PHENO_LOG";

/// 默认输出文件.
pub const DEFAULT_OUT: &str = "phenotypes.csv";

/// 获取肺部数据集基本路径.
///
/// 1. 若环境变量 `$LUNG_PHENO_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/lung`;
/// 3. 无法定位主目录时, 返回相对路径 `dataset/lung`.
pub fn data_dir_from_env_or_home() -> PathBuf {
    match env::var(DATA_DIR_ENV) {
        Ok(d) if !d.is_empty() => PathBuf::from(d),
        _ => lung_berry::dataset::home_dataset_dir_with(["lung"])
            .unwrap_or_else(|| PathBuf::from("dataset").join("lung")),
    }
}

/// 获取报告输出路径.
///
/// 1. 若环境变量 `$LUNG_PHENO_OUT` 非空, 则返回其值;
/// 2. 否则, 返回 `./phenotypes.csv`.
pub fn output_path_from_env() -> PathBuf {
    match env::var(OUT_ENV) {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_OUT),
    }
}

/// 解析日志级别. 空值或无法识别时返回 `Info`.
pub fn parse_log_level(s: Option<&str>) -> LevelFilter {
    s.and_then(|s| LevelFilter::from_str(s.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}

/// 获取 `$LUNG_PHENO_LOG` 指定的日志级别.
#[inline]
pub fn log_level_from_env() -> LevelFilter {
    parse_log_level(env::var(LOG_ENV).ok().as_deref())
}

/// 获取 `dir` 下全部病例编号 (以标签图文件为准), 按字典序排列.
pub fn case_ids<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
    generic::list_case_ids(dir, LABEL_SUFFIX)
}

/// 按默认文件名加载 `dir` 下的单个病例.
pub fn load_case<P: AsRef<Path>>(dir: P, cid: &str) -> PhenoResult<CtData3d> {
    let dir = dir.as_ref();
    CtData3d::open(
        dir.join(generic::scan_filename(cid)),
        dir.join(generic::label_filename(cid)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level(None), LevelFilter::Info);
        assert_eq!(parse_log_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_log_level(Some(" WARN ")), LevelFilter::Warn);
        assert_eq!(parse_log_level(Some("loud")), LevelFilter::Info);
    }

    #[test]
    fn test_missing_dir() {
        assert!(case_ids("/definitely/not/a/lung/dir").is_err());
        assert!(load_case("/definitely/not/a/lung/dir", "c1").is_err());
    }
}
