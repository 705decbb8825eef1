//! 命令行参数.

use std::path::PathBuf;

use clap::Parser;
use lung_berry::dataset::generic::SCAN_SUFFIX;
use utils::loader;

/// 计算肺实质表型并写出 CSV 报告.
///
/// 给出 `--in_ct` 与 `--in_lm` 时只处理单个病例, 否则处理数据目录下的全部病例.
#[derive(Parser, Debug)]
#[command(name = "pheno-report", version, about)]
pub struct Cli {
    /// 单病例模式: 输入 CT 文件 (nifti)
    #[arg(long = "in_ct", requires = "in_lm")]
    pub in_ct: Option<PathBuf>,

    /// 单病例模式: 输入标签图文件 (nifti)
    #[arg(long = "in_lm", requires = "in_ct")]
    pub in_lm: Option<PathBuf>,

    /// 单病例模式下的病例编号. 缺省时由 CT 文件名推断
    #[arg(long = "cid")]
    pub cid: Option<String>,

    /// 输出 CSV 文件. 缺省时使用 `$LUNG_PHENO_OUT` 或 `./phenotypes.csv`
    #[arg(long = "out_csv")]
    pub out_csv: Option<PathBuf>,

    /// 批处理模式的数据目录. 缺省时使用 `$LUNG_PHENO_DATA_DIR` 或 `$HOME/dataset/lung`
    #[arg(conflicts_with_all = ["in_ct", "in_lm", "cid"])]
    pub data_dir: Option<PathBuf>,
}

/// 运行模式.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// 单个病例.
    Single {
        ct: PathBuf,
        lm: PathBuf,
        cid: String,
    },
    /// 目录下的全部病例.
    Batch(Option<PathBuf>),
}

impl Cli {
    /// 根据参数确定运行模式.
    pub fn mode(&self) -> Mode {
        match (&self.in_ct, &self.in_lm) {
            (Some(ct), Some(lm)) => Mode::Single {
                cid: self
                    .cid
                    .clone()
                    .unwrap_or_else(|| case_id_from_path(ct)),
                ct: ct.clone(),
                lm: lm.clone(),
            },
            _ => Mode::Batch(self.data_dir.clone()),
        }
    }

    /// 输出文件路径.
    pub fn output_path(&self) -> PathBuf {
        self.out_csv
            .clone()
            .unwrap_or_else(loader::output_path_from_env)
    }
}

/// 由 CT 文件名推断病例编号: 去掉目录和 `.nii.gz` 后缀.
pub fn case_id_from_path(path: &std::path::Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(SCAN_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_case_args() {
        let cli = Cli::try_parse_from([
            "pheno-report",
            "--in_ct",
            "/data/10004O.nii.gz",
            "--in_lm",
            "/data/10004O_partialLungLabelMap.nii.gz",
            "--out_csv",
            "out.csv",
        ])
        .unwrap();
        assert_eq!(
            cli.mode(),
            Mode::Single {
                ct: PathBuf::from("/data/10004O.nii.gz"),
                lm: PathBuf::from("/data/10004O_partialLungLabelMap.nii.gz"),
                cid: "10004O".to_string(),
            }
        );
        assert_eq!(cli.output_path(), PathBuf::from("out.csv"));

        let cli = Cli::try_parse_from([
            "pheno-report",
            "--in_ct",
            "a.nii.gz",
            "--in_lm",
            "b.nii.gz",
            "--cid",
            "case-7",
        ])
        .unwrap();
        assert!(matches!(cli.mode(), Mode::Single { cid, .. } if cid == "case-7"));
    }

    #[test]
    fn test_batch_args() {
        let cli = Cli::try_parse_from(["pheno-report"]).unwrap();
        assert_eq!(cli.mode(), Mode::Batch(None));

        let cli = Cli::try_parse_from(["pheno-report", "/data/lung"]).unwrap();
        assert_eq!(cli.mode(), Mode::Batch(Some(PathBuf::from("/data/lung"))));
    }

    #[test]
    fn test_rejected_args() {
        // CT 与标签图必须同时给出.
        assert!(Cli::try_parse_from(["pheno-report", "--in_ct", "a.nii.gz"]).is_err());
        assert!(Cli::try_parse_from([
            "pheno-report",
            "--in_ct",
            "a.nii.gz",
            "--in_lm",
            "b.nii.gz",
            "/data/lung",
        ])
        .is_err());
    }

    #[test]
    fn test_case_id_from_path() {
        assert_eq!(case_id_from_path("/x/c1.nii.gz".as_ref()), "c1");
        assert_eq!(case_id_from_path("scan.nrrd".as_ref()), "scan.nrrd");
        assert_eq!(case_id_from_path(".nii.gz".as_ref()), ".nii.gz");
    }
}
