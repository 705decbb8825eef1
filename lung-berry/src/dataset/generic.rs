//! 通用肺部 CT scan/label 数据加载器.
//!
//! 提供迭代器风格的数据集获取模式. 每个病例由病例编号 (case id) 标识,
//! 文件名由文件名构造器根据病例编号生成.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PhenoResult;
use crate::{CtData3d, LabelMap, LungCt};

/// 文件名构造器. 接受病例编号, 获得文件名.
pub type FilenameBuilder = fn(&str) -> String;

/// CT 扫描文件后缀.
pub const SCAN_SUFFIX: &str = ".nii.gz";

/// 标签图文件后缀.
pub const LABEL_SUFFIX: &str = "_partialLungLabelMap.nii.gz";

/// 默认 CT 扫描文件名: `{cid}.nii.gz`.
pub fn scan_filename(cid: &str) -> String {
    format!("{cid}{SCAN_SUFFIX}")
}

/// 默认标签图文件名: `{cid}_partialLungLabelMap.nii.gz`.
pub fn label_filename(cid: &str) -> String {
    format!("{cid}{LABEL_SUFFIX}")
}

/// 列出 `dir` 下所有以 `suffix` 结尾的文件对应的病例编号, 按字典序排列.
///
/// 文件名恰好等于 `suffix` 的文件被忽略.
pub fn list_case_ids<P: AsRef<Path>>(dir: P, suffix: &str) -> io::Result<Vec<String>> {
    let mut ans = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(cid) = name.to_str().and_then(|n| n.strip_suffix(suffix)) else {
            continue;
        };
        if !cid.is_empty() {
            ans.push(cid.to_string());
        }
    }
    ans.sort_unstable();
    Ok(ans)
}

/// 将病例编号逆序存放, 以便从尾部弹出.
fn reversed_ids<S: Into<String>, I: IntoIterator<Item = S>>(cids: I) -> Vec<String> {
    let mut data: Vec<String> = cids.into_iter().map(Into::into).collect();
    data.reverse();
    data
}

/// 从指定病例编号、路径、文件名构造器来创建通用的 CT scans 加载器.
///
/// # 注意
///
/// 1. `path` 必须是目录, 否则程序 panic.
/// 2. `cids` 的所有取值 `cid` 必须在 `path` 下有形如 `builder(cid)` 的 nifti
///   文件, 否则加载器在迭代时会返回 `Result::Error`.
pub fn scan_loader<S, I, P>(cids: I, path: P, builder: FilenameBuilder) -> ScanLoader
where
    S: Into<String>,
    I: IntoIterator<Item = S>,
    P: AsRef<Path>,
{
    let path = path.as_ref().to_owned();
    assert!(path.is_dir());

    ScanLoader {
        path,
        data_rev: reversed_ids(cids),
        builder,
    }
}

/// 3D CT scans 数据加载器, 并在内部自动转换文件名.
#[derive(Debug)]
pub struct ScanLoader {
    path: PathBuf,
    data_rev: Vec<String>,
    builder: FilenameBuilder,
}

impl Iterator for ScanLoader {
    type Item = (String, nifti::Result<LungCt>);

    fn next(&mut self) -> Option<Self::Item> {
        let cid = self.data_rev.pop()?;

        self.path.push((self.builder)(&cid));
        let data = LungCt::open(self.path.as_path());
        self.path.pop();

        Some((cid, data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.data_rev.len(), Some(self.data_rev.len()))
    }
}

impl ExactSizeIterator for ScanLoader {}

/// 从指定病例编号、路径、文件名构造器来创建通用的标签图加载器.
///
/// # 注意
///
/// 1. `path` 必须是目录, 否则程序 panic.
/// 2. `cids` 的所有取值 `cid` 必须在 `path` 下有形如 `builder(cid)` 的 nifti
///   文件, 否则加载器在迭代时会返回 `Result::Error`.
pub fn label_loader<S, I, P>(cids: I, path: P, builder: FilenameBuilder) -> LabelLoader
where
    S: Into<String>,
    I: IntoIterator<Item = S>,
    P: AsRef<Path>,
{
    let path = path.as_ref().to_owned();
    assert!(path.is_dir());

    LabelLoader {
        path,
        data_rev: reversed_ids(cids),
        builder,
    }
}

/// 3D 标签图数据加载器, 并在内部自动转换文件名.
#[derive(Debug)]
pub struct LabelLoader {
    path: PathBuf,
    data_rev: Vec<String>,
    builder: FilenameBuilder,
}

impl Iterator for LabelLoader {
    type Item = (String, nifti::Result<LabelMap>);

    fn next(&mut self) -> Option<Self::Item> {
        let cid = self.data_rev.pop()?;

        self.path.push((self.builder)(&cid));
        let data = LabelMap::open(self.path.as_path());
        self.path.pop();

        Some((cid, data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.data_rev.len(), Some(self.data_rev.len()))
    }
}

impl ExactSizeIterator for LabelLoader {}

/// 从指定病例编号、路径、文件名构造器来创建通用的 (扫描 + 标签图) 加载器.
///
/// # 注意
///
/// 1. `cids` 的所有取值 `cid` 必须在 `scan_path` 下有形如
///   `scan_builder(cid)` 的 nifti 文件, 否则加载器在迭代时会返回 `Result::Error`.
/// 2. `cids` 的所有取值 `cid` 必须在 `label_path` 下有形如
///   `label_builder(cid)` 的 nifti 文件, 否则加载器在迭代时会返回 `Result::Error`.
/// 3. 扫描与标签图形状不一致时, 迭代时返回 `DimensionMismatch`.
pub fn data_loader<S, I, P>(
    cids: I,
    scan_path: P,
    scan_builder: FilenameBuilder,
    label_path: P,
    label_builder: FilenameBuilder,
) -> CtDataLoader
where
    S: Into<String>,
    I: IntoIterator<Item = S>,
    P: AsRef<Path>,
{
    CtDataLoader {
        scan_path: scan_path.as_ref().to_owned(),
        scan_builder,
        label_path: label_path.as_ref().to_owned(),
        label_builder,
        data_rev: reversed_ids(cids),
    }
}

/// 扫描和标签图位于同一目录, 并使用默认文件名时的加载器.
#[inline]
pub fn default_data_loader<S, I, P>(cids: I, dir: P) -> CtDataLoader
where
    S: Into<String>,
    I: IntoIterator<Item = S>,
    P: AsRef<Path>,
{
    data_loader(cids, dir.as_ref(), scan_filename, dir.as_ref(), label_filename)
}

/// 3D 肺部 CT 数据集 (scan + label) 加载器, 并在内部自动转换文件名.
#[derive(Debug)]
pub struct CtDataLoader {
    scan_path: PathBuf,
    scan_builder: FilenameBuilder,
    label_path: PathBuf,
    label_builder: FilenameBuilder,
    data_rev: Vec<String>,
}

impl Iterator for CtDataLoader {
    type Item = (String, PhenoResult<CtData3d>);

    fn next(&mut self) -> Option<Self::Item> {
        let cid = self.data_rev.pop()?;

        self.scan_path.push((self.scan_builder)(&cid));
        self.label_path.push((self.label_builder)(&cid));
        let data = CtData3d::open(&self.scan_path, &self.label_path);
        self.label_path.pop();
        self.scan_path.pop();

        Some((cid, data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.data_rev.len(), Some(self.data_rev.len()))
    }
}

impl ExactSizeIterator for CtDataLoader {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhenoError;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_filenames() {
        assert_eq!(scan_filename("10004O"), "10004O.nii.gz");
        assert_eq!(label_filename("10004O"), "10004O_partialLungLabelMap.nii.gz");
    }

    #[test]
    fn test_list_case_ids() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b_partialLungLabelMap.nii.gz");
        touch(dir.path(), "a_partialLungLabelMap.nii.gz");
        touch(dir.path(), "a.nii.gz");
        touch(dir.path(), "_partialLungLabelMap.nii.gz");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("c_partialLungLabelMap.nii.gz")).unwrap();

        let cids = list_case_ids(dir.path(), LABEL_SUFFIX).unwrap();
        assert_eq!(cids, ["a", "b"]);
    }

    #[test]
    fn test_loader_order_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = default_data_loader(["x", "y"], dir.path());
        assert_eq!(loader.len(), 2);

        let (cid, res) = loader.next().unwrap();
        assert_eq!(cid, "x");
        assert!(matches!(res, Err(PhenoError::Nifti(_))));
        assert_eq!(loader.len(), 1);
        assert_eq!(loader.next().unwrap().0, "y");
        assert!(loader.next().is_none());

        let mut scans = scan_loader(vec!["z".to_string()], dir.path(), scan_filename);
        let (cid, res) = scans.next().unwrap();
        assert_eq!(cid, "z");
        assert!(res.is_err());
        assert_eq!(label_loader(Vec::<String>::new(), dir.path(), label_filename).len(), 0);
    }
}
