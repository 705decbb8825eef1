//! 多病例批处理.
//!
//! 每个病例使用一个全新的计算引擎, 彼此之间没有共享状态.
//! 结果表按输入顺序合并, 与是否并行无关.

use log::{info, warn};

use crate::error::{PhenoError, PhenoResult};
use crate::phenotype::ParenchymaPhenotypes;
use crate::region_type::Selection;
use crate::report::ResultsTable;
use crate::CtData3d;

/// 批处理结果.
#[derive(Debug)]
pub struct BatchReport {
    /// 全部成功病例的结果, 按输入顺序.
    pub table: ResultsTable,

    /// 加载或计算失败的病例, 按输入顺序.
    pub failures: Vec<(String, PhenoError)>,
}

impl BatchReport {
    /// 是否所有病例都成功?
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn collect<I: IntoIterator<Item = (String, PhenoResult<ResultsTable>)>>(it: I) -> Self {
        let mut table = ResultsTable::new();
        let mut failures = vec![];
        for (cid, res) in it {
            match res {
                Ok(t) => table.append(t),
                Err(e) => {
                    warn!("[{cid}] failed: {e}");
                    failures.push((cid, e));
                }
            }
        }
        info!(
            "batch finished: {} rows, {} failed cases",
            table.len(),
            failures.len()
        );
        Self { table, failures }
    }
}

/// 加载并计算单个病例.
fn run_one<F>(
    cid: &str,
    load: &F,
    selection: &Selection,
    phenotypes: Option<&[&str]>,
) -> PhenoResult<ResultsTable>
where
    F: Fn(&str) -> PhenoResult<CtData3d>,
{
    let data = load(cid)?;
    let mut engine = ParenchymaPhenotypes::new(selection.clone(), phenotypes)?;
    engine.execute(
        data.scan.data(),
        data.label.data(),
        cid,
        data.spacing(),
        None,
        None,
    )?;
    Ok(engine.into_sink())
}

/// 依次处理 `cids` 中的每个病例. `load` 负责根据病例编号加载数据.
///
/// 表型名在处理任何病例之前校验, 非法时直接返回 `Err`.
/// 单个病例的加载或计算失败不会中断批处理, 而是记录在 [`BatchReport::failures`] 中.
pub fn run_cases<S, F>(
    cids: &[S],
    load: F,
    selection: &Selection,
    phenotypes: Option<&[&str]>,
) -> PhenoResult<BatchReport>
where
    S: AsRef<str>,
    F: Fn(&str) -> PhenoResult<CtData3d>,
{
    ParenchymaPhenotypes::new(selection.clone(), phenotypes)?;
    info!("running {} cases sequentially", cids.len());

    Ok(BatchReport::collect(cids.iter().map(|cid| {
        let cid = cid.as_ref();
        (cid.to_string(), run_one(cid, &load, selection, phenotypes))
    })))
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 借助 `rayon`, 并行地处理 `cids` 中的每个病例. 语义与 [`run_cases`] 相同,
/// 结果表仍按 `cids` 的顺序合并.
#[cfg(feature = "rayon")]
pub fn par_run_cases<S, F>(
    cids: &[S],
    load: F,
    selection: &Selection,
    phenotypes: Option<&[&str]>,
) -> PhenoResult<BatchReport>
where
    S: AsRef<str> + Sync,
    F: Fn(&str) -> PhenoResult<CtData3d> + Sync,
{
    ParenchymaPhenotypes::new(selection.clone(), phenotypes)?;
    info!(
        "running {} cases on {} threads",
        cids.len(),
        rayon::current_num_threads()
    );

    let results: Vec<_> = cids
        .par_iter()
        .map(|cid| {
            let cid = cid.as_ref();
            (cid.to_string(), run_one(cid, &load, selection, phenotypes))
        })
        .collect();
    Ok(BatchReport::collect(results))
}
