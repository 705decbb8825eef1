//! 肺实质表型计算引擎.

use log::{debug, info};
use ndarray::{ArrayView3, Zip};

use super::{parse_names, GroupStats, Phenotype};
use crate::error::{PhenoError, PhenoResult};
use crate::region_type::{MaskResolver, RegionTypeParser, Selection};
use crate::report::{PhenoSink, ResultsTable};

/// 肺实质表型计算引擎.
///
/// 给定 CT 扫描, 标签图, 体素分辨率和结构选择器, 对每个选中的结构计算
/// 所请求的表型, 并逐行写入结果接收端 `S` (默认为 [`ResultsTable`]).
///
/// 选择器与表型列表都可以在构造时给出默认值, 并在每次 [`execute`] 时覆盖.
/// 优先级: 调用时参数 > 构造时默认值 > 标签图中出现的全部结构 / 全部表型.
///
/// # 示例
///
/// ```
/// use lung_berry::prelude::*;
/// use ndarray::Array3;
///
/// let ct = Array3::from_elem((4, 4, 4), -900.0f32);
/// let mut lm = Array3::<u16>::zeros((4, 4, 4));
/// lm[(1, 1, 1)] = 1;
///
/// let mut engine = ParenchymaPhenotypes::new(Selection::new(), Some(&["Volume"][..])).unwrap();
/// let table = engine
///     .execute(ct.view(), lm.view(), "case-01", [1.0; 3], None, None)
///     .unwrap();
/// // (WholeLung, WildCard) 与 (WholeLung, UndefinedType) 各一行.
/// assert_eq!(table.len(), 2);
/// ```
///
/// [`execute`]: ParenchymaPhenotypes::execute
#[derive(Debug)]
pub struct ParenchymaPhenotypes<S: PhenoSink = ResultsTable> {
    selection: Selection,

    /// `None` 表示整个目录.
    requested: Option<Vec<Phenotype>>,

    sink: S,

    /// 最近一次处理的病例编号.
    cid: Option<String>,
}

impl ParenchymaPhenotypes<ResultsTable> {
    /// 以空结果表初始化.
    ///
    /// 表型名在此时即被校验, 未知名称返回 `InvalidPhenotypeName`.
    pub fn new(selection: Selection, phenotypes: Option<&[&str]>) -> PhenoResult<Self> {
        Self::with_sink(selection, phenotypes, ResultsTable::new())
    }
}

impl<S: PhenoSink> ParenchymaPhenotypes<S> {
    /// 以给定的结果接收端初始化.
    pub fn with_sink(
        selection: Selection,
        phenotypes: Option<&[&str]>,
        sink: S,
    ) -> PhenoResult<Self> {
        let requested = phenotypes.map(parse_names).transpose()?;
        Ok(Self {
            selection,
            requested,
            sink,
            cid: None,
        })
    }

    /// 最近一次 `execute` 处理的病例编号.
    #[inline]
    pub fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    /// 结果接收端.
    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 取出结果接收端.
    #[inline]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// 计算一个病例的表型, 追加到结果接收端并返回它.
    ///
    /// 标签图按 `value & 0xff` 为区域, `value >> 8` 为类型解析.
    /// `selection` 和 `phenotypes` 为本次调用的覆盖值, 逐类生效.
    ///
    /// # 错误
    ///
    /// 所有校验都在追加第一行之前完成:
    ///
    /// 1. `cid` 为空: `EmptyCaseId`;
    /// 2. `spacing` 含非正数或非有限数: `InvalidSpacing`;
    /// 3. 扫描与标签图形状不一致: `DimensionMismatch`;
    /// 4. 未知表型名: `InvalidPhenotypeName`.
    pub fn execute(
        &mut self,
        ct: ArrayView3<f32>,
        lm: ArrayView3<u16>,
        cid: &str,
        spacing: [f64; 3],
        selection: Option<&Selection>,
        phenotypes: Option<&[&str]>,
    ) -> PhenoResult<&S> {
        let parser = RegionTypeParser::new(lm);
        self.execute_with(ct, &parser, cid, spacing, selection, phenotypes)
    }

    /// 与 [`execute`](Self::execute) 相同, 但使用自定义的掩码解析器.
    pub fn execute_with<R: MaskResolver + ?Sized>(
        &mut self,
        ct: ArrayView3<f32>,
        resolver: &R,
        cid: &str,
        spacing: [f64; 3],
        selection: Option<&Selection>,
        phenotypes: Option<&[&str]>,
    ) -> PhenoResult<&S> {
        if cid.is_empty() {
            return Err(PhenoError::EmptyCaseId);
        }
        if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(PhenoError::InvalidSpacing(spacing));
        }
        if ct.dim() != resolver.shape() {
            return Err(PhenoError::DimensionMismatch {
                ct: ct.dim(),
                label: resolver.shape(),
            });
        }
        let phenos = match phenotypes {
            Some(names) => parse_names(names)?,
            None => self
                .requested
                .clone()
                .unwrap_or_else(|| Phenotype::ALL.to_vec()),
        };
        let resolved = match selection {
            Some(s) => s.or(&self.selection),
            None => self.selection.clone(),
        }
        .resolve(resolver);

        debug!(
            "[{cid}] regions: {:?}, types: {:?}, pairs: {:?}",
            resolved.regions, resolved.types, resolved.pairs
        );

        self.cid = Some(cid.to_string());
        self.sink.start_case(cid, spacing);

        let wildcard = resolver.wildcard_name();
        let mut rows = 0usize;

        for &r in resolved.regions.iter().filter(|&&r| r != 0) {
            let name = resolver.region_name(r);
            let values = masked_values(ct, resolver, Some(r), None);
            rows += self.emit(&name, &wildcard, values, spacing, &phenos);
        }
        for &t in resolved.types.iter().filter(|&&t| t != 0) {
            let name = resolver.type_name(t);
            let values = masked_values(ct, resolver, None, Some(t));
            rows += self.emit(&wildcard, &name, values, spacing, &phenos);
        }
        for &(r, t) in resolved.pairs.iter().filter(|&&p| p != (0, 0)) {
            let (rn, tn) = (resolver.region_name(r), resolver.type_name(t));
            let values = masked_values(ct, resolver, Some(r), Some(t));
            rows += self.emit(&rn, &tn, values, spacing, &phenos);
        }

        info!("[{cid}] {rows} phenotype rows appended");
        Ok(&self.sink)
    }

    /// 计算一个结构上的全部表型并写入接收端. 返回写入的行数.
    fn emit(
        &mut self,
        region: &str,
        ty: &str,
        values: Vec<f32>,
        spacing: [f64; 3],
        phenos: &[Phenotype],
    ) -> usize {
        let Some(group) = GroupStats::new(values, spacing) else {
            debug!("({region}, {ty}) is empty, skipped");
            return 0;
        };
        debug!("({region}, {ty}): {} voxels", group.count());

        let mut rows = 0;
        for &p in phenos {
            if let Some(value) = group.eval(p) {
                self.sink.add_result(region, ty, p, value);
                rows += 1;
            }
        }
        rows
    }
}

/// 取出掩码内的全部 CT 值.
fn masked_values<R: MaskResolver + ?Sized>(
    ct: ArrayView3<f32>,
    resolver: &R,
    region: Option<u8>,
    ty: Option<u8>,
) -> Vec<f32> {
    let mask = resolver.mask_for(region, ty);
    let mut values = vec![];
    Zip::from(&ct).and(&mask).for_each(|&v, &m| {
        if m {
            values.push(v);
        }
    });
    values
}
