//! 表型结果表.
//!
//! 结果表只追加, 不修改也不删除. 每一行对应一个病例的一个结构上的一个表型.

use std::io::{self, Write};

use chrono::Local;

use crate::consts::GENERATOR;
use crate::phenotype::Phenotype;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 表型计算结果的接收端.
///
/// 计算引擎只通过该 trait 输出结果, 因此可以替换为其它后端
/// (例如直接写入数据库或网络流).
pub trait PhenoSink {
    /// 开始处理一个新病例. 在该病例的第一条结果之前调用.
    fn start_case(&mut self, cid: &str, spacing: [f64; 3]);

    /// 追加一条结果.
    fn add_result(&mut self, region: &str, ty: &str, phenotype: Phenotype, value: f64);
}

/// 一行结果.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultRow {
    /// 病例编号.
    pub cid: String,

    /// 区域名称. 不约束区域时为通配名.
    pub region: String,

    /// 类型名称. 不约束类型时为通配名.
    pub ty: String,

    /// 表型.
    pub phenotype: Phenotype,

    /// 表型值.
    pub value: f64,

    /// 体素分辨率 (z, H, W), 毫米.
    pub spacing: [f64; 3],
}

/// 一次运行的元数据. 每张结果表只记录一次.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunMetadata {
    /// 生成器名称.
    pub generator: String,
    /// 本 crate 版本.
    pub version: String,
    /// 操作系统.
    pub os: String,
    /// CPU 架构.
    pub arch: String,
    /// 运行时间戳 (本地时间).
    pub timestamp: String,
}

impl RunMetadata {
    /// 以当前时间创建.
    pub fn now() -> Self {
        Self {
            generator: GENERATOR.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// CSV 表头.
pub const CSV_HEADER: &str = "CID,Region,Type,Phenotype,Value,SpacingZ,SpacingH,SpacingW,\
    Generator,Version,OS,Arch,RunTimeStamp";

/// 默认的结果接收端: 内存中的有序结果表.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultsTable {
    meta: RunMetadata,
    rows: Vec<ResultRow>,

    /// 当前病例. 由 `start_case` 设置.
    current: Option<(String, [f64; 3])>,
}

impl Default for ResultsTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsTable {
    /// 创建空表, 并记录运行元数据.
    pub fn new() -> Self {
        Self::with_metadata(RunMetadata::now())
    }

    /// 以给定元数据创建空表.
    pub fn with_metadata(meta: RunMetadata) -> Self {
        Self {
            meta,
            rows: vec![],
            current: None,
        }
    }

    /// 运行元数据.
    #[inline]
    pub fn metadata(&self) -> &RunMetadata {
        &self.meta
    }

    /// 全部结果, 按追加顺序.
    #[inline]
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// 结果行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否没有任何结果?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 将 `other` 的全部行按顺序追加到末尾. `other` 的元数据被丢弃.
    pub fn append(&mut self, other: ResultsTable) {
        self.rows.extend(other.rows);
    }

    /// 查找某个结构上某个表型的值 (第一个匹配行).
    pub fn find(&self, region: &str, ty: &str, phenotype: Phenotype) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.region == region && r.ty == ty && r.phenotype == phenotype)
            .map(|r| r.value)
    }

    /// 以 CSV 格式写出, 包含表头. 每行附带运行元数据.
    pub fn write_csv<W: Write>(&self, w: W) -> io::Result<()> {
        let m = &self.meta;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(w);
        wtr.write_record(CSV_HEADER.split(','))?;
        for r in self.rows.iter() {
            let [z, h, wd] = r.spacing;
            wtr.serialize((
                r.cid.as_str(),
                r.region.as_str(),
                r.ty.as_str(),
                r.phenotype.name(),
                r.value,
                z,
                h,
                wd,
                m.generator.as_str(),
                m.version.as_str(),
                m.os.as_str(),
                m.arch.as_str(),
                m.timestamp.as_str(),
            ))?;
        }
        wtr.flush()
    }
}

impl PhenoSink for ResultsTable {
    fn start_case(&mut self, cid: &str, spacing: [f64; 3]) {
        self.current = Some((cid.to_string(), spacing));
    }

    fn add_result(&mut self, region: &str, ty: &str, phenotype: Phenotype, value: f64) {
        let (cid, spacing) = self
            .current
            .clone()
            .unwrap_or_else(|| (String::new(), [f64::NAN; 3]));
        self.rows.push(ResultRow {
            cid,
            region: region.to_string(),
            ty: ty.to_string(),
            phenotype,
            value,
            spacing,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_meta() -> RunMetadata {
        RunMetadata {
            generator: GENERATOR.to_string(),
            version: "0.0.0".to_string(),
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            timestamp: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_append_rows_in_order() {
        let mut t = ResultsTable::with_metadata(fixed_meta());
        assert!(t.is_empty());
        t.start_case("case-01", [1.0, 0.5, 0.5]);
        t.add_result("WholeLung", "WildCard", Phenotype::Laa950, 0.25);
        t.add_result("WholeLung", "WildCard", Phenotype::HuMean, -870.5);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[0].cid, "case-01");
        assert_eq!(t.rows()[1].phenotype, Phenotype::HuMean);
        assert_eq!(t.rows()[1].spacing, [1.0, 0.5, 0.5]);
        assert_eq!(
            t.find("WholeLung", "WildCard", Phenotype::HuMean),
            Some(-870.5)
        );
        assert_eq!(t.find("LeftLung", "WildCard", Phenotype::HuMean), None);

        let mut other = ResultsTable::with_metadata(fixed_meta());
        other.start_case("case-02", [1.0; 3]);
        other.add_result("WildCard", "Vessel", Phenotype::Volume, 0.1);
        t.append(other);
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows()[2].cid, "case-02");
    }

    #[test]
    fn test_write_csv() {
        let mut t = ResultsTable::with_metadata(fixed_meta());
        t.start_case("a,b", [2.5, 0.5, 0.5]);
        t.add_result("LeftLung", "WildCard", Phenotype::Perc15, -912.5);

        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "CID,Region,Type,Phenotype,Value,SpacingZ,SpacingH,SpacingW,\
             Generator,Version,OS,Arch,RunTimeStamp"
        );
        assert_eq!(
            lines[1],
            "\"a,b\",LeftLung,WildCard,Perc15,-912.5,2.5,0.5,0.5,\
             ParenchymaPhenotypes,0.0.0,linux,x86_64,2024-01-01 00:00:00"
        );
    }

    #[test]
    fn test_write_csv_quotes_fields() {
        let mut t = ResultsTable::with_metadata(fixed_meta());
        t.start_case("say \"hi\"", [1.0, 0.5, 0.5]);
        t.add_result("Left\nLung", "WildCard", Phenotype::HuMean, -0.25);

        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"say \"\"hi\"\"\",\"Left\nLung\",WildCard,HUMean,-0.25,"));

        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let header = rdr.headers().unwrap().clone();
        assert_eq!(header.len(), 13);
        let rec = rdr.records().next().unwrap().unwrap();
        assert_eq!(&rec[0], "say \"hi\"");
        assert_eq!(&rec[1], "Left\nLung");
        assert_eq!(&rec[3], "HUMean");
    }

    #[test]
    fn test_metadata_now() {
        let m = RunMetadata::now();
        assert_eq!(m.generator, "ParenchymaPhenotypes");
        assert_eq!(m.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(m.os, std::env::consts::OS);
        assert_eq!(m.timestamp.len(), "2024-01-01 00:00:00".len());
    }
}
