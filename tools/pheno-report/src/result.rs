//! 运行结果.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use lung_berry::batch::BatchReport;

/// 将 `report` 的摘要写进 `w` 中.
pub fn describe_into<W: Write>(report: &BatchReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    let rows = report.table.rows();
    let mut cases: Vec<&str> = rows.iter().map(|r| r.cid.as_str()).collect();
    cases.dedup();

    let meta = report.table.metadata();
    writeln!(w, "Report `{} {}`:", meta.generator, meta.version)?;
    writeln!(w, "{S4}Run at: {}", meta.timestamp)?;
    writeln!(w, "{S4}Cases with results: {}", cases.len())?;
    writeln!(w, "{S4}Phenotype rows: {}", rows.len())?;
    write!(w, "{S4}Failed cases: {}", report.failures.len())?;
    for (cid, e) in report.failures.iter() {
        write!(w, "\n{S4}{S4}{cid}: {e}")?;
    }
    Ok(())
}

/// 打印摘要, 并将结果表以 CSV 格式写入 `out`.
pub fn save(report: &BatchReport, out: &Path) -> io::Result<()> {
    let mut buf = Vec::with_capacity(512);
    describe_into(report, &mut buf)?;
    utils::sep();
    println!("{}", String::from_utf8_lossy(&buf));
    utils::sep();

    let file = BufWriter::new(File::create(out)?);
    report.table.write_csv(file)?;
    println!("Saved to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lung_berry::{PhenoError, PhenoSink, Phenotype, ResultsTable};

    #[test]
    fn test_describe_into() {
        let mut table = ResultsTable::new();
        table.start_case("c1", [1.0; 3]);
        table.add_result("WholeLung", "WildCard", Phenotype::Volume, 1e-3);
        table.add_result("WholeLung", "WildCard", Phenotype::Mass, 0.5);
        let report = BatchReport {
            table,
            failures: vec![("c2".to_string(), PhenoError::EmptyCaseId)],
        };

        let mut buf = Vec::new();
        describe_into(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Report `ParenchymaPhenotypes "));
        assert!(text.contains("Cases with results: 1"));
        assert!(text.contains("Phenotype rows: 2"));
        assert!(text.contains("Failed cases: 1"));
        assert!(text.contains("c2: "));
    }
}
