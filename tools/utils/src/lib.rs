//! 表型报告工具依赖的通用组件.

use log::LevelFilter;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 安装日志后端. 日志级别取自 `$LUNG_PHENO_LOG`, 默认为 `info`.
///
/// 重复安装时静默忽略.
pub fn init_logger() {
    let level: LevelFilter = loader::log_level_from_env();
    let _ = simple_logger::SimpleLogger::new()
        .with_level(level)
        .init();
}
