//! 运行时错误.

use crate::Idx3d;

/// 表型计算的运行时错误.
///
/// 所有错误都在向结果表追加任何一行之前被检测出来.
/// 支撑集为空导致的 "未定义表型" 不是错误, 只是不输出对应行.
#[derive(Debug, thiserror::Error)]
pub enum PhenoError {
    /// 区域/类型编码不在 `[0, 255]` 内.
    #[error("非法选择器编码 {0}, 编码必须位于 [0, 255]")]
    InvalidSelector(i64),

    /// CT 扫描和标签图形状不一致.
    #[error("CT 扫描形状 {ct:?} 与标签图形状 {label:?} 不一致")]
    DimensionMismatch {
        /// CT 扫描形状.
        ct: Idx3d,
        /// 标签图形状.
        label: Idx3d,
    },

    /// 表型名不在目录中.
    #[error("未知表型名 `{0}`")]
    InvalidPhenotypeName(String),

    /// 体素分辨率必须为三个有限正数.
    #[error("非法体素分辨率 {0:?}")]
    InvalidSpacing([f64; 3]),

    /// 病例编号为空.
    #[error("病例编号 (case id) 不能为空")]
    EmptyCaseId,

    /// 读取 nifti 文件失败.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 表型计算结果.
pub type PhenoResult<T> = Result<T, PhenoError>;
