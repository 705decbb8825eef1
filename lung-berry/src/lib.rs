#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 根据肺部 CT 扫描与胸部标签图计算肺实质定量表型
//! (parenchyma phenotypes), 并汇总为结果表.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 标签图遵循 CIP 编码: 每个 16 位体素值的低 8 位为胸部区域, 高 8 位为胸部类型.
//! 2. 体数据一律使用 `(z, H, W)` 轴序. nii 文件中的 `[W, H, z]` 在加载时被转换.
//! 3. 计算引擎从不修改输入的体数据.
//! 4. 对于调用方违约的数值工具参数 (例如输出维度为 0), 程序会直接 panic.
//!
//! # 功能
//!
//! ### 表型目录与计算引擎 ✅
//!
//! 共 27 个表型: 密度阈值比例 (LAA/HAA), 百分位数, HU 分布的矩统计量
//! (包括仅针对 `HU <= -500` 的子集), 体积, 以及分段线性密度模型下的质量.
//!
//! 实现位于 `lung-berry/src/phenotype`.
//!
//! ### 区域/类型选择与掩码提取 ✅
//!
//! 按区域, 类型, 或 (区域, 类型) 对选取结构. 三类选择器逐类独立,
//! 调用时参数优先于构造时默认值; 全部未指定时使用标签图中出现的全部结构.
//!
//! 实现位于 `lung-berry/src/region_type`.
//!
//! ### 结果表 ✅
//!
//! 只追加的结果表, 以及 CSV 导出. 计算引擎通过 `PhenoSink` 输出结果,
//! 可替换为其它后端.
//!
//! 实现位于 `lung-berry/src/report.rs`.
//!
//! ### 多病例批处理 ✅
//!
//! 顺序或 (`rayon` feature) 并行地处理多个病例, 结果按输入顺序合并.
//!
//! 实现位于 `lung-berry/src/batch.rs`.
//!
//! ### 数值变换 ✅
//!
//! 三线性缩放/重采样, 标准化, CT 窗口归一化, 二维弹性形变.
//!
//! 实现位于 `lung-berry/src/transform` 与 `lung-berry/src/data/window.rs`.
//!
//! ### 数据加载 ✅
//!
//! nii 格式的 CT 扫描与标签图, 以及按病例编号迭代的数据集加载器.
//!
//! 实现位于 `lung-berry/src/data` 与 `lung-berry/src/dataset`.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D CT nii 文件基础数据结构.
mod data;

pub use data::{CtData3d, CtWindow, LabelMap, LungCt, NiftiHeaderAttr};

pub mod batch;
pub mod consts;
pub mod dataset;
pub mod error;
pub mod phenotype;
pub mod prelude;
pub mod region_type;
pub mod report;
pub mod transform;

pub use error::{PhenoError, PhenoResult};
pub use phenotype::{catalog_names, ParenchymaPhenotypes, Phenotype};
pub use report::{PhenoSink, ResultsTable};
