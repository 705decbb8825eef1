//! 胸部区域/类型选择与掩码提取.
//!
//! 标签图的每个体素同时编码了区域 (低 8 位) 与类型 (高 8 位).
//! 一个结构可以只按区域, 只按类型, 或按 (区域, 类型) 对选取.

mod conventions;

use std::collections::BTreeSet;

use ndarray::{Array3, ArrayView3};

use crate::consts::code;
use crate::error::{PhenoError, PhenoResult};
use crate::Idx3d;

pub use conventions::{ChestConventions, WILDCARD_NAME};

/// 区域/类型编码对.
pub type RegionTypePair = (u8, u8);

/// 结构掩码解析器. 给定标签图, 枚举其中出现的结构并提取布尔掩码.
///
/// 名称相关方法默认使用 [`ChestConventions`].
pub trait MaskResolver {
    /// 标签图形状 (z, H, W). 提取的掩码与之同形.
    fn shape(&self) -> Idx3d;

    /// 标签图中出现过的所有区域编码, 升序.
    fn all_region_codes(&self) -> BTreeSet<u8>;

    /// 标签图中出现过的所有类型编码, 升序.
    fn all_type_codes(&self) -> BTreeSet<u8>;

    /// 标签图中出现过的所有 (区域, 类型) 对, 升序.
    fn all_pairs(&self) -> BTreeSet<RegionTypePair>;

    /// 提取结构掩码.
    ///
    /// 1. 仅给定 `region` 时, 选取区域编码匹配的所有体素 (类型任意);
    /// 2. 仅给定 `ty` 时, 选取类型编码匹配的所有体素 (区域任意);
    /// 3. 两者都给定时, 选取区域与类型同时匹配的体素;
    /// 4. 两者都未给定时, 选取所有非零标签体素.
    fn mask_for(&self, region: Option<u8>, ty: Option<u8>) -> Array3<bool>;

    /// 区域编码对应的名称.
    #[inline]
    fn region_name(&self, region: u8) -> String {
        ChestConventions.region_name(region).to_string()
    }

    /// 类型编码对应的名称.
    #[inline]
    fn type_name(&self, ty: u8) -> String {
        ChestConventions.type_name(ty).to_string()
    }

    /// 某一坐标轴不加约束时使用的名称.
    #[inline]
    fn wildcard_name(&self) -> String {
        ChestConventions.wildcard_name().to_string()
    }
}

/// 基于标签图视图的默认掩码解析器. 不拷贝底层数据.
#[derive(Clone, Debug)]
pub struct RegionTypeParser<'a> {
    label: ArrayView3<'a, u16>,
}

impl<'a> RegionTypeParser<'a> {
    /// 初始化.
    #[inline]
    pub fn new(label: ArrayView3<'a, u16>) -> Self {
        Self { label }
    }

    /// 标签图中出现的所有不同标签值, 升序.
    fn distinct_values(&self) -> BTreeSet<u16> {
        self.label.iter().copied().collect()
    }
}

impl MaskResolver for RegionTypeParser<'_> {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.label.dim()
    }

    fn all_region_codes(&self) -> BTreeSet<u8> {
        self.distinct_values()
            .into_iter()
            .map(code::region_of)
            .collect()
    }

    fn all_type_codes(&self) -> BTreeSet<u8> {
        self.distinct_values().into_iter().map(code::type_of).collect()
    }

    fn all_pairs(&self) -> BTreeSet<RegionTypePair> {
        self.distinct_values()
            .into_iter()
            .map(|v| (code::region_of(v), code::type_of(v)))
            .collect()
    }

    fn mask_for(&self, region: Option<u8>, ty: Option<u8>) -> Array3<bool> {
        match (region, ty) {
            (Some(r), Some(t)) => {
                let label = code::compose(r, t);
                self.label.mapv(|v| v == label)
            }
            (Some(r), None) => self.label.mapv(|v| code::region_of(v) == r),
            (None, Some(t)) => self.label.mapv(|v| code::type_of(v) == t),
            (None, None) => self.label.mapv(|v| v != 0),
        }
    }
}

/// 将一组原始编码校验为 `[0, 255]` 内的 `u8`.
fn check_codes<I: IntoIterator<Item = i64>>(codes: I) -> PhenoResult<Vec<u8>> {
    codes
        .into_iter()
        .map(|c| {
            if code::is_valid(c) {
                Ok(c as u8)
            } else {
                Err(PhenoError::InvalidSelector(c))
            }
        })
        .collect()
}

/// 结构选择器. 三类选择器 (区域, 类型, 区域-类型对) 各自可选.
///
/// `None` 表示 "未指定", 而 `Some(vec![])` 表示 "指定为空集".
/// 所有编码在构建时即被校验.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    regions: Option<Vec<u8>>,
    types: Option<Vec<u8>>,
    pairs: Option<Vec<RegionTypePair>>,
}

impl Selection {
    /// 三类选择器均未指定.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定区域编码. 任一编码不在 `[0, 255]` 内时返回 `InvalidSelector`.
    pub fn with_regions<I: IntoIterator<Item = i64>>(mut self, regions: I) -> PhenoResult<Self> {
        self.regions = Some(check_codes(regions)?);
        Ok(self)
    }

    /// 指定类型编码. 任一编码不在 `[0, 255]` 内时返回 `InvalidSelector`.
    pub fn with_types<I: IntoIterator<Item = i64>>(mut self, types: I) -> PhenoResult<Self> {
        self.types = Some(check_codes(types)?);
        Ok(self)
    }

    /// 指定 (区域, 类型) 对. 任一编码不在 `[0, 255]` 内时返回 `InvalidSelector`.
    pub fn with_pairs<I: IntoIterator<Item = (i64, i64)>>(mut self, pairs: I) -> PhenoResult<Self> {
        let (rs, ts): (Vec<i64>, Vec<i64>) = pairs.into_iter().unzip();
        let rs = check_codes(rs)?;
        let ts = check_codes(ts)?;
        self.pairs = Some(rs.into_iter().zip(ts).collect());
        Ok(self)
    }

    /// 区域选择器.
    #[inline]
    pub fn regions(&self) -> Option<&[u8]> {
        self.regions.as_deref()
    }

    /// 类型选择器.
    #[inline]
    pub fn types(&self) -> Option<&[u8]> {
        self.types.as_deref()
    }

    /// 区域-类型对选择器.
    #[inline]
    pub fn pairs(&self) -> Option<&[RegionTypePair]> {
        self.pairs.as_deref()
    }

    /// 三类选择器是否都未指定?
    #[inline]
    pub fn is_unspecified(&self) -> bool {
        self.regions.is_none() && self.types.is_none() && self.pairs.is_none()
    }

    /// 逐类合并: 对每一类选择器, `self` 已指定则取 `self`, 否则取 `fallback`.
    pub fn or(&self, fallback: &Selection) -> Selection {
        Selection {
            regions: self.regions.clone().or_else(|| fallback.regions.clone()),
            types: self.types.clone().or_else(|| fallback.types.clone()),
            pairs: self.pairs.clone().or_else(|| fallback.pairs.clone()),
        }
    }

    /// 得到实际需要处理的结构.
    ///
    /// 处理策略 (逐类独立):
    ///
    /// 1. 三类都未指定时, 使用 `resolver` 在标签图中找到的全部区域, 类型和对;
    /// 2. 否则, 已指定的类按原顺序使用, 未指定的类不处理.
    ///
    /// 返回值中保留了编码 0, 由调用方按规则跳过.
    pub fn resolve<R: MaskResolver + ?Sized>(&self, resolver: &R) -> Resolved {
        if self.is_unspecified() {
            return Resolved {
                regions: resolver.all_region_codes().into_iter().collect(),
                types: resolver.all_type_codes().into_iter().collect(),
                pairs: resolver.all_pairs().into_iter().collect(),
            };
        }
        Resolved {
            regions: self.regions.clone().unwrap_or_default(),
            types: self.types.clone().unwrap_or_default(),
            pairs: self.pairs.clone().unwrap_or_default(),
        }
    }
}

/// 选择器解析结果: 实际需要处理的区域, 类型和对.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolved {
    /// 区域编码, 按处理顺序.
    pub regions: Vec<u8>,

    /// 类型编码, 按处理顺序.
    pub types: Vec<u8>,

    /// (区域, 类型) 对, 按处理顺序.
    pub pairs: Vec<RegionTypePair>,
}
