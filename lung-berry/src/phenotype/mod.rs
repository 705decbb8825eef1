//! 表型目录.
//!
//! 目录是封闭的: 共 27 个表型, 顺序即报表中的输出顺序.
//! 每个表型由一个 [`Phenotype`] 变体表示, 计算时穷尽匹配.

mod engine;
pub mod mass;
pub mod stats;

use std::fmt;
use std::str::FromStr;

use crate::consts::{hu, MM3_TO_LITER};
use crate::error::PhenoError;
use stats::HuStats;

pub use engine::ParenchymaPhenotypes;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! declare_phenotypes {
    ($($variant: ident => $name: literal),+ $(,)?) => {
        /// 可计算的表型.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serde",
            derive(Serialize, Deserialize),
            serde(try_from = "String", into = "&'static str")
        )]
        pub enum Phenotype {
            $(
                #[doc = concat!("`", $name, "`.")]
                $variant,
            )+
        }

        impl Phenotype {
            /// 按目录声明顺序排列的全部表型.
            pub const ALL: [Phenotype; declare_phenotypes!(@count $($variant)+)] =
                [$(Phenotype::$variant),+];

            /// 表型名.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Phenotype::$variant => $name,)+
                }
            }
        }
    };
    (@count $($t: ident)+) => { 0 $(+ declare_phenotypes!(@one $t))+ };
    (@one $t: ident) => { 1 };
}

declare_phenotypes! {
    Laa950 => "LAA950",
    Laa910 => "LAA910",
    Laa856 => "LAA856",
    Haa700 => "HAA700",
    Haa600 => "HAA600",
    Haa500 => "HAA500",
    Haa250 => "HAA250",
    Perc10 => "Perc10",
    Perc15 => "Perc15",
    HuMean => "HUMean",
    HuStd => "HUStd",
    HuKurtosis => "HUKurtosis",
    HuSkewness => "HUSkewness",
    HuMode => "HUMode",
    HuMedian => "HUMedian",
    HuMin => "HUMin",
    HuMax => "HUMax",
    HuMean500 => "HUMean500",
    HuStd500 => "HUStd500",
    HuKurtosis500 => "HUKurtosis500",
    HuSkewness500 => "HUSkewness500",
    HuMode500 => "HUMode500",
    HuMedian500 => "HUMedian500",
    HuMin500 => "HUMin500",
    HuMax500 => "HUMax500",
    Volume => "Volume",
    Mass => "Mass",
}

/// 按目录声明顺序获取全部表型名.
pub fn catalog_names() -> Vec<&'static str> {
    Phenotype::ALL.iter().map(Phenotype::name).collect()
}

/// 将表型名列表解析为去重且按目录顺序排列的表型.
///
/// 任一名称不在目录中时返回 `InvalidPhenotypeName`.
pub fn parse_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<Phenotype>, PhenoError> {
    let mut ans = names
        .iter()
        .map(|n| n.as_ref().parse::<Phenotype>())
        .collect::<Result<Vec<_>, _>>()?;
    ans.sort_unstable();
    ans.dedup();
    Ok(ans)
}

impl fmt::Display for Phenotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phenotype {
    type Err = PhenoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phenotype::ALL
            .iter()
            .find(|p| p.name() == s)
            .copied()
            .ok_or_else(|| PhenoError::InvalidPhenotypeName(s.to_string()))
    }
}

impl TryFrom<String> for Phenotype {
    type Error = PhenoError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Phenotype> for &'static str {
    #[inline]
    fn from(value: Phenotype) -> Self {
        value.name()
    }
}

/// 单个结构的全部中间统计量. 每个结构只构建一次, 供所有表型共享.
#[derive(Clone, Debug)]
pub struct GroupStats {
    /// 结构内全部体素.
    all: HuStats,

    /// 结构内不大于 -500 HU 的体素. 为空时为 `None`.
    restricted: Option<HuStats>,

    /// 单个体素的体积 (立方毫米).
    voxel_mm3: f64,
}

impl GroupStats {
    /// 由结构内的 HU 值和体素分辨率构建. 结构为空时返回 `None`.
    pub fn new(values: Vec<f32>, spacing: [f64; 3]) -> Option<Self> {
        let all = HuStats::new(values)?;
        let restricted = all.restrict_le(hu::RESTRICT_500);
        Some(Self {
            all,
            restricted,
            voxel_mm3: spacing.iter().product(),
        })
    }

    /// 结构体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.all.len()
    }

    /// 计算表型值. 返回 `None` 表示该表型在此结构上无定义 (不输出).
    pub fn eval(&self, pheno: Phenotype) -> Option<f64> {
        use Phenotype::*;

        let all = &self.all;
        let r = self.restricted.as_ref();
        match pheno {
            Laa950 => Some(all.fraction_le(hu::LAA_950)),
            Laa910 => Some(all.fraction_le(hu::LAA_910)),
            Laa856 => Some(all.fraction_le(hu::LAA_856)),
            Haa700 => Some(all.fraction_ge(hu::HAA_700)),
            Haa600 => Some(all.fraction_ge(hu::HAA_600)),
            Haa500 => Some(all.fraction_ge(hu::HAA_500)),
            Haa250 => Some(all.fraction_ge(hu::HAA_250)),
            Perc10 => Some(all.percentile(10.0)),
            Perc15 => Some(all.percentile(15.0)),
            HuMean => Some(all.mean()),
            HuStd => Some(all.std()),
            HuKurtosis => Some(all.kurtosis()),
            HuSkewness => Some(all.skewness()),
            HuMode => Some(all.mode()),
            HuMedian => Some(all.median()),
            HuMin => Some(all.min()),
            HuMax => Some(all.max()),
            HuMean500 => r.map(HuStats::mean),
            HuStd500 => r.map(HuStats::std),
            HuKurtosis500 => r.map(HuStats::kurtosis),
            HuSkewness500 => r.map(HuStats::skewness),
            HuMode500 => r.map(HuStats::mode),
            HuMedian500 => r.map(HuStats::median),
            HuMin500 => r.map(HuStats::min),
            HuMax500 => r.map(HuStats::max),
            Volume => Some(self.voxel_mm3 * self.count() as f64 * MM3_TO_LITER),
            Mass => Some(mass::mass_grams(all.values(), self.voxel_mm3)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_catalog_completeness() {
        let names = catalog_names();
        assert_eq!(names.len(), 27);
        assert_eq!(
            names,
            [
                "LAA950", "LAA910", "LAA856", "HAA700", "HAA600", "HAA500", "HAA250", "Perc10",
                "Perc15", "HUMean", "HUStd", "HUKurtosis", "HUSkewness", "HUMode", "HUMedian",
                "HUMin", "HUMax", "HUMean500", "HUStd500", "HUKurtosis500", "HUSkewness500",
                "HUMode500", "HUMedian500", "HUMin500", "HUMax500", "Volume", "Mass"
            ]
        );
        for name in names {
            assert_eq!(name.parse::<Phenotype>().unwrap().name(), name);
        }
    }

    #[test]
    fn test_parse_names() {
        let ps = parse_names(&["Mass", "LAA950", "Mass"]).unwrap();
        assert_eq!(ps, [Phenotype::Laa950, Phenotype::Mass]);

        let err = parse_names(&["LAA950", "LAA1000"]).unwrap_err();
        assert!(matches!(err, PhenoError::InvalidPhenotypeName(n) if n == "LAA1000"));
        assert!("laa950".parse::<Phenotype>().is_err());
    }

    #[test]
    fn test_group_fractions_in_unit_interval() {
        let values = vec![-1020.0, -960.0, -900.0, -800.0, -650.0, -300.0, 40.0];
        let g = GroupStats::new(values, [1.0, 1.0, 1.0]).unwrap();
        for p in [
            Phenotype::Laa950,
            Phenotype::Laa910,
            Phenotype::Laa856,
            Phenotype::Haa700,
            Phenotype::Haa600,
            Phenotype::Haa500,
            Phenotype::Haa250,
        ] {
            let v = g.eval(p).unwrap();
            assert!((0.0..=1.0).contains(&v), "{p}: {v}");
        }
        assert!(f64_eq(g.eval(Phenotype::Laa950).unwrap(), 2.0 / 7.0));
        assert!(f64_eq(g.eval(Phenotype::Haa250).unwrap(), 1.0 / 7.0));
    }

    #[test]
    fn test_restricted_undefined_alone() {
        let g = GroupStats::new(vec![-400.0, -100.0, 20.0], [1.0; 3]).unwrap();
        assert!(g.eval(Phenotype::HuMean500).is_none());
        assert!(g.eval(Phenotype::HuMax500).is_none());
        assert!(f64_eq(g.eval(Phenotype::HuMean).unwrap(), -160.0));
        assert!(g.eval(Phenotype::Mass).is_some());
    }

    #[test]
    fn test_volume_liters() {
        let spacing = [0.6, 0.7, 2.5];
        let g = GroupStats::new(vec![-900.0; 11], spacing).unwrap();
        let expected = 0.6 * 0.7 * 2.5 * 11.0 * 1e-6;
        assert!(f64_eq(g.eval(Phenotype::Volume).unwrap(), expected));
        assert!(GroupStats::new(vec![], spacing).is_none());
    }

    #[test]
    fn test_single_voxel_defines_every_phenotype() {
        let g = GroupStats::new(vec![-870.0], [1.0; 3]).unwrap();
        for p in Phenotype::ALL {
            assert!(g.eval(p).is_some(), "{p}");
        }
        assert!(f64_eq(g.eval(Phenotype::HuKurtosis).unwrap(), -3.0));
        assert!(f64_eq(g.eval(Phenotype::HuSkewness500).unwrap(), 0.0));
    }

    #[test]
    fn test_nan_voxel() {
        let g = GroupStats::new(vec![-800.0, f32::NAN], [1.0; 3]).unwrap();
        assert!(f64_eq(g.eval(Phenotype::Haa700).unwrap(), 0.0));
        assert!(f64_eq(g.eval(Phenotype::Laa856).unwrap(), 0.0));
        assert!(f64_eq(g.eval(Phenotype::HuMin).unwrap(), -800.0));
        let mass = g.eval(Phenotype::Mass).unwrap();
        assert!(f64_eq(mass, mass::density(-800.0) * 0.001));
    }
}
