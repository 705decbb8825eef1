//! 胸部区域/类型命名约定.
//!
//! 编码即为名称表中的下标. 超出名称表的编码统一视为未定义.

use crate::consts::code::{UNDEFINED_REGION, UNDEFINED_TYPE};

/// 某一坐标轴不加约束时使用的名称.
pub const WILDCARD_NAME: &str = "WildCard";

/// 胸部区域名称, 以区域编码为下标.
const REGION_NAMES: [&str; 45] = [
    "UndefinedRegion",
    "WholeLung",
    "RightLung",
    "LeftLung",
    "RightSuperiorLobe",
    "RightMiddleLobe",
    "RightInferiorLobe",
    "LeftSuperiorLobe",
    "LeftInferiorLobe",
    "LeftUpperThird",
    "LeftMiddleThird",
    "LeftLowerThird",
    "RightUpperThird",
    "RightMiddleThird",
    "RightLowerThird",
    "Mediastinum",
    "WholeHeart",
    "Aorta",
    "PulmonaryArtery",
    "PulmonaryVein",
    "UpperThird",
    "MiddleThird",
    "LowerThird",
    "Left",
    "Right",
    "Liver",
    "Spleen",
    "Abdomen",
    "ParaVertebral",
    "OutsideLung",
    "OutsideBody",
    "Skeleton",
    "Sternum",
    "Humeri",
    "LeftHumerus",
    "RightHumerus",
    "Scapulae",
    "LeftScapula",
    "RightScapula",
    "Hila",
    "LeftHilum",
    "RightHilum",
    "Kidneys",
    "LeftKidney",
    "RightKidney",
];

/// 胸部类型名称, 以类型编码为下标.
const TYPE_NAMES: [&str; 42] = [
    "UndefinedType",
    "NormalParenchyma",
    "Airway",
    "Vessel",
    "Emphysematous",
    "GroundGlass",
    "Reticular",
    "Nodular",
    "ObliqueFissure",
    "HorizontalFissure",
    "MildParaseptalEmphysema",
    "ModerateParaseptalEmphysema",
    "SevereParaseptalEmphysema",
    "MildBulla",
    "ModerateBulla",
    "SevereBulla",
    "MildCentrilobularEmphysema",
    "ModerateCentrilobularEmphysema",
    "SevereCentrilobularEmphysema",
    "MildPanlobularEmphysema",
    "ModeratePanlobularEmphysema",
    "SeverePanlobularEmphysema",
    "AirwayWallThickening",
    "AirwayCylindricalDilation",
    "VaricoseBronchiectasis",
    "CysticBronchiectasis",
    "CentrilobularNodule",
    "Mosaicing",
    "ExpiratoryMalacia",
    "SaberSheath",
    "OutPouching",
    "MucoidMaterial",
    "PatchyGasTrapping",
    "DiffuseGasTrapping",
    "LinearScar",
    "Cyst",
    "Atelectasis",
    "HoneyCombing",
    "Trachea",
    "MainBronchus",
    "UpperLobeBronchus",
    "AirwayGeneration3",
];

/// 胸部区域/类型命名约定. 无状态.
#[derive(Copy, Clone, Debug, Default)]
pub struct ChestConventions;

impl ChestConventions {
    /// 获取区域编码对应的名称. 未知编码返回未定义区域的名称.
    #[inline]
    pub fn region_name(&self, region: u8) -> &'static str {
        REGION_NAMES
            .get(region as usize)
            .copied()
            .unwrap_or(REGION_NAMES[UNDEFINED_REGION as usize])
    }

    /// 获取类型编码对应的名称. 未知编码返回未定义类型的名称.
    #[inline]
    pub fn type_name(&self, ty: u8) -> &'static str {
        TYPE_NAMES
            .get(ty as usize)
            .copied()
            .unwrap_or(TYPE_NAMES[UNDEFINED_TYPE as usize])
    }

    /// 通配名称.
    #[inline]
    pub fn wildcard_name(&self) -> &'static str {
        WILDCARD_NAME
    }

    /// 由区域名称反查编码 (大小写不敏感).
    pub fn region_code(&self, name: &str) -> Option<u8> {
        REGION_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|p| p as u8)
    }

    /// 由类型名称反查编码 (大小写不敏感).
    pub fn type_code(&self, name: &str) -> Option<u8> {
        TYPE_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|p| p as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let c = ChestConventions;
        assert_eq!(c.region_name(0), "UndefinedRegion");
        assert_eq!(c.region_name(3), "LeftLung");
        assert_eq!(c.type_name(4), "Emphysematous");
        assert_eq!(c.region_name(250), "UndefinedRegion");
        assert_eq!(c.type_name(250), "UndefinedType");
        assert_eq!(c.wildcard_name(), "WildCard");
    }

    #[test]
    fn test_reverse_lookup() {
        let c = ChestConventions;
        assert_eq!(c.region_code("leftlung"), Some(3));
        assert_eq!(c.type_code("Vessel"), Some(3));
        assert_eq!(c.region_code("NoSuchRegion"), None);
        for code in 0..45u8 {
            assert_eq!(c.region_code(c.region_name(code)), Some(code));
        }
    }
}
