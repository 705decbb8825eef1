//! 通用常量.

/// 标签图编码.
///
/// 标签图体素值为 16 位无符号整数, 低 8 位代表胸部区域 (chest region),
/// 高 8 位代表胸部类型 (chest type).
pub mod code {
    /// 未定义区域. 迭代选择器时总是被跳过.
    pub const UNDEFINED_REGION: u8 = 0;

    /// 未定义类型. 迭代选择器时总是被跳过.
    pub const UNDEFINED_TYPE: u8 = 0;

    /// 合法编码的最大值 (包含).
    pub const MAX_CODE: i64 = 255;

    /// 从标签值中取出区域编码.
    #[inline]
    pub const fn region_of(value: u16) -> u8 {
        (value & 0x00ff) as u8
    }

    /// 从标签值中取出类型编码.
    #[inline]
    pub const fn type_of(value: u16) -> u8 {
        (value >> 8) as u8
    }

    /// 由区域编码和类型编码组合出标签值.
    #[inline]
    pub const fn compose(region: u8, ty: u8) -> u16 {
        ((ty as u16) << 8) | region as u16
    }

    /// 编码是否为合法的 `[0, 255]` 整数?
    #[inline]
    pub const fn is_valid(code: i64) -> bool {
        0 <= code && code <= MAX_CODE
    }
}

/// CT HU 阈值.
pub mod hu {
    /// 低衰减区 (LAA950) 上限.
    pub const LAA_950: f32 = -950.0;

    /// 低衰减区 (LAA910) 上限.
    pub const LAA_910: f32 = -910.0;

    /// 低衰减区 (LAA856) 上限.
    pub const LAA_856: f32 = -856.0;

    /// 高衰减区 (HAA700) 下限.
    pub const HAA_700: f32 = -700.0;

    /// 高衰减区 (HAA600) 下限.
    pub const HAA_600: f32 = -600.0;

    /// 高衰减区 (HAA500) 下限.
    pub const HAA_500: f32 = -500.0;

    /// 高衰减区 (HAA250) 下限.
    pub const HAA_250: f32 = -250.0;

    /// `*500` 系列表型只统计不大于该值的体素.
    pub const RESTRICT_500: f32 = -500.0;

    /// 空气的 HU 值. 质量模型第一段会将更低的值截断到这里.
    pub const AIR: f32 = -1000.0;
}

/// 组织密度 (质量) 模型分段点与系数.
///
/// 参考: Schneider et al., "Correlation between CT numbers and tissue
/// parameters needed for Monte Carlo simulations of clinical dose distributions".
pub mod density {
    /// 第一段与第二段的分界 (第一段为开区间).
    pub const LUNG_UPPER: f32 = -98.0;

    /// 第二段与第三段的分界 (第二段为闭区间).
    pub const SOFT_UPPER: f32 = 18.0;

    /// 第三段与第四段的分界 (第三段为左开右闭区间).
    pub const DENSE_UPPER: f32 = 100.0;

    /// 空气密度 (g/cm^3), 对应 -1000 HU.
    pub const AIR_DENSITY: f64 = 1.21e-3;

    /// 肺组织密度 (g/cm^3), 对应 -98 HU.
    pub const LUNG_DENSITY: f64 = 0.93;

    /// 立方毫米到立方厘米.
    pub const MM3_TO_CM3: f64 = 0.001;
}

/// 立方毫米到升.
pub const MM3_TO_LITER: f64 = 1e-6;

/// 报表中 "生成器" 一列的值.
pub const GENERATOR: &str = "ParenchymaPhenotypes";
