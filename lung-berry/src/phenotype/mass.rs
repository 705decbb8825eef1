//! 分段线性的 HU → 组织密度模型, 以及由此得到的结构质量 (克).

use crate::consts::density::*;
use crate::consts::hu::AIR;

/// 第一段 (肺组织) 的斜率和截距, 经过 (-1000 HU, 空气密度) 和 (-98 HU, 肺组织密度).
#[inline]
fn lung_line() -> (f64, f64) {
    let m = (AIR_DENSITY - LUNG_DENSITY) / (AIR as f64 - LUNG_UPPER as f64);
    let b = AIR_DENSITY - AIR as f64 * m;
    (m, b)
}

/// 第一段: `HU < -98`. HU 在此之前被截断到不小于 -1000.
#[inline]
pub fn lung_density(hu: f32) -> f64 {
    let (m, b) = lung_line();
    m * hu.max(AIR) as f64 + b
}

/// 第二段: `-98 <= HU <= 18`.
#[inline]
pub fn soft_density(hu: f32) -> f64 {
    1.018 + 0.893 * hu as f64 / 1000.0
}

/// 第三段: `18 < HU <= 100`.
#[inline]
pub fn dense_density(hu: f32) -> f64 {
    1.003 + 1.169 * hu as f64 / 1000.0
}

/// 第四段: `HU > 100`.
#[inline]
pub fn bone_density(hu: f32) -> f64 {
    1.017 + 0.592 * hu as f64 / 1000.0
}

/// 单个体素的组织密度 (g/cm^3).
pub fn density(hu: f32) -> f64 {
    if hu < LUNG_UPPER {
        lung_density(hu)
    } else if hu <= SOFT_UPPER {
        soft_density(hu)
    } else if hu <= DENSE_UPPER {
        dense_density(hu)
    } else {
        bone_density(hu)
    }
}

/// 计算一组体素的总质量 (克). `voxel_mm3` 为单个体素体积 (立方毫米).
///
/// NaN 体素不属于任何区间, 不计入质量.
pub fn mass_grams(values: &[f32], voxel_mm3: f64) -> f64 {
    let cm3 = voxel_mm3 * MM3_TO_CM3;
    values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|&hu| density(hu) * cm3)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lung_line_anchors() {
        assert!(f64_eq(lung_density(-1000.0), 1.21e-3));
        assert!(f64_eq(lung_density(-98.0), 0.93));
        // -1000 以下被截断.
        assert!(f64_eq(lung_density(-3024.0), 1.21e-3));
    }

    /// 记录各分界点两侧公式的实际取值. 该模型在分界点并不严格连续.
    #[test]
    fn test_boundary_values() {
        // -98: 0.93 vs 0.930486
        assert!(f64_eq(soft_density(-98.0), 1.018 - 0.893 * 0.098));
        assert!((lung_density(-98.0) - soft_density(-98.0)).abs() < 1e-3);

        // 18: 1.034074 vs 1.024042
        assert!(f64_eq(soft_density(18.0), 1.034074));
        assert!(f64_eq(dense_density(18.0), 1.024042));
        assert!((soft_density(18.0) - dense_density(18.0)).abs() < 0.011);

        // 100: 1.1199 vs 1.0762
        assert!(f64_eq(dense_density(100.0), 1.1199));
        assert!(f64_eq(bone_density(100.0), 1.0762));
        assert!((dense_density(100.0) - bone_density(100.0)).abs() < 0.044);

        // 分界点本身归属于闭合一侧.
        assert!(f64_eq(density(-98.0), soft_density(-98.0)));
        assert!(f64_eq(density(18.0), soft_density(18.0)));
        assert!(f64_eq(density(100.0), dense_density(100.0)));
        assert!(f64_eq(density(100.5), bone_density(100.5)));
    }

    #[test]
    fn test_mass_sum() {
        assert!(f64_eq(mass_grams(&[], 1.0), 0.0));

        let voxel = 0.5 * 0.5 * 2.0;
        let values = [-1000.0, -500.0, 0.0, 50.0, 400.0];
        let expected: f64 = values.iter().map(|&v| density(v) * voxel * 0.001).sum();
        assert!(f64_eq(mass_grams(&values, voxel), expected));

        // 8 个 -1000 HU 的 1 mm^3 体素: 8 * 1.21e-3 * 0.001 克.
        assert!(f64_eq(mass_grams(&[-1000.0; 8], 1.0), 8.0 * 1.21e-6));
    }

    #[test]
    fn test_mass_skips_nan() {
        let m = mass_grams(&[-800.0, f32::NAN, 50.0], 2.0);
        assert!(m.is_finite());
        assert!(f64_eq(m, (density(-800.0) + density(50.0)) * 2.0 * 0.001));
        assert!(f64_eq(mass_grams(&[f32::NAN], 1.0), 0.0));
    }
}
