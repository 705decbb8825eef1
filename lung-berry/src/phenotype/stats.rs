//! HU 值分布的统计量.
//!
//! 所有统计量都基于升序排列的样本计算. 高阶矩采用与 scipy 一致的定义:
//! 峰度为 Fisher 超额峰度, 偏度为样本偏度, 两者在样本量足够时做无偏修正.

use itertools::Itertools;
use ordered_float::OrderedFloat;

/// 一组非空 HU 样本及其预先计算好的中心矩.
#[derive(Clone, Debug)]
pub struct HuStats {
    /// 升序样本.
    sorted: Vec<f32>,
    mean: f64,
    /// 二阶中心矩 (有偏, 除以 n).
    m2: f64,
    m3: f64,
    m4: f64,
}

impl HuStats {
    /// 由任意顺序的样本构建. 样本为空时返回 `None`.
    pub fn new(mut values: Vec<f32>) -> Option<Self> {
        values.sort_unstable_by_key(|v| OrderedFloat(*v));
        Self::from_sorted(values)
    }

    /// 由已经升序排列的样本构建. 样本为空时返回 `None`.
    pub fn from_sorted(sorted: Vec<f32>) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }
        debug_assert!(sorted
            .windows(2)
            .all(|w| OrderedFloat(w[0]) <= OrderedFloat(w[1])));

        let n = sorted.len() as f64;
        let mean = sorted.iter().map(|&v| v as f64).sum::<f64>() / n;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &v in sorted.iter() {
            let d = v as f64 - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        Some(Self {
            sorted,
            mean,
            m2: m2 / n,
            m3: m3 / n,
            m4: m4 / n,
        })
    }

    /// 取出不大于 `upper` 的子样本 (升序样本的前缀). 子样本为空时返回 `None`.
    pub fn restrict_le(&self, upper: f32) -> Option<Self> {
        let end = self.sorted.partition_point(|&v| v <= upper);
        Self::from_sorted(self.sorted[..end].to_vec())
    }

    /// 升序样本.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.sorted
    }

    /// 样本个数. 总是大于 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// 恒为 `false`, 空样本无法构建 `HuStats`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// 不大于 `threshold` 的样本所占比例.
    #[inline]
    pub fn fraction_le(&self, threshold: f32) -> f64 {
        let cnt = self.sorted.partition_point(|&v| v <= threshold);
        cnt as f64 / self.len() as f64
    }

    /// 不小于 `threshold` 的样本所占比例. NaN 不满足任何比较, 只计入分母.
    #[inline]
    pub fn fraction_ge(&self, threshold: f32) -> f64 {
        // NaN 排在升序样本的末尾.
        let end = self.sorted.partition_point(|v| !v.is_nan());
        let below = self.sorted[..end].partition_point(|&v| v < threshold);
        (end - below) as f64 / self.len() as f64
    }

    /// 第 `q` 百分位数 (`0 <= q <= 100`), 在相邻两个秩之间线性插值.
    pub fn percentile(&self, q: f64) -> f64 {
        assert!((0.0..=100.0).contains(&q), "百分位必须位于 [0, 100]");
        let pos = (self.len() - 1) as f64 * q / 100.0;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let (a, b) = (self.sorted[lo] as f64, self.sorted[hi] as f64);
        a + (pos - lo as f64) * (b - a)
    }

    /// 均值.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 总体标准差 (除以 n).
    #[inline]
    pub fn std(&self) -> f64 {
        self.m2.sqrt()
    }

    /// 中位数.
    #[inline]
    pub fn median(&self) -> f64 {
        self.percentile(50.0)
    }

    /// 最小值.
    #[inline]
    pub fn min(&self) -> f64 {
        self.sorted[0] as f64
    }

    /// 最大值.
    #[inline]
    pub fn max(&self) -> f64 {
        self.sorted[self.len() - 1] as f64
    }

    /// 众数. 多个值出现次数相同时, 取其中最小的那个.
    pub fn mode(&self) -> f64 {
        let mut best = (0usize, self.sorted[0]);
        for (cnt, v) in self.sorted.iter().copied().dedup_with_count() {
            // 升序遍历, 严格大于才替换, 保证取到最小的众数.
            if cnt > best.0 {
                best = (cnt, v);
            }
        }
        best.1 as f64
    }

    /// 方差是否 (在浮点意义下) 为零?
    #[inline]
    fn is_degenerate(&self) -> bool {
        self.m2 <= (f64::EPSILON * self.mean).powi(2)
    }

    /// 偏度. 样本量大于 2 时做无偏修正. 方差为零时取 0.
    pub fn skewness(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let g1 = self.m3 / self.m2.powf(1.5);
        let n = self.len() as f64;
        if self.len() > 2 {
            (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
        } else {
            g1
        }
    }

    /// Fisher 超额峰度 (正态分布为 0). 样本量大于 3 时做无偏修正.
    /// 方差为零时取 -3, 即 `m4 / m2^2` 按 0 计.
    pub fn kurtosis(&self) -> f64 {
        if self.is_degenerate() {
            return -3.0;
        }
        let g2 = self.m4 / (self.m2 * self.m2);
        let n = self.len() as f64;
        if self.len() > 3 {
            ((n * n - 1.0) * g2 - 3.0 * (n - 1.0).powi(2)) / ((n - 2.0) * (n - 3.0))
        } else {
            g2 - 3.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HuStats;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    fn stats(v: &[f32]) -> HuStats {
        HuStats::new(v.to_vec()).unwrap()
    }

    #[test]
    fn test_empty() {
        assert!(HuStats::new(vec![]).is_none());
        assert!(stats(&[-100.0, 20.0]).restrict_le(-500.0).is_none());
    }

    #[test]
    fn test_basic_moments() {
        let s = stats(&[4.0, 1.0, 3.0, 2.0]);
        assert!(f64_eq(s.mean(), 2.5));
        assert!(f64_eq(s.std(), 1.25_f64.sqrt()));
        assert!(f64_eq(s.min(), 1.0));
        assert!(f64_eq(s.max(), 4.0));
        assert!(f64_eq(s.median(), 2.5));
        assert_eq!(s.values(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_percentile_linear() {
        // numpy: np.percentile([1, 2, 3, 4, 5], q)
        let s = stats(&[5.0, 1.0, 4.0, 2.0, 3.0]);
        assert!(f64_eq(s.percentile(0.0), 1.0));
        assert!(f64_eq(s.percentile(10.0), 1.4));
        assert!(f64_eq(s.percentile(15.0), 1.6));
        assert!(f64_eq(s.percentile(100.0), 5.0));

        let single = stats(&[-870.0]);
        assert!(f64_eq(single.percentile(15.0), -870.0));
    }

    #[test]
    fn test_fractions() {
        let s = stats(&[-1000.0, -950.0, -900.0, -500.0, 0.0]);
        assert!(f64_eq(s.fraction_le(-950.0), 0.4));
        assert!(f64_eq(s.fraction_ge(-500.0), 0.4));
        assert!(f64_eq(s.fraction_ge(-2000.0), 1.0));
        assert!(f64_eq(s.fraction_le(-2000.0), 0.0));
    }

    #[test]
    fn test_mode_smallest_on_tie() {
        let s = stats(&[3.0, 1.0, 3.0, 1.0, 2.0]);
        assert!(f64_eq(s.mode(), 1.0));
        let s = stats(&[7.0, 5.0, 7.0]);
        assert!(f64_eq(s.mode(), 7.0));
        let s = stats(&[9.0, 8.0, 6.0]);
        assert!(f64_eq(s.mode(), 6.0));
    }

    #[test]
    fn test_skewness_kurtosis() {
        // m2 = 12.5, m3 = 45, m4 = 348.5.
        let s = stats(&[1.0, 2.0, 3.0, 10.0]);
        let g1 = 45.0 / 12.5_f64.powf(1.5);
        assert!(f64_eq(s.skewness(), 12.0_f64.sqrt() / 2.0 * g1));
        assert!((s.skewness() - 1.763_632_6).abs() < 1e-6);
        assert!(f64_eq(s.kurtosis(), 3.228));

        let sym = stats(&[1.0, 2.0, 3.0]);
        assert!(f64_eq(sym.skewness(), 0.0));
        // n <= 3, 不做修正: 1.5 - 3.
        assert!(f64_eq(sym.kurtosis(), -1.5));
    }

    #[test]
    fn test_degenerate_moments() {
        let s = stats(&[-1000.0; 8]);
        assert!(f64_eq(s.skewness(), 0.0));
        assert!(f64_eq(s.kurtosis(), -3.0));
        assert!(f64_eq(s.std(), 0.0));

        let single = stats(&[-870.0]);
        assert!(f64_eq(single.skewness(), 0.0));
        assert!(f64_eq(single.kurtosis(), -3.0));

        let five = stats(&[-650.0; 5]);
        assert!(f64_eq(five.skewness(), 0.0));
        assert!(f64_eq(five.kurtosis(), -3.0));
    }

    #[test]
    fn test_fractions_ignore_nan() {
        let s = stats(&[-800.0, f32::NAN]);
        assert!(f64_eq(s.fraction_ge(-700.0), 0.0));
        assert!(f64_eq(s.fraction_ge(-900.0), 0.5));
        assert!(f64_eq(s.fraction_le(-700.0), 0.5));
        assert!(f64_eq(s.fraction_le(-900.0), 0.0));

        let s = stats(&[f32::NAN, 100.0, -300.0, f32::NAN]);
        assert!(f64_eq(s.fraction_ge(-250.0), 0.25));
        assert!(f64_eq(s.fraction_ge(-500.0), 0.5));
    }

    #[test]
    fn test_restrict() {
        let s = stats(&[-900.0, -400.0, -600.0, 10.0, -500.0]);
        let r = s.restrict_le(-500.0).unwrap();
        assert_eq!(r.values(), [-900.0, -600.0, -500.0]);
        assert!(f64_eq(r.max(), -500.0));
    }
}
