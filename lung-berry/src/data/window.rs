use ndarray::{Array, ArrayBase, ArrayViewMut, Data, Dimension};

/// CT 窗口, 包含窗位 (window level) 和窗宽 (window width).
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug)]
pub struct CtWindow {
    level: f32,
    width: f32,
}

impl CtWindow {
    /// 构建 CT 窗.
    ///
    /// `level` 和 `width` 必须在合理范围内, 否则返回 `None`.
    pub fn new(level: f32, width: f32) -> Option<CtWindow> {
        if (-1e5..=1e5).contains(&level) && 0.0 < width && width <= 1e5 {
            Some(Self { level, width })
        } else {
            None
        }
    }

    /// 由窗下限 `lower` 和窗上限 `upper` 构建 CT 窗.
    ///
    /// 要求 `lower < upper`, 且两者都在合理范围内, 否则返回 `None`.
    #[inline]
    pub fn from_bounds(lower: f32, upper: f32) -> Option<CtWindow> {
        Self::new((lower + upper) / 2.0, upper - lower)
    }

    /// 以数据本身的最小值和最大值作为窗口上下限.
    ///
    /// 数据为空, 含有非有限值或为常数时返回 `None`.
    pub fn from_data_range<S, D>(image: &ArrayBase<S, D>) -> Option<CtWindow>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        let mut it = image.iter().copied();
        let first = it.next()?;
        let (lo, hi) = it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self::from_bounds(lo, hi)
    }

    /// 构建神经网络预处理常用的 CT 窗口. 该窗口的下限为 -300, 上限为 700.
    #[inline]
    pub const fn from_network_input() -> CtWindow {
        Self {
            level: 200.0,
            width: 1000.0,
        }
    }

    /// 构建一个便于展示肺实质结构的 CT 窗口. 该窗口的窗位为
    /// -600, 窗宽为 1500.
    #[inline]
    pub const fn from_lung_visual() -> CtWindow {
        Self {
            level: -600.0,
            width: 1500.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值线性映射到 `[out_min, out_max]` 后的值.
    /// 窗外的值先被截断到窗口边界.
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_range(&self, ct: f32, out_min: f32, out_max: f32) -> Option<f32> {
        if !ct.is_finite() {
            return None;
        }
        let clipped = num::clamp(ct, self.lower_bound(), self.upper_bound());
        let ratio = (clipped - self.lower_bound()) / self.width();
        Some(ratio * (out_max - out_min) + out_min)
    }

    /// 对整幅图像 (任意维数) 做强度截断与归一化, 映射到 `[out_min, out_max]`.
    ///
    /// 无意义的 HU 值 (inf, NaN) 原样保留.
    pub fn normalize<S, D>(&self, image: &ArrayBase<S, D>, out_min: f32, out_max: f32) -> Array<f32, D>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        image.mapv(|ct| self.eval_range(ct, out_min, out_max).unwrap_or(ct))
    }

    /// 与 [`Self::normalize`] 相同, 但就地修改 `image`.
    pub fn normalize_inplace<D: Dimension>(
        &self,
        mut image: ArrayViewMut<'_, f32, D>,
        out_min: f32,
        out_max: f32,
    ) {
        image.mapv_inplace(|ct| self.eval_range(ct, out_min, out_max).unwrap_or(ct));
    }
}
