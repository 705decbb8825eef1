//! 数值变换工具: 缩放/重采样, 标准化, 弹性形变.
//!
//! CT 强度归一化见 [`CtWindow::normalize`](crate::CtWindow::normalize).
//!
//! 这些函数都是无状态的纯函数. 非法参数 (例如输出维度为 0) 属于调用方违约,
//! 程序直接 panic.

use ndarray::{Array, Array3, ArrayBase, Data, Dimension, Ix3};

use crate::Idx3d;

mod elastic;

pub use elastic::{elastic_transform, gaussian_filter, map_coordinates};

/// 单轴线性插值的采样位置: `(下邻下标, 上邻下标, 小数部分)`.
///
/// 两端对齐: 输出的第一个/最后一个样本恰好落在输入的第一个/最后一个样本上.
fn axis_samples(n_in: usize, n_out: usize) -> Vec<(usize, usize, f64)> {
    (0..n_out)
        .map(|o| {
            let pos = if n_out == 1 {
                0.0
            } else {
                o as f64 * (n_in - 1) as f64 / (n_out - 1) as f64
            };
            let lo = (pos.floor() as usize).min(n_in - 1);
            let hi = (lo + 1).min(n_in - 1);
            (lo, hi, pos - lo as f64)
        })
        .collect()
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// 从 `in_shape` 缩放到 `out_shape` 时每个轴的缩放倍率 (`out / in`).
pub fn scale_factors(in_shape: Idx3d, out_shape: Idx3d) -> [f64; 3] {
    let (iz, ih, iw) = in_shape;
    let (oz, oh, ow) = out_shape;
    [
        oz as f64 / iz as f64,
        oh as f64 / ih as f64,
        ow as f64 / iw as f64,
    ]
}

/// 以三线性插值将 3D 图像缩放到 `out_shape`. 八个角点保持不变.
///
/// # 注意
///
/// `image` 和 `out_shape` 的每一维都必须大于 0, 否则程序 panic.
pub fn zoom<S: Data<Elem = f32>>(image: &ArrayBase<S, Ix3>, out_shape: Idx3d) -> Array3<f32> {
    let (iz, ih, iw) = image.dim();
    let (oz, oh, ow) = out_shape;
    assert!(iz > 0 && ih > 0 && iw > 0, "输入图像不能为空");
    assert!(oz > 0 && oh > 0 && ow > 0, "输出形状的每一维都必须大于 0");

    if image.dim() == out_shape {
        return image.to_owned();
    }

    let (sz, sh, sw) = (
        axis_samples(iz, oz),
        axis_samples(ih, oh),
        axis_samples(iw, ow),
    );

    Array3::from_shape_fn(out_shape, |(z, h, w)| {
        let (z0, z1, tz) = sz[z];
        let (h0, h1, th) = sh[h];
        let (w0, w1, tw) = sw[w];
        let at = |z: usize, h: usize, w: usize| image[(z, h, w)] as f64;

        let c00 = lerp(at(z0, h0, w0), at(z0, h0, w1), tw);
        let c01 = lerp(at(z0, h1, w0), at(z0, h1, w1), tw);
        let c10 = lerp(at(z1, h0, w0), at(z1, h0, w1), tw);
        let c11 = lerp(at(z1, h1, w0), at(z1, h1, w1), tw);
        let c0 = lerp(c00, c01, th);
        let c1 = lerp(c10, c11, th);
        lerp(c0, c1, tz) as f32
    })
}

/// 将 3D 图像重采样到 `out_shape`, 返回新图像以及新的体素分辨率.
///
/// 物理尺寸不变: `新分辨率 = 旧分辨率 * 旧形状 / 新形状`.
pub fn resample<S: Data<Elem = f32>>(
    image: &ArrayBase<S, Ix3>,
    spacing: [f64; 3],
    out_shape: Idx3d,
) -> (Array3<f32>, [f64; 3]) {
    let factors = scale_factors(image.dim(), out_shape);
    let out_spacing = [
        spacing[0] / factors[0],
        spacing[1] / factors[1],
        spacing[2] / factors[2],
    ];
    (zoom(image, out_shape), out_spacing)
}

/// 减去均值并除以标准差.
///
/// 1. `mean` 为 `None` 时使用图像自身均值;
/// 2. `std` 为 `None` 时使用图像自身 (总体) 标准差, 若其不大于 `1e-4` 则取 1.
///
/// 常用参数为 `mean = -600`, `std = 1`.
pub fn standardize<S, D>(image: &ArrayBase<S, D>, mean: Option<f32>, std: Option<f32>) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let mean = mean.unwrap_or_else(|| image.mean().unwrap_or(0.0));
    let std = std.unwrap_or_else(|| {
        let s = if image.is_empty() { 0.0 } else { image.std(0.0) };
        if s <= 1e-4 {
            1.0
        } else {
            s
        }
    });
    image.mapv(|v| (v - mean) / std)
}
