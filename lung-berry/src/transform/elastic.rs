//! 二维弹性形变.
//!
//! 随机位移场经高斯平滑后乘以 `alpha`, 再以双线性插值在位移后的坐标上重采样.
//! 参考: Simard et al., "Best practices for convolutional neural networks
//! applied to visual document analysis", ICDAR 2003.

use ndarray::{Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// 高斯核截断半径 (以 sigma 为单位).
const TRUNCATE: f64 = 4.0;

/// 归一化的一维高斯核, 长度为 `2 * radius + 1`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / (sigma * sigma)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// 沿 `axis` 做一维相关, 越界处取 `cval`.
fn correlate1d(input: ArrayView2<f64>, weights: &[f64], axis: Axis, cval: f64) -> Array2<f64> {
    let radius = (weights.len() / 2) as isize;
    let n = input.len_of(axis) as isize;
    Array2::from_shape_fn(input.dim(), |(i, j)| {
        let center = (if axis == Axis(0) { i } else { j }) as isize;
        weights
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let p = center + k as isize - radius;
                let v = if p < 0 || p >= n {
                    cval
                } else if axis == Axis(0) {
                    input[(p as usize, j)]
                } else {
                    input[(i, p as usize)]
                };
                w * v
            })
            .sum()
    })
}

/// 可分离的二维高斯滤波. 边界外的值视为常数 `cval`.
///
/// `sigma <= 0` 时原样返回.
pub fn gaussian_filter<S: Data<Elem = f64>>(
    input: &ArrayBase<S, Ix2>,
    sigma: f64,
    cval: f64,
) -> Array2<f64> {
    if sigma <= 0.0 {
        return input.to_owned();
    }
    let kernel = gaussian_kernel(sigma);
    let rows = correlate1d(input.view(), &kernel, Axis(0), cval);
    correlate1d(rows.view(), &kernel, Axis(1), cval)
}

/// 在浮点坐标 `(rows[p], cols[p])` 处双线性采样 `image`, 输出与坐标数组同形.
///
/// 坐标超出 `[0, n - 1]` 时取 `cval`.
pub fn map_coordinates(
    image: ArrayView2<f32>,
    rows: ArrayView2<f64>,
    cols: ArrayView2<f64>,
    cval: f32,
) -> Array2<f32> {
    assert_eq!(rows.dim(), cols.dim(), "行坐标与列坐标必须同形");
    let (h, w) = image.dim();
    let (hmax, wmax) = (h as f64 - 1.0, w as f64 - 1.0);

    Array2::from_shape_fn(rows.dim(), |p| {
        let (y, x) = (rows[p], cols[p]);
        if !(0.0..=hmax).contains(&y) || !(0.0..=wmax).contains(&x) {
            return cval;
        }
        let (y0, x0) = (y.floor() as usize, x.floor() as usize);
        let (y1, x1) = ((y0 + 1).min(h - 1), (x0 + 1).min(w - 1));
        let (ty, tx) = (y - y0 as f64, x - x0 as f64);
        let at = |i: usize, j: usize| image[(i, j)] as f64;

        let top = at(y0, x0) + (at(y0, x1) - at(y0, x0)) * tx;
        let bottom = at(y1, x0) + (at(y1, x1) - at(y1, x0)) * tx;
        (top + (bottom - top) * ty) as f32
    })
}

/// 对二维图像做随机弹性形变.
///
/// 1. 两个方向的位移场分别在 `[-1, 1)` 内均匀采样;
/// 2. 以 `sigma` 做高斯平滑 (边界外取 `cval`), 再乘以 `alpha`;
/// 3. 在位移后的坐标上双线性重采样, 越界处取 0.
///
/// `alpha == 0` 时输出与输入相同.
pub fn elastic_transform<S, R>(
    image: &ArrayBase<S, Ix2>,
    alpha: f64,
    sigma: f64,
    cval: f64,
    rng: &mut R,
) -> Array2<f32>
where
    S: Data<Elem = f32>,
    R: Rng + ?Sized,
{
    let shape = image.dim();
    let mut displacement = || {
        let field = Array2::random_using(shape, Uniform::new(-1.0, 1.0), &mut *rng);
        gaussian_filter(&field, sigma, cval) * alpha
    };
    let dy = displacement();
    let dx = displacement();

    let rows = Array2::from_shape_fn(shape, |(i, j)| i as f64 + dy[(i, j)]);
    let cols = Array2::from_shape_fn(shape, |(i, j)| j as f64 + dx[(i, j)]);
    map_coordinates(image.view(), rows.view(), cols.view(), 0.0)
}
