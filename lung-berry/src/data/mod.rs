use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::code;
use crate::error::{PhenoError, PhenoResult};
use crate::Idx3d;

pub mod window;

pub use window::CtWindow;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 将 header 中的 (W, H, z) 转换成 (z, H, W).
#[inline]
fn shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 根据 (z, H, W) 分辨率伪造一个最小 header.
fn fake_header(shape: Idx3d, [z, h, w]: [f32; 3]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    let (dz, dh, dw) = shape;
    header.dim = [3, dw as u16, dh as u16, dz as u16, 1, 1, 1, 1];
    header.pixdim = [1.0, w, h, z, 0.0, 0.0, 0.0, 0.0];
    header.intent_name[..4].copy_from_slice(b"fake");
    header
}

/// 3D 体数据 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小, 按 (z, H, W) 排列.
    fn shape(&self) -> Idx3d;

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 判断该结构是否是由数组直接拼接 (而非从文件读取) 的.
    #[inline]
    fn is_faked(&self) -> bool {
        self.header().intent_name.starts_with(b"fake")
    }
}

/// nii 格式 3D 肺部 CT 扫描, 包括 header 和 CT 扫描 (HU). HU 值以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct LungCt {
    header: BoxedHeader,
    data: Array3<f32>,
}

impl NiftiHeaderAttr for LungCt {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for LungCt {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl LungCt {
    /// 打开 nii 文件格式的 3D CT 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [W, H, z] -> [z, H, W].
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = obj
            .into_volume()
            .into_ndarray::<f32>()?
            .permuted_axes([2, 1, 0].as_slice());

        // The nature of nifti data field layout.
        debug_assert!(data.is_standard_layout());

        // 该操作不会生成 `Err`, 可直接 unwrap.
        let data =
            Array3::<f32>::from_shape_vec(shape_from_header(&header), data.into_raw_vec())
                .unwrap();

        Ok(Self { header, data })
    }

    /// 根据 (z, H, W) 排列的 HU 数据和分辨率直接创建 `LungCt` 实体.
    pub fn from_array(data: Array3<f32>, pix_dim: [f32; 3]) -> Self {
        let header = fake_header(data.dim(), pix_dim);
        Self { header, data }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }
}

/// nii 格式 3D 胸部标签图. 标签值以 `u16` 保存,
/// 低 8 位为区域编码, 高 8 位为类型编码.
#[derive(Debug, Clone)]
pub struct LabelMap {
    header: BoxedHeader,
    data: Array3<u16>,
}

impl NiftiHeaderAttr for LabelMap {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for LabelMap {
    type Output = u16;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl LabelMap {
    /// 打开 nii 文件格式的 3D 标签图. `path` 为 nii 文件的本地路径. 如果打开成功,
    /// 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [W, H, z] -> [z, H, W]
        let data = obj
            .into_volume()
            .into_ndarray::<u16>()?
            .permuted_axes([2, 1, 0].as_slice());
        debug_assert!(data.is_standard_layout());

        // 同上, 可直接 unwrap.
        let data =
            Array3::<u16>::from_shape_vec(shape_from_header(&header), data.into_raw_vec())
                .unwrap();

        Ok(Self { header, data })
    }

    /// 根据 (z, H, W) 排列的标签数据和分辨率直接创建 `LabelMap` 实体.
    pub fn from_array(data: Array3<u16>, pix_dim: [f32; 3]) -> Self {
        let header = fake_header(data.dim(), pix_dim);
        Self { header, data }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u16, Ix3> {
        self.data.view()
    }

    /// 获取区域编码为 `region`, 类型编码为 `ty` 的体素个数.
    #[inline]
    pub fn count(&self, region: u8, ty: u8) -> usize {
        let label = code::compose(region, ty);
        self.data.iter().filter(|p| **p == label).count()
    }
}

/// nii 格式的 3D 肺部 CT 扫描与对应的标签图.
///
/// 该结构完全透明, 仅包含两个公开的 `scan` 和 `label` 子结构,
/// 用户可以直接使用它们来实现相关上层功能.
#[derive(Debug, Clone)]
pub struct CtData3d {
    /// 3D CT 扫描.
    pub scan: LungCt,

    /// 3D 标签图.
    pub label: LabelMap,
}

impl CtData3d {
    /// 分别打开 nii 文件格式的 3D CT 扫描和对应标签图.
    ///
    /// 任一文件打开失败, 或两者形状不一致时返回 `Err`.
    pub fn open(scan_path: impl AsRef<Path>, label_path: impl AsRef<Path>) -> PhenoResult<Self> {
        let scan = LungCt::open(scan_path.as_ref())?;
        let label = LabelMap::open(label_path.as_ref())?;
        Self::new(scan, label)
    }

    /// 组合扫描与标签图. 形状不一致时返回 `Err`.
    pub fn new(scan: LungCt, label: LabelMap) -> PhenoResult<Self> {
        if scan.shape() != label.shape() {
            return Err(PhenoError::DimensionMismatch {
                ct: scan.shape(),
                label: label.shape(),
            });
        }
        Ok(Self { scan, label })
    }

    /// CT 扫描的体素分辨率 (z, H, W), 以毫米为单位.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.scan.pix_dim()
    }

    /// 获取能按行优先序迭代 3D (扫描, 标签) 体素的迭代器.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&f32, &u16)> {
        self.scan.data.iter().zip(self.label.data.iter())
    }
}
