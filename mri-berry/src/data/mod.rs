use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::gray::*;
use crate::{Idx3d, SegError, SegResult};

mod geometry;
mod iter;
mod save;
mod window;

pub use geometry::Geometry;
pub use iter::PosIter3d;
pub use save::ImgWriteVis;
pub use window::IntensityWindow;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 3D 网格的共用几何属性和部分通用操作.
pub trait GeometryAttr {
    /// 获取几何信息.
    fn geometry(&self) -> &Geometry;

    /// 获取数据形状大小 `(z, h, w)`.
    #[inline]
    fn shape(&self) -> Idx3d {
        self.geometry().shape()
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        self.geometry().size()
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, pos: &Idx3d) -> bool {
        self.geometry().check(pos)
    }

    /// 获取单个体素分辨率 `[z, h, w]`, 以毫米为单位.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        self.geometry().spacing()
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.geometry().voxel()
    }

    /// 检查 `self` 和 `other` 的几何信息是否兼容,
    /// 不兼容时返回 [`SegError::GeometryMismatch`].
    #[inline]
    fn ensure_same_geometry<G: GeometryAttr + ?Sized>(&self, other: &G) -> SegResult<()> {
        self.geometry().ensure_compatible(other.geometry())
    }
}

/// 检查数组形状与几何信息是否一致.
fn check_shape<T>(data: &Array3<T>, geometry: &Geometry) -> SegResult<()> {
    if data.dim() != geometry.shape() {
        return Err(SegError::invalid(format!(
            "data shape {:?} does not match geometry {geometry}",
            data.dim()
        )));
    }
    Ok(())
}

/// 打开 nii 文件, 返回 header 和按 `(z, H, W)` 组织的数据.
macro_rules! read_nifti {
    ($path: expr, $elem: ty) => {{
        let obj = ReaderOptions::new().read_file($path)?;
        let header = Box::new(obj.header().clone());
        let geometry = Geometry::from_header(&header)?;

        let mut data = obj.into_volume().into_ndarray::<$elem>()?;
        // 去掉末尾长度为 1 的维度, 例如单帧的 4D 导出.
        while data.ndim() > 3 && data.shape()[data.ndim() - 1] == 1 {
            let last = Axis(data.ndim() - 1);
            data = data.index_axis_move(last, 0);
        }
        if data.ndim() != 3 {
            return Err(SegError::invalid(format!(
                "expected a 3D volume, found {} dimensions",
                data.ndim()
            )));
        }
        // [W, H, z] -> [z, H, W].
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = data.permuted_axes([2, 1, 0].as_slice());

        // The nature of nifti data field layout.
        debug_assert!(data.is_standard_layout());

        let data = Array3::<$elem>::from_shape_vec(geometry.shape(), data.into_raw_vec())
            .map_err(|e| SegError::invalid(format!("nifti data layout: {e}")))?;
        (header, geometry, data)
    }};
}

/// 以 `header` (若有) 为模板, 写入几何信息和按 `(z, H, W)` 组织的数据.
/// 原 header 的方向信息原样保留; 没有 header 时由几何信息构造.
macro_rules! write_nifti {
    ($obj: expr, $path: expr) => {{
        let mut header = match $obj.header.as_deref() {
            Some(h) => h.clone(),
            None => {
                let mut h = NiftiHeader::default();
                $obj.geometry.write_qform(&mut h);
                h
            }
        };
        $obj.geometry.write_dims(&mut header);
        // 数据已经是缩放后的实际值.
        (header.scl_slope, header.scl_inter) = (1.0, 0.0);

        // [z, H, W] -> [W, H, z].
        let data = $obj.data.view().permuted_axes([2, 1, 0]);
        WriterOptions::new($path)
            .reference_header(&header)
            .write_nifti(&data)?;
    }};
}

/// nii 格式 3D MRI 扫描, 包括几何信息和强度值. 强度值以 `f32` 保存.
///
/// 该结构是只读的. 每个处理阶段都会返回新的 `Volume`.
#[derive(Debug, Clone)]
pub struct Volume {
    geometry: Geometry,
    header: Option<BoxedHeader>,
    data: Array3<f32>,
}

impl GeometryAttr for Volume {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

impl Index<Idx3d> for Volume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl Volume {
    /// 以 `(z, h, w)` 组织的数据和体素分辨率 `spacing` 直接创建扫描, 原点为零.
    ///
    /// 如果 `data` 不含任何体素, 返回 [`SegError::InvalidInput`].
    #[inline]
    pub fn new(data: Array3<f32>, spacing: [f64; 3]) -> SegResult<Self> {
        let geometry = Geometry::new(data.dim(), spacing, [0.0; 3])?;
        Self::with_geometry(data, geometry)
    }

    /// 以给定几何信息创建扫描. 数据形状必须与 `geometry` 一致.
    pub fn with_geometry(data: Array3<f32>, geometry: Geometry) -> SegResult<Self> {
        check_shape(&data, &geometry)?;
        Ok(Self {
            geometry,
            header: None,
            data: data.as_standard_layout().into_owned(),
        })
    }

    /// 打开 nii 文件格式的 3D MRI 扫描. `path` 为 nii 文件的本地路径.
    pub fn open<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let (header, geometry, data) = read_nifti!(path.as_ref(), f32);
        Ok(Self {
            geometry,
            header: Some(header),
            data,
        })
    }

    /// 将扫描保存为 nii 文件 (`f32` 数据). 路径以 `.gz` 结尾时自动压缩.
    /// 常用于导出归一化或平滑后的中间结果.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SegResult<()> {
        write_nifti!(self, path.as_ref());
        Ok(())
    }

    /// 以相同几何信息包装新的强度数据. 仅供处理阶段内部使用.
    #[inline]
    pub(crate) fn derive(&self, data: Array3<f32>) -> Self {
        debug_assert_eq!(data.dim(), self.shape());
        Self {
            geometry: self.geometry,
            header: self.header.clone(),
            data,
        }
    }

    /// 以相同几何信息包装标签数据, 得到派生的 [`Mask`].
    #[inline]
    pub(crate) fn derive_mask(&self, data: Array3<u8>) -> Mask {
        debug_assert_eq!(data.dim(), self.shape());
        Mask {
            geometry: self.geometry,
            header: self.header.clone(),
            data,
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 获取 3D 扫描 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获取 (最小值, 最大值). 非有限值被忽略; 若全部非有限则返回 `None`.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// 获取原始 nifti header (若由文件加载).
    #[inline]
    pub fn header(&self) -> Option<&NiftiHeader> {
        self.header.as_deref()
    }
}

/// nii 格式 3D 标签, 包括几何信息和标签值. 标签值以 `u8` 保存.
///
/// 二值标签只包含 [`MASK_BACKGROUND`] 和 [`MASK_FOREGROUND`];
/// 标记图可能包含其它较小的正整数.
#[derive(Debug, Clone)]
pub struct Mask {
    geometry: Geometry,
    header: Option<BoxedHeader>,
    data: Array3<u8>,
}

impl GeometryAttr for Mask {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

impl Index<Idx3d> for Mask {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl PartialEq for Mask {
    /// 几何信息兼容且体素逐一相等. header 不参与比较.
    fn eq(&self, other: &Self) -> bool {
        self.geometry.is_compatible(&other.geometry) && self.data == other.data
    }
}

impl Mask {
    /// 以 `(z, h, w)` 组织的数据和体素分辨率 `spacing` 直接创建标签, 原点为零.
    ///
    /// 如果 `data` 不含任何体素, 返回 [`SegError::InvalidInput`].
    #[inline]
    pub fn new(data: Array3<u8>, spacing: [f64; 3]) -> SegResult<Self> {
        let geometry = Geometry::new(data.dim(), spacing, [0.0; 3])?;
        Self::with_geometry(data, geometry)
    }

    /// 以给定几何信息创建标签. 数据形状必须与 `geometry` 一致.
    pub fn with_geometry(data: Array3<u8>, geometry: Geometry) -> SegResult<Self> {
        check_shape(&data, &geometry)?;
        Ok(Self {
            geometry,
            header: None,
            data: data.as_standard_layout().into_owned(),
        })
    }

    /// 创建全背景标签.
    #[inline]
    pub fn zeros(geometry: Geometry) -> Self {
        Self {
            geometry,
            header: None,
            data: Array3::zeros(geometry.shape()),
        }
    }

    /// 打开 nii 文件格式的 3D 标签. `path` 为 nii 文件的本地路径.
    pub fn open<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let (header, geometry, data) = read_nifti!(path.as_ref(), u8);
        Ok(Self {
            geometry,
            header: Some(header),
            data,
        })
    }

    /// 将标签保存为 nii 文件. 路径以 `.gz` 结尾时自动压缩.
    ///
    /// 若标签由文件派生, 则沿用原 header (方向等信息不丢失), 否则由几何信息构造 header.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SegResult<()> {
        write_nifti!(self, path.as_ref());
        Ok(())
    }

    /// 以相同几何信息包装新的标签数据. 仅供处理阶段内部使用.
    #[inline]
    pub(crate) fn derive(&self, data: Array3<u8>) -> Self {
        debug_assert_eq!(data.dim(), self.shape());
        Self {
            geometry: self.geometry,
            header: self.header.clone(),
            data,
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 直接获得内部数据的所有权.
    #[inline]
    pub fn into_raw(self) -> Array3<u8> {
        self.data
    }

    /// 获取 nifti header (若由文件加载或派生).
    #[inline]
    pub fn header(&self) -> Option<&NiftiHeader> {
        self.header.as_deref()
    }

    /// 获取 3D 标签 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获取 3D 标签中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取前景 (任意非零标签) 体素个数.
    #[inline]
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|p| is_foreground(**p)).count()
    }

    /// 该标签是否为全背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 收集所有前景体素对应的下标, 结果按行优先存储.
    pub fn foreground_pos(&self) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, pixel)| is_foreground(*pixel).then_some(pos))
            .collect()
    }

    /// 将任意非零标签映射为 [`MASK_FOREGROUND`], 得到二值标签.
    pub fn binarized(&self) -> Self {
        self.derive(self.data.mapv(|p| {
            if is_foreground(p) {
                MASK_FOREGROUND
            } else {
                MASK_BACKGROUND
            }
        }))
    }

    /// 前景的实际体积, 以立方毫米为单位.
    #[inline]
    pub fn volume_mm3(&self) -> f64 {
        self.count_foreground() as f64 * self.voxel()
    }
}
