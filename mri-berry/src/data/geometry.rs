//! 体数据的几何信息: 形状, 体素分辨率, 原点.

use crate::{Idx3d, SegError, SegResult};
use nifti::NiftiHeader;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 原点比较时允许的误差, 以毫米为单位.
const ORIGIN_EPS: f64 = 1e-6;

/// 3D 网格的几何信息.
///
/// 所有分量均按照 `(z, h, w)` 顺序组织. 该结构是只读的,
/// 构造时保证形状非空、分辨率为正有限值.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    shape: Idx3d,
    spacing: [f64; 3],
    origin: [f64; 3],
}

impl Geometry {
    /// 构建几何信息.
    ///
    /// 任一维度为 0, 或任一分辨率非正/非有限时返回 [`SegError::InvalidInput`].
    pub fn new(shape: Idx3d, spacing: [f64; 3], origin: [f64; 3]) -> SegResult<Self> {
        let (z, h, w) = shape;
        if z == 0 || h == 0 || w == 0 {
            return Err(SegError::invalid(format!("empty grid {z}x{h}x{w}")));
        }
        if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(SegError::invalid(format!("bad spacing {spacing:?}")));
        }
        if !origin.iter().all(|o| o.is_finite()) {
            return Err(SegError::invalid(format!("bad origin {origin:?}")));
        }
        Ok(Self {
            shape,
            spacing,
            origin,
        })
    }

    /// 以 1mm 各向同性分辨率和零原点构建几何信息.
    #[inline]
    pub fn unit(shape: Idx3d) -> SegResult<Self> {
        Self::new(shape, [1.0; 3], [0.0; 3])
    }

    /// 从 nifti header 中读取几何信息.
    ///
    /// nifti 按照 \[W, H, z\] 存储, 这里转换成 `(z, H, W)`.
    pub(crate) fn from_header(h: &NiftiHeader) -> SegResult<Self> {
        let [_, w, hh, z, ..] = h.dim;
        let [_, pw, ph, pz, ..] = h.pixdim;
        let origin = if h.qform_code > 0 {
            [h.quatern_z as f64, h.quatern_y as f64, h.quatern_x as f64]
        } else if h.sform_code > 0 {
            [h.srow_z[3] as f64, h.srow_y[3] as f64, h.srow_x[3] as f64]
        } else {
            [0.0; 3]
        };
        // 部分文件 pixdim 为负 (方向信息编码在 qfac 中), 取绝对值.
        let spacing = [pz, ph, pw].map(|p| (p as f64).abs());
        Self::new((z as usize, hh as usize, w as usize), spacing, origin)
    }

    /// 将形状和体素分辨率写入 `header` 的 dim / pixdim 字段.
    /// 方向与原点 (qform / sform) 不受影响.
    pub(crate) fn write_dims(&self, header: &mut NiftiHeader) {
        let (z, h, w) = self.shape;
        let [sz, sh, sw] = self.spacing;
        header.dim[..4].copy_from_slice(&[3, w as u16, h as u16, z as u16]);
        header.pixdim[1..4].copy_from_slice(&[sw as f32, sh as f32, sz as f32]);
    }

    /// 为没有原始 header 的网格构造 qform: 无旋转, 偏移为原点. sform 被关闭.
    pub(crate) fn write_qform(&self, header: &mut NiftiHeader) {
        let [oz, oh, ow] = self.origin;
        header.qform_code = 1;
        header.sform_code = 0;
        header.pixdim[0] = 1.0;
        (header.quatern_b, header.quatern_c, header.quatern_d) = (0.0, 0.0, 0.0);
        (header.quatern_x, header.quatern_y, header.quatern_z) =
            (ow as f32, oh as f32, oz as f32);
    }

    /// 形状 `(z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.shape
    }

    /// 体素分辨率 `[z, h, w]`, 以毫米为单位.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// 原点 `[z, h, w]`, 以毫米为单位.
    #[inline]
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// 体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (z, h, w) = self.shape;
        z * h * w
    }

    /// 单个体素的实际体积, 以立方毫米为单位.
    #[inline]
    pub fn voxel(&self) -> f64 {
        self.spacing.iter().product()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, &(z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape;
        z0 < z && h0 < h && w0 < w
    }

    /// 两个几何信息是否兼容: 形状和分辨率相同, 原点在误差范围内一致.
    pub fn is_compatible(&self, other: &Geometry) -> bool {
        self.shape == other.shape
            && self.spacing == other.spacing
            && self
                .origin
                .iter()
                .zip(other.origin.iter())
                .all(|(a, b)| (a - b).abs() <= ORIGIN_EPS)
    }

    /// 同 [`Self::is_compatible`], 但不兼容时返回 [`SegError::GeometryMismatch`].
    #[inline]
    pub fn ensure_compatible(&self, other: &Geometry) -> SegResult<()> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(SegError::GeometryMismatch {
                left: *self,
                right: *other,
            })
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (z, h, w) = self.shape;
        let [sz, sh, sw] = self.spacing;
        write!(f, "{z}x{h}x{w} @ ({sz:.3}, {sh:.3}, {sw:.3})mm")
    }
}
