//! 切片预览图的持久化存储.

use super::{GeometryAttr, IntensityWindow, Mask, Volume};
use crate::{SegError, SegResult};
use ndarray::ArrayView2;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式将水平切片保存为图片的 3D 对象.
///
/// 对于 [`Mask`], 背景映射为黑色, 任意前景映射为白色;
/// 对于 [`Volume`], 按照其强度范围线性映射到 8-bit 灰度.
pub trait ImgWriteVis {
    /// 将第 `z_index` 层水平切片按照可视化规则保存到 `path` 路径.
    ///
    /// `z_index` 越界时返回 [`SegError::InvalidInput`].
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> SegResult<()>;
}

/// 把二维切片逐像素映射为灰度并写入 `path`.
fn write_gray<T: Copy, F: Fn(T) -> u8, P: AsRef<Path>>(
    sli: ArrayView2<'_, T>,
    pixel: F,
    path: P,
) -> SegResult<()> {
    let (height, width) = sli.dim();
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for ((h, w), &v) in sli.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, image::Luma([pixel(v)]));
    }
    buf.save(path)?;
    Ok(())
}

/// 检查水平切片索引.
#[inline]
fn check_z<G: GeometryAttr>(g: &G, z_index: usize) -> SegResult<()> {
    if z_index >= g.len_z() {
        return Err(SegError::invalid(format!(
            "slice {z_index} out of range 0..{}",
            g.len_z()
        )));
    }
    Ok(())
}

/// 背景为黑色, 前景为白色.
impl ImgWriteVis for Mask {
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> SegResult<()> {
        use crate::consts::gray::*;

        check_z(self, z_index)?;
        write_gray(
            self.slice_at(z_index),
            |p| if is_foreground(p) { WHITE } else { BLACK },
            path,
        )
    }
}

/// 窗口取整个扫描的 `[min, max]`.
impl ImgWriteVis for Volume {
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> SegResult<()> {
        check_z(self, z_index)?;
        let (lo, hi) = self.min_max().unwrap_or((0.0, 0.0));
        let window = IntensityWindow::new(lo, hi).unwrap_or(IntensityWindow::from_normalized());
        write_gray(self.slice_at(z_index), |v| window.eval_u8(v), path)
    }
}
