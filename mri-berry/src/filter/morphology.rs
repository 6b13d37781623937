//! 3D 二值形态学操作.
//!
//! 输入中任何非零体素都被视为前景; 输出只包含
//! [`MASK_BACKGROUND`] 和 [`MASK_FOREGROUND`].

use super::{ball_offsets, cube_offsets, shift, Offset3d};
use crate::consts::gray::*;
use crate::Idx3d;
use ndarray::{s, Array3, ArrayView3, Zip};

#[inline]
const fn to_mask(b: bool) -> u8 {
    if b {
        MASK_FOREGROUND
    } else {
        MASK_BACKGROUND
    }
}

/// 对每个输出体素并行 (若开启 `rayon`) 地求值.
fn map_indexed<F>(shape: Idx3d, f: F) -> Array3<u8>
where
    F: Fn(Idx3d) -> u8 + Sync + Send,
{
    let mut out = Array3::<u8>::zeros(shape);
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::indexed(&mut out).par_for_each(|pos, o| *o = f(pos));
        } else {
            Zip::indexed(&mut out).for_each(|pos, o| *o = f(pos));
        }
    }
    out
}

/// `pos` 处的结构元素内是否存在前景. 越界部分视为背景.
#[inline]
fn any_foreground(a: &ArrayView3<'_, u8>, pos: Idx3d, se: &[Offset3d]) -> bool {
    se.iter()
        .filter_map(|&d| shift(pos, d, a.dim()))
        .any(|q| is_foreground(a[q]))
}

/// `pos` 处的结构元素内是否全为前景. 越界部分视为前景.
#[inline]
fn all_foreground(a: &ArrayView3<'_, u8>, pos: Idx3d, se: &[Offset3d]) -> bool {
    se.iter()
        .filter_map(|&d| shift(pos, d, a.dim()))
        .all(|q| is_foreground(a[q]))
}

/// 以半径为 `radius` 的球形结构元素进行二值膨胀. 网格外视为背景.
pub fn binary_dilate(a: ArrayView3<'_, u8>, radius: usize) -> Array3<u8> {
    let se = ball_offsets(radius);
    map_indexed(a.dim(), |pos| to_mask(any_foreground(&a, pos, &se)))
}

/// 以半径为 `radius` 的球形结构元素进行二值腐蚀. 网格外视为前景.
pub fn binary_erode(a: ArrayView3<'_, u8>, radius: usize) -> Array3<u8> {
    let se = ball_offsets(radius);
    map_indexed(a.dim(), |pos| {
        to_mask(is_foreground(a[pos]) && all_foreground(&a, pos, &se))
    })
}

/// 二值开运算: 先腐蚀后膨胀. 用于去除细小突起和孤立噪点.
#[inline]
pub fn binary_opening(a: ArrayView3<'_, u8>, radius: usize) -> Array3<u8> {
    binary_dilate(binary_erode(a, radius).view(), radius)
}

/// 二值闭运算: 先膨胀后腐蚀. 用于弥合细小缝隙.
///
/// 运算前在六个表面各补 `radius` 层背景, 运算后裁剪回原形状,
/// 因此贴着网格边界的前景不会因为膨胀被截断而在腐蚀中丢失.
pub fn binary_closing(a: ArrayView3<'_, u8>, radius: usize) -> Array3<u8> {
    let (z, h, w) = a.dim();
    let r = radius;
    let mut padded = Array3::<u8>::zeros((z + 2 * r, h + 2 * r, w + 2 * r));
    padded.slice_mut(s![r..r + z, r..r + h, r..r + w]).assign(&a);

    let closed = binary_erode(binary_dilate(padded.view(), r).view(), r);
    closed.slice(s![r..r + z, r..r + h, r..r + w]).to_owned()
}

/// 迭代投票式空洞填充.
///
/// 对每个背景体素, 统计其 `(2 * radius + 1)^3` 立方体邻域 (不含自身, 越界部分不计)
/// 中的前景个数. 若不少于 `(n - 1) / 2 + 1` (`n` 为邻域总大小), 则将其改为前景.
/// 前景体素从不改变. 重复至没有变化或达到 `max_iterations` 次.
pub fn voting_hole_filling(a: ArrayView3<'_, u8>, radius: usize, max_iterations: u32) -> Array3<u8> {
    let neighbourhood = cube_offsets(radius);
    let birth = neighbourhood.len() / 2 + 1;

    let mut cur = a.mapv(|p| to_mask(is_foreground(p)));
    for _ in 0..max_iterations {
        let view = cur.view();
        let next = map_indexed(view.dim(), |pos| {
            if is_foreground(view[pos]) {
                return MASK_FOREGROUND;
            }
            let votes = neighbourhood
                .iter()
                .filter_map(|&d| shift(pos, d, view.dim()))
                .filter(|&q| is_foreground(view[q]))
                .count();
            to_mask(votes >= birth)
        });
        if next == cur {
            break;
        }
        cur = next;
    }
    cur
}
