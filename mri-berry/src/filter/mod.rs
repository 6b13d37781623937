//! 体素级基础算法.
//!
//! 该模块中的所有函数都是 `(数组, 参数) -> 新数组 | 标量` 形式的纯函数,
//! 不持有任何状态, 也不会修改输入. 上层的分割流水线只依赖这些函数的契约,
//! 不依赖其内部算法.
//!
//! 所有三维数组均按照 `(z, h, w)` 组织.

use crate::Idx3d;
use itertools::iproduct;

mod diffusion;
mod distance;
mod grow;
mod label;
mod morphology;
mod stats;

pub use diffusion::{gradient_anisotropic_diffusion, DiffusionParams};
pub use distance::{boundary_pos, hausdorff_distance};
pub use grow::connected_threshold;
pub use label::{label_components, Labeling};
pub use morphology::{
    binary_closing, binary_dilate, binary_erode, binary_opening, voting_hole_filling,
};
pub use stats::{percentile, percentiles};

/// 有符号的三维偏移量.
pub type Offset3d = (isize, isize, isize);

/// 钻石型 (6-邻域) 偏移量.
pub(crate) const DIAMOND: [Offset3d; 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// 计算 `pos + d`. 结果越界 (包括负数) 时返回 `None`.
#[inline]
pub(crate) fn shift((z, h, w): Idx3d, (dz, dh, dw): Offset3d, shape: Idx3d) -> Option<Idx3d> {
    let z = z.checked_add_signed(dz)?;
    let h = h.checked_add_signed(dh)?;
    let w = w.checked_add_signed(dw)?;
    (z < shape.0 && h < shape.1 && w < shape.2).then_some((z, h, w))
}

/// 获取 `pos` 前后上下左右六个点的坐标.
///
/// 在数据范围外的坐标会被过滤掉, 不会包含在返回值中.
#[inline]
pub(crate) fn diamond_neighbours(pos: Idx3d, shape: Idx3d) -> impl Iterator<Item = Idx3d> {
    DIAMOND.into_iter().filter_map(move |d| shift(pos, d, shape))
}

/// 半径为 `radius` (体素) 的球形结构元素偏移量, 包括原点.
///
/// 偏移 `d` 满足 `|d|^2 <= radius^2 + radius` 时属于结构元素
/// (离散球在半径较小时更饱满). 半径为 0 时只包含原点.
pub fn ball_offsets(radius: usize) -> Vec<Offset3d> {
    let r = radius as isize;
    let limit = r * r + r;
    iproduct!(-r..=r, -r..=r, -r..=r)
        .filter(|&(a, b, c)| a * a + b * b + c * c <= limit)
        .collect()
}

/// 边长为 `2 * radius + 1` 的立方体邻域偏移量, **不** 包括原点.
pub fn cube_offsets(radius: usize) -> Vec<Offset3d> {
    let r = radius as isize;
    iproduct!(-r..=r, -r..=r, -r..=r)
        .filter(|&d| d != (0, 0, 0))
        .collect()
}
