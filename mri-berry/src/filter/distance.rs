use super::diamond_neighbours;
use crate::consts::gray::*;
use crate::Idx3d;
use ndarray::ArrayView3;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 收集前景表面体素的下标, 结果按行优先存储.
///
/// 满足以下任意条件之一的前景体素被称为表面体素:
///
/// 1. 6-邻域包含背景体素;
/// 2. 位于网格的六个表面之一 (6-邻域不完整).
pub fn boundary_pos(a: ArrayView3<'_, u8>) -> Vec<Idx3d> {
    let shape = a.dim();
    a.indexed_iter()
        .filter(|(_, p)| is_foreground(**p))
        .filter_map(|(pos, _)| {
            let mut n = 0;
            let mut touches_background = false;
            for neigh in diamond_neighbours(pos, shape) {
                n += 1;
                touches_background |= is_background(a[neigh]);
            }
            (touches_background || n < 6).then_some(pos)
        })
        .collect()
}

/// 两个体素中心之间的物理距离的平方, 单位为 (mm)^2.
#[inline]
fn distance_squared(&(a, b, c): &Idx3d, &(x, y, z): &Idx3d, spacing: &[f64; 3]) -> f64 {
    let dz = a.abs_diff(x) as f64 * spacing[0];
    let dh = b.abs_diff(y) as f64 * spacing[1];
    let dw = c.abs_diff(z) as f64 * spacing[2];
    dz * dz + dh * dh + dw * dw
}

/// 有向 Hausdorff 距离的平方: `from` 中每个点到 `to` 的最近距离的最大值.
fn directed_squared(from: &[Idx3d], to: &[Idx3d], spacing: &[f64; 3]) -> f64 {
    let nearest = |p: &Idx3d| {
        to.iter()
            .map(|q| distance_squared(p, q, spacing))
            .fold(f64::INFINITY, f64::min)
    };
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            from.par_iter().map(nearest).reduce(|| 0.0, f64::max)
        } else {
            from.iter().map(nearest).fold(0.0, f64::max)
        }
    }
}

/// 计算两个二值数组前景表面之间的对称 Hausdorff 距离, 单位为毫米.
///
/// `spacing` 为 `[z, h, w]` 体素分辨率.
///
/// # 返回值
///
/// - 两者均无前景: `0.0`;
/// - 恰好一者无前景: `f64::INFINITY`;
/// - 否则为 `max(h(A, B), h(B, A))`.
///
/// # 注意
///
/// 两个数组形状必须一致, 否则程序 panic.
pub fn hausdorff_distance(a: ArrayView3<'_, u8>, b: ArrayView3<'_, u8>, spacing: [f64; 3]) -> f64 {
    assert_eq!(a.dim(), b.dim());
    let (sa, sb) = (boundary_pos(a), boundary_pos(b));
    match (sa.is_empty(), sb.is_empty()) {
        (true, true) => 0.0,
        (true, false) | (false, true) => f64::INFINITY,
        (false, false) => directed_squared(&sa, &sb, &spacing)
            .max(directed_squared(&sb, &sa, &spacing))
            .sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::{boundary_pos, hausdorff_distance};
    use ndarray::{s, Array3};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_boundary_of_cube() {
        let mut a = Array3::<u8>::zeros((5, 5, 5));
        a.slice_mut(s![1..4, 1..4, 1..4]).fill(1);
        // 3x3x3 立方体只有中心不在表面上.
        assert_eq!(boundary_pos(a.view()).len(), 26);

        let full = Array3::<u8>::ones((3, 3, 3));
        assert_eq!(boundary_pos(full.view()).len(), 26);
    }

    #[test]
    fn test_hausdorff_identical_and_shifted() {
        let mut a = Array3::<u8>::zeros((4, 4, 8));
        a.slice_mut(s![1..3, 1..3, 1..3]).fill(1);
        assert!(f64_eq(hausdorff_distance(a.view(), a.view(), [1.0; 3]), 0.0));

        let mut b = Array3::<u8>::zeros((4, 4, 8));
        b.slice_mut(s![1..3, 1..3, 4..6]).fill(1);
        assert!(f64_eq(hausdorff_distance(a.view(), b.view(), [1.0; 3]), 3.0));
        assert!(f64_eq(hausdorff_distance(b.view(), a.view(), [1.0; 3]), 3.0));
        // 物理距离考虑体素分辨率.
        assert!(f64_eq(
            hausdorff_distance(a.view(), b.view(), [1.0, 1.0, 0.5]),
            1.5
        ));
    }

    #[test]
    fn test_hausdorff_empty() {
        let e = Array3::<u8>::zeros((2, 2, 2));
        let mut a = e.clone();
        a[(0, 0, 0)] = 1;
        assert_eq!(hausdorff_distance(e.view(), e.view(), [1.0; 3]), 0.0);
        assert_eq!(hausdorff_distance(a.view(), e.view(), [1.0; 3]), f64::INFINITY);
    }
}
