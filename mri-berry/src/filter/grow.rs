use super::diamond_neighbours;
use crate::consts::gray::*;
use crate::Idx3d;
use ndarray::{Array3, ArrayView3};
use std::collections::VecDeque;

/// 连通阈值区域生长.
///
/// 从 `seeds` 中的每个种子出发, 按照 6-邻域 BFS, 将强度落在闭区间
/// `[lower, upper]` 内且可经由此类体素链到达的体素标记为
/// [`MASK_FOREGROUND`]. 强度不在区间内的种子本身不产生任何区域.
///
/// # 注意
///
/// 调用者负责保证 `seeds` 不越界, 否则程序 panic.
/// 空种子集得到全背景结果.
pub fn connected_threshold<I>(data: ArrayView3<'_, f32>, seeds: I, lower: f32, upper: f32) -> Array3<u8>
where
    I: IntoIterator<Item = Idx3d>,
{
    let shape = data.dim();
    let inside = |pos: Idx3d| (lower..=upper).contains(&data[pos]);

    let mut out = Array3::<u8>::zeros(shape);
    let mut q = VecDeque::with_capacity(64);

    for seed in seeds {
        if out[seed] == MASK_FOREGROUND || !inside(seed) {
            continue;
        }
        out[seed] = MASK_FOREGROUND;
        q.push_back(seed);

        while let Some(cur) = q.pop_front() {
            for neigh in diamond_neighbours(cur, shape) {
                if out[neigh] == MASK_BACKGROUND && inside(neigh) {
                    out[neigh] = MASK_FOREGROUND;
                    q.push_back(neigh);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::connected_threshold;
    use ndarray::Array3;

    /// 两个被低强度间隔分开的高强度块.
    fn two_blobs() -> Array3<f32> {
        let mut a = Array3::<f32>::zeros((3, 5, 9));
        for h in 1..4 {
            for w in 1..4 {
                a[(1, h, w)] = 490.0;
            }
            for w in 5..8 {
                a[(1, h, w)] = 495.0;
            }
        }
        a
    }

    #[test]
    fn test_grow_from_single_seed() {
        let a = two_blobs();
        let out = connected_threshold(a.view(), [(1, 2, 2)], 480.0, 500.0);
        assert_eq!(out.iter().filter(|p| **p == 1).count(), 9);
        assert_eq!(out[(1, 2, 6)], 0);
    }

    #[test]
    fn test_grow_from_many_seeds() {
        let a = two_blobs();
        let out = connected_threshold(a.view(), [(1, 1, 1), (1, 3, 7), (1, 2, 2)], 480.0, 500.0);
        assert_eq!(out.iter().filter(|p| **p == 1).count(), 18);
    }

    #[test]
    fn test_seed_outside_band_and_empty_seeds() {
        let a = two_blobs();
        let out = connected_threshold(a.view(), [(0, 0, 0)], 480.0, 500.0);
        assert!(out.iter().all(|p| *p == 0));

        let out = connected_threshold(a.view(), std::iter::empty(), 480.0, 500.0);
        assert!(out.iter().all(|p| *p == 0));
    }

    #[test]
    fn test_band_is_inclusive() {
        let a = two_blobs();
        let out = connected_threshold(a.view(), [(1, 2, 2)], 490.0, 490.0);
        assert_eq!(out.iter().filter(|p| **p == 1).count(), 9);
    }
}
