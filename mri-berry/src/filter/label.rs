use super::diamond_neighbours;
use crate::consts::gray::*;
use crate::Idx3d;
use ndarray::{Array3, ArrayView3};
use std::collections::VecDeque;

/// 连通分量标记结果.
///
/// 标签从 1 开始, 按照分量体素数降序排列; 体素数相同时,
/// 按照分量首个体素的行优先扫描顺序排列. 0 代表背景.
#[derive(Clone, Debug)]
pub struct Labeling {
    labels: Array3<u32>,
    /// `sizes[i]` 为标签 `i + 1` 的体素数.
    sizes: Vec<usize>,
}

/// 以 6-邻域规则标记 `a` 的前景连通分量 (任何非零体素都视为前景).
pub fn label_components(a: ArrayView3<'_, u8>) -> Labeling {
    let shape = a.dim();
    let mut labels = Array3::<u32>::zeros(shape);
    let mut sizes = Vec::new();
    let mut q: VecDeque<Idx3d> = VecDeque::with_capacity(64);

    // 第一遍: 按扫描顺序赋予临时标签.
    for (pos, &p) in a.indexed_iter() {
        if is_background(p) || labels[pos] != 0 {
            continue;
        }
        let id = sizes.len() as u32 + 1;
        let mut size = 0usize;
        labels[pos] = id;
        q.push_back(pos);
        while let Some(cur) = q.pop_front() {
            size += 1;
            for neigh in diamond_neighbours(cur, shape) {
                if is_foreground(a[neigh]) && labels[neigh] == 0 {
                    labels[neigh] = id;
                    q.push_back(neigh);
                }
            }
        }
        sizes.push(size);
    }

    // 第二遍: 按体素数降序重新编号. 稳定排序保证同大小分量保持扫描顺序.
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&x, &y| sizes[y].cmp(&sizes[x]));
    let mut remap = vec![0u32; sizes.len() + 1];
    for (rank, &old) in order.iter().enumerate() {
        remap[old + 1] = rank as u32 + 1;
    }
    labels.mapv_inplace(|l| remap[l as usize]);
    let sizes = order.into_iter().map(|i| sizes[i]).collect();

    Labeling { labels, sizes }
}

impl Labeling {
    /// 连通分量个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// 是否不存在任何前景?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// 按标签顺序排列的分量体素数 (降序).
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// 最大分量的体素数. 不存在前景时返回 `None`.
    #[inline]
    pub fn largest(&self) -> Option<usize> {
        self.sizes.first().copied()
    }

    /// 标签 `label` 的体素数. 标签不存在时返回 `None`.
    #[inline]
    pub fn size_of(&self, label: u32) -> Option<usize> {
        let idx = (label as usize).checked_sub(1)?;
        self.sizes.get(idx).copied()
    }

    /// 获得标记图的一份不可变 shallow copy.
    #[inline]
    pub fn labels(&self) -> ArrayView3<'_, u32> {
        self.labels.view()
    }

    /// 获取 `pos` 处的标签.
    #[inline]
    pub fn label_at(&self, pos: Idx3d) -> u32 {
        self.labels[pos]
    }

    /// 保留所有体素数不小于 `min_size` 的分量, 输出二值数组.
    pub fn keep_at_least(&self, min_size: usize) -> Array3<u8> {
        // 标签按大小降序排列, 所以满足条件的标签是一个前缀.
        let kept = self.sizes.iter().take_while(|&&s| s >= min_size).count() as u32;
        self.labels.mapv(|l| {
            if l != 0 && l <= kept {
                MASK_FOREGROUND
            } else {
                MASK_BACKGROUND
            }
        })
    }
}
