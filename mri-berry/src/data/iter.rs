use crate::Idx3d;

/// 行优先 (`z -> h -> w`) 三维索引迭代器.
///
/// 虽然如下函数也能实现相同的功能:
///
/// ```
/// type Idx3d = (usize, usize, usize);
///
/// fn pos_iter_auto((z, h, w): Idx3d) -> impl Iterator<Item = Idx3d> {
///     (0..z).flat_map(move |a| (0..h).flat_map(move |b| (0..w).map(move |c| (a, b, c))))
/// }
///
/// // ...
/// ```
///
/// 但该迭代器对象无法 `Clone`, 且占用空间更大. 种子点生成需要可重启的迭代器,
/// 因此保留该结构.
#[derive(Clone, Debug)]
pub struct PosIter3d {
    cur: Idx3d,
    shape: Idx3d,
}

impl PosIter3d {
    /// 从形状 `(z, h, w)` 创建迭代器, 起点为 `(0, 0, 0)`.
    #[inline]
    pub fn new(shape: Idx3d) -> Self {
        Self {
            cur: (0, 0, 0),
            shape,
        }
    }

    /// 剩余索引个数.
    #[inline]
    fn remaining(&self) -> usize {
        let (z, h, w) = self.shape;
        if z == 0 || h == 0 || w == 0 {
            return 0;
        }
        let (cz, ch, cw) = self.cur;
        z * h * w - (cz * h * w + ch * w + cw)
    }
}

impl Iterator for PosIter3d {
    type Item = Idx3d;

    fn next(&mut self) -> Option<Self::Item> {
        let (z, h, w) = self.shape;
        if z == 0 || h == 0 || w == 0 || self.cur.0 == z {
            return None;
        }
        let ret_pos = self.cur;
        let (cz, ch, cw) = &mut self.cur;
        *cw += 1;
        if *cw == w {
            *cw = 0;
            *ch += 1;
            if *ch == h {
                *ch = 0;
                *cz += 1;
            }
        }
        Some(ret_pos)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for PosIter3d {}

/// 该测试已足够覆盖所有情况, 不用变更.
#[cfg(test)]
mod completeness_tests {
    use super::PosIter3d;
    use crate::Idx3d;

    fn pos_iter_builtin((z, h, w): Idx3d) -> impl Iterator<Item = Idx3d> {
        (0..z).flat_map(move |a| (0..h).flat_map(move |b| (0..w).map(move |c| (a, b, c))))
    }

    #[test]
    fn test_pos_iter() {
        // 这几个基本例子足以证明正确性了.
        for i in 0..=3 {
            for j in 0..=3 {
                for k in 0..=3 {
                    let tup = (i, j, k);
                    assert!(Iterator::eq(pos_iter_builtin(tup), PosIter3d::new(tup)));
                    assert_eq!(PosIter3d::new(tup).len(), i * j * k);
                }
            }
        }
    }

    #[test]
    fn test_pos_iter_restart() {
        let mut it = PosIter3d::new((2, 2, 2));
        it.next();
        let snapshot = it.clone();
        assert!(Iterator::eq(it, snapshot));
    }
}
