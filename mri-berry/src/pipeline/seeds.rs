use crate::{GeometryAttr, Idx3d, PosIter3d, Volume};

/// 种子点生成器: 强度严格大于阈值的体素成为种子点.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SeedGenerator {
    threshold: f32,
}

impl SeedGenerator {
    /// 以强度阈值 `threshold` 创建生成器.
    #[inline]
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// 阈值.
    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// 按行优先顺序惰性地产生 `volume` 中的种子点.
    #[inline]
    pub fn seeds<'a>(&self, volume: &'a Volume) -> Seeds<'a> {
        Seeds {
            volume,
            threshold: self.threshold,
            pos: PosIter3d::new(volume.shape()),
        }
    }
}

/// 种子点序列, 由 [`SeedGenerator::seeds`] 创建.
///
/// 顺序完全由扫描决定. `clone` 得到一个从当前位置重新开始的独立序列,
/// 可用于多次遍历.
#[derive(Clone, Debug)]
pub struct Seeds<'a> {
    volume: &'a Volume,
    threshold: f32,
    pos: PosIter3d,
}

impl Iterator for Seeds<'_> {
    type Item = Idx3d;

    fn next(&mut self) -> Option<Self::Item> {
        let (volume, threshold) = (self.volume, self.threshold);
        // NaN 不大于任何阈值.
        self.pos.find(|&pos| volume[pos] > threshold)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.pos.size_hint().1)
    }
}

#[cfg(test)]
mod tests {
    use super::SeedGenerator;
    use crate::Volume;
    use ndarray::Array3;

    #[test]
    fn test_strictly_above_in_scan_order() {
        let mut data = Array3::<f32>::zeros((2, 2, 2));
        data[(1, 0, 1)] = 495.0;
        data[(0, 1, 0)] = 491.0;
        data[(0, 0, 0)] = 490.0;
        data[(1, 1, 1)] = f32::NAN;
        let v = Volume::new(data, [1.0; 3]).unwrap();

        let seeds: Vec<_> = SeedGenerator::new(490.0).seeds(&v).collect();
        assert_eq!(seeds, vec![(0, 1, 0), (1, 0, 1)]);
    }

    #[test]
    fn test_restartable() {
        let v = Volume::new(Array3::from_elem((2, 3, 4), 500.0), [1.0; 3]).unwrap();
        let mut seeds = SeedGenerator::new(0.0).seeds(&v);
        assert_eq!(seeds.next(), Some((0, 0, 0)));
        let rest = seeds.clone();
        assert_eq!(seeds.count(), 23);
        assert_eq!(rest.count(), 23);

        let empty = SeedGenerator::new(500.0).seeds(&v);
        assert_eq!(empty.count(), 0);
    }
}
