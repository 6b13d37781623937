use crate::filter::connected_threshold;
use crate::{GeometryAttr, Idx3d, Mask, SegError, SegResult, Volume};

/// 连通阈值区域生长.
///
/// 从所有种子点出发, 沿 6-邻域扩张到强度落在 `[lower, upper]` (含两端) 的体素.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RegionGrower {
    lower: f32,
    upper: f32,
}

impl RegionGrower {
    /// 以强度带 `[lower, upper]` 创建区域生长器.
    ///
    /// 强度带为空或包含非有限值时返回 [`SegError::InvalidInput`].
    pub fn new(lower: f32, upper: f32) -> SegResult<Self> {
        if !(lower.is_finite() && upper.is_finite() && lower <= upper) {
            return Err(SegError::invalid(format!(
                "bad region growing band [{lower}, {upper}]"
            )));
        }
        Ok(Self { lower, upper })
    }

    /// 强度带 `(lower, upper)`.
    #[inline]
    pub fn band(&self) -> (f32, f32) {
        (self.lower, self.upper)
    }

    /// 在 `volume` 上从 `seeds` 生长, 返回二值标签.
    ///
    /// 任何种子点越界时返回 [`SegError::InvalidInput`], 此时不做任何生长.
    /// 空种子集得到全背景标签.
    pub fn grow<I>(&self, volume: &Volume, seeds: I) -> SegResult<Mask>
    where
        I: IntoIterator<Item = Idx3d>,
    {
        let seeds: Vec<Idx3d> = seeds.into_iter().collect();
        if let Some(bad) = seeds.iter().find(|pos| !volume.check(pos)) {
            return Err(SegError::invalid(format!(
                "seed {bad:?} out of grid {:?}",
                volume.shape()
            )));
        }
        let data = connected_threshold(volume.data(), seeds, self.lower, self.upper);
        Ok(volume.derive_mask(data))
    }
}

#[cfg(test)]
mod tests {
    use super::RegionGrower;
    use crate::{GeometryAttr, SegError, Volume};
    use ndarray::Array3;

    fn volume() -> Volume {
        let mut data = Array3::<f32>::zeros((2, 4, 4));
        for h in 0..2 {
            for w in 0..2 {
                data[(0, h, w)] = 485.0;
            }
        }
        data[(1, 3, 3)] = 495.0;
        Volume::new(data, [1.0; 3]).unwrap()
    }

    #[test]
    fn test_grow() {
        let v = volume();
        let g = RegionGrower::new(480.0, 500.0).unwrap();
        let m = g.grow(&v, [(0, 0, 0)]).unwrap();
        assert_eq!(m.count_foreground(), 4);
        assert_eq!(m.geometry(), v.geometry());

        let m = g.grow(&v, [(0, 1, 1), (1, 3, 3)]).unwrap();
        assert_eq!(m.count_foreground(), 5);

        let m = g.grow(&v, std::iter::empty()).unwrap();
        assert!(m.is_background());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            RegionGrower::new(500.0, 480.0),
            Err(SegError::InvalidInput(_))
        ));
        let g = RegionGrower::new(480.0, 500.0).unwrap();
        assert!(matches!(
            g.grow(&volume(), [(0, 0, 0), (2, 0, 0)]),
            Err(SegError::InvalidInput(_))
        ));
    }
}
