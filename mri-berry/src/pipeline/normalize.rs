use crate::filter::percentiles;
use crate::{IntensityWindow, SegError, SegResult, Volume, WindowBounds};

/// 强度归一化.
///
/// 根据 [`WindowBounds`] 从扫描本身求得强度窗口, 然后将所有体素线性映射到
/// `[NORMALIZED_MIN, NORMALIZED_MAX]`, 窗外的值被截断.
///
/// [`NORMALIZED_MIN`]: crate::consts::NORMALIZED_MIN
/// [`NORMALIZED_MAX`]: crate::consts::NORMALIZED_MAX
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Normalizer {
    bounds: WindowBounds,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(WindowBounds::default())
    }
}

impl Normalizer {
    /// 以给定的窗口取法创建归一化器.
    #[inline]
    pub fn new(bounds: WindowBounds) -> Self {
        Self { bounds }
    }

    /// 求 `volume` 的强度窗口.
    ///
    /// 扫描不含任何有限强度值时返回 [`SegError::InvalidInput`].
    pub fn window_for(&self, volume: &Volume) -> SegResult<IntensityWindow> {
        self.bounds.validate()?;
        let no_finite = || SegError::invalid("volume contains no finite intensity");

        let (lower, upper) = match self.bounds {
            WindowBounds::Percentile { lower, upper } => {
                let [lo, hi] = percentiles(volume.data().iter().copied(), [lower, upper])
                    .ok_or_else(no_finite)?;
                (lo as f32, hi as f32)
            }
            WindowBounds::MinMaxMargin { margin } => {
                let (min, max) = volume.min_max().ok_or_else(no_finite)?;
                (min + margin, max - margin)
            }
        };
        IntensityWindow::new(lower, upper).ok_or_else(no_finite)
    }

    /// 归一化 `volume`, 返回新的扫描.
    pub fn run(&self, volume: &Volume) -> SegResult<Volume> {
        let window = self.window_for(volume)?;
        if window.is_degenerate() {
            log::warn!(
                "degenerate intensity window [{}, {}]",
                window.lower_bound(),
                window.upper_bound()
            );
        }

        let mut data = volume.data().to_owned();
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                data.par_mapv_inplace(|v| window.eval(v));
            } else {
                data.mapv_inplace(|v| window.eval(v));
            }
        }
        Ok(volume.derive(data))
    }
}

#[cfg(test)]
mod tests {
    use super::Normalizer;
    use crate::consts::{NORMALIZED_MAX, NORMALIZED_MIN};
    use crate::{SegError, Volume, WindowBounds};
    use ndarray::Array3;

    /// 强度依次为 `0, 1, ..., 99`.
    fn ramp() -> Volume {
        let data = Array3::from_shape_fn((1, 10, 10), |(_, h, w)| (h * 10 + w) as f32);
        Volume::new(data, [1.0; 3]).unwrap()
    }

    #[test]
    fn test_percentile_window() {
        let n = Normalizer::new(WindowBounds::Percentile {
            lower: 0.0,
            upper: 100.0,
        });
        let out = n.run(&ramp()).unwrap();
        assert_eq!(out[(0, 0, 0)], NORMALIZED_MIN);
        assert_eq!(out[(0, 9, 9)], NORMALIZED_MAX);
        assert!(out
            .data()
            .iter()
            .all(|v| (NORMALIZED_MIN..=NORMALIZED_MAX).contains(v)));
    }

    #[test]
    fn test_default_window_clamps_tails() {
        let out = Normalizer::default().run(&ramp()).unwrap();
        // 第 5 百分位为 4.95, 第 99 百分位为 98.01.
        assert_eq!(out[(0, 0, 4)], NORMALIZED_MIN);
        assert_eq!(out[(0, 9, 9)], NORMALIZED_MAX);
        assert!(out[(0, 5, 0)] > NORMALIZED_MIN && out[(0, 5, 0)] < NORMALIZED_MAX);
    }

    #[test]
    fn test_min_max_margin_window() {
        let n = Normalizer::new(WindowBounds::MinMaxMargin { margin: 5.0 });
        let w = n.window_for(&ramp()).unwrap();
        assert_eq!((w.lower_bound(), w.upper_bound()), (5.0, 94.0));
    }

    #[test]
    fn test_constant_volume_is_step() {
        let v = Volume::new(Array3::from_elem((2, 2, 2), 7.0), [1.0; 3]).unwrap();
        let out = Normalizer::default().run(&v).unwrap();
        assert!(out.data().iter().all(|p| *p == NORMALIZED_MAX));
    }

    #[test]
    fn test_non_finite() {
        let mut data = Array3::from_elem((1, 2, 2), f32::NAN);
        let v = Volume::new(data.clone(), [1.0; 3]).unwrap();
        assert!(matches!(
            Normalizer::default().run(&v),
            Err(SegError::InvalidInput(_))
        ));

        data[(0, 0, 0)] = 1.0;
        data[(0, 0, 1)] = 3.0;
        let v = Volume::new(data, [1.0; 3]).unwrap();
        let out = Normalizer::default().run(&v).unwrap();
        assert_eq!(out[(0, 1, 1)], NORMALIZED_MIN);
    }
}
