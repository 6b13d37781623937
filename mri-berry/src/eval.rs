//! 分割结果评估.
//!
//! 以真值标签为参照, 计算重叠度指标 (Dice, Jaccard) 和表面距离指标 (Hausdorff).
//! 两个标签中任何非零体素都视为前景.

use crate::consts::gray::is_foreground;
use crate::filter::hausdorff_distance;
use crate::{GeometryAttr, Mask, SegResult};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个病例的评估指标.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricReport {
    /// Dice 系数, `2|A∩B| / (|A| + |B|)`, 位于 `[0, 1]`.
    pub dice: f64,

    /// Jaccard 系数, `|A∩B| / |A∪B|`, 位于 `[0, 1]`.
    pub jaccard: f64,

    /// 对称 Hausdorff 距离, 以毫米为单位. 恰好一方无前景时为正无穷.
    pub hausdorff: f64,

    /// 分割前景的物理体积, 以立方毫米为单位.
    pub volume_mm3: f64,
}

impl fmt::Display for MetricReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dice = {:.4}, jaccard = {:.4}, hausdorff = {:.2} mm, volume = {:.1} mm^3",
            self.dice, self.jaccard, self.hausdorff, self.volume_mm3
        )
    }
}

/// 重叠计数: `(|A∩B|, |A|, |B|)`.
fn overlap(seg: &Mask, reference: &Mask) -> (usize, usize, usize) {
    seg.data()
        .iter()
        .zip(reference.data().iter())
        .fold((0, 0, 0), |(both, a, b), (&p, &q)| {
            let (p, q) = (is_foreground(p), is_foreground(q));
            (
                both + usize::from(p && q),
                a + usize::from(p),
                b + usize::from(q),
            )
        })
}

/// 分割评估器.
#[derive(Copy, Clone, Debug, Default)]
pub struct Evaluator {
    skip_hausdorff: bool,
}

impl Evaluator {
    /// 创建计算全部指标的评估器.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 跳过 Hausdorff 距离计算 (结果中记为 `NaN`). 大体积时该计算开销较大.
    #[inline]
    pub fn without_hausdorff(mut self) -> Self {
        self.skip_hausdorff = true;
        self
    }

    /// 比较分割标签 `seg` 与真值标签 `reference`.
    ///
    /// 两者几何信息不一致时返回 [`crate::SegError::GeometryMismatch`].
    /// 两者都无前景时视为完全一致: Dice = Jaccard = 1, Hausdorff = 0.
    pub fn evaluate(&self, seg: &Mask, reference: &Mask) -> SegResult<MetricReport> {
        seg.ensure_same_geometry(reference)?;

        let (both, a, b) = overlap(seg, reference);
        let union = a + b - both;
        let (dice, jaccard) = if union == 0 {
            (1.0, 1.0)
        } else {
            (
                2.0 * both as f64 / (a + b) as f64,
                both as f64 / union as f64,
            )
        };
        let hausdorff = if self.skip_hausdorff {
            f64::NAN
        } else {
            hausdorff_distance(seg.data(), reference.data(), seg.pix_dim())
        };

        Ok(MetricReport {
            dice,
            jaccard,
            hausdorff,
            volume_mm3: a as f64 * seg.voxel(),
        })
    }
}
