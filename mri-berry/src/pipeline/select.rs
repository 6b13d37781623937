use crate::filter::label_components;
use crate::{GeometryAttr, Mask};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个连通分量的统计信息.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentStats {
    /// 分量标签, 从 1 开始按体素数降序排列.
    pub label: u32,

    /// 体素个数.
    pub voxel_count: usize,

    /// 物理体积, 以立方毫米为单位.
    pub physical_size: f64,
}

/// 候选标签被拒绝的原因.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectReason {
    /// 不存在任何前景.
    NoComponent,

    /// 最大连通分量的体素数小于下限.
    TooSmall {
        /// 最大分量体素数.
        largest: usize,
        /// 体素数下限.
        min_size: usize,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoComponent => write!(f, "no component"),
            Self::TooSmall { largest, min_size } => {
                write!(f, "largest component {largest} < {min_size} voxels")
            }
        }
    }
}

/// 连通分量选择结果.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// 接受最大连通分量.
    Accepted {
        /// 只保留最大连通分量 (若有多个同样大小的最大分量, 则全部保留) 的二值标签.
        mask: Mask,
        /// 最大连通分量 (标签 1) 的统计信息.
        stats: ComponentStats,
    },

    /// 拒绝.
    Rejected(RejectReason),
}

impl Selection {
    /// 是否被接受?
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// 统计 `mask` 中全部 6-连通分量, 结果按体素数降序排列.
pub fn label_stats(mask: &Mask) -> Vec<ComponentStats> {
    let voxel = mask.voxel();
    label_components(mask.data())
        .sizes()
        .iter()
        .zip(1u32..)
        .map(|(&voxel_count, label)| ComponentStats {
            label,
            voxel_count,
            physical_size: voxel_count as f64 * voxel,
        })
        .collect()
}

/// 最大连通分量选择.
///
/// 以 6-邻域规则标记连通分量, 若最大分量的体素数不小于 `min_size`,
/// 则只保留体素数等于最大值的分量.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComponentSelector {
    min_size: usize,
}

impl ComponentSelector {
    /// 以最小可接受体素数创建选择器.
    #[inline]
    pub fn new(min_size: usize) -> Self {
        Self { min_size }
    }

    /// 最小可接受体素数.
    #[inline]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// 对 `mask` 进行选择. 对已接受的输出再次选择, 结果不变.
    pub fn select(&self, mask: &Mask) -> Selection {
        let labeling = label_components(mask.data());
        let Some(largest) = labeling.largest() else {
            return Selection::Rejected(RejectReason::NoComponent);
        };
        if largest < self.min_size {
            return Selection::Rejected(RejectReason::TooSmall {
                largest,
                min_size: self.min_size,
            });
        }

        let kept = labeling.keep_at_least(largest);
        let ties = labeling.sizes().iter().filter(|&&s| s == largest).count();
        if ties > 1 {
            log::debug!("{ties} components tie at {largest} voxels, keeping all of them");
        }
        Selection::Accepted {
            mask: mask.derive(kept),
            stats: ComponentStats {
                label: 1,
                voxel_count: largest,
                physical_size: largest as f64 * mask.voxel(),
            },
        }
    }
}
