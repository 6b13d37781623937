use crate::filter::{binary_closing, binary_dilate, binary_erode, binary_opening, voting_hole_filling};
use crate::Mask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个形态学后处理步骤. 结构元素均为球形.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum MorphStep {
    /// 开运算, 去除细小突起和孤立噪点.
    Opening {
        /// 结构元素半径 (体素).
        radius: usize,
    },

    /// 闭运算, 弥合细小缝隙.
    Closing {
        /// 结构元素半径 (体素).
        radius: usize,
    },

    /// 膨胀.
    Dilation {
        /// 结构元素半径 (体素).
        radius: usize,
    },

    /// 腐蚀.
    Erosion {
        /// 结构元素半径 (体素).
        radius: usize,
    },

    /// 迭代投票式空洞填充.
    FillHoles {
        /// 立方体邻域半径 (体素).
        radius: usize,
        /// 最大迭代次数.
        max_iterations: u32,
    },
}

impl MorphStep {
    /// 对 `mask` 执行该步骤, 返回新的二值标签.
    pub fn apply(&self, mask: &Mask) -> Mask {
        let a = mask.data();
        let data = match *self {
            Self::Opening { radius } => binary_opening(a, radius),
            Self::Closing { radius } => binary_closing(a, radius),
            Self::Dilation { radius } => binary_dilate(a, radius),
            Self::Erosion { radius } => binary_erode(a, radius),
            Self::FillHoles {
                radius,
                max_iterations,
            } => voting_hole_filling(a, radius, max_iterations),
        };
        mask.derive(data)
    }
}

/// 形态学后处理: 按顺序执行一组 [`MorphStep`].
///
/// 空步骤列表只将输入二值化.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostProcessor {
    steps: Vec<MorphStep>,
}

impl PostProcessor {
    /// 以步骤列表创建后处理器.
    #[inline]
    pub fn new(steps: Vec<MorphStep>) -> Self {
        Self { steps }
    }

    /// 步骤列表.
    #[inline]
    pub fn steps(&self) -> &[MorphStep] {
        &self.steps
    }

    /// 依次执行所有步骤, 返回新的二值标签. 几何信息不变.
    pub fn run(&self, mask: &Mask) -> Mask {
        self.steps
            .iter()
            .fold(mask.binarized(), |cur, step| step.apply(&cur))
    }
}
