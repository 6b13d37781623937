//! 分割流程配置.
//!
//! 原先一份份复制粘贴、仅参数略有不同的分割脚本, 在这里被收敛为一张参数表:
//! 每个模态一份 [`ModalityParameters`], 由同一个回退状态机驱动.
//! 所有常量都是配置而非架构, 应当在具体数据集上调优验证.

use crate::consts::{modality, DEFAULT_MIN_COMPONENT_SIZE, DEFAULT_SEED_THRESHOLD};
use crate::filter::DiffusionParams;
use crate::pipeline::MorphStep;
use crate::{SegError, SegResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 平滑阶段参数.
pub type SmoothingParams = DiffusionParams;

/// 归一化窗口的取法.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum WindowBounds {
    /// 以全部体素强度的第 `lower` / `upper` 百分位数 (`0..=100`) 作为窗口.
    Percentile {
        /// 下百分位.
        lower: f64,
        /// 上百分位.
        upper: f64,
    },

    /// 以 `[min + margin, max - margin]` 作为窗口, 去除两端的测量误差.
    MinMaxMargin {
        /// 两端裁掉的强度余量.
        margin: f32,
    },
}

impl Default for WindowBounds {
    /// 第 5 和第 99 百分位.
    fn default() -> Self {
        Self::Percentile {
            lower: 5.0,
            upper: 99.0,
        }
    }
}

impl WindowBounds {
    /// 检查参数是否合法.
    pub fn validate(&self) -> SegResult<()> {
        match *self {
            Self::Percentile { lower, upper } => {
                let r = 0.0..=100.0;
                if !(r.contains(&lower) && r.contains(&upper) && lower <= upper) {
                    return Err(SegError::invalid(format!(
                        "percentile window ({lower}, {upper}) out of range"
                    )));
                }
            }
            Self::MinMaxMargin { margin } => {
                if !(margin.is_finite() && margin >= 0.0) {
                    return Err(SegError::invalid(format!("bad window margin {margin}")));
                }
            }
        }
        Ok(())
    }
}

/// 单个模态的分割参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModalityParameters {
    /// 模态标识, 同时用于从数据源加载对应扫描.
    pub modality: String,

    /// 种子点强度阈值. 平滑后强度严格大于该值的体素成为种子点.
    pub seed_threshold: f32,

    /// 区域生长强度下限 (含).
    pub lower: f32,

    /// 区域生长强度上限 (含).
    pub upper: f32,

    /// 最小可接受连通分量体素数.
    pub min_component_size: usize,

    /// 区域生长之后依次执行的形态学操作.
    pub post_steps: Vec<MorphStep>,
}

impl ModalityParameters {
    /// 默认主模态参数: 窄强度带 `[480, 500]`, 开运算 + 闭运算.
    pub fn primary_default() -> Self {
        Self {
            modality: modality::PRIMARY.to_owned(),
            seed_threshold: DEFAULT_SEED_THRESHOLD,
            lower: 480.0,
            upper: 500.0,
            min_component_size: DEFAULT_MIN_COMPONENT_SIZE,
            post_steps: vec![MorphStep::Opening { radius: 1 }, MorphStep::Closing { radius: 2 }],
        }
    }

    /// 默认次模态参数: 宽强度带 `[200, 500]`, 开运算 + 闭运算 + 空洞填充.
    pub fn secondary_default() -> Self {
        Self {
            modality: modality::SECONDARY.to_owned(),
            seed_threshold: DEFAULT_SEED_THRESHOLD,
            lower: 200.0,
            upper: 500.0,
            min_component_size: DEFAULT_MIN_COMPONENT_SIZE,
            post_steps: vec![
                MorphStep::Opening { radius: 1 },
                MorphStep::Closing { radius: 2 },
                MorphStep::FillHoles {
                    radius: 1,
                    max_iterations: 10,
                },
            ],
        }
    }

    /// 检查参数是否合法.
    pub fn validate(&self) -> SegResult<()> {
        if self.modality.is_empty() {
            return Err(SegError::invalid("empty modality identifier"));
        }
        if !(self.seed_threshold.is_finite() && self.lower.is_finite() && self.upper.is_finite()) {
            return Err(SegError::invalid(format!(
                "`{}`: non-finite intensity parameter",
                self.modality
            )));
        }
        if self.lower > self.upper {
            return Err(SegError::invalid(format!(
                "`{}`: band [{}, {}] is empty",
                self.modality, self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// 完整的分割流程配置.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// 归一化窗口.
    pub window: WindowBounds,

    /// 平滑参数.
    pub smoothing: SmoothingParams,

    /// 主模态参数.
    pub primary: ModalityParameters,

    /// 次模态 (回退) 参数.
    pub secondary: ModalityParameters,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: WindowBounds::default(),
            smoothing: SmoothingParams::default(),
            primary: ModalityParameters::primary_default(),
            secondary: ModalityParameters::secondary_default(),
        }
    }
}

impl PipelineConfig {
    /// 检查全部参数是否合法.
    pub fn validate(&self) -> SegResult<()> {
        self.window.validate()?;
        let s = &self.smoothing;
        if !(s.time_step.is_finite() && s.time_step > 0.0 && s.conductance.is_finite()) {
            return Err(SegError::invalid(format!("bad smoothing parameters {s:?}")));
        }
        self.primary.validate()?;
        self.secondary.validate()
    }
}

#[cfg(feature = "serde")]
impl PipelineConfig {
    /// 从 TOML 文本解析配置. 缺失的顶层段落取默认值. 解析后会检查参数合法性.
    pub fn from_toml_str(s: &str) -> SegResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SegError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载配置.
    pub fn from_toml_file<P: AsRef<std::path::Path>>(path: P) -> SegResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// 将配置序列化为 TOML 文本.
    pub fn to_toml_string(&self) -> SegResult<String> {
        toml::to_string(self).map_err(|e| SegError::Config(e.to_string()))
    }
}
