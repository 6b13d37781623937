//! 模态回退状态机.
//!
//! ```text
//! Start -> TryPrimary -> Accepted(Primary)
//!                     -> TrySecondary -> Accepted(Secondary)
//!                                     -> Rejected
//! ```
//!
//! 每个状态最多进入一次, 次模态最多尝试一次, 不存在循环.

use super::{run_chain, ComponentStats, RejectReason, Selection};
use crate::dataset::VolumeSource;
use crate::{Mask, ModalityParameters, PipelineConfig, SegError, SegResult, Volume};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 分割结果来自哪个模态通道.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    /// 主模态.
    Primary,
    /// 次模态 (回退).
    Secondary,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// 单个病例的最终分割结果.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentationResult {
    /// 某个模态产生了可接受的连通分量.
    Accepted {
        /// 二值分割标签.
        mask: Mask,
        /// 产生该标签的通道.
        channel: Channel,
        /// 产生该标签的模态标识.
        modality: String,
        /// 最大连通分量的统计信息.
        stats: ComponentStats,
        /// 若经由回退得到, 记录主模态被拒绝的原因.
        fallback_from: Option<RejectReason>,
    },

    /// 两个模态均被拒绝. 这不是错误.
    Rejected {
        /// 主模态被拒绝的原因.
        primary: RejectReason,
        /// 次模态被拒绝的原因.
        secondary: RejectReason,
    },
}

impl SegmentationResult {
    /// 是否被接受?
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// 被接受时的分割标签.
    #[inline]
    pub fn mask(&self) -> Option<&Mask> {
        match self {
            Self::Accepted { mask, .. } => Some(mask),
            Self::Rejected { .. } => None,
        }
    }

    /// 被接受时的通道.
    #[inline]
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Self::Accepted { channel, .. } => Some(*channel),
            Self::Rejected { .. } => None,
        }
    }
}

/// 状态机内部状态.
enum State {
    Start,
    TryPrimary,
    TrySecondary { primary: RejectReason },
    Done(SegmentationResult),
}

/// 模态回退控制器.
///
/// 先以主模态参数运行处理链; 若被拒绝, 则恰好一次地加载次模态并以次模态参数运行.
/// 次模态扫描只在需要时才加载.
///
/// 可通过共享的取消标志在两次尝试之间中止, 此时返回 [`SegError::Cancelled`].
#[derive(Clone, Copy, Debug)]
pub struct FallbackController<'a> {
    config: &'a PipelineConfig,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> FallbackController<'a> {
    /// 以流程配置创建控制器.
    #[inline]
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// 设置取消标志. 标志被置为 `true` 后, 下一次尝试开始前返回 [`SegError::Cancelled`].
    #[inline]
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// 流程配置.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        self.config
    }

    fn check_cancelled(&self) -> SegResult<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(SegError::Cancelled),
            _ => Ok(()),
        }
    }

    /// 从数据源分割病例 `case`.
    ///
    /// 任何处理开始前先确认两个模态都存在, 缺失时返回 [`SegError::NotFound`].
    pub fn segment<S: VolumeSource + ?Sized>(
        &self,
        source: &S,
        case: &str,
    ) -> SegResult<SegmentationResult> {
        for params in [&self.config.primary, &self.config.secondary] {
            if !source.contains(case, &params.modality) {
                return Err(SegError::not_found(
                    case,
                    format!("modality {}", params.modality),
                ));
            }
        }
        let primary = source.volume(case, &self.config.primary.modality)?;
        self.segment_with(&primary, || {
            source.volume(case, &self.config.secondary.modality)
        })
    }

    /// 以已加载的主模态扫描和惰性的次模态加载函数运行状态机.
    ///
    /// `load_secondary` 至多被调用一次, 且只在主模态被拒绝时调用.
    pub fn segment_with<F>(&self, primary: &Volume, load_secondary: F) -> SegResult<SegmentationResult>
    where
        F: FnOnce() -> SegResult<Volume>,
    {
        let mut load_secondary = Some(load_secondary);
        let mut state = State::Start;
        loop {
            state = match state {
                State::Start => {
                    self.check_cancelled()?;
                    State::TryPrimary
                }
                State::TryPrimary => {
                    let params = &self.config.primary;
                    match run_chain(primary, self.config, params)? {
                        Selection::Accepted { mask, stats } => {
                            State::Done(accepted(mask, Channel::Primary, params, stats, None))
                        }
                        Selection::Rejected(reason) => {
                            log::debug!("`{}` rejected ({reason}), falling back", params.modality);
                            State::TrySecondary { primary: reason }
                        }
                    }
                }
                State::TrySecondary { primary } => {
                    self.check_cancelled()?;
                    let params = &self.config.secondary;
                    let Some(load) = load_secondary.take() else {
                        unreachable!("secondary modality is attempted at most once");
                    };
                    match run_chain(&load()?, self.config, params)? {
                        Selection::Accepted { mask, stats } => State::Done(accepted(
                            mask,
                            Channel::Secondary,
                            params,
                            stats,
                            Some(primary),
                        )),
                        Selection::Rejected(secondary) => {
                            log::debug!("`{}` rejected ({secondary})", params.modality);
                            State::Done(SegmentationResult::Rejected { primary, secondary })
                        }
                    }
                }
                State::Done(result) => return Ok(result),
            };
        }
    }
}

fn accepted(
    mask: Mask,
    channel: Channel,
    params: &ModalityParameters,
    stats: ComponentStats,
    fallback_from: Option<RejectReason>,
) -> SegmentationResult {
    log::debug!(
        "`{}` accepted on {channel} channel: {} voxels, {:.1} mm^3",
        params.modality,
        stats.voxel_count,
        stats.physical_size
    );
    SegmentationResult::Accepted {
        mask,
        channel,
        modality: params.modality.clone(),
        stats,
        fallback_from,
    }
}
