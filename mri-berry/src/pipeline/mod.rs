//! 分割流水线.
//!
//! 单个模态的处理链为:
//!
//! ```text
//! Volume -> Normalizer -> Smoother -> SeedGenerator -> RegionGrower
//!        -> PostProcessor -> ComponentSelector -> Selection
//! ```
//!
//! 每个阶段都是纯函数, 不修改输入, 返回新的 [`crate::Volume`] 或 [`crate::Mask`].
//! [`FallbackController`] 负责在主模态失败时恰好一次地回退到次模态.

mod fallback;
mod normalize;
mod post;
mod region;
mod seeds;
mod select;
mod smooth;

pub use fallback::{Channel, FallbackController, SegmentationResult};
pub use normalize::Normalizer;
pub use post::{MorphStep, PostProcessor};
pub use region::RegionGrower;
pub use seeds::{SeedGenerator, Seeds};
pub use select::{label_stats, ComponentSelector, ComponentStats, RejectReason, Selection};
pub use smooth::Smoother;

use crate::{ModalityParameters, PipelineConfig, SegResult, Volume};

/// 以 `config` 的公共参数和 `params` 的模态参数, 对 `volume` 运行一次完整的单模态处理链.
///
/// 该函数不做回退; 回退逻辑见 [`FallbackController`].
pub fn run_chain(
    volume: &Volume,
    config: &PipelineConfig,
    params: &ModalityParameters,
) -> SegResult<Selection> {
    params.validate()?;
    let normalized = Normalizer::new(config.window).run(volume)?;
    let smoothed = Smoother::new(config.smoothing).run(&normalized);
    let seeds = SeedGenerator::new(params.seed_threshold).seeds(&smoothed);
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "`{}`: {} seeds above {}",
            params.modality,
            seeds.clone().count(),
            params.seed_threshold
        );
    }
    let grown = RegionGrower::new(params.lower, params.upper)?.grow(&smoothed, seeds)?;
    let processed = PostProcessor::new(params.post_steps.clone()).run(&grown);
    Ok(ComponentSelector::new(params.min_component_size).select(&processed))
}
