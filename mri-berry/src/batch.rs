//! 多病例批处理.
//!
//! 病例之间相互独立, 开启 `rayon` 特性时并行处理. 单个病例的错误不会中止整批.

use crate::dataset::VolumeSource;
use crate::eval::{Evaluator, MetricReport};
use crate::pipeline::{Channel, FallbackController, SegmentationResult};
use crate::{PipelineConfig, SegError, SegResult};
use std::sync::atomic::AtomicBool;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;
    }
}

/// 单个病例的处理报告.
#[derive(Clone, Debug)]
pub struct CaseReport {
    /// 病例标识.
    pub case: String,

    /// 分割结果.
    pub result: SegmentationResult,

    /// 与真值的比较结果. 仅当分割被接受时存在.
    pub metrics: Option<MetricReport>,
}

/// 一批病例的汇总.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    /// 病例总数.
    pub total: usize,
    /// 主模态被接受的病例数.
    pub primary: usize,
    /// 回退到次模态后被接受的病例数.
    pub secondary: usize,
    /// 两个模态均被拒绝的病例数.
    pub rejected: usize,
    /// 运行出错的病例数.
    pub failed: usize,
    /// 被接受病例的平均 Dice 系数. 没有被接受的病例时为 `None`.
    pub mean_dice: Option<f64>,
}

impl BatchSummary {
    /// 汇总 [`run_batch`] 的输出.
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, SegResult<CaseReport>)>,
    {
        let mut ans = Self::default();
        let mut dice = Vec::new();
        for (_, r) in results {
            ans.total += 1;
            match r {
                Err(_) => ans.failed += 1,
                Ok(report) => {
                    match report.result.channel() {
                        Some(Channel::Primary) => ans.primary += 1,
                        Some(Channel::Secondary) => ans.secondary += 1,
                        None => ans.rejected += 1,
                    }
                    dice.extend(report.metrics.map(|m| m.dice));
                }
            }
        }
        if !dice.is_empty() {
            ans.mean_dice = Some(dice.iter().sum::<f64>() / dice.len() as f64);
        }
        ans
    }
}

/// 分割单个病例, 被接受时与真值比较.
pub fn run_case<S: VolumeSource + ?Sized>(
    source: &S,
    controller: &FallbackController<'_>,
    evaluator: &Evaluator,
    case: &str,
) -> SegResult<CaseReport> {
    let result = controller.segment(source, case)?;
    let metrics = match result.mask() {
        Some(mask) => {
            let reference = source.reference(case)?;
            Some(evaluator.evaluate(mask, &reference)?)
        }
        None => None,
    };
    match (&result, &metrics) {
        (SegmentationResult::Accepted { channel, .. }, Some(m)) => {
            log::info!("case `{case}` accepted on {channel} channel: {m}")
        }
        (SegmentationResult::Rejected { primary, secondary }, _) => {
            log::info!("case `{case}` rejected: {primary}; {secondary}")
        }
        _ => {}
    }
    Ok(CaseReport {
        case: case.to_owned(),
        result,
        metrics,
    })
}

/// 批量处理 `cases`, 输出顺序与输入一致.
///
/// `cancel` 被置为 `true` 后, 尚未完成的病例返回 [`SegError::Cancelled`].
pub fn run_batch<S>(
    source: &S,
    config: &PipelineConfig,
    cases: &[String],
    cancel: Option<&AtomicBool>,
) -> Vec<(String, SegResult<CaseReport>)>
where
    S: VolumeSource + Sync + ?Sized,
{
    if let Err(e) = config.validate() {
        log::error!("invalid pipeline config: {e}");
        let msg = e.to_string();
        return cases
            .iter()
            .map(|c| (c.clone(), Err(SegError::InvalidInput(msg.clone()))))
            .collect();
    }

    let mut controller = FallbackController::new(config);
    if let Some(flag) = cancel {
        controller = controller.with_cancel(flag);
    }
    let evaluator = Evaluator::new();
    let job = |case: &String| {
        let r = run_case(source, &controller, &evaluator, case);
        if let Err(e) = &r {
            log::warn!("case `{case}` failed: {e}");
        }
        (case.clone(), r)
    };

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            cases.par_iter().map(job).collect()
        } else {
            cases.iter().map(job).collect()
        }
    }
}
