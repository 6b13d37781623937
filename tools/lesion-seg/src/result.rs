//! 批处理结果.

use mri_berry::batch::{BatchSummary, CaseReport};
use mri_berry::{SegResult, SegmentationResult};
use std::io::{self, Write};
use utils::f64_to_display;

const S4: &str = "    ";

/// 将单个病例的结果写进 `w` 中.
fn describe_into<W: Write>(case: &str, r: &SegResult<CaseReport>, w: &mut W) -> io::Result<()> {
    writeln!(w, "Case `{case}`:")?;
    let report = match r {
        Ok(report) => report,
        Err(e) => return write!(w, "{S4}Error: {e}"),
    };

    match &report.result {
        SegmentationResult::Accepted {
            channel,
            modality,
            stats,
            fallback_from,
            ..
        } => {
            writeln!(w, "{S4}Accepted on {channel} channel (`{modality}`)")?;
            if let Some(reason) = fallback_from {
                writeln!(w, "{S4}Primary channel rejected: {reason}")?;
            }
            writeln!(
                w,
                "{S4}Largest component: {} voxels, {:.1} mm^3",
                stats.voxel_count, stats.physical_size
            )?;
        }
        SegmentationResult::Rejected { primary, secondary } => {
            writeln!(w, "{S4}Rejected: primary {primary}, secondary {secondary}")?;
        }
    }

    let m = report.metrics.as_ref();
    writeln!(w, "{S4}Dice: {}", f64_to_display(m.map(|m| m.dice)))?;
    writeln!(w, "{S4}Jaccard: {}", f64_to_display(m.map(|m| m.jaccard)))?;
    writeln!(
        w,
        "{S4}Lesion volume: {} mm^3",
        f64_to_display(m.map(|m| m.volume_mm3))
    )?;
    write!(
        w,
        "{S4}Hausdorff: {} mm",
        f64_to_display(m.map(|m| m.hausdorff))
    )
}

/// 将汇总写进 `w` 中.
fn summarize_into<W: Write>(s: &BatchSummary, w: &mut W) -> io::Result<()> {
    writeln!(w, "Summary:")?;
    writeln!(w, "{S4}Cases: {}", s.total)?;
    writeln!(w, "{S4}Accepted on primary: {}", s.primary)?;
    writeln!(w, "{S4}Accepted on secondary: {}", s.secondary)?;
    writeln!(w, "{S4}Rejected: {}", s.rejected)?;
    writeln!(w, "{S4}Failed: {}", s.failed)?;
    write!(w, "{S4}Mean Dice: {}", f64_to_display(s.mean_dice))
}

/// 批处理最终结果.
pub struct BatchResult {
    rows: Vec<(String, SegResult<CaseReport>)>,
    summary: BatchSummary,
}

impl BatchResult {
    pub fn new(rows: Vec<(String, SegResult<CaseReport>)>) -> Self {
        let summary = BatchSummary::from_results(&rows);
        Self { rows, summary }
    }

    /// 输出每个病例的结果和汇总.
    pub fn analyze(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        utils::sep_to(&mut out)?;
        let mut buf = Vec::with_capacity(512);

        for (case, r) in self.rows.iter() {
            describe_into(case, r, &mut buf)?;
            writeln!(out, "{}", String::from_utf8_lossy(&buf))?;
            buf.clear();

            utils::sep_to(&mut out)?;
        }
        summarize_into(&self.summary, &mut buf)?;
        writeln!(out, "{}", String::from_utf8_lossy(&buf))?;
        utils::sep_to(&mut out)
    }
}
