//! 程序运行函数.

use crate::result::BatchResult;
use anyhow::Context;
use mri_berry::batch::run_batch;
use mri_berry::{GeometryAttr, ImgWriteVis};
use std::fs;
use utils::loader;

/// 实际运行.
pub fn run() -> anyhow::Result<BatchResult> {
    let source = loader::source_from(None).context("loading dataset")?;
    let config = loader::config_from(None).context("loading config")?;
    let preview = loader::preview_dir_from_env();

    let cases = source.cases()?;
    anyhow::ensure!(!cases.is_empty(), "no case under {}", source.root().display());
    if let Some(dir) = &preview {
        fs::create_dir_all(dir)?;
    }

    log::info!(
        "Segmenting {} cases under {} ({} -> {})",
        cases.len(),
        source.root().display(),
        config.primary.modality,
        config.secondary.modality
    );
    let rows = run_batch(&source, &config, &cases, None);

    for (case, report) in rows.iter() {
        let Some(mask) = report.as_ref().ok().and_then(|r| r.result.mask()) else {
            continue;
        };
        match source.save_segmentation(case, mask) {
            Ok(path) => log::debug!("saved {}", path.display()),
            Err(e) => log::warn!("case `{case}`: saving segmentation failed: {e}"),
        }
        if let Some(dir) = &preview {
            let path = dir.join(format!("{case}.png"));
            if let Err(e) = mask.save_slice(mask.len_z() / 2, &path) {
                log::warn!("case `{case}`: saving preview failed: {e}");
            }
        }
    }

    Ok(BatchResult::new(rows))
}
