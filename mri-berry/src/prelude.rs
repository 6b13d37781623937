//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::{Geometry, GeometryAttr, ImgWriteVis, IntensityWindow, Mask, Volume};
pub use crate::{SegError, SegResult};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};
pub use crate::consts::{NORMALIZED_MAX, NORMALIZED_MIN};

pub use crate::config::{ModalityParameters, PipelineConfig, SmoothingParams, WindowBounds};
pub use crate::pipeline::{
    Channel, ComponentSelector, ComponentStats, FallbackController, MorphStep, Normalizer,
    PostProcessor, RegionGrower, RejectReason, SegmentationResult, SeedGenerator, Selection,
    Smoother,
};

pub use crate::eval::{Evaluator, MetricReport};

pub use crate::batch::{run_batch, BatchSummary, CaseReport};
pub use crate::dataset::{self, home_dataset_dir_with, MemorySource, NiftiSource, VolumeSource};
