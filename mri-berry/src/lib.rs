#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 对 3D 脑 MRI 扫描进行缺血性病灶分割, 并基于真值标签评估分割结果.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 每个病例 (case) 包含两个 MRI 模态 (主模态与次模态) 以及一个真值标签.
//!   主模态无法得到可接受的连通分量时, 流程会 **恰好一次** 回退到次模态.
//! 2. 所有处理阶段都是纯函数: 输入 [`Volume`] / [`Mask`] 不会被就地修改,
//!   每个阶段都返回新的对象.
//! 3. "找不到病灶" 不是错误, 而是 [`SegmentationResult::Rejected`].
//!   只有 "分割无法运行" (非法输入, 几何不一致, 文件缺失) 才是 [`SegError`].
//!
//! # 开发计划
//!
//! ### NIfTI 体数据与几何信息 ✅
//!
//! 体数据按照 `(z, h, w)` 访问, 体素分辨率以毫米为单位.
//!
//! 实现位于 `mri-berry/src/data`.
//!
//! ### 体素级基础算法 ✅
//!
//! 百分位统计, 梯度各向异性扩散, 连通阈值区域生长, 二值形态学, 投票式空洞填充,
//! 连通分量标记, Hausdorff 距离.
//!
//! 实现位于 `mri-berry/src/filter`.
//!
//! ### 分割流水线 ✅
//!
//! 归一化 -> 平滑 -> 种子点 -> 区域生长 -> 形态学后处理 -> 最大连通分量选择.
//!
//! 实现位于 `mri-berry/src/pipeline`.
//!
//! ### 模态回退状态机 ✅
//!
//! `Start -> TryPrimary -> (Accepted | TrySecondary) -> (Accepted | Rejected)`.
//!
//! 实现位于 `mri-berry/src/pipeline/fallback.rs`.
//!
//! ### 评估指标 ✅
//!
//! Dice, Jaccard, 对称 Hausdorff 距离, 病灶物理体积.
//!
//! 实现位于 `mri-berry/src/eval.rs`.
//!
//! ### 数据集与批处理 ✅
//!
//! 按病例目录加载模态与真值, 多病例并行处理, 单病例错误不影响整批.
//!
//! 实现位于 `mri-berry/src/dataset` 和 `mri-berry/src/batch.rs`.

/// 三维索引 (z, 高, 宽), 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D MRI nii 文件基础数据结构.
mod data;

mod error;

pub use data::{Geometry, GeometryAttr, ImgWriteVis, IntensityWindow, Mask, PosIter3d, Volume};

pub use error::{SegError, SegResult};

pub mod consts;

pub mod filter;

pub mod pipeline;

pub use pipeline::{
    Channel, ComponentSelector, ComponentStats, FallbackController, MorphStep, Normalizer,
    PostProcessor, RegionGrower, RejectReason, SegmentationResult, SeedGenerator, Seeds,
    Selection, Smoother,
};

pub mod config;

pub use config::{ModalityParameters, PipelineConfig, SmoothingParams, WindowBounds};

pub mod eval;

pub use eval::{Evaluator, MetricReport};

pub mod dataset;

pub mod batch;

pub mod prelude;
