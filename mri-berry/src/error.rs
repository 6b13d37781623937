//! 运行时错误.

use crate::Geometry;
use thiserror::Error;

/// 分割流程的运行时错误.
///
/// 注意 "两个模态都没有可接受的连通分量" 不在此列,
/// 它由 [`crate::SegmentationResult::Rejected`] 表示.
#[derive(Debug, Error)]
pub enum SegError {
    /// 空的或退化的输入, 或者非法参数.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 两个网格的形状或体素分辨率不一致.
    #[error("geometry mismatch: {left} vs {right}")]
    GeometryMismatch {
        /// 左操作数的几何信息.
        left: Geometry,

        /// 右操作数的几何信息.
        right: Geometry,
    },

    /// 请求的病例, 模态或真值不存在.
    #[error("case `{case}`: {what} not found")]
    NotFound {
        /// 病例标识.
        case: String,

        /// 缺失的对象描述, 例如 `modality dwi`.
        what: String,
    },

    /// 底层 nifti 读写错误.
    #[error("nifti: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 切片预览图写入错误.
    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    /// 其他底层 I/O 错误.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件解析错误.
    #[error("config: {0}")]
    Config(String),

    /// 任务在两次模态尝试之间被取消.
    #[error("cancelled")]
    Cancelled,
}

impl SegError {
    /// 构造 [`SegError::InvalidInput`].
    #[inline]
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// 构造 [`SegError::NotFound`].
    #[inline]
    pub(crate) fn not_found(case: &str, what: impl Into<String>) -> Self {
        Self::NotFound {
            case: case.to_owned(),
            what: what.into(),
        }
    }
}

/// 分割流程运行时错误.
pub type SegResult<T> = Result<T, SegError>;
