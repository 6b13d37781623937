//! 数据集操作.
//!
//! 分割流程只通过 [`VolumeSource`] 获取数据, 不关心数据来自磁盘还是内存.

use std::path::{Path, PathBuf};

mod memory;
mod nifti_dir;

pub use memory::MemorySource;
pub use nifti_dir::{default_filename, FilenameBuilder, NiftiSource};

use crate::{Mask, SegResult, Volume};

/// 按 (病例, 模态) 提供扫描, 按病例提供真值标签的数据源.
pub trait VolumeSource {
    /// 获取病例 `case` 的 `modality` 模态扫描. 不存在时返回 [`crate::SegError::NotFound`].
    fn volume(&self, case: &str, modality: &str) -> SegResult<Volume>;

    /// 获取病例 `case` 的真值标签. 不存在时返回 [`crate::SegError::NotFound`].
    fn reference(&self, case: &str) -> SegResult<Mask>;

    /// 病例 `case` 是否有 `modality` 模态扫描? 该检查不应加载数据.
    fn contains(&self, case: &str, modality: &str) -> bool;
}

impl<S: VolumeSource + ?Sized> VolumeSource for &S {
    #[inline]
    fn volume(&self, case: &str, modality: &str) -> SegResult<Volume> {
        (**self).volume(case, modality)
    }

    #[inline]
    fn reference(&self, case: &str) -> SegResult<Mask> {
        (**self).reference(case)
    }

    #[inline]
    fn contains(&self, case: &str, modality: &str) -> bool {
        (**self).contains(case, modality)
    }
}

/// 获取 `{用户主目录}/dataset/lesion` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.extend(["dataset", "lesion"]);
    Some(ans)
}

/// 获取 `{用户主目录}/dataset/lesion` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}
