//! 对 `mri-berry::dataset` 和 `mri-berry::config` 的更一层封装.
//! 提供从环境变量或用户主目录获取数据集与配置的方式.

use mri_berry::dataset::{self, NiftiSource};
use mri_berry::{PipelineConfig, SegError, SegResult};
use std::env;
use std::path::{Path, PathBuf};

/// 数据集根目录环境变量.
pub const DATA_DIR_ENV: &str = "LESION_DATA_DIR";

/// 流程配置文件环境变量.
pub const CONFIG_ENV: &str = "LESION_CONFIG";

/// 切片预览输出目录环境变量.
pub const PREVIEW_DIR_ENV: &str = "LESION_PREVIEW_DIR";

/// 读取非空环境变量.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// 获取数据集根目录.
///
/// 1. 若环境变量 `$LESION_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/lesion`.
pub fn data_dir_from_env_or_home() -> Option<PathBuf> {
    match non_empty_var(DATA_DIR_ENV) {
        Some(d) => Some(PathBuf::from(d)),
        None => dataset::home_dataset_dir(),
    }
}

/// 若环境变量 `$LESION_PREVIEW_DIR` 非空, 返回其值.
pub fn preview_dir_from_env() -> Option<PathBuf> {
    non_empty_var(PREVIEW_DIR_ENV).map(PathBuf::from)
}

/// 从 `path` 或者 [`data_dir_from_env_or_home`] 创建数据源.
pub fn source_from(path: Option<&Path>) -> SegResult<NiftiSource> {
    match path {
        Some(p) => NiftiSource::new(p),
        None => {
            let dir = data_dir_from_env_or_home()
                .ok_or_else(|| SegError::Config("cannot locate home directory".to_string()))?;
            NiftiSource::new(dir)
        }
    }
}

/// 加载流程配置.
///
/// 1. 若给出 `path`, 从该文件加载;
/// 2. 否则若环境变量 `$LESION_CONFIG` 非空, 从其指向的文件加载;
/// 3. 否则使用默认配置.
pub fn config_from(path: Option<&Path>) -> SegResult<PipelineConfig> {
    let from_env = non_empty_var(CONFIG_ENV).map(PathBuf::from);
    match path.map(Path::to_owned).or(from_env) {
        Some(p) => PipelineConfig::from_toml_file(p),
        None => Ok(PipelineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::{config_from, source_from};
    use mri_berry::SegError;

    #[test]
    fn test_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "[window]\nkind = \"min_max_margin\"\nmargin = 5.0\n").unwrap();
        let c = config_from(Some(&path)).unwrap();
        assert_eq!(c.primary.modality, "dwi");

        let src = source_from(Some(dir.path())).unwrap();
        assert_eq!(src.root(), dir.path());
        assert!(matches!(
            source_from(Some(&dir.path().join("missing"))),
            Err(SegError::NotFound { .. })
        ));
    }
}
