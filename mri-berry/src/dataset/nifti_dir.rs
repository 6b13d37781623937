//! 按病例目录组织的 nii 数据集.
//!
//! ```text
//! {root}/
//! ├── {case}/
//! │   ├── {modality}.nii.gz      (由 FilenameBuilder 决定)
//! │   ├── reference.nii.gz
//! │   └── segmentation.nii.gz    (分割结果, 可被人工修订)
//! └── ...
//! ```

use super::VolumeSource;
use crate::consts::{REFERENCE_FILENAME, SEGMENTATION_FILENAME};
use crate::{Mask, SegError, SegResult, Volume};
use std::path::{Path, PathBuf};

/// 文件名构造器. 接受模态标识, 获得病例目录下的文件名.
pub type FilenameBuilder = fn(&str) -> String;

/// 默认文件名构造器: `{modality}.nii.gz`.
#[inline]
pub fn default_filename(modality: &str) -> String {
    format!("{modality}.nii.gz")
}

/// 磁盘上的 nii 数据集.
#[derive(Clone, Debug)]
pub struct NiftiSource {
    root: PathBuf,
    builder: FilenameBuilder,
}

impl NiftiSource {
    /// 以数据集根目录创建数据源. `root` 不是目录时返回 [`SegError::NotFound`].
    pub fn new<P: AsRef<Path>>(root: P) -> SegResult<Self> {
        let root = root.as_ref().to_owned();
        if !root.is_dir() {
            return Err(SegError::not_found(
                "*",
                format!("dataset directory {}", root.display()),
            ));
        }
        Ok(Self {
            root,
            builder: default_filename,
        })
    }

    /// 替换模态文件名构造器.
    #[inline]
    pub fn with_builder(mut self, builder: FilenameBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// 数据集根目录.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 病例目录.
    #[inline]
    pub fn case_dir(&self, case: &str) -> PathBuf {
        self.root.join(case)
    }

    /// 病例 `case` 的 `modality` 模态文件路径.
    #[inline]
    pub fn volume_path(&self, case: &str, modality: &str) -> PathBuf {
        self.case_dir(case).join((self.builder)(modality))
    }

    /// 病例 `case` 的真值标签路径.
    #[inline]
    pub fn reference_path(&self, case: &str) -> PathBuf {
        self.case_dir(case).join(REFERENCE_FILENAME)
    }

    /// 病例 `case` 的分割结果路径.
    #[inline]
    pub fn segmentation_path(&self, case: &str) -> PathBuf {
        self.case_dir(case).join(SEGMENTATION_FILENAME)
    }

    /// 按字典序列出所有病例 (根目录下的子目录名).
    pub fn cases(&self) -> SegResult<Vec<String>> {
        let mut ans = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    ans.push(name.to_owned());
                }
            }
        }
        ans.sort_unstable();
        Ok(ans)
    }

    /// 将分割结果保存到病例目录, 返回文件路径.
    pub fn save_segmentation(&self, case: &str, mask: &Mask) -> SegResult<PathBuf> {
        let dir = self.case_dir(case);
        if !dir.is_dir() {
            return Err(SegError::not_found(case, "case directory"));
        }
        let path = self.segmentation_path(case);
        mask.save(&path)?;
        Ok(path)
    }

    /// 重新加载 (可能被人工修订过的) 分割结果.
    pub fn edited_mask(&self, case: &str) -> SegResult<Mask> {
        open_existing(case, "segmentation", &self.segmentation_path(case), |p| Mask::open(p))
    }
}

/// 文件存在时才打开, 否则返回 [`SegError::NotFound`].
fn open_existing<T, F>(case: &str, what: &str, path: &Path, open: F) -> SegResult<T>
where
    F: FnOnce(&Path) -> SegResult<T>,
{
    if !path.is_file() {
        return Err(SegError::not_found(
            case,
            format!("{what} ({})", path.display()),
        ));
    }
    log::trace!("loading {}", path.display());
    open(path)
}

impl VolumeSource for NiftiSource {
    fn volume(&self, case: &str, modality: &str) -> SegResult<Volume> {
        let path = self.volume_path(case, modality);
        open_existing(case, &format!("modality {modality}"), &path, |p| Volume::open(p))
    }

    fn reference(&self, case: &str) -> SegResult<Mask> {
        open_existing(case, "reference", &self.reference_path(case), |p| Mask::open(p))
    }

    #[inline]
    fn contains(&self, case: &str, modality: &str) -> bool {
        self.volume_path(case, modality).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::NiftiSource;
    use crate::dataset::VolumeSource;
    use crate::{GeometryAttr, Mask, SegError, Volume};
    use ndarray::Array3;

    #[test]
    fn test_layout_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        for case in ["case-02", "case-01"] {
            std::fs::create_dir(dir.path().join(case)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "not a case").unwrap();

        let src = NiftiSource::new(dir.path()).unwrap();
        assert_eq!(src.cases().unwrap(), vec!["case-01", "case-02"]);

        let v = Volume::new(Array3::from_elem((2, 3, 4), 7.0), [2.0, 1.0, 1.0]).unwrap();
        v.save(src.volume_path("case-01", "dwi")).unwrap();
        assert!(src.contains("case-01", "dwi"));
        assert!(!src.contains("case-01", "flair"));

        let back = src.volume("case-01", "dwi").unwrap();
        assert_eq!(back.geometry(), v.geometry());

        let mut data = Array3::<u8>::zeros((2, 3, 4));
        data[(1, 1, 1)] = 1;
        let m = Mask::new(data, [2.0, 1.0, 1.0]).unwrap();
        let path = src.save_segmentation("case-01", &m).unwrap();
        assert!(path.ends_with("case-01/segmentation.nii.gz"));
        assert_eq!(src.edited_mask("case-01").unwrap(), m);
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();
        let src = NiftiSource::new(dir.path()).unwrap();

        assert!(matches!(
            src.volume("c", "dwi"),
            Err(SegError::NotFound { .. })
        ));
        assert!(matches!(src.reference("c"), Err(SegError::NotFound { .. })));
        assert!(matches!(src.edited_mask("c"), Err(SegError::NotFound { .. })));
        let m = Mask::new(Array3::zeros((1, 1, 1)), [1.0; 3]).unwrap();
        assert!(matches!(
            src.save_segmentation("missing", &m),
            Err(SegError::NotFound { .. })
        ));
        assert!(matches!(
            NiftiSource::new(dir.path().join("nope")),
            Err(SegError::NotFound { .. })
        ));
    }

    #[test]
    fn test_custom_filename() {
        let dir = tempfile::tempdir().unwrap();
        let src = NiftiSource::new(dir.path())
            .unwrap()
            .with_builder(|m| format!("{}.nii", m.to_uppercase()));
        assert!(src.volume_path("c", "dwi").ends_with("c/DWI.nii"));
    }
}
