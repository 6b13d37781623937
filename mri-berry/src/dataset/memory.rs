use super::VolumeSource;
use crate::{Mask, SegError, SegResult, Volume};
use std::collections::HashMap;

/// 内存数据源. 常用于测试和交互式调参.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    volumes: HashMap<(String, String), Volume>,
    references: HashMap<String, Mask>,
}

impl MemorySource {
    /// 创建空数据源.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入 (或替换) 病例 `case` 的 `modality` 模态扫描.
    pub fn insert_volume(&mut self, case: &str, modality: &str, volume: Volume) -> &mut Self {
        self.volumes
            .insert((case.to_owned(), modality.to_owned()), volume);
        self
    }

    /// 加入 (或替换) 病例 `case` 的真值标签.
    pub fn insert_reference(&mut self, case: &str, reference: Mask) -> &mut Self {
        self.references.insert(case.to_owned(), reference);
        self
    }

    /// 按字典序列出所有病例.
    pub fn cases(&self) -> Vec<String> {
        let mut ans: Vec<String> = self
            .volumes
            .keys()
            .map(|(case, _)| case)
            .chain(self.references.keys())
            .cloned()
            .collect();
        ans.sort_unstable();
        ans.dedup();
        ans
    }
}

impl VolumeSource for MemorySource {
    fn volume(&self, case: &str, modality: &str) -> SegResult<Volume> {
        self.volumes
            .get(&(case.to_owned(), modality.to_owned()))
            .cloned()
            .ok_or_else(|| SegError::not_found(case, format!("modality {modality}")))
    }

    fn reference(&self, case: &str) -> SegResult<Mask> {
        self.references
            .get(case)
            .cloned()
            .ok_or_else(|| SegError::not_found(case, "reference"))
    }

    #[inline]
    fn contains(&self, case: &str, modality: &str) -> bool {
        self.volumes
            .contains_key(&(case.to_owned(), modality.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySource;
    use crate::dataset::VolumeSource;
    use crate::{Mask, SegError, Volume};
    use ndarray::Array3;

    #[test]
    fn test_memory_source() {
        let v = Volume::new(Array3::zeros((1, 2, 2)), [1.0; 3]).unwrap();
        let m = Mask::new(Array3::zeros((1, 2, 2)), [1.0; 3]).unwrap();
        let mut src = MemorySource::new();
        src.insert_volume("b", "dwi", v.clone())
            .insert_volume("a", "flair", v)
            .insert_reference("b", m.clone());

        assert_eq!(src.cases(), vec!["a", "b"]);
        assert!(src.contains("b", "dwi"));
        assert!(!src.contains("b", "flair"));
        assert_eq!(src.reference("b").unwrap(), m);
        assert!(matches!(
            src.volume("b", "flair"),
            Err(SegError::NotFound { .. })
        ));
        assert!(matches!(src.reference("a"), Err(SegError::NotFound { .. })));
    }
}
