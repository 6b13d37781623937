//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 二值标签中, 背景的体素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 二值标签中, 前景 (病灶) 的体素值.
    pub const MASK_FOREGROUND: u8 = 1;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, MASK_BACKGROUND)
    }

    /// 体素是否是前景? 标记图中任何非零标签都视为前景.
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        !is_background(p)
    }
}

/// 归一化后的强度下限.
pub const NORMALIZED_MIN: f32 = 0.0;

/// 归一化后的强度上限.
pub const NORMALIZED_MAX: f32 = 500.0;

/// 默认模态名.
pub mod modality {
    /// 默认主模态 (弥散加权成像).
    pub const PRIMARY: &str = "dwi";

    /// 默认次模态 (液体衰减反转恢复序列).
    pub const SECONDARY: &str = "flair";
}

/// 默认的种子点强度阈值 (严格大于该值的体素成为种子点).
pub const DEFAULT_SEED_THRESHOLD: f32 = 490.0;

/// 默认的最小可接受连通分量体素数.
pub const DEFAULT_MIN_COMPONENT_SIZE: usize = 20;

/// 病例目录下, 分割结果的默认持久化文件名.
pub const SEGMENTATION_FILENAME: &str = "segmentation.nii.gz";

/// 病例目录下, 真值标签的默认文件名.
pub const REFERENCE_FILENAME: &str = "reference.nii.gz";
