//! 端到端测试: 从磁盘数据集出发, 以默认配置分割, 保存, 重新加载并评估.

use mri_berry::batch::{run_batch, BatchSummary};
use mri_berry::prelude::*;
use ndarray::{s, Array3};

const SHAPE: Idx3d = (12, 16, 16);
const SPACING: [f64; 3] = [2.0, 1.0, 1.0];

fn init_logger() {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();
}

/// 强度在 `100..=120` 之间起伏的背景.
fn background() -> Array3<f32> {
    Array3::from_shape_fn(SHAPE, |(z, h, w)| 100.0 + ((z + h + w) % 3) as f32 * 10.0)
}

/// 背景上有一个边长为 6 的高亮立方体病灶.
fn lesion_volume() -> Volume {
    let mut data = background();
    data.slice_mut(s![3..9, 5..11, 5..11]).fill(1000.0);
    Volume::new(data, SPACING).unwrap()
}

/// 背景上只有互不相邻的孤立亮点, 不存在可接受的连通分量.
fn speckle_volume() -> Volume {
    let data = Array3::from_shape_fn(SHAPE, |(z, h, w)| {
        if z % 3 == 0 && h % 3 == 0 && w % 3 == 0 {
            1000.0
        } else {
            100.0
        }
    });
    Volume::new(data, SPACING).unwrap()
}

fn reference() -> Mask {
    let mut data = Array3::<u8>::zeros(SHAPE);
    data.slice_mut(s![3..9, 5..11, 5..11]).fill(MASK_FOREGROUND);
    Mask::new(data, SPACING).unwrap()
}

#[test]
fn test_primary_then_fallback_in_memory() {
    init_logger();
    let config = PipelineConfig::default();
    let mut src = MemorySource::new();
    src.insert_volume("a", "dwi", lesion_volume())
        .insert_volume("a", "flair", speckle_volume())
        .insert_reference("a", reference())
        .insert_volume("b", "dwi", speckle_volume())
        .insert_volume("b", "flair", lesion_volume())
        .insert_reference("b", reference())
        .insert_volume("c", "dwi", speckle_volume())
        .insert_volume("c", "flair", speckle_volume());

    let cases: Vec<String> = src.cases();
    let out = run_batch(&src, &config, &cases, None);

    let a = out[0].1.as_ref().unwrap();
    assert_eq!(a.result.channel(), Some(Channel::Primary));
    assert!(a.metrics.unwrap().dice > 0.9);

    let b = out[1].1.as_ref().unwrap();
    assert_eq!(b.result.channel(), Some(Channel::Secondary));
    assert!(b.metrics.unwrap().dice > 0.9);

    let c = out[2].1.as_ref().unwrap();
    assert!(!c.result.is_accepted());
    assert!(c.metrics.is_none());

    let summary = BatchSummary::from_results(&out);
    assert_eq!(
        (summary.primary, summary.secondary, summary.rejected, summary.failed),
        (1, 1, 1, 0)
    );
}

#[test]
fn test_nifti_dataset_round_trip() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("case-01")).unwrap();
    let src = NiftiSource::new(dir.path()).unwrap();
    lesion_volume()
        .save(src.volume_path("case-01", "dwi"))
        .unwrap();
    speckle_volume()
        .save(src.volume_path("case-01", "flair"))
        .unwrap();
    reference().save(src.reference_path("case-01")).unwrap();

    let config = PipelineConfig::default();
    let result = FallbackController::new(&config)
        .segment(&src, "case-01")
        .unwrap();
    let SegmentationResult::Accepted { mask, channel, .. } = result else {
        panic!("expected acceptance");
    };
    assert_eq!(channel, Channel::Primary);
    assert_eq!(mask.geometry(), lesion_volume().geometry());

    // 持久化后重新加载, 模拟人工修订后的再评估.
    src.save_segmentation("case-01", &mask).unwrap();
    let edited = src.edited_mask("case-01").unwrap();
    assert_eq!(edited, mask);

    let ev = Evaluator::new();
    let before = ev.evaluate(&mask, &src.reference("case-01").unwrap()).unwrap();
    let after = ev.evaluate(&edited, &src.reference("case-01").unwrap()).unwrap();
    assert_eq!(before, after);
    assert!(after.hausdorff.is_finite());
}

#[test]
fn test_missing_modality_and_geometry_mismatch() {
    init_logger();
    let config = PipelineConfig::default();
    let mut src = MemorySource::new();
    src.insert_volume("only-dwi", "dwi", lesion_volume())
        .insert_volume("odd", "dwi", lesion_volume())
        .insert_volume("odd", "flair", lesion_volume())
        .insert_reference(
            "odd",
            Mask::new(Array3::zeros(SHAPE), [1.0; 3]).unwrap(),
        );

    let out = run_batch(
        &src,
        &config,
        &["only-dwi".to_string(), "odd".to_string()],
        None,
    );
    assert!(matches!(out[0].1, Err(SegError::NotFound { .. })));
    assert!(matches!(out[1].1, Err(SegError::GeometryMismatch { .. })));
}
