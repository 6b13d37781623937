//! 缺血性病灶批量分割与评估.
//!
//! 对数据集中的每个病例运行 "主模态 -> 次模态" 回退分割, 保存分割结果,
//! 并与真值标签比较. 所有输入都来自环境变量:
//!
//! - `$LESION_DATA_DIR`: 数据集根目录, 默认 `$HOME/dataset/lesion`;
//! - `$LESION_CONFIG`: TOML 流程配置, 默认使用内置配置;
//! - `$LESION_PREVIEW_DIR`: 若设置, 为每个被接受的标签导出中间层切片 PNG;
//! - `$RUST_LOG`: 日志级别, 默认 `info`.

mod result;
mod runner;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let jobs = utils::cpus();
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()?;
    log::debug!("{jobs} worker threads");

    let result = runner::run()?;
    result.analyze()?;
    Ok(())
}
