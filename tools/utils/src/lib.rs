//! 批处理工具依赖的通用组件.

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 将可选的浮点数格式化为固定 6 位小数, 缺失时显示 `/`.
pub fn f64_to_display(f: Option<f64>) -> String {
    match f {
        Some(f) if f.is_infinite() => "inf".to_string(),
        Some(f) => format!("{f:.6}"),
        None => "/".to_string(),
    }
}
