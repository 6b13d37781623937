use crate::consts::{NORMALIZED_MAX, NORMALIZED_MIN};

/// 强度窗口, 包含窗下限和窗上限.
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntensityWindow {
    lower: f32,
    upper: f32,
}

impl IntensityWindow {
    /// 构建强度窗口.
    ///
    /// `lower` 和 `upper` 必须是有限值, 否则返回 `None`.
    /// 允许 `lower >= upper` 的退化窗口: 此时窗口退化为阶跃函数.
    pub fn new(lower: f32, upper: f32) -> Option<IntensityWindow> {
        (lower.is_finite() && upper.is_finite()).then_some(Self { lower, upper })
    }

    /// 构建一个便于展示归一化扫描的窗口, 即 `[0, 500]`.
    #[inline]
    pub const fn from_normalized() -> IntensityWindow {
        Self {
            lower: NORMALIZED_MIN,
            upper: NORMALIZED_MAX,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.lower
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.upper
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.upper - self.lower
    }

    /// 窗口是否退化 (窗宽不为正)?
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0
    }

    /// 窗口位置 `[0.0, 1.0]`. 非有限值映射为 0.
    fn ratio(&self, v: f32) -> f32 {
        if !v.is_finite() {
            return 0.0;
        }
        if self.is_degenerate() {
            return if v >= self.upper { 1.0 } else { 0.0 };
        }
        if v <= self.lower {
            0.0
        } else if v >= self.upper {
            1.0
        } else {
            (v - self.lower) / self.width()
        }
    }

    /// 求在当前窗口设置下, `v` 映射到归一化范围
    /// `[NORMALIZED_MIN, NORMALIZED_MAX]` 的值. 窗外的值被截断.
    #[inline]
    pub fn eval(&self, v: f32) -> f32 {
        let out = NORMALIZED_MIN + self.ratio(v) * (NORMALIZED_MAX - NORMALIZED_MIN);
        out.clamp(NORMALIZED_MIN, NORMALIZED_MAX)
    }

    /// 求在当前窗口设置下, `v` 对应的灰度图像素整数值 (0 <= value <= 255).
    #[inline]
    pub fn eval_u8(&self, v: f32) -> u8 {
        // 255, not 256.
        (self.ratio(v) * 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::IntensityWindow;

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_window_invalid_input() {
        assert!(IntensityWindow::new(f32::NAN, 1.0).is_none());
        assert!(IntensityWindow::new(0.0, f32::INFINITY).is_none());
    }

    #[test]
    fn test_window_generic() {
        // [60, 100]
        let w = IntensityWindow::new(60.0, 100.0).unwrap();
        assert_eq!(w.eval(f32::NAN), 0.0);
        assert_eq!(w.eval(f32::MIN), 0.0);
        assert_eq!(w.eval(f32::MAX), 500.0);

        assert!(float_eq(w.eval(50.0), 0.0));
        assert!(float_eq(w.eval(60.0), 0.0));
        assert!(float_eq(w.eval(70.0), 125.0));
        assert!(float_eq(w.eval(80.0), 250.0));
        assert!(float_eq(w.eval(90.0), 375.0));
        assert!(float_eq(w.eval(100.0), 500.0));
        assert!(float_eq(w.eval(1e6), 500.0));

        assert_eq!(w.eval_u8(80.0), (255.0 * 0.5) as u8);
        assert_eq!(w.eval_u8(100.0), u8::MAX);
    }

    #[test]
    fn test_window_degenerate() {
        let w = IntensityWindow::new(5.0, 5.0).unwrap();
        assert!(w.is_degenerate());
        assert_eq!(w.eval(4.9), 0.0);
        assert_eq!(w.eval(5.0), 500.0);
    }
}
