use num::ToPrimitive;
use ordered_float::OrderedFloat;

/// 计算 `values` 中有限值的第 `p` 百分位数 (`0 <= p <= 100`).
///
/// 与 numpy 的默认行为一致: 在排序后的相邻两个样本之间线性插值.
/// 若不存在有限值, 或 `p` 不在 `[0, 100]` 内, 则返回 `None`.
#[inline]
pub fn percentile<T, I>(values: I, p: f64) -> Option<f64>
where
    T: ToPrimitive,
    I: IntoIterator<Item = T>,
{
    percentiles(values, [p]).map(|[v]| v)
}

/// 同 [`percentile`], 但一次求多个百分位数. 样本只排序一次.
pub fn percentiles<T, I, const N: usize>(values: I, ps: [f64; N]) -> Option<[f64; N]>
where
    T: ToPrimitive,
    I: IntoIterator<Item = T>,
{
    if !ps.iter().all(|p| (0.0..=100.0).contains(p)) {
        return None;
    }
    let mut sorted: Vec<OrderedFloat<f64>> = values
        .into_iter()
        .filter_map(|v| v.to_f64())
        .filter(|v| v.is_finite())
        .map(OrderedFloat)
        .collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable();

    Some(ps.map(|p| {
        let rank = p / 100.0 * (sorted.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        let (a, b) = (sorted[lo].0, sorted[hi].0);
        a + (b - a) * (rank - lo as f64)
    }))
}

#[cfg(test)]
mod tests {
    use super::{percentile, percentiles};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_percentile_numpy_compatible() {
        let v: Vec<u16> = (1..=10).collect();
        // np.percentile(range(1, 11), [0, 5, 50, 99, 100])
        assert!(f64_eq(percentile(v.iter().copied(), 0.0).unwrap(), 1.0));
        assert!(f64_eq(percentile(v.iter().copied(), 5.0).unwrap(), 1.45));
        assert!(f64_eq(percentile(v.iter().copied(), 50.0).unwrap(), 5.5));
        assert!(f64_eq(percentile(v.iter().copied(), 99.0).unwrap(), 9.91));
        assert!(f64_eq(percentile(v.iter().copied(), 100.0).unwrap(), 10.0));
    }

    #[test]
    fn test_percentiles_share_one_sort() {
        let v: Vec<f32> = (1..=10).rev().map(|x| x as f32).collect();
        let [lo, mid, hi] = percentiles(v.iter().copied(), [5.0, 50.0, 99.0]).unwrap();
        assert!(f64_eq(lo, 1.45));
        assert!(f64_eq(mid, 5.5));
        assert!(f64_eq(hi, 9.91));
        assert_eq!(percentiles(v.iter().copied(), [5.0, 100.5]), None);
        assert_eq!(percentiles(Vec::<f32>::new(), [5.0, 99.0]), None);
    }

    #[test]
    fn test_percentile_corner_cases() {
        assert_eq!(percentile(Vec::<f32>::new(), 50.0), None);
        assert_eq!(percentile(vec![f32::NAN], 50.0), None);
        assert_eq!(percentile(vec![1.0f32], 101.0), None);
        assert_eq!(percentile(vec![3.0f32, f32::NAN], 50.0), Some(3.0));
    }
}
