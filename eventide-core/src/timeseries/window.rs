/// Trailing moving average over the time window `(t - window, t]`.
///
/// `timestamps` must be ascending and `values` must have the same length.
/// Events sharing a timestamp see each other. NaN values are skipped; a
/// window holding no non-NaN value yields NaN.
///
/// Each window is summed from its own values, so a large or infinite value
/// never leaks into later windows once it has left. The window edges only
/// move forward and the sum is reused while neither edge moves.
///
/// ```
/// use eventide_core::timeseries::window::moving_average;
///
/// let out = moving_average(&[0.0, 1.0, 2.0, 5.0], &[1.0, 2.0, 3.0, 4.0], 2.0);
/// assert_eq!(out, vec![1.0, 1.5, 2.5, 4.0]);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(timestamps: &[f64], values: &[f64], window: f64) -> Vec<f64> {
    debug_assert_eq!(timestamps.len(), values.len());
    let n = timestamps.len().min(values.len());
    let mut out = Vec::with_capacity(n);
    let (mut begin, mut end) = (0, 0);
    let mut mean = f64::NAN;

    for i in 0..n {
        let t = timestamps[i];
        let (prev_begin, prev_end) = (begin, end);
        while end < n && timestamps[end] <= t {
            end += 1;
        }
        while begin < end && timestamps[begin] <= t - window {
            begin += 1;
        }
        if i == 0 || begin != prev_begin || end != prev_end {
            mean = window_mean(&values[begin..end]);
        }
        out.push(mean);
    }
    out
}

fn window_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::moving_average;

    #[test]
    fn nan_values_are_ignored() {
        let out = moving_average(&[0.0, 1.0, 2.0], &[f64::NAN, 4.0, f64::NAN], 10.0);
        assert!(out[0].is_nan());
        assert!((out[1] - 4.0).abs() < 1e-12);
        assert!((out[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ties_share_the_window() {
        let out = moving_average(&[1.0, 1.0, 3.0], &[2.0, 4.0, 8.0], 1.0);
        assert_eq!(out, vec![3.0, 3.0, 8.0]);
    }

    #[test]
    fn infinity_does_not_outlive_its_window() {
        let out = moving_average(&[0.0, 10.0, 20.0], &[f64::INFINITY, 1.0, 2.0], 5.0);
        assert_eq!(out, vec![f64::INFINITY, 1.0, 2.0]);
    }

    #[test]
    fn large_values_do_not_cancel_later_windows() {
        let out = moving_average(&[0.0, 10.0, 20.0], &[1e20, 1.0, 1.0], 5.0);
        assert_eq!(out, vec![1e20, 1.0, 1.0]);
    }

    #[test]
    fn opposite_infinities_in_one_window_give_nan() {
        let out = moving_average(&[0.0, 1.0, 10.0], &[f64::INFINITY, f64::NEG_INFINITY, 3.0], 5.0);
        assert_eq!(out[0], f64::INFINITY);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 3.0);
    }
}
