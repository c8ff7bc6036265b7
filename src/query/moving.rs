use std::collections::VecDeque;

/// Simple moving average over the last `period` values.
///
/// Output has the same length as the input; positions before the window
/// fills are `None`.
pub fn moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut window = VecDeque::with_capacity(period);
    let mut sum = 0.0;

    values
        .iter()
        .map(|&v| {
            window.push_back(v);
            sum += v;
            if window.len() > period {
                if let Some(old) = window.pop_front() {
                    sum -= old;
                }
            }
            (window.len() == period).then(|| sum / period as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_short_series() {
        assert_eq!(moving_average(&[1.0], 3), vec![None]);
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 5.0], 0), vec![None; 4]);
    }
}
