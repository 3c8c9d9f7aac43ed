/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```should_panic
/// # use algae_rl::assert_interval;
/// let value = 2.0;
/// assert_interval!(value, 0.0, 1.0);
/// ```
/// This will panic with the message "Invalid value for \`value\`. Must be in the interval \[0, 1\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}

/// Index of the greatest value, preferring the lowest index on ties
///
/// **Panics** if `values` is empty
pub(crate) fn argmax(values: &[f64]) -> usize {
    assert!(!values.is_empty(), "argmax of an empty slice");
    let mut best = 0;
    for (ix, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = ix;
        }
    }
    best
}

/// Greatest value in the slice, or `0.0` if it is empty
pub(crate) fn max_value(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_lowest_index() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1, "first of equal maxima");
        assert_eq!(argmax(&[-1.0]), 0, "single element");
        assert_eq!(argmax(&[0.0, -0.5, 0.25]), 2, "max at the end");
    }

    #[test]
    fn max_value_functional() {
        assert_eq!(max_value(&[0.5, -2.0, 1.5]), 1.5);
        assert_eq!(max_value(&[]), 0.0, "empty defaults to zero");
    }

    #[test]
    #[should_panic(expected = "Invalid value for `alpha`")]
    fn assert_interval_panics_outside() {
        let alpha = 1.5;
        assert_interval!(alpha, 0.0, 1.0);
    }
}
