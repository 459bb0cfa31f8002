use std::env;
use std::path::PathBuf;

use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Output directory for the demo binary, overridable via `OUTPUT_DIR`.
pub fn results_dir() -> PathBuf {
    match env::var_os("OUTPUT_DIR") {
        Some(val) => PathBuf::from(val),
        None => PathBuf::from("./results"),
    }
}

/// Mean of a slice, `None` when empty. Empty groups surface as an explicit
/// undefined value rather than NaN.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Statistics::mean(values.iter()))
}

/// Median of a slice, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut data = Data::new(values.to_vec());
    Some(data.median())
}

/// `numerator / denominator`, `None` on a zero denominator.
pub fn ratio(numerator: f64, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator / denominator as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_median_of_empty_are_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_of_even_slice_averages_middle_pair() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(3.0, 0), None);
        assert_eq!(ratio(3.0, 4), Some(0.75));
    }
}
