//! Simple Moving Average.
//!
//! SMA(n)[i] = (C[i-n+1] + ... + C[i]) / n
//! Warmup: first (n-1) values are undefined.

/// SMA at every index.
///
/// Each value sums its own window, so index `i` is bit-identical to
/// [`trailing_mean`] over `closes[..=i]`.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| trailing_mean(&closes[..=i], period))
        .collect()
}

/// Mean of the last `period` closes, if there are that many.
pub fn trailing_mean(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}
