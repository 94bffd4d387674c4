//! Realized volatility from the historical index feed.
//!
//! The feed delivers irregularly spaced observations. They are resampled
//! into fixed-width buckets (last observation wins as the bucket close),
//! then the sample standard deviation of log returns between consecutive
//! closes gives one volatility figure per resampling step.
//!
//! Empty buckets are forward-filled with the previous close, contributing
//! a zero log return. This keeps the step count proportional to elapsed
//! time even through feed gaps.

use hpx_core::{Price, PricePoint};
use rust_decimal::prelude::ToPrimitive;

/// Per-step volatility derived from resampled closes.
///
/// Recomputed every iteration, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityEstimate {
    /// Standard deviation of log returns, in units of one resampling step.
    pub sigma_per_step: f64,
    /// Number of closes the estimate was computed from.
    pub sample_count: usize,
    /// False when fewer than two closes were available; `sigma_per_step`
    /// is 0.0 in that case and the caller decides how to proceed.
    pub is_valid: bool,
}

impl VolatilityEstimate {
    fn undefined(sample_count: usize) -> Self {
        Self {
            sigma_per_step: 0.0,
            sample_count,
            is_valid: false,
        }
    }
}

/// Resample a price series into fixed-width bucket closes.
///
/// Buckets are contiguous `interval_secs`-wide windows starting at the
/// first observation's timestamp. The last observation inside a bucket is
/// its close; buckets with no observation repeat the previous close.
///
/// Out-of-order observations (timestamp before the current bucket) are
/// ignored rather than rewriting already-closed buckets.
pub fn resample_closes(points: &[PricePoint], interval_secs: i64) -> Vec<Price> {
    if points.is_empty() || interval_secs <= 0 {
        return Vec::new();
    }

    let origin = points[0].timestamp;
    let mut closes = Vec::new();
    let mut current_bucket: i64 = 0;
    let mut current_close = points[0].price;

    for point in points {
        let bucket = (point.timestamp - origin) / interval_secs;
        if bucket < current_bucket {
            continue;
        }
        if bucket > current_bucket {
            closes.push(current_close);
            // forward-fill buckets the feed skipped
            for _ in (current_bucket + 1)..bucket {
                closes.push(current_close);
            }
            current_bucket = bucket;
        }
        current_close = point.price;
    }
    closes.push(current_close);

    closes
}

/// Sample standard deviation of log returns between consecutive closes.
///
/// Returns an invalid estimate (sigma 0.0) with fewer than two closes.
/// Non-positive closes cannot produce a log return and are skipped.
pub fn realized_volatility(closes: &[Price]) -> VolatilityEstimate {
    if closes.len() < 2 {
        return VolatilityEstimate::undefined(closes.len());
    }

    let mut returns = Vec::with_capacity(closes.len() - 1);
    for window in closes.windows(2) {
        let (prev, cur) = (window[0], window[1]);
        if !prev.is_positive() || !cur.is_positive() {
            continue;
        }
        let ratio = (cur.inner() / prev.inner()).to_f64().unwrap_or(f64::NAN);
        if ratio.is_finite() && ratio > 0.0 {
            returns.push(ratio.ln());
        }
    }

    if returns.is_empty() {
        return VolatilityEstimate::undefined(closes.len());
    }

    let n = returns.len();
    let mean = returns.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    VolatilityEstimate {
        sigma_per_step: variance.sqrt(),
        sample_count: closes.len(),
        is_valid: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pt(timestamp: i64, price: &str) -> PricePoint {
        PricePoint::new(timestamp, price.parse().unwrap())
    }

    #[test]
    fn test_resample_last_observation_wins() {
        let points = [
            pt(0, "100"),
            pt(100, "101"),
            pt(3599, "102"), // same bucket, becomes the close
            pt(3600, "103"),
        ];
        let closes = resample_closes(&points, 3600);
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].inner(), dec!(102));
        assert_eq!(closes[1].inner(), dec!(103));
    }

    #[test]
    fn test_resample_forward_fills_gaps() {
        // Observations in buckets 0 and 3; buckets 1 and 2 are empty.
        let points = [pt(0, "100"), pt(3 * 3600, "110")];
        let closes = resample_closes(&points, 3600);
        assert_eq!(closes.len(), 4);
        assert_eq!(closes[1].inner(), dec!(100));
        assert_eq!(closes[2].inner(), dec!(100));
        assert_eq!(closes[3].inner(), dec!(110));
    }

    #[test]
    fn test_resample_empty_and_bad_interval() {
        assert!(resample_closes(&[], 3600).is_empty());
        assert!(resample_closes(&[pt(0, "100")], 0).is_empty());
    }

    #[test]
    fn test_resample_ignores_out_of_order() {
        let points = [pt(3600, "100"), pt(7200, "101"), pt(3601, "999")];
        let closes = resample_closes(&points, 3600);
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[1].inner(), dec!(101));
    }

    #[test]
    fn test_volatility_undefined_below_two_closes() {
        let est = realized_volatility(&[Price::new(dec!(100))]);
        assert!(!est.is_valid);
        assert_eq!(est.sigma_per_step, 0.0);
        assert_eq!(est.sample_count, 1);
    }

    #[test]
    fn test_volatility_constant_series_is_zero() {
        let closes: Vec<Price> = (0..10).map(|_| Price::new(dec!(100))).collect();
        let est = realized_volatility(&closes);
        assert!(est.is_valid);
        assert_eq!(est.sigma_per_step, 0.0);
    }

    #[test]
    fn test_volatility_alternating_series() {
        // Closes alternate 100, 110, 100, 110... Log returns alternate
        // +ln(1.1), -ln(1.1); mean 0, sample std dev = ln(1.1) * sqrt(n/(n-1)).
        let closes: Vec<Price> = (0..9)
            .map(|i| {
                if i % 2 == 0 {
                    Price::new(dec!(100))
                } else {
                    Price::new(dec!(110))
                }
            })
            .collect();
        let est = realized_volatility(&closes);
        let r = (1.1f64).ln();
        let expected = (r * r * 8.0 / 7.0).sqrt();
        assert!((est.sigma_per_step - expected).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_skips_non_positive_closes() {
        let closes = [
            Price::new(dec!(100)),
            Price::new(dec!(0)),
            Price::new(dec!(100)),
            Price::new(dec!(105)),
        ];
        let est = realized_volatility(&closes);
        // Only the 100 -> 105 pair produces a return.
        assert!(est.is_valid);
        assert_eq!(est.sigma_per_step, 0.0);
    }

    #[test]
    fn test_gap_contributes_zero_return() {
        // Forward-filled gap repeats the close: the extra return is zero
        // and pulls the estimate down versus the gap-free series.
        let gapped = [pt(0, "100"), pt(3600, "110"), pt(3 * 3600, "100")];
        let closes = resample_closes(&gapped, 3600);
        assert_eq!(closes.len(), 4);
        assert_eq!(closes[2], closes[1]);

        let dense = resample_closes(
            &[pt(0, "100"), pt(3600, "110"), pt(2 * 3600, "100")],
            3600,
        );
        let est_gapped = realized_volatility(&closes);
        let est_dense = realized_volatility(&dense);
        assert!(est_gapped.sigma_per_step < est_dense.sigma_per_step);
    }
}
