//! Domain Services
//!
//! Stateless calculations over entity snapshots.
//! - metrics: derived rates, task/package roll-ups, daily summaries, trends
//! - analytics: dashboard and widget figures

pub mod analytics;
pub mod metrics;

pub use metrics::{PackageCallStats, TrendPoint};

/// `numerator / denominator`, or 0 when the denominator is 0
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
