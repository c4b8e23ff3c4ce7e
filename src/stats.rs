use std::time::Duration;

use crate::errors::BestOfError;
use crate::types::Stat;

/// Percentiles appended to the summary, in report order.
pub const PERCENTILES: &[(&str, f64)] = &[
    ("Median", 50.0),
    ("90th percentile", 90.0),
    ("95th percentile", 95.0),
    ("99th percentile", 99.0),
];

/// Summarize a duration sample into labeled statistics.
///
/// Always yields Best, Worst and Average in that order; with `percentiles`
/// set, the entries of [`PERCENTILES`] follow. The caller's slice is left
/// untouched; percentile computation works on a sorted copy.
pub fn summarize(sample: &[Duration], percentiles: bool) -> Result<Vec<Stat>, BestOfError> {
    let mut stats = vec![
        Stat::new("Best", best(sample)?),
        Stat::new("Worst", worst(sample)?),
        Stat::new("Average", average(sample)?),
    ];

    if percentiles {
        let sorted = sorted_copy(sample);
        for &(label, p) in PERCENTILES {
            stats.push(Stat::new(label, percentile(&sorted, p)?));
        }
    }

    Ok(stats)
}

pub fn best(sample: &[Duration]) -> Result<Duration, BestOfError> {
    sample.iter().copied().min().ok_or(BestOfError::EmptySample)
}

pub fn worst(sample: &[Duration]) -> Result<Duration, BestOfError> {
    sample.iter().copied().max().ok_or(BestOfError::EmptySample)
}

/// Arithmetic mean, summed in whole nanoseconds so long samples cannot overflow.
pub fn average(sample: &[Duration]) -> Result<Duration, BestOfError> {
    if sample.is_empty() {
        return Err(BestOfError::EmptySample);
    }
    let total: u128 = sample.iter().map(Duration::as_nanos).sum();
    let mean = total / sample.len() as u128;
    Ok(Duration::from_nanos(u64::try_from(mean).unwrap_or(u64::MAX)))
}

pub fn sorted_copy(sample: &[Duration]) -> Vec<Duration> {
    let mut sorted = sample.to_vec();
    sorted.sort_unstable();
    sorted
}

/// The `p`th percentile of an ascending-sorted sample.
///
/// The rank is `p / 100 * (n - 1)`. An integral rank selects that order
/// statistic directly; otherwise the result is interpolated linearly between
/// the two neighbouring order statistics. `p = 100` yields the maximum.
pub fn percentile(sorted: &[Duration], p: f64) -> Result<Duration, BestOfError> {
    if !(0.0..=100.0).contains(&p) {
        return Err(BestOfError::PercentileOutOfRange { percentile: p });
    }
    let last = sorted.len().checked_sub(1).ok_or(BestOfError::EmptySample)?;

    let rank = p / 100.0 * last as f64;
    let floor = rank.floor();
    let lo_index = (floor as usize).min(last);

    if rank == floor {
        return Ok(sorted[lo_index]);
    }

    let lower = sorted[lo_index];
    if lo_index == last {
        return Ok(lower);
    }
    let upper = sorted[lo_index + 1];
    let span = (upper - lower).as_nanos() as f64;
    Ok(lower + Duration::from_nanos((span * (rank - floor)).round() as u64))
}
