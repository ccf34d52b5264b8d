//! Elapsed time since the first point of a track.

use chrono::NaiveDateTime;

use crate::error::{Result, TrackError};
use crate::{Track, TrackPoint};

/// Seconds elapsed since the first point, one value per point.
///
/// The first value is always `0.0`. Values are non-decreasing exactly when
/// the timestamps are in chronological order; nothing is reordered here.
pub fn elapsed_seconds(points: &[TrackPoint]) -> Result<Vec<f64>> {
    let start = points.first().ok_or(TrackError::EmptyTrack)?.timestamp;
    Ok(points
        .iter()
        .map(|p| seconds_between(start, p.timestamp))
        .collect())
}

fn seconds_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta = end - start;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

impl Track {
    /// Compute and attach the elapsed-seconds column.
    pub fn derive_elapsed(&mut self) -> Result<&[f64]> {
        let elapsed = elapsed_seconds(&self.points)?;
        Ok(self.elapsed_seconds.insert(elapsed).as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(offset_ms: i64) -> TrackPoint {
        let base = NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(23, 59, 50)
            .unwrap();
        TrackPoint {
            latitude_rad: 0.0,
            longitude_rad: 0.0,
            elevation_m: 0.0,
            timestamp: base + Duration::milliseconds(offset_ms),
        }
    }

    #[test]
    fn test_first_is_zero() {
        let elapsed = elapsed_seconds(&[at(0), at(1_000), at(30_500)]).unwrap();
        assert_eq!(elapsed, vec![0.0, 1.0, 30.5]);
    }

    #[test]
    fn test_crosses_midnight() {
        let elapsed = elapsed_seconds(&[at(0), at(20_000)]).unwrap();
        assert_eq!(elapsed[1], 20.0);
    }

    #[test]
    fn test_single_point() {
        assert_eq!(elapsed_seconds(&[at(5_000)]).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_out_of_order_goes_negative() {
        let elapsed = elapsed_seconds(&[at(10_000), at(0)]).unwrap();
        assert_eq!(elapsed, vec![0.0, -10.0]);
    }

    #[test]
    fn test_monotonic_for_chronological_input() {
        let points: Vec<TrackPoint> = (0..50).map(|i| at(i * 733)).collect();
        let elapsed = elapsed_seconds(&points).unwrap();
        assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_empty_track() {
        assert!(matches!(elapsed_seconds(&[]), Err(TrackError::EmptyTrack)));

        let mut track = Track::new("empty", vec![]);
        assert!(track.derive_elapsed().is_err());
        assert!(track.elapsed_seconds.is_none());
    }

    #[test]
    fn test_derive_elapsed_attaches_column() {
        let mut track = Track::new("t", vec![at(0), at(2_000)]);
        track.derive_elapsed().unwrap();
        assert_eq!(track.elapsed_seconds.as_deref(), Some(&[0.0, 2.0][..]));
    }
}
