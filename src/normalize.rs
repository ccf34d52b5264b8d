//! Geo-time normalization of single points.
//!
//! Turns raw, string-encoded point attributes into a [`TrackPoint`] or
//! [`Waypoint`]: degrees become radians, elevation is rounded to one decimal,
//! and time strings become naive UTC timestamps.

use chrono::{DateTime, NaiveDateTime};
use log::debug;

use crate::error::{Result, TrackError};
use crate::geo_utils::{deg_to_rad, round_to};
use crate::{TrackPoint, Waypoint};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Raw attributes of a track point, as found in the source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPoint {
    /// Latitude in degrees
    pub lat: Option<String>,
    /// Longitude in degrees
    pub lon: Option<String>,
    /// Elevation in meters
    pub ele: Option<String>,
    /// ISO-8601 time, usually `<date>T<time>Z`
    pub time: Option<String>,
}

/// Raw attributes of a waypoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWaypoint {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub name: Option<String>,
}

/// Normalize one track point. `file` only labels errors.
///
/// Track points require a timestamp; a missing one fails with
/// [`TrackError::MalformedTimestamp`].
pub fn normalize_point(raw: &RawPoint, file: &str) -> Result<TrackPoint> {
    let lat = parse_degrees(raw.lat.as_deref(), "lat", file)?;
    let lon = parse_degrees(raw.lon.as_deref(), "lon", file)?;

    let elevation = match raw.ele.as_deref().map(str::trim) {
        Some(ele) => ele.parse::<f64>().map_err(|e| TrackError::MalformedPoint {
            file: file.to_string(),
            reason: format!("elevation {:?}: {}", ele, e),
        })?,
        None => 0.0,
    };

    Ok(TrackPoint {
        latitude_rad: deg_to_rad(lat),
        longitude_rad: deg_to_rad(lon),
        elevation_m: round_to(elevation, 1),
        timestamp: parse_timestamp(raw.time.as_deref())?,
    })
}

/// Normalize one waypoint. Missing names become `placeholder`.
pub fn normalize_waypoint(raw: &RawWaypoint, placeholder: &str, file: &str) -> Result<Waypoint> {
    let lat = parse_degrees(raw.lat.as_deref(), "lat", file)?;
    let lon = parse_degrees(raw.lon.as_deref(), "lon", file)?;

    let name = match raw.name.as_deref() {
        Some(name) => name.to_string(),
        None => {
            debug!("waypoint without name in {}, using {:?}", file, placeholder);
            placeholder.to_string()
        }
    };

    Ok(Waypoint {
        latitude_rad: deg_to_rad(lat),
        longitude_rad: deg_to_rad(lon),
        name,
    })
}

/// Parse a point time into a naive UTC timestamp.
///
/// `Z`-terminated values have the marker stripped and the date/time separator
/// replaced with a space. Values with an explicit offset are shifted to UTC.
/// Values without any zone marker are taken as-is.
///
/// ```rust
/// use track_labeler::parse_timestamp;
///
/// let ts = parse_timestamp(Some("2023-05-01T08:00:10Z")).unwrap();
/// assert_eq!(ts.to_string(), "2023-05-01 08:00:10");
/// ```
pub fn parse_timestamp(value: Option<&str>) -> Result<NaiveDateTime> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(TrackError::MalformedTimestamp { value: None })?;
    let malformed = || TrackError::MalformedTimestamp {
        value: Some(value.to_string()),
    };

    if let Some(stripped) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        let joined = join_date_time(stripped);
        return NaiveDateTime::parse_from_str(&joined, TIMESTAMP_FORMAT).map_err(|_| malformed());
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_utc());
    }

    NaiveDateTime::parse_from_str(&join_date_time(value), TIMESTAMP_FORMAT).map_err(|_| malformed())
}

fn join_date_time(value: &str) -> String {
    match value.split_once('T') {
        Some((date, time)) => format!("{} {}", date, time),
        None => value.to_string(),
    }
}

fn parse_degrees(value: Option<&str>, axis: &str, file: &str) -> Result<f64> {
    let value = value.ok_or_else(|| TrackError::MalformedPoint {
        file: file.to_string(),
        reason: format!("missing {} attribute", axis),
    })?;
    value.trim().parse::<f64>().map_err(|e| TrackError::MalformedPoint {
        file: file.to_string(),
        reason: format!("{} {:?}: {}", axis, value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(lat: &str, lon: &str, ele: Option<&str>, time: Option<&str>) -> RawPoint {
        RawPoint {
            lat: Some(lat.to_string()),
            lon: Some(lon.to_string()),
            ele: ele.map(String::from),
            time: time.map(String::from),
        }
    }

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, 1).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_normalize_point() {
        let point = normalize_point(
            &raw("10.0", "20.0", Some("5.04"), Some("2023-05-01T08:00:00Z")),
            "f",
        )
        .unwrap();
        assert!((point.latitude_rad - 10f64.to_radians()).abs() < 1e-12);
        assert!((point.longitude_rad - 20f64.to_radians()).abs() < 1e-12);
        assert_eq!(point.elevation_m, 5.0);
        assert_eq!(point.timestamp, ts(8, 0, 0));
    }

    #[test]
    fn test_missing_elevation_defaults_to_zero() {
        let point = normalize_point(&raw("1", "2", None, Some("2023-05-01T08:00:00Z")), "f").unwrap();
        assert_eq!(point.elevation_m, 0.0);
    }

    #[test]
    fn test_missing_latitude_is_malformed_point() {
        let mut r = raw("1", "2", None, Some("2023-05-01T08:00:00Z"));
        r.lat = None;
        let err = normalize_point(&r, "day1").unwrap_err();
        assert!(matches!(err, TrackError::MalformedPoint { ref file, .. } if file == "day1"));
    }

    #[test]
    fn test_unparseable_longitude_is_malformed_point() {
        let err = normalize_point(&raw("1", "east", None, Some("2023-05-01T08:00:00Z")), "f")
            .unwrap_err();
        assert!(matches!(err, TrackError::MalformedPoint { .. }));
    }

    #[test]
    fn test_missing_time_is_malformed_timestamp() {
        let err = normalize_point(&raw("1", "2", None, None), "f").unwrap_err();
        assert!(matches!(err, TrackError::MalformedTimestamp { value: None }));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert_eq!(parse_timestamp(Some("2023-05-01T08:00:10Z")).unwrap(), ts(8, 0, 10));
        assert_eq!(
            parse_timestamp(Some("2023-05-01T10:00:10+02:00")).unwrap(),
            ts(8, 0, 10)
        );
        assert_eq!(parse_timestamp(Some("2023-05-01 08:00:10")).unwrap(), ts(8, 0, 10));

        let frac = parse_timestamp(Some("2023-05-01T08:00:10.250Z")).unwrap();
        assert_eq!(frac, ts(8, 0, 10) + chrono::Duration::milliseconds(250));
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        let err = parse_timestamp(Some("yesterday")).unwrap_err();
        assert!(matches!(err, TrackError::MalformedTimestamp { value: Some(_) }));
        assert!(parse_timestamp(Some("  ")).is_err());
    }

    #[test]
    fn test_waypoint_placeholder() {
        let wpt = RawWaypoint {
            lat: Some("45".into()),
            lon: Some("90".into()),
            name: None,
        };
        let normalized = normalize_waypoint(&wpt, "EMPTY", "f").unwrap();
        assert_eq!(normalized.name, "EMPTY");

        let named = RawWaypoint { name: Some("Summit".into()), ..wpt };
        assert_eq!(normalize_waypoint(&named, "EMPTY", "f").unwrap().name, "Summit");
    }

    #[test]
    fn test_waypoint_needs_no_time() {
        let wpt = RawWaypoint {
            lat: Some("0".into()),
            lon: Some("0".into()),
            name: Some("origin".into()),
        };
        assert!(normalize_waypoint(&wpt, "EMPTY", "f").is_ok());
    }
}
