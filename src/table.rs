//! CSV tables for normalized tracks, waypoints and labeled datasets.
//!
//! | Table | Columns |
//! |-------|---------|
//! | track | `lat,lon,ele,date` plus `sec_from_start` once derived |
//! | waypoints | `lat,lon,name` |
//! | labeled | `lat,lon,ele,date,sec_from_start,Target` |
//!
//! Coordinates are radians. Dates use `YYYY-MM-DD HH:MM:SS[.fff]`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::error::{Result, TrackError};
use crate::{LabeledTrackPoint, Track, TrackPoint, Waypoint};

mod date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        crate::normalize::parse_timestamp(Some(&value)).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Serialize)]
struct TrackRow {
    lat: f64,
    lon: f64,
    ele: f64,
    #[serde(with = "date_format")]
    date: NaiveDateTime,
}

#[derive(Debug, Serialize)]
struct TimedTrackRow {
    lat: f64,
    lon: f64,
    ele: f64,
    #[serde(with = "date_format")]
    date: NaiveDateTime,
    sec_from_start: f64,
}

#[derive(Debug, Serialize)]
struct WaypointRow<'a> {
    lat: f64,
    lon: f64,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct LabeledRow {
    lat: f64,
    lon: f64,
    ele: f64,
    #[serde(with = "date_format")]
    date: NaiveDateTime,
    sec_from_start: Option<f64>,
    #[serde(rename = "Target")]
    target: u8,
}

// Only the columns inversion needs; anything else in the file is ignored.
#[derive(Debug, Deserialize)]
struct NormalizedRow {
    lat: f64,
    lon: f64,
    #[serde(default)]
    ele: f64,
    #[serde(with = "date_format")]
    date: NaiveDateTime,
}

/// Write a track table. `sec_from_start` is included once elapsed time was derived.
pub fn write_track_csv<W: Write>(writer: W, track: &Track) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    match &track.elapsed_seconds {
        Some(elapsed) => {
            if elapsed.len() != track.len() {
                return Err(TrackError::Table(format!(
                    "{} elapsed values for {} points",
                    elapsed.len(),
                    track.len()
                )));
            }
            for (p, &sec_from_start) in track.points.iter().zip(elapsed) {
                csv.serialize(TimedTrackRow {
                    lat: p.latitude_rad,
                    lon: p.longitude_rad,
                    ele: p.elevation_m,
                    date: p.timestamp,
                    sec_from_start,
                })?;
            }
        }
        None => {
            for p in &track.points {
                csv.serialize(TrackRow {
                    lat: p.latitude_rad,
                    lon: p.longitude_rad,
                    ele: p.elevation_m,
                    date: p.timestamp,
                })?;
            }
        }
    }
    csv.flush()?;
    Ok(())
}

pub fn write_waypoints_csv<W: Write>(writer: W, waypoints: &[Waypoint]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for w in waypoints {
        csv.serialize(WaypointRow {
            lat: w.latitude_rad,
            lon: w.longitude_rad,
            name: &w.name,
        })?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_labeled_csv<W: Write>(writer: W, labeled: &[LabeledTrackPoint]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for l in labeled {
        csv.serialize(LabeledRow {
            lat: l.point.latitude_rad,
            lon: l.point.longitude_rad,
            ele: l.point.elevation_m,
            date: l.point.timestamp,
            sec_from_start: l.sec_from_start,
            target: l.label.as_target(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Read a normalized table back into points, e.g. for inversion.
///
/// Requires `lat`, `lon` and `date`; `ele` defaults to 0.0.
pub fn read_track_csv<R: Read>(reader: R) -> Result<Vec<TrackPoint>> {
    let mut csv = csv::Reader::from_reader(reader);
    csv.deserialize::<NormalizedRow>()
        .map(|row| -> Result<TrackPoint> {
            let row = row?;
            Ok(TrackPoint {
                latitude_rad: row.lat,
                longitude_rad: row.lon,
                elevation_m: row.ele,
                timestamp: row.date,
            })
        })
        .collect()
}
