//! # Track Labeler
//!
//! GPS track normalization and label fusion for building training datasets.
//!
//! This library provides:
//! - Normalization of GPX points into radians, rounded elevation and parsed timestamps
//! - Assembly of multi-segment, multi-file recordings into one continuous track
//! - Elapsed-time derivation relative to the first point
//! - Label fusion of a raw track against a manually cleaned copy of the same track
//! - Inversion of a normalized table back into a minimal GPX document
//!
//! ## Features
//!
//! - **`parallel`** - Assemble raw and clean tracks concurrently with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use track_labeler::{
//!     MemorySource, PipelineConfig, RawPoint, SourceDocument, Label, build_training_pool,
//! };
//!
//! let point = |lat: &str, lon: &str, time: &str| RawPoint {
//!     lat: Some(lat.into()),
//!     lon: Some(lon.into()),
//!     ele: None,
//!     time: Some(time.into()),
//! };
//!
//! let mut source = MemorySource::new();
//! source.insert("raw", "day1", SourceDocument {
//!     track_name: Some("Morning Ride".into()),
//!     segments: vec![vec![
//!         point("10.0", "20.0", "2023-05-01T08:00:00Z"),
//!         point("11.0", "21.0", "2023-05-01T08:00:10Z"),
//!     ]],
//!     waypoints: vec![],
//! });
//! source.insert("clean", "day1", SourceDocument {
//!     track_name: Some("Morning Ride".into()),
//!     segments: vec![vec![point("10.0", "20.0", "2023-05-01T08:00:00Z")]],
//!     waypoints: vec![],
//! });
//!
//! let pool = build_training_pool(&source, "raw", "clean", &["day1"], &PipelineConfig::default())
//!     .unwrap();
//! assert_eq!(pool.track_name, "morningride");
//! assert_eq!(pool.rows[0].label, Label::Kept);
//! assert_eq!(pool.rows[1].label, Label::Removed);
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error;
pub use error::{Result, TrackError};

pub mod geo_utils;
pub use geo_utils::{make_relevant_name, QuantizedCoordinateKey};

pub mod normalize;
pub use normalize::{normalize_point, normalize_waypoint, parse_timestamp, RawPoint, RawWaypoint};

pub mod source;
pub use source::{GpxDirectory, MemorySource, SourceDocument, TrackSource};

pub mod assemble;
pub use assemble::{assemble_track, AssembledTrack};

pub mod elapsed;
pub use elapsed::elapsed_seconds;

pub mod fuse;
pub use fuse::{fuse_labels, FuseSummary};

pub mod invert;
pub use invert::{write_gpx, write_gpx_file, InvertOptions};

pub mod table;

pub mod pipeline;
pub use pipeline::{build_training_pool, read_track, TrainingPool};

// ============================================================================
// Core Types
// ============================================================================

/// One normalized track sample.
///
/// Coordinates are radians. Conversion from the degree-valued source happens
/// once, at ingestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    /// Meters, rounded to one decimal. 0.0 when the source has no elevation.
    pub elevation_m: f64,
    pub timestamp: NaiveDateTime,
}

impl TrackPoint {
    /// Quantized identity of this point's location.
    pub fn key(&self, scale: f64) -> QuantizedCoordinateKey {
        QuantizedCoordinateKey::from_radians(self.latitude_rad, self.longitude_rad, scale)
    }
}

/// A named waypoint. Coordinates are radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    pub name: String,
}

/// An ordered, assembled track.
///
/// Points keep file order, then segment order, then point order. Nothing
/// re-sorts by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Sanitized name taken from the first source file.
    pub name: String,
    pub points: Vec<TrackPoint>,
    /// Seconds since the first point. Set by [`Track::derive_elapsed`].
    pub elapsed_seconds: Option<Vec<f64>>,
}

impl Track {
    pub fn new(name: impl Into<String>, points: Vec<TrackPoint>) -> Self {
        Self {
            name: name.into(),
            points,
            elapsed_seconds: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Binary label fused onto every raw point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// The point survived manual cleaning.
    Kept,
    /// The point is absent from the cleaned track and treated as noise.
    Removed,
}

impl Label {
    /// Numeric form written to the `Target` column.
    pub fn as_target(self) -> u8 {
        match self {
            Label::Kept => 0,
            Label::Removed => 1,
        }
    }
}

/// A raw point with its fused label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledTrackPoint {
    pub point: TrackPoint,
    pub sec_from_start: Option<f64>,
    pub label: Label,
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root under which track directories live (`<tracks_dir>/<dir>/<file>.gpx`).
    /// Default: "tracks"
    pub tracks_dir: PathBuf,

    /// Directory receiving CSV output.
    /// Default: "tmps"
    pub output_dir: PathBuf,

    /// Name given to waypoints that carry none.
    /// Default: "EMPTY"
    pub waypoint_placeholder: String,

    /// Collect top-level waypoints alongside track points.
    /// Default: false
    pub parse_waypoints: bool,

    /// Multiplier applied to degrees before rounding into a join key.
    /// Default: 1e6 (~0.11 m at the equator)
    pub quantization_scale: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tracks_dir: PathBuf::from("tracks"),
            output_dir: PathBuf::from("tmps"),
            waypoint_placeholder: "EMPTY".to_string(),
            parse_waypoints: false,
            quantization_scale: geo_utils::DEFAULT_QUANTIZATION_SCALE,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
