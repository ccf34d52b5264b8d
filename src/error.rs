//! Error taxonomy for track processing.
//!
//! Every variant aborts processing of the current track. Coordinate mismatches
//! during label fusion are not errors and never show up here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    /// Source document is missing or could not be parsed.
    #[error("failed to read track source {path}: {reason}")]
    SourceRead { path: PathBuf, reason: String },

    /// A point lacks a usable latitude or longitude.
    #[error("malformed point in {file}: {reason}")]
    MalformedPoint { file: String, reason: String },

    /// Required time field is absent or unparseable.
    #[error("malformed timestamp: {value:?}")]
    MalformedTimestamp { value: Option<String> },

    /// Elapsed time requested for a track with no points.
    #[error("track has no points")]
    EmptyTrack,

    /// Inversion requested for a table with no rows.
    #[error("no rows to write")]
    EmptyInput,

    #[error("table error: {0}")]
    Table(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for TrackError {
    fn from(e: csv::Error) -> Self {
        TrackError::Table(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
