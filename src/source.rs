//! Track sources.
//!
//! A [`TrackSource`] resolves a `(directory, file)` pair into a parsed
//! [`SourceDocument`]: the first track's declared name, every segment in
//! document order, and the top-level waypoints. Attribute values stay
//! string-encoded so the normalizer owns every numeric conversion.

use geo::Point;
use gpx::errors::GpxError;
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackError};
use crate::normalize::{RawPoint, RawWaypoint};

/// One parsed source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDocument {
    /// Name of the first track, if declared
    pub track_name: Option<String>,
    /// Segments in document order, across all tracks
    pub segments: Vec<Vec<RawPoint>>,
    /// Top-level waypoints
    pub waypoints: Vec<RawWaypoint>,
}

impl SourceDocument {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

/// Anything that can load source documents by directory and file identifier.
pub trait TrackSource: Sync {
    fn load(&self, dir: &str, file: &str) -> Result<SourceDocument>;
}

// ============================================================================
// GPX files on disk
// ============================================================================

/// GPX files laid out as `<root>/<dir>/<file>.gpx`.
#[derive(Debug, Clone)]
pub struct GpxDirectory {
    root: PathBuf,
}

impl GpxDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `file` inside `dir`. The `.gpx` extension is appended.
    pub fn path_for(&self, dir: &str, file: &str) -> PathBuf {
        self.root.join(dir).join(format!("{}.gpx", file))
    }
}

impl TrackSource for GpxDirectory {
    fn load(&self, dir: &str, file: &str) -> Result<SourceDocument> {
        let path = self.path_for(dir, file);
        debug!("loading {}", path.display());
        let handle = File::open(&path).map_err(|e| TrackError::SourceRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        parse_gpx(BufReader::new(handle), &path)
    }
}

/// Parse a GPX document into a [`SourceDocument`]. `path` only labels errors.
///
/// A point without a latitude or longitude, or with one out of range, is a
/// [`TrackError::MalformedPoint`]. Any other parse failure is a
/// [`TrackError::SourceRead`].
pub fn parse_gpx<R: Read>(reader: R, path: &Path) -> Result<SourceDocument> {
    let source_error = |reason: String| TrackError::SourceRead {
        path: path.to_path_buf(),
        reason,
    };
    let gpx = gpx::read(reader).map_err(|e| match e {
        GpxError::InvalidElementLacksAttribute(..) | GpxError::LonLatOutOfBoundsError(..) => {
            TrackError::MalformedPoint {
                file: file_label(path),
                reason: e.to_string(),
            }
        }
        other => source_error(other.to_string()),
    })?;

    // First track that declares a name, not necessarily the first track.
    let track_name = gpx.tracks.iter().find_map(|t| t.name.clone());

    let mut segments = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            let points = segment
                .points
                .iter()
                .map(|wpt| -> Result<RawPoint> {
                    let time = match &wpt.time {
                        Some(t) => Some(t.format().map_err(|e| source_error(e.to_string()))?),
                        None => None,
                    };
                    let (lat, lon) = degree_strings(wpt.point());
                    Ok(RawPoint {
                        lat: Some(lat),
                        lon: Some(lon),
                        ele: wpt.elevation.map(|e| e.to_string()),
                        time,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            segments.push(points);
        }
    }

    let waypoints = gpx
        .waypoints
        .iter()
        .map(|wpt| {
            let (lat, lon) = degree_strings(wpt.point());
            RawWaypoint {
                lat: Some(lat),
                lon: Some(lon),
                name: wpt.name.clone(),
            }
        })
        .collect();

    Ok(SourceDocument {
        track_name,
        segments,
        waypoints,
    })
}

/// `(lat, lon)` of a GPX point as decimal-degree strings.
///
/// f64 Display is the shortest round-trip representation, so no precision is lost.
fn degree_strings(point: Point<f64>) -> (String, String) {
    let (lon, lat) = point.x_y();
    (lat.to_string(), lon.to_string())
}

/// File identifier used in point errors: the file stem, like the assembler's file names.
fn file_label(path: &Path) -> String {
    path.file_stem()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

// ============================================================================
// In-memory documents
// ============================================================================

/// Source documents held in memory, keyed by `(dir, file)`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<(String, String), SourceDocument>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dir: &str, file: &str, document: SourceDocument) {
        self.documents
            .insert((dir.to_string(), file.to_string()), document);
    }
}

impl TrackSource for MemorySource {
    fn load(&self, dir: &str, file: &str) -> Result<SourceDocument> {
        self.documents
            .get(&(dir.to_string(), file.to_string()))
            .cloned()
            .ok_or_else(|| TrackError::SourceRead {
                path: Path::new(dir).join(file),
                reason: "no such document".to_string(),
            })
    }
}
