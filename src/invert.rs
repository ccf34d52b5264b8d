//! Track inversion: normalized points back into a GPX document.
//!
//! Produces a single track with a single unnamed segment. Each point carries
//! degree-valued `lat`/`lon` attributes and a `<time>` child.

use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, TrackError};
use crate::geo_utils::rad_to_deg;
use crate::TrackPoint;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// Names written into the reconstructed document.
#[derive(Debug, Clone)]
pub struct InvertOptions {
    /// Document `<metadata><name>`. Default: "tmp_name"
    pub document_name: String,
    /// Track `<name>`. Default: "tmp_name"
    pub track_name: String,
}

impl Default for InvertOptions {
    fn default() -> Self {
        Self {
            document_name: "tmp_name".to_string(),
            track_name: "tmp_name".to_string(),
        }
    }
}

/// Write `points` as a minimal GPX 1.1 document.
///
/// Fails with [`TrackError::EmptyInput`] when there are no points.
pub fn write_gpx<W: Write>(mut writer: W, points: &[TrackPoint], options: &InvertOptions) -> Result<()> {
    if points.is_empty() {
        return Err(TrackError::EmptyInput);
    }

    writeln!(writer, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        writer,
        r#"<gpx version="1.1" creator="track-labeler" xmlns="{}">"#,
        GPX_NAMESPACE
    )?;
    writeln!(writer, "  <metadata>")?;
    writeln!(writer, "    <name>{}</name>", escape_xml(&options.document_name))?;
    writeln!(writer, "  </metadata>")?;
    writeln!(writer, "  <trk>")?;
    writeln!(writer, "    <name>{}</name>", escape_xml(&options.track_name))?;
    writeln!(writer, "    <trkseg>")?;

    for point in points {
        writeln!(
            writer,
            r#"      <trkpt lat="{}" lon="{}"><time>{}</time></trkpt>"#,
            rad_to_deg(point.latitude_rad),
            rad_to_deg(point.longitude_rad),
            point.timestamp.format("%Y-%m-%dT%H:%M:%S%.fZ")
        )?;
    }

    writeln!(writer, "    </trkseg>")?;
    writeln!(writer, "  </trk>")?;
    writeln!(writer, "</gpx>")?;
    writer.flush()?;
    Ok(())
}

/// Write `points` as a GPX document at `path`.
pub fn write_gpx_file(path: &Path, points: &[TrackPoint], options: &InvertOptions) -> Result<()> {
    if points.is_empty() {
        return Err(TrackError::EmptyInput);
    }
    let file = File::create(path)?;
    write_gpx(BufWriter::new(file), points, options)?;
    info!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::deg_to_rad;
    use crate::source::parse_gpx;
    use crate::normalize::normalize_point;
    use chrono::NaiveDate;

    fn pt(lat: f64, lon: f64, second: u32) -> TrackPoint {
        TrackPoint {
            latitude_rad: deg_to_rad(lat),
            longitude_rad: deg_to_rad(lon),
            elevation_m: 3.5,
            timestamp: NaiveDate::from_ymd_opt(2023, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, second)
                .unwrap(),
        }
    }

    fn render(points: &[TrackPoint], options: &InvertOptions) -> String {
        let mut out = Vec::new();
        write_gpx(&mut out, points, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let mut out = Vec::new();
        let err = write_gpx(&mut out, &[], &InvertOptions::default()).unwrap_err();
        assert!(matches!(err, TrackError::EmptyInput));
        assert!(out.is_empty());
    }

    #[test]
    fn test_document_shape() {
        let text = render(&[pt(10.0, 20.0, 0), pt(11.0, 21.0, 10)], &InvertOptions::default());
        assert!(text.starts_with("<?xml"));
        assert_eq!(text.matches("<trk>").count(), 1);
        assert_eq!(text.matches("<trkseg>").count(), 1);
        assert_eq!(text.matches("<trkpt ").count(), 2);
        assert_eq!(text.matches("<name>tmp_name</name>").count(), 2);
        assert!(text.contains("<time>2023-05-01T08:00:10Z</time>"));
    }

    #[test]
    fn test_names_are_escaped() {
        let options = InvertOptions {
            document_name: "a<b".into(),
            track_name: "Tom & Jerry".into(),
        };
        let text = render(&[pt(1.0, 2.0, 0)], &options);
        assert!(text.contains("<name>a&lt;b</name>"));
        assert!(text.contains("<name>Tom &amp; Jerry</name>"));
    }

    #[test]
    fn test_round_trip_through_reader() {
        let points = vec![pt(10.0, 20.0, 0), pt(-33.8688, 151.2093, 10), pt(51.5074, -0.1278, 30)];
        let text = render(&points, &InvertOptions::default());

        let doc = parse_gpx(text.as_bytes(), Path::new("inverted.gpx")).unwrap();
        assert_eq!(doc.track_name.as_deref(), Some("tmp_name"));
        assert_eq!(doc.segments.len(), 1);

        let reread: Vec<TrackPoint> = doc.segments[0]
            .iter()
            .map(|raw| normalize_point(raw, "inverted").unwrap())
            .collect();
        assert_eq!(reread.len(), points.len());
        for (a, b) in reread.iter().zip(&points) {
            assert!((a.latitude_rad - b.latitude_rad).abs() < 1e-12);
            assert!((a.longitude_rad - b.longitude_rad).abs() < 1e-12);
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.elevation_m, 0.0);
        }
    }
}
