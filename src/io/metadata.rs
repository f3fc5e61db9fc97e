//! Capture-time metadata access
//!
//! Acquisition timestamps travel inside the image files as EXIF
//! `DateTimeOriginal` fields in the fixed `YYYY:MM:DD HH:MM:SS` layout.
//! Cameras record no timezone here, so timestamps are naive local times;
//! only differences between them are meaningful to the pipeline.

use crate::types::{Frame, TrackError, TrackResult};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Fixed EXIF timestamp layout (`YYYY:MM:DD HH:MM:SS`)
pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Parse an acquisition timestamp in the fixed EXIF layout
pub fn parse_capture_time(value: &str) -> TrackResult<NaiveDateTime> {
    let trimmed = value.trim_matches(char::from(0)).trim();
    NaiveDateTime::parse_from_str(trimmed, CAPTURE_TIME_FORMAT).map_err(|e| {
        TrackError::Metadata(format!("Malformed capture time {:?}: {}", value, e))
    })
}

/// Render an acquisition timestamp back into the fixed EXIF layout
pub fn format_capture_time(time: &NaiveDateTime) -> String {
    time.format(CAPTURE_TIME_FORMAT).to_string()
}

/// Read the `DateTimeOriginal` timestamp embedded in an image file
pub fn read_capture_time<P: AsRef<Path>>(path: P) -> TrackResult<NaiveDateTime> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader)?;

    let field = exif
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .ok_or_else(|| {
            TrackError::Metadata(format!(
                "No DateTimeOriginal field in {}",
                path.display()
            ))
        })?;

    // Take the raw ASCII bytes rather than the display form, which
    // reformats the timestamp.
    let raw = match field.value {
        exif::Value::Ascii(ref lines) if !lines.is_empty() => {
            String::from_utf8_lossy(&lines[0]).into_owned()
        }
        _ => {
            return Err(TrackError::Metadata(format!(
                "DateTimeOriginal in {} is not an ASCII value",
                path.display()
            )))
        }
    };

    parse_capture_time(&raw)
}

/// Whole seconds elapsed from frame `a` to frame `b`
///
/// Negative when `b` precedes `a`. Pair processing treats non-positive
/// deltas as degenerate and skips the pair.
pub fn elapsed_seconds(a: &Frame, b: &Frame) -> i64 {
    (b.captured_at - a.captured_at).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Frame;
    use chrono::{Datelike, Timelike};
    use image::GrayImage;

    fn frame_at(time: &str) -> Frame {
        Frame::new("test", GrayImage::new(8, 8), parse_capture_time(time).unwrap())
    }

    #[test]
    fn test_parse_capture_time() {
        let time = parse_capture_time("2024:01:15 10:30:00").unwrap();
        assert_eq!(time.year(), 2024);
        assert_eq!(time.month(), 1);
        assert_eq!(time.day(), 15);
        assert_eq!(time.hour(), 10);
        assert_eq!(time.minute(), 30);
        assert_eq!(time.second(), 0);
    }

    #[test]
    fn test_parse_trims_nul_padding() {
        // EXIF ASCII values may carry NUL terminators
        let time = parse_capture_time("2024:01:15 10:30:00\0").unwrap();
        assert_eq!(time.hour(), 10);
    }

    #[test]
    fn test_parse_format_round_trip() {
        let original = "2023:12:31 23:59:59";
        let time = parse_capture_time(original).unwrap();
        assert_eq!(format_capture_time(&time), original);
    }

    #[test]
    fn test_malformed_timestamp_is_metadata_error() {
        let result = parse_capture_time("2024-01-15T10:30:00");
        assert!(matches!(result, Err(TrackError::Metadata(_))));

        let result = parse_capture_time("");
        assert!(matches!(result, Err(TrackError::Metadata(_))));
    }

    #[test]
    fn test_elapsed_seconds() {
        let first = frame_at("2024:01:15 10:30:00");
        let second = frame_at("2024:01:15 10:30:14");

        assert_eq!(elapsed_seconds(&first, &second), 14);
        assert_eq!(elapsed_seconds(&second, &first), -14);
        assert_eq!(elapsed_seconds(&first, &first), 0);
    }

    #[test]
    fn test_elapsed_seconds_across_midnight() {
        let first = frame_at("2024:01:15 23:59:50");
        let second = frame_at("2024:01:16 00:00:10");
        assert_eq!(elapsed_seconds(&first, &second), 20);
    }
}
