//! Frame ingestion
//!
//! Decodes a time-ordered set of photographs into grayscale [`Frame`]s,
//! pulling the acquisition time of each from its embedded metadata. Files
//! whose pixels or metadata cannot be read are dropped with a warning so one
//! bad exposure does not abort a whole capture sequence; the frames before
//! and after a dropped file simply become a consecutive pair.

use crate::io::metadata;
use crate::types::{Frame, TrackError, TrackResult};
use std::path::{Path, PathBuf};

/// Reader that turns ordered image files into pipeline frames
pub struct FrameReader {
    paths: Vec<PathBuf>,
}

impl FrameReader {
    /// Create a reader over an explicit, already-ordered list of image paths
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Create a reader over every regular file in a directory
    ///
    /// Files are ordered by name. Capture sequences with numeric suffixes
    /// beyond one digit (image_10 sorts before image_2) should build the
    /// path list themselves and use [`FrameReader::new`].
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> TrackResult<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(TrackError::InsufficientData(format!(
                "No files found in {}",
                dir.display()
            )));
        }

        Ok(Self { paths })
    }

    /// Number of files behind this reader
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Load every readable frame, in input order
    ///
    /// Fails only when not a single file yields a usable frame.
    pub fn read_frames(&self) -> TrackResult<Vec<Frame>> {
        log::info!("Loading {} image files", self.paths.len());

        let mut frames = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            match Self::read_frame(path) {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    log::warn!("Dropping frame {}: {}", path.display(), e);
                }
            }
        }

        if frames.is_empty() {
            return Err(TrackError::InsufficientData(
                "No frame could be loaded from the input set".to_string(),
            ));
        }

        log::info!("Loaded {} of {} frames", frames.len(), self.paths.len());
        Ok(frames)
    }

    /// Load a single file into a frame (grayscale raster plus capture time)
    pub fn read_frame<P: AsRef<Path>>(path: P) -> TrackResult<Frame> {
        let path = path.as_ref();
        let captured_at = metadata::read_capture_time(path)?;
        let raster = image::open(path)?.to_luma8();

        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!(
            "Frame {}: {}x{} captured at {}",
            id,
            raster.width(),
            raster.height(),
            captured_at
        );

        Ok(Frame::new(id, raster, captured_at))
    }
}
