use chrono::NaiveDateTime;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// 8-bit grayscale raster as decoded from a nadir photograph
pub type FrameRaster = GrayImage;

/// 256-bit binary feature descriptor, packed into 32 bytes
pub type Descriptor = [u8; 32];

/// A single time-stamped image sample from the capture sequence
#[derive(Debug, Clone)]
pub struct Frame {
    /// Identifier carried through logs and results, usually the file stem
    pub id: String,
    /// Grayscale pixel data
    pub raster: FrameRaster,
    /// Acquisition time as recorded by the camera (no timezone)
    pub captured_at: NaiveDateTime,
}

impl Frame {
    pub fn new(id: impl Into<String>, raster: FrameRaster, captured_at: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            raster,
            captured_at,
        }
    }
}

/// A salient image location with its detector response and patch orientation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Corner response used for ranking, higher is stronger
    pub response: f32,
    /// Patch orientation in radians from the intensity centroid
    pub angle: f32,
}

/// Keypoints and descriptors detected in one frame, index-aligned
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// A one-to-one correspondence between keypoints of two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Keypoint index in the first (query) frame
    pub query_idx: usize,
    /// Keypoint index in the second (train) frame
    pub train_idx: usize,
    /// Hamming distance between the two descriptors, lower is more similar
    pub distance: u32,
}

/// Measurement derived from one consecutive frame pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePairResult {
    /// Position of the pair in the sequence (0 = first two frames)
    pub pair_index: usize,
    /// Whole seconds elapsed between the two acquisitions
    pub time_delta_s: u64,
    /// Mean Euclidean displacement over all matched keypoints, pixels
    pub mean_displacement_px: f64,
    /// Arc-corrected ground speed in km/s
    pub speed_kmps: f64,
    /// Number of correspondences behind the measurement
    pub match_count: usize,
}

/// Aggregate speed over all surviving frame pairs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedEstimate {
    /// Arithmetic mean of the accepted per-pair speeds, km/s
    pub mean_kmps: f64,
    /// Accepted per-pair measurements, in sequence order
    pub pairs: Vec<FramePairResult>,
    /// Pairs dropped as outliers or due to per-pair failures
    pub rejected_pairs: usize,
}

impl SpeedEstimate {
    pub fn accepted_pairs(&self) -> usize {
        self.pairs.len()
    }
}

/// Error types for ground-track processing
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Empty correspondence set: {0}")]
    EmptyCorrespondence(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for ground-track operations
pub type TrackResult<T> = Result<T, TrackError>;
