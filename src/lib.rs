//! GroundTrack: A Fast, Modular Ground-Track Speed Estimator for Orbital Camera Imagery
//!
//! This library estimates the ground speed of an orbiting camera platform from a
//! time-ordered sequence of nadir photographs. Features detected in consecutive
//! frames are matched to measure pixel displacement, which the ground sampling
//! distance and an orbital arc correction turn into distance over the ground;
//! elapsed capture time turns distance into speed.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    Descriptor, FeatureSet, Frame, FramePairResult, FrameRaster, Keypoint, Match,
    SpeedEstimate, TrackError, TrackResult,
};

pub use crate::core::{
    ArcCorrector, DescriptorMatcher, EstimatorConfig, FeatureExtractor, FeatureParams,
    MatchParams, OrbitGeometry, SpeedEstimator, SpeedParams,
};

pub use io::FrameReader;
