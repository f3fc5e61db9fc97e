//! Core ground-track processing modules

pub mod features;
pub mod matching;
pub mod displacement;
pub mod arc_correction;
pub mod speed_estimation;

// Re-export main types
pub use features::{FeatureExtractor, FeatureParams};
pub use matching::{DescriptorMatcher, MatchParams};
pub use arc_correction::{ArcCorrector, OrbitGeometry};
pub use speed_estimation::{EstimatorConfig, SpeedEstimator, SpeedParams};
