//! Ground-speed estimation over a frame sequence
//!
//! Walks every consecutive frame pair: cached features are matched, the
//! matched displacement is reduced to a mean pixel chord, arc-corrected,
//! scaled by the ground sampling distance, and divided by the elapsed
//! capture time. Per-pair failures and outlier speeds are logged and
//! skipped; the run fails only when no pair at all survives.

use crate::core::arc_correction::{ArcCorrector, OrbitGeometry};
use crate::core::displacement;
use crate::core::features::{FeatureExtractor, FeatureParams};
use crate::core::matching::{self, DescriptorMatcher, MatchParams};
use crate::io::metadata;
use crate::types::{FeatureSet, Frame, FramePairResult, SpeedEstimate, TrackError, TrackResult};
use serde::{Deserialize, Serialize};

/// Speed computation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedParams {
    /// Ground sampling distance: ground length covered by one pixel
    pub gsd: f64,
    /// Divisor turning `displacement * gsd` into kilometers
    ///
    /// Tied to the GSD convention of the capture platform; the defaults
    /// express GSD in centimeters per pixel.
    pub unit_divisor: f64,
    /// Per-pair speeds at or above this value (km/s) are discarded as outliers
    pub outlier_ceiling_kmps: f64,
}

impl Default for SpeedParams {
    fn default() -> Self {
        Self {
            gsd: 26_500.0,
            unit_divisor: 100_000.0,
            outlier_ceiling_kmps: 10.0,
        }
    }
}

/// Configuration for the complete estimation pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub features: FeatureParams,
    pub matching: MatchParams,
    pub geometry: OrbitGeometry,
    pub speed: SpeedParams,
}

/// End-to-end ground-speed estimator for an ordered frame sequence
pub struct SpeedEstimator {
    extractor: FeatureExtractor,
    matcher: DescriptorMatcher,
    corrector: ArcCorrector,
    params: SpeedParams,
}

impl SpeedEstimator {
    /// Create an estimator with default configuration throughout
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::default())
    }

    /// Create an estimator from a pipeline configuration
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self {
            extractor: FeatureExtractor::with_params(config.features),
            matcher: DescriptorMatcher::with_params(config.matching),
            corrector: ArcCorrector::with_geometry(config.geometry),
            params: config.speed,
        }
    }

    /// Estimate the mean ground speed over all consecutive frame pairs
    pub fn estimate(&self, frames: &[Frame]) -> TrackResult<SpeedEstimate> {
        if frames.len() < 2 {
            return Err(TrackError::InsufficientData(format!(
                "Need at least two frames, got {}",
                frames.len()
            )));
        }

        log::info!("Estimating ground speed over {} frames", frames.len());

        // Features are detected once per frame; both neighbouring pairs
        // reuse the same set.
        let feature_sets = self.extract_features(frames);
        for (frame, features) in frames.iter().zip(feature_sets.iter()) {
            log::debug!("Frame {}: {} keypoints", frame.id, features.len());
        }

        let mut measured = Vec::with_capacity(frames.len() - 1);
        let mut failed_pairs = 0usize;

        for pair_index in 0..frames.len() - 1 {
            let result = self.pair_speed(
                pair_index,
                &frames[pair_index],
                &frames[pair_index + 1],
                &feature_sets[pair_index],
                &feature_sets[pair_index + 1],
            );

            match result {
                Ok(pair) => {
                    log::debug!(
                        "Pair {}: {:.4} km/s from {} matches over {} s",
                        pair.pair_index,
                        pair.speed_kmps,
                        pair.match_count,
                        pair.time_delta_s
                    );
                    measured.push(pair);
                }
                Err(e) => {
                    log::warn!("Pair {}: skipped ({})", pair_index, e);
                    failed_pairs += 1;
                }
            }
        }

        aggregate(measured, self.params.outlier_ceiling_kmps, failed_pairs)
    }

    /// Compute the speed for one consecutive pair from cached feature sets
    pub fn pair_speed(
        &self,
        pair_index: usize,
        first: &Frame,
        second: &Frame,
        first_features: &FeatureSet,
        second_features: &FeatureSet,
    ) -> TrackResult<FramePairResult> {
        let delta_s = metadata::elapsed_seconds(first, second);
        if delta_s <= 0 {
            return Err(TrackError::Processing(format!(
                "Degenerate time delta {} s between {} and {}",
                delta_s, first.id, second.id
            )));
        }

        let matches = self
            .matcher
            .match_descriptors(&first_features.descriptors, &second_features.descriptors);
        let (query_coords, train_coords) = matching::matched_coordinates(
            &matches,
            &first_features.keypoints,
            &second_features.keypoints,
        );

        let mean_px = displacement::mean_displacement(&query_coords, &train_coords)?;
        let arc_px = self.corrector.chord_to_arc(mean_px)?;
        let speed_kmps = arc_px * self.params.gsd / self.params.unit_divisor / delta_s as f64;

        Ok(FramePairResult {
            pair_index,
            time_delta_s: delta_s as u64,
            mean_displacement_px: mean_px,
            speed_kmps,
            match_count: matches.len(),
        })
    }

    /// Detect features once per frame
    #[cfg(feature = "parallel")]
    fn extract_features(&self, frames: &[Frame]) -> Vec<FeatureSet> {
        use rayon::prelude::*;

        log::debug!("Extracting features from {} frames in parallel", frames.len());
        frames
            .par_iter()
            .map(|frame| self.extractor.extract(&frame.raster))
            .collect()
    }

    /// Detect features once per frame
    #[cfg(not(feature = "parallel"))]
    fn extract_features(&self, frames: &[Frame]) -> Vec<FeatureSet> {
        log::debug!("Extracting features from {} frames", frames.len());
        frames
            .iter()
            .map(|frame| self.extractor.extract(&frame.raster))
            .collect()
    }
}

/// Average the per-pair speeds below the outlier ceiling
///
/// `failed_pairs` counts pairs that never produced a measurement; they join
/// the rejected tally of the final estimate. Accepting nothing is an error:
/// an estimate needs at least one surviving pair.
pub fn aggregate(
    results: Vec<FramePairResult>,
    ceiling_kmps: f64,
    failed_pairs: usize,
) -> TrackResult<SpeedEstimate> {
    let (accepted, outliers): (Vec<_>, Vec<_>) = results
        .into_iter()
        .partition(|pair| pair.speed_kmps < ceiling_kmps);

    for outlier in &outliers {
        log::warn!(
            "Pair {}: removed outlier at {:.4} km/s (ceiling {} km/s)",
            outlier.pair_index,
            outlier.speed_kmps,
            ceiling_kmps
        );
    }

    if accepted.is_empty() {
        return Err(TrackError::InsufficientData(
            "No frame pair survived filtering".to_string(),
        ));
    }

    let mean_kmps =
        accepted.iter().map(|pair| pair.speed_kmps).sum::<f64>() / accepted.len() as f64;
    let rejected_pairs = failed_pairs + outliers.len();

    log::info!(
        "Aggregated {} accepted pairs ({} rejected): {:.4} km/s",
        accepted.len(),
        rejected_pairs,
        mean_kmps
    );

    Ok(SpeedEstimate {
        mean_kmps,
        pairs: accepted,
        rejected_pairs,
    })
}
