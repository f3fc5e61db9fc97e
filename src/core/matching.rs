//! Descriptor matching
//!
//! Brute-force Hamming matching with a mutual-nearest-neighbor cross-check:
//! a correspondence survives only when each descriptor is the other's best
//! candidate. Ties resolve to the lowest index, so matching is deterministic
//! for identical inputs.

use crate::types::{Descriptor, Keypoint, Match};
use serde::{Deserialize, Serialize};

/// Descriptor matching parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchParams {
    /// Optional Hamming-distance ceiling for accepted matches
    ///
    /// `None` keeps every mutual nearest neighbor. Set a bound to shed
    /// low-quality correspondences before the geometric reduction.
    pub max_distance: Option<u32>,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self { max_distance: None }
    }
}

/// Brute-force Hamming matcher with cross-check
pub struct DescriptorMatcher {
    params: MatchParams,
}

impl DescriptorMatcher {
    /// Create a matcher with default parameters
    pub fn new() -> Self {
        Self {
            params: MatchParams::default(),
        }
    }

    /// Create a matcher with custom parameters
    pub fn with_params(params: MatchParams) -> Self {
        Self { params }
    }

    /// Match two descriptor sets one-to-one, sorted by ascending distance
    ///
    /// Either side empty yields an empty list, not an error; whether an
    /// empty correspondence set is fatal is the caller's call.
    pub fn match_descriptors(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<Match> {
        if query.is_empty() || train.is_empty() {
            return Vec::new();
        }

        let forward = nearest_neighbors(query, train);
        let backward = nearest_neighbors(train, query);

        let mut matches: Vec<Match> = forward
            .iter()
            .enumerate()
            .filter_map(|(query_idx, &(train_idx, distance))| {
                (backward[train_idx].0 == query_idx).then(|| Match {
                    query_idx,
                    train_idx,
                    distance,
                })
            })
            .collect();

        if let Some(bound) = self.params.max_distance {
            matches.retain(|m| m.distance <= bound);
        }

        matches.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then(a.query_idx.cmp(&b.query_idx))
        });

        log::debug!(
            "Cross-checked {}x{} descriptors into {} matches",
            query.len(),
            train.len(),
            matches.len()
        );

        matches
    }
}

/// Best candidate in `to` for every descriptor in `from`
#[cfg(feature = "parallel")]
fn nearest_neighbors(from: &[Descriptor], to: &[Descriptor]) -> Vec<(usize, u32)> {
    use rayon::prelude::*;

    from.par_iter().map(|d| best_candidate(d, to)).collect()
}

/// Best candidate in `to` for every descriptor in `from`
#[cfg(not(feature = "parallel"))]
fn nearest_neighbors(from: &[Descriptor], to: &[Descriptor]) -> Vec<(usize, u32)> {
    from.iter().map(|d| best_candidate(d, to)).collect()
}

/// Index and distance of the closest candidate; ties keep the lowest index
fn best_candidate(descriptor: &Descriptor, candidates: &[Descriptor]) -> (usize, u32) {
    let mut best_idx = 0;
    let mut best_distance = u32::MAX;

    for (idx, candidate) in candidates.iter().enumerate() {
        let distance = hamming_distance(descriptor, candidate);
        if distance < best_distance {
            best_distance = distance;
            best_idx = idx;
        }
    }

    (best_idx, best_distance)
}

/// Number of differing bits between two descriptors
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

/// Pixel coordinates of both sides of each match, in match order
pub fn matched_coordinates(
    matches: &[Match],
    query_keypoints: &[Keypoint],
    train_keypoints: &[Keypoint],
) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let mut query_coords = Vec::with_capacity(matches.len());
    let mut train_coords = Vec::with_capacity(matches.len());

    for m in matches {
        let q = &query_keypoints[m.query_idx];
        let t = &train_keypoints[m.train_idx];
        query_coords.push((q.x as f64, q.y as f64));
        train_coords.push((t.x as f64, t.y as f64));
    }

    (query_coords, train_coords)
}
