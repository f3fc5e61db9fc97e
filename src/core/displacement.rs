//! Geometric reduction of matched correspondences
//!
//! Collapses a set of matched keypoint pairs into a single scalar: the mean
//! Euclidean displacement in pixels. No correspondences means no displacement
//! signal, which is an error rather than a zero.

use crate::types::{TrackError, TrackResult};

/// Mean Euclidean displacement in pixels across correspondence pairs
///
/// The two slices are index-aligned: entry `i` of each belongs to the same
/// correspondence.
pub fn mean_displacement(
    query_coords: &[(f64, f64)],
    train_coords: &[(f64, f64)],
) -> TrackResult<f64> {
    if query_coords.len() != train_coords.len() {
        return Err(TrackError::Processing(format!(
            "Correspondence length mismatch: {} vs {}",
            query_coords.len(),
            train_coords.len()
        )));
    }
    if query_coords.is_empty() {
        return Err(TrackError::EmptyCorrespondence(
            "No matched coordinates to reduce".to_string(),
        ));
    }

    let total: f64 = query_coords
        .iter()
        .zip(train_coords.iter())
        .map(|(q, t)| (q.0 - t.0).hypot(q.1 - t.1))
        .sum();

    Ok(total / query_coords.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_coordinates_have_zero_displacement() {
        let coords = vec![(10.0, 20.0), (30.0, 40.0)];
        let result = mean_displacement(&coords, &coords).unwrap();
        assert_relative_eq!(result, 0.0);
    }

    #[test]
    fn test_single_pair() {
        // 3-4-5 triangle
        let result = mean_displacement(&[(0.0, 0.0)], &[(3.0, 4.0)]).unwrap();
        assert_relative_eq!(result, 5.0);
    }

    #[test]
    fn test_mean_over_pairs() {
        let query = vec![(0.0, 0.0), (10.0, 10.0)];
        let train = vec![(3.0, 4.0), (10.0, 20.0)];

        // displacements 5 and 10
        let result = mean_displacement(&query, &train).unwrap();
        assert_relative_eq!(result, 7.5);
    }

    #[test]
    fn test_displacement_is_direction_independent() {
        let query = vec![(5.0, 5.0)];
        let train = vec![(2.0, 1.0)];

        let forward = mean_displacement(&query, &train).unwrap();
        let backward = mean_displacement(&train, &query).unwrap();
        assert_relative_eq!(forward, backward);
        assert_relative_eq!(forward, 5.0);
    }

    #[test]
    fn test_empty_correspondences_is_error() {
        let result = mean_displacement(&[], &[]);
        assert!(matches!(result, Err(TrackError::EmptyCorrespondence(_))));
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let result = mean_displacement(&[(0.0, 0.0)], &[]);
        assert!(matches!(result, Err(TrackError::Processing(_))));
    }
}
