//! Feature detection and description
//!
//! Finds salient corners with FAST-9, assigns each an intensity-centroid
//! orientation, and packs a rotation-aware 256-bit binary descriptor per
//! keypoint. The whole stage is deterministic: the sampling pattern is a
//! fixed constant and every ranking tie breaks on raster order, so the same
//! image always yields the same feature set.

use crate::types::{Descriptor, FeatureSet, FrameRaster, Keypoint};
use imageproc::corners::{corners_fast9, Corner};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Learned comparison pattern for the binary descriptor
///
/// Each entry is one intensity test: two sample offsets (x1, y1, x2, y2)
/// relative to the keypoint, rotated by the keypoint orientation before
/// sampling. 256 tests pack into 32 descriptor bytes.
const SAMPLING_PATTERN: [(i8, i8, i8, i8); 256] = [
    (8, -3, 9, 5), (-11, 9, -8, 2), (3, -12, -13, 2), (-3, -7, -4, 5),
    (1, -11, 12, -2), (1, -1, 11, -1), (4, -2, -5, -8), (2, -13, -8, 9),
    (-11, 1, 6, 2), (11, 11, 12, -1), (6, -12, -9, -8), (12, 5, 3, -6),
    (1, 1, -4, -1), (7, -4, -6, 7), (-3, 2, 9, -8), (-4, -8, 3, 3),
    (-5, 3, 0, -4), (2, -11, -13, 0), (10, 5, 5, 2), (0, 9, 10, -3),
    (5, -8, -10, 1), (8, 3, -8, -5), (2, -6, -9, -4), (-12, 2, 0, -10),
    (5, -10, -7, -2), (-7, 9, -1, 0), (0, -1, -3, 3), (-12, 5, -2, -1),
    (-1, 1, -5, -11), (-1, 2, -3, 0), (-5, -6, 7, -1), (4, 7, 0, -8),
    (-9, 9, 3, -13), (7, -3, 13, -7), (10, -4, -5, 3), (6, 1, -13, -13),
    (-12, -11, 7, 0), (0, -1, -8, -6), (-10, -5, -6, 7), (10, 2, -6, -12),
    (-11, 8, 4, -2), (9, 0, -11, -4), (0, 11, 6, -11), (4, 1, -10, -3),
    (-6, 12, 1, 12), (-4, -8, 8, -7), (-3, 0, 8, 3), (3, 3, -3, -1),
    (-6, -11, -2, 12), (0, -3, -6, -3), (-6, 3, -12, -8), (6, 3, -2, -10),
    (-3, -10, -1, 0), (11, 2, 11, 3), (1, -8, -10, 8), (2, -2, -7, 8),
    (0, -13, 13, 0), (6, -9, -1, -1), (7, 5, 6, 3), (-13, 7, -7, -7),
    (-5, -13, 5, -11), (6, 7, -2, 12), (-6, -11, 8, 6), (-2, -2, -5, 9),
    (5, 4, 7, -6), (0, 11, -4, -5), (10, 1, 2, -8), (-3, -10, -10, -10),
    (1, 9, 6, -5), (-7, -11, 11, 3), (11, -2, -4, 3), (7, -1, 5, 12),
    (-5, 5, -2, -5), (8, -11, -1, -13), (-13, 2, -11, -8), (-2, 9, 5, 0),
    (2, -5, 2, 0), (3, -13, -12, 9), (6, -3, 5, 4), (10, 10, 1, -9),
    (-13, -8, -4, 10), (2, -2, -3, 8), (-13, -11, -8, -3), (2, -4, -7, -3),
    (12, 0, -2, 13), (-11, 7, -10, -1), (-5, -10, 0, -11), (6, 7, 12, -3),
    (-1, -1, 8, -6), (-6, 3, -1, -3), (-2, -11, -11, -3), (12, -2, 3, -10),
    (-11, -1, -2, -8), (3, -1, 7, 3), (2, -2, -12, 12), (6, -4, 12, -2),
    (-3, 11, 2, -12), (-1, 3, 2, 3), (1, 3, -11, -3), (2, -8, -7, -5),
    (0, -5, -11, -6), (-12, 8, -2, 9), (3, -7, 9, -8), (-10, -6, -1, -11),
    (11, -6, -3, -13), (3, 0, 0, -8), (-5, -2, -1, -13), (-8, -5, -10, -13),
    (7, -13, 0, -3), (1, -4, -1, -13), (6, -5, -7, 8), (8, 7, -5, -13),
    (2, 0, -8, -6), (-8, -3, -13, -6), (-6, 5, 0, 6), (-8, 8, -9, 1),
    (10, 1, -9, 4), (-4, -8, -5, 7), (7, 7, 10, -8), (-7, -3, -1, 1),
    (10, -1, 3, 1), (5, 6, -10, -8), (-6, -13, 5, -8), (4, -3, -4, -13),
    (-3, 4, -2, -13), (10, -11, 9, 11), (-9, 0, 12, 2), (-4, -2, 13, -6),
    (2, -10, -6, 1), (11, -13, 4, -13), (1, -1, 1, 9), (1, -5, -13, -5),
    (7, 4, 12, -7), (0, -2, -8, 3), (7, 2, 2, -8), (-2, 7, -12, -4),
    (1, 11, 6, -2), (-1, -1, -4, 10), (0, 8, 0, -13), (3, 12, 5, -13),
    (-9, -1, 9, -13), (12, 4, -6, -4), (-13, 13, 1, -4), (0, -2, -7, -9),
    (10, -8, -13, 3), (2, -13, 6, 8), (10, -6, -7, 0), (-11, 7, -1, -7),
    (12, 0, 5, -4), (-7, -8, 4, -12), (-13, 5, -5, -2), (0, 5, 4, 4),
    (-2, -11, -1, 8), (9, 3, -1, -12), (0, 6, -10, 12), (1, -8, -7, -10),
    (-6, 4, -6, 3), (5, 1, -3, -9), (-6, 6, -6, 3), (7, -8, 1, -7),
    (3, 8, -9, -5), (2, -4, 5, 7), (11, 4, 6, -3), (-8, -1, 11, -1),
    (-3, -6, -10, -8), (2, 7, 3, -12), (-4, -10, 12, -3), (1, -2, -4, 6),
    (3, 11, -11, 0), (-6, 2, 3, -8), (6, 12, 0, -13), (3, 2, -2, -5),
    (-4, 1, -6, 5), (-12, 0, -13, 9), (-6, 2, 7, -8), (-2, -4, -6, 5),
    (0, 0, 0, -13), (9, -13, -2, 0), (3, -13, 5, -12), (10, 11, -13, -13),
    (-2, 3, -12, 3), (11, 7, -7, 0), (12, 2, 1, -13), (12, -11, 12, -8),
    (-7, -2, -4, -7), (7, 5, -1, -13), (-5, -8, -9, 10), (6, 0, -3, -13),
    (12, 4, -13, 1), (-7, 8, 8, -3), (10, -4, 0, -13), (2, 1, -7, 0),
    (-5, 4, 2, -8), (12, 8, 4, -13), (8, 7, -10, 0), (-3, 6, -2, 4),
    (-5, -1, -8, -12), (4, -1, -2, -10), (6, -4, -13, 9), (-7, 8, -6, -12),
    (-10, 2, -13, 10), (-1, -7, 0, 2), (-5, 6, -5, -12), (6, -13, 7, -3),
    (-13, 2, -1, 8), (2, 8, -13, 0), (-6, -9, 1, -4), (-9, 13, 0, -13),
    (-2, -3, 8, 0), (4, 0, -11, 12), (0, 3, -10, 10), (-6, -9, -3, -2),
    (9, -4, -6, 2), (5, 0, -13, -10), (-3, -8, -13, 3), (-12, -1, -4, -2),
    (7, -9, -4, 3), (-8, -4, 1, 11), (11, 6, 2, -12), (6, 6, -8, 12),
    (-3, -8, 2, -10), (2, 5, -8, 8), (-9, 8, -6, -8), (-4, 0, -11, -7),
    (7, 6, -3, 8), (-5, 7, -12, 5), (2, -8, -5, 1), (0, 4, -5, -3),
    (9, -9, -6, -12), (0, -13, 0, -13), (-7, -11, -3, -13), (6, -12, -7, 10),
    (6, -8, -13, 7), (8, 7, -11, -1), (-11, -5, -6, 9), (6, 4, 2, -13),
    (-1, -6, 3, -9), (1, -4, 4, -3), (-6, 8, -12, 0), (-11, 3, -6, 2),
    (7, -10, 11, -6), (5, 0, 12, -13), (4, -8, 1, -1), (-13, 12, -6, 3),
    (1, 4, -9, -2), (-8, -12, -8, 7), (-9, 5, 0, -5), (9, 7, 5, 3),
    (-12, -2, 8, -8), (3, 7, 12, -8), (-13, 3, -1, -1), (-10, -4, -10, 12),
    (5, -2, 0, 13), (-7, 1, -12, 8), (2, 9, -5, -11), (11, -13, 0, 2),
];

/// Feature detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureParams {
    /// Maximum number of keypoints kept per frame, strongest response first
    pub max_features: usize,
    /// FAST-9 intensity threshold
    pub fast_threshold: u8,
    /// Gaussian smoothing applied before descriptor sampling
    pub blur_sigma: f32,
    /// Radius of the patch used for the orientation moments
    pub orientation_radius: i32,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            max_features: 1000,
            fast_threshold: 20,
            blur_sigma: 2.0,
            orientation_radius: 15,
        }
    }
}

/// FAST-9 detector with rotation-aware binary descriptors
pub struct FeatureExtractor {
    params: FeatureParams,
}

impl FeatureExtractor {
    /// Create an extractor with default parameters
    pub fn new() -> Self {
        Self {
            params: FeatureParams::default(),
        }
    }

    /// Create an extractor with custom parameters
    pub fn with_params(params: FeatureParams) -> Self {
        Self { params }
    }

    /// Detect keypoints and compute their descriptors for one raster
    ///
    /// An image without salient structure yields an empty set; callers
    /// decide whether that is an error.
    pub fn extract(&self, image: &FrameRaster) -> FeatureSet {
        let corners = self.detect_ranked_corners(image);
        if corners.is_empty() {
            log::debug!("No corners above threshold {}", self.params.fast_threshold);
            return FeatureSet::default();
        }

        // Descriptor bits compare single pixels, so sample a smoothed copy
        // to keep sensor noise from flipping them.
        let smoothed = imageproc::filter::gaussian_blur_f32(image, self.params.blur_sigma);

        let mut keypoints = Vec::with_capacity(corners.len());
        let mut descriptors = Vec::with_capacity(corners.len());

        for corner in corners {
            let angle = self.orientation(image, corner.x, corner.y);
            let keypoint = Keypoint {
                x: corner.x as f32,
                y: corner.y as f32,
                response: corner.score,
                angle,
            };
            descriptors.push(self.describe(&smoothed, &keypoint));
            keypoints.push(keypoint);
        }

        log::debug!(
            "Extracted {} keypoints ({}x{} raster)",
            keypoints.len(),
            image.width(),
            image.height()
        );

        FeatureSet {
            keypoints,
            descriptors,
        }
    }

    /// FAST-9 corners ranked by response, truncated to `max_features`
    ///
    /// Ties break on (y, x) so ranking never depends on detector output
    /// order.
    fn detect_ranked_corners(&self, image: &FrameRaster) -> Vec<Corner> {
        let mut corners = corners_fast9(image, self.params.fast_threshold);

        corners.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| (a.y, a.x).cmp(&(b.y, b.x)))
        });
        corners.truncate(self.params.max_features);

        corners
    }

    /// Patch orientation from intensity moments (m01, m10)
    fn orientation(&self, image: &FrameRaster, cx: u32, cy: u32) -> f32 {
        let radius = self.params.orientation_radius;
        let mut m01 = 0.0f32;
        let mut m10 = 0.0f32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let px = cx as i32 + dx;
                let py = cy as i32 + dy;
                if px < 0 || py < 0 || px >= image.width() as i32 || py >= image.height() as i32 {
                    continue;
                }

                let intensity = image.get_pixel(px as u32, py as u32)[0] as f32;
                m10 += intensity * dx as f32;
                m01 += intensity * dy as f32;
            }
        }

        m01.atan2(m10)
    }

    /// 256 rotated intensity comparisons packed into 32 bytes
    fn describe(&self, image: &FrameRaster, keypoint: &Keypoint) -> Descriptor {
        let mut descriptor = [0u8; 32];
        let (sin_a, cos_a) = keypoint.angle.sin_cos();
        let cx = keypoint.x as i32;
        let cy = keypoint.y as i32;

        for (byte_idx, byte_tests) in SAMPLING_PATTERN.chunks(8).enumerate() {
            let mut byte_val = 0u8;

            for (bit_idx, &(x1, y1, x2, y2)) in byte_tests.iter().enumerate() {
                let first = sample_rotated(image, cx, cy, x1, y1, sin_a, cos_a);
                let second = sample_rotated(image, cx, cy, x2, y2, sin_a, cos_a);
                if first < second {
                    byte_val |= 1 << bit_idx;
                }
            }

            descriptor[byte_idx] = byte_val;
        }

        descriptor
    }
}

/// Intensity at a pattern offset rotated around the keypoint
///
/// Reads are clamped to the raster so keypoints near the border stay valid.
fn sample_rotated(
    image: &FrameRaster,
    cx: i32,
    cy: i32,
    dx: i8,
    dy: i8,
    sin_a: f32,
    cos_a: f32,
) -> u8 {
    let rx = (dx as f32 * cos_a - dy as f32 * sin_a).round() as i32;
    let ry = (dx as f32 * sin_a + dy as f32 * cos_a).round() as i32;

    let px = (cx + rx).clamp(0, image.width() as i32 - 1) as u32;
    let py = (cy + ry).clamp(0, image.height() as i32 - 1) as u32;

    image.get_pixel(px, py)[0]
}
