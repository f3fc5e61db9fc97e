//! Orbital arc correction
//!
//! A displacement measured between two nadir photographs is a straight chord
//! across the ground sphere, but the platform travels an arc at orbital
//! radius. Both sweep the same central angle, so the chord converts through
//! `theta = 2 * asin(c / (2 * r_ground))` and `arc = r_orbit * theta`.
//! Skipping the correction systematically underestimates speed.

use crate::types::{TrackError, TrackResult};
use serde::{Deserialize, Serialize};

/// Ground-sphere and orbit radii used for the chord-to-arc conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitGeometry {
    /// Radius of the ground sphere in meters
    pub ground_radius_m: f64,
    /// Radius of the platform orbit from the body center in meters
    pub orbit_radius_m: f64,
}

impl Default for OrbitGeometry {
    /// Earth equatorial radius and the ISS orbit (~408 km altitude)
    fn default() -> Self {
        Self {
            ground_radius_m: 6_378_000.0,
            orbit_radius_m: 6_786_000.0,
        }
    }
}

/// Converts ground-sphere chords into orbital arc lengths
pub struct ArcCorrector {
    geometry: OrbitGeometry,
}

impl ArcCorrector {
    /// Create a corrector with the default geometry
    pub fn new() -> Self {
        Self {
            geometry: OrbitGeometry::default(),
        }
    }

    /// Create a corrector with custom geometry
    pub fn with_geometry(geometry: OrbitGeometry) -> Self {
        Self { geometry }
    }

    /// Arc length swept at orbital radius for a chord on the ground sphere
    ///
    /// Chord and radii must share a unit; the result is in that unit. A
    /// chord outside the asin domain is a hard geometry error, never a
    /// silent clamp.
    pub fn chord_to_arc(&self, chord: f64) -> TrackResult<f64> {
        if self.geometry.ground_radius_m <= 0.0 || self.geometry.orbit_radius_m <= 0.0 {
            return Err(TrackError::Geometry(format!(
                "Radii must be positive: ground {} m, orbit {} m",
                self.geometry.ground_radius_m, self.geometry.orbit_radius_m
            )));
        }

        let ratio = chord / (2.0 * self.geometry.ground_radius_m);
        if !(-1.0..=1.0).contains(&ratio) {
            return Err(TrackError::Geometry(format!(
                "Chord {} outside the ground sphere (half-chord ratio {})",
                chord, ratio
            )));
        }

        let theta = 2.0 * ratio.asin();
        Ok(self.geometry.orbit_radius_m * theta)
    }
}
