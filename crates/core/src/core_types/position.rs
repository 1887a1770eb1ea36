//! Sky coordinates
//!
//! Positions are Galactic longitude/latitude in degrees. Geometry (angular
//! distances, bearings) is done on unit vectors.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Unit vector on the celestial sphere
pub type UnitVec = Vector3<f64>;

/// A direction on the sky in Galactic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    /// Galactic longitude [deg], any value (wrapped on use)
    pub lon: f64,
    /// Galactic latitude [deg], in [-90, 90]
    pub lat: f64,
}

impl SkyPosition {
    /// Create a new position from longitude and latitude in degrees
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build a position from HEALPix colatitude θ and azimuth φ (radians)
    #[must_use]
    pub fn from_colatitude(theta: f64, phi: f64) -> Self {
        Self {
            lon: phi.to_degrees().rem_euclid(360.0),
            lat: 90.0 - theta.to_degrees(),
        }
    }

    /// Colatitude θ in radians (0 at the north Galactic pole)
    #[must_use]
    pub fn colatitude(&self) -> f64 {
        (90.0 - self.lat).to_radians()
    }

    /// Azimuth φ in radians, wrapped to [0, 2π)
    #[must_use]
    pub fn azimuth(&self) -> f64 {
        self.lon.to_radians().rem_euclid(std::f64::consts::TAU)
    }

    /// True if both coordinates are finite and the latitude is on the sphere
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat)
    }

    /// Cartesian unit vector for this direction
    #[must_use]
    pub fn to_unit_vector(&self) -> UnitVec {
        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.lon.to_radians().sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Local east/north basis vectors of the tangent plane at this position
    ///
    /// At the poles the east vector follows the longitude, which keeps the
    /// basis orthonormal.
    #[must_use]
    pub fn tangent_basis(&self) -> (UnitVec, UnitVec) {
        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.lon.to_radians().sin_cos();
        let east = Vector3::new(-sin_lon, cos_lon, 0.0);
        let north = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
        (east, north)
    }

    /// Great-circle distance to another position [rad]
    #[must_use]
    pub fn angular_distance(&self, other: &SkyPosition) -> f64 {
        angle_between(&self.to_unit_vector(), &other.to_unit_vector())
    }
}

/// Angle between two unit vectors [rad], stable for small and large angles
#[must_use]
pub fn angle_between(a: &UnitVec, b: &UnitVec) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}
