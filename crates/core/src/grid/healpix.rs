//! HEALPix equal-area pixelization in NESTED ordering
//!
//! The sphere is split into 12 base pixels; each refinement order splits
//! every pixel into 4 children, so `nside = 2^order` and
//! `npix = 12 * nside^2`. In NESTED ordering the children of pixel `p` at
//! order `k` are `4p .. 4p+3` at order `k+1`, which makes resolution changes
//! pure index arithmetic.
//!
//! Hashing, cell centres and cone coverage come from `cdshealpix`, whose
//! `depth` is our `order`.
//!
//! # References
//! - Górski, K.M. et al. (2005). "HEALPix: A Framework for High-Resolution
//!   Discretization and Fast Analysis of Data Distributed on the Sphere"
//!   ApJ, 622, 759

use crate::core_types::position::{angle_between, SkyPosition, UnitVec};
use crate::error::{ForegroundError, Result};
use cdshealpix::nested;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Highest supported resolution order (nside = 4096, ~201M pixels)
pub const MAX_ORDER: u8 = 12;

/// Shared equal-area spherical grid at a fixed resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SphericalGrid {
    order: u8,
}

impl SphericalGrid {
    /// Create a grid at the given order
    ///
    /// # Errors
    /// Returns `ForegroundError::Resolution` if `order > MAX_ORDER`.
    pub fn new(order: u8) -> Result<Self> {
        check_order(order)?;
        Ok(Self { order })
    }

    /// Resolution order
    #[must_use]
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Pixels along one side of a base pixel
    #[must_use]
    pub fn nside(&self) -> u32 {
        cdshealpix::nside(self.order)
    }

    /// Total pixel count
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        pixel_count(self.order)
    }

    /// Solid angle of one pixel [sr]
    #[must_use]
    pub fn pixel_solid_angle(&self) -> f64 {
        pixel_solid_angle(self.order)
    }

    /// Approximate pixel size [rad] (square root of the pixel solid angle)
    #[must_use]
    pub fn pixel_size(&self) -> f64 {
        self.pixel_solid_angle().sqrt()
    }

    /// Pixel containing a sky position
    #[must_use]
    pub fn angle_to_pixel(&self, position: &SkyPosition) -> u64 {
        angle_to_pixel(self.order, position)
    }

    /// Centre of a pixel
    #[must_use]
    pub fn pixel_to_angle(&self, pixel: u64) -> SkyPosition {
        pixel_to_angle(self.order, pixel)
    }

    /// Unit vector of a pixel centre
    #[must_use]
    pub fn pixel_to_vector(&self, pixel: u64) -> UnitVec {
        pixel_to_vector(self.order, pixel)
    }

    /// Pixels whose centres lie within `radius` [rad] of `centre`
    #[must_use]
    pub fn query_disc(&self, centre: &SkyPosition, radius: f64) -> Vec<u64> {
        query_disc(self.order, centre, radius)
    }
}

/// Validate a resolution order
///
/// # Errors
/// Returns `ForegroundError::Resolution` if `order > MAX_ORDER`.
pub fn check_order(order: u8) -> Result<()> {
    if order > MAX_ORDER {
        return Err(ForegroundError::Resolution(format!(
            "order {order} exceeds the maximum supported order {MAX_ORDER}"
        )));
    }
    Ok(())
}

/// Number of pixels at a resolution order: `12 * 4^order`
#[must_use]
pub fn pixel_count(order: u8) -> usize {
    cdshealpix::n_hash(order) as usize
}

/// Solid angle of one pixel at a resolution order [sr]
#[must_use]
pub fn pixel_solid_angle(order: u8) -> f64 {
    4.0 * PI / pixel_count(order) as f64
}

/// Pixel (NESTED) containing a sky position
#[must_use]
pub fn angle_to_pixel(order: u8, position: &SkyPosition) -> u64 {
    let lat = position.lat.to_radians().clamp(-FRAC_PI_2, FRAC_PI_2);
    nested::get(order).hash(position.azimuth(), lat)
}

/// Pixel (NESTED) containing a unit vector
#[must_use]
pub fn vector_to_pixel(order: u8, v: &UnitVec) -> u64 {
    let norm = v.norm();
    let lat = (v.z / norm).clamp(-1.0, 1.0).asin();
    let lon = v.y.atan2(v.x).rem_euclid(TAU);
    nested::get(order).hash(lon, lat)
}

/// Centre of a pixel (NESTED)
#[must_use]
pub fn pixel_to_angle(order: u8, pixel: u64) -> SkyPosition {
    let (lon, lat) = nested::get(order).center(pixel);
    SkyPosition::new(lon.to_degrees().rem_euclid(360.0), lat.to_degrees())
}

/// Unit vector of a pixel centre (NESTED)
#[must_use]
pub fn pixel_to_vector(order: u8, pixel: u64) -> UnitVec {
    let (lon, lat) = nested::get(order).center(pixel);
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    UnitVec::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// Pixels whose centres lie within `radius` [rad] of `centre`
///
/// The approximate cone coverage is a superset of the pixels overlapping the
/// disc; it is narrowed to pixels whose centres are inside. Returned pixels
/// are sorted ascending.
#[must_use]
pub fn query_disc(order: u8, centre: &SkyPosition, radius: f64) -> Vec<u64> {
    if radius.is_nan() || radius < 0.0 {
        return Vec::new();
    }
    let target = centre.to_unit_vector();
    let inside = |pixel: &u64| angle_between(&target, &pixel_to_vector(order, *pixel)) <= radius;

    if radius >= PI {
        return (0..pixel_count(order) as u64).filter(inside).collect();
    }

    let lat = centre.lat.to_radians().clamp(-FRAC_PI_2, FRAC_PI_2);
    // A zero-radius cone still has to return the pixel holding the centre
    let cone_radius = radius.max(f64::EPSILON);
    let coverage = nested::get(order).cone_coverage_approx(centre.azimuth(), lat, cone_radius);

    let mut found: Vec<u64> = coverage.flat_iter().filter(inside).collect();
    found.sort_unstable();
    found.dedup();
    found
}

/// Parent of a pixel `levels` orders up the hierarchy
#[inline]
#[must_use]
pub fn parent(pixel: u64, levels: u8) -> u64 {
    pixel >> (2 * u32::from(levels))
}

/// Range of descendants of a pixel `levels` orders down the hierarchy
#[inline]
#[must_use]
pub fn children(pixel: u64, levels: u8) -> std::ops::Range<u64> {
    let shift = 2 * u32::from(levels);
    (pixel << shift)..((pixel + 1) << shift)
}
