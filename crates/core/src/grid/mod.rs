//! Shared spherical pixelization

pub mod healpix;
pub mod resample;

// Re-export main types
pub use healpix::{
    angle_to_pixel, check_order, pixel_count, pixel_solid_angle, pixel_to_angle, query_disc,
    SphericalGrid, MAX_ORDER,
};
pub use resample::resample;
