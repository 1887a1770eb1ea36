//! Physical models shared by the foreground components

pub mod convert;
pub mod cosmology;
pub mod free_free;
pub mod profiles;
pub mod spectral;

// Re-export main functions
pub use convert::{
    brightness_temperature_to_flux, flux_to_brightness_temperature, rayleigh_jeans_factor,
    surface_brightness_to_temperature,
};
pub use cosmology::Cosmology;
pub use free_free::FreeFreeModel;
pub use spectral::{curved_power_law, power_law};
