//! Rayleigh–Jeans conversions between brightness temperature and flux density
//!
//! In the Rayleigh–Jeans limit the specific intensity of a source with
//! brightness temperature `T` is `I = 2 k ν² T / c²`. Integrating over a
//! solid angle `Ω` gives the flux density `S = I Ω`. All constants are CGS;
//! flux densities are returned in Jansky (1 Jy = 1e-23 erg s⁻¹ cm⁻² Hz⁻¹).
//!
//! # References
//! - Wilson, Rohlfs & Hüttemeister (2013). "Tools of Radio Astronomy", §1.6

use crate::core_types::Megahertz;

/// Boltzmann constant (erg/K)
pub const BOLTZMANN: f64 = 1.380_649e-16;

/// Speed of light (cm/s)
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e10;

/// One Jansky in CGS units (erg s⁻¹ cm⁻² Hz⁻¹)
pub const JANSKY: f64 = 1e-23;

/// Square degrees per steradian
pub const SQ_DEG_PER_SR: f64 = (180.0 / std::f64::consts::PI) * (180.0 / std::f64::consts::PI);

/// Flux density per unit brightness temperature per steradian
///
/// # Returns
/// `2 k ν² / c²` in Jy sr⁻¹ K⁻¹ (about 5114 at 408 MHz)
#[must_use]
pub fn rayleigh_jeans_factor(frequency: Megahertz) -> f64 {
    let nu = frequency.to_hz();
    2.0 * BOLTZMANN * nu * nu / (SPEED_OF_LIGHT * SPEED_OF_LIGHT) / JANSKY
}

/// Convert a brightness temperature to flux density
///
/// # Arguments
/// * `temperature` - Brightness temperature (K)
/// * `solid_angle` - Solid angle of the emitting region (sr)
/// * `frequency` - Observing frequency
///
/// # Returns
/// Flux density (Jy)
#[must_use]
pub fn brightness_temperature_to_flux(temperature: f64, solid_angle: f64, frequency: Megahertz) -> f64 {
    temperature * solid_angle * rayleigh_jeans_factor(frequency)
}

/// Convert a flux density to brightness temperature
///
/// # Arguments
/// * `flux` - Flux density (Jy)
/// * `solid_angle` - Solid angle of the emitting region (sr)
/// * `frequency` - Observing frequency
///
/// # Returns
/// Brightness temperature (K)
#[must_use]
pub fn flux_to_brightness_temperature(flux: f64, solid_angle: f64, frequency: Megahertz) -> f64 {
    flux / (solid_angle * rayleigh_jeans_factor(frequency))
}

/// Convert a surface brightness in Jy/deg² to brightness temperature (K)
#[must_use]
pub fn surface_brightness_to_temperature(brightness: f64, frequency: Megahertz) -> f64 {
    brightness * SQ_DEG_PER_SR / rayleigh_jeans_factor(frequency)
}
