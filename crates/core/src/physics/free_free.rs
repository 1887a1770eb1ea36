//! Dickinson et al. (2003) free-free emission from Hα
//!
//! The Hα intensity is first corrected for dust absorption using the 100-µm
//! dust map, then converted to a free-free brightness temperature through the
//! electron-temperature and frequency dependent ratio of Eq. (11).
//!
//! # Scientific References
//! - Dickinson, C., Davies, R.D., Davis, R.J. (2003). "Towards a free-free
//!   template for CMB foregrounds". MNRAS, 341, 369
//! - Finkbeiner, D.P. (2003). "A Full-Sky Hα Template for Microwave
//!   Foreground Prediction". ApJS, 146, 407
//! - Schlegel, D.J., Finkbeiner, D.P., Davis, M. (1998). "Maps of Dust
//!   Infrared Emission". ApJ, 500, 525

use crate::core_types::Megahertz;
use crate::error::{ForegroundError, Result};
use serde::{Deserialize, Serialize};

/// Effective fraction of line-of-sight dust that absorbs Hα
pub const DUST_FRACTION: f64 = 0.33;

/// Hα absorption (mag) per unit 100-µm dust emission (MJy/sr)
pub const HALPHA_ABSORPTION_PER_DUST: f64 = 0.0462;

/// Correction exponent per MJy/sr in `10^(c · f_dust · D)`
pub const DUST_CORRECTION_COEFF: f64 = 0.0185;

/// Hα absorption above which the correction is considered unreliable (mag)
pub const HALPHA_ABSORPTION_LIMIT: f64 = 1.0;

/// Helium contribution to the free-free to Hα ratio
const HELIUM_FACTOR: f64 = 1.08;

/// Free-free emission model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeFreeModel {
    /// Electron temperature Te (K)
    pub electron_temperature: f64,
    /// Effective dust fraction f_dust
    pub dust_fraction: f64,
}

impl Default for FreeFreeModel {
    fn default() -> Self {
        Self {
            electron_temperature: 7000.0,
            dust_fraction: DUST_FRACTION,
        }
    }
}

impl FreeFreeModel {
    /// Dust emission (MJy/sr) above which pixels are masked
    ///
    /// About 65.6 MJy/sr for the default dust fraction.
    #[must_use]
    pub fn dust_mask_threshold(&self) -> f64 {
        HALPHA_ABSORPTION_LIMIT / HALPHA_ABSORPTION_PER_DUST / self.dust_fraction
    }

    /// Dust-corrected Hα intensity (R), or `NaN` for masked pixels
    ///
    /// # Arguments
    /// * `halpha` - Observed Hα intensity (R)
    /// * `dust` - 100-µm dust emission (MJy/sr)
    #[must_use]
    pub fn correct_halpha(&self, halpha: f64, dust: f64) -> f64 {
        if dust.is_nan() || dust > self.dust_mask_threshold() {
            return f64::NAN;
        }
        halpha * 10f64.powf(dust * DUST_CORRECTION_COEFF * self.dust_fraction)
    }

    /// Reject electron temperatures and dust fractions outside `(0, ∞)`
    ///
    /// A non-positive dust fraction makes the mask threshold infinite or
    /// negative, which would silently keep or mask every pixel.
    ///
    /// # Errors
    /// Returns `ForegroundError::ModelDomain` naming the offending parameter.
    pub fn check_parameters(&self, frequency: Megahertz) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.electron_temperature) {
            return Err(ForegroundError::ModelDomain {
                frequency,
                reason: format!(
                    "electron temperature must be positive, got {}",
                    self.electron_temperature
                ),
            });
        }
        if !positive(self.dust_fraction) {
            return Err(ForegroundError::ModelDomain {
                frequency,
                reason: format!("dust fraction must be positive, got {}", self.dust_fraction),
            });
        }
        Ok(())
    }

    /// Gaunt-factor ratio `a(Te, ν)` of Dickinson et al. Eq. (8)
    #[must_use]
    pub fn gaunt_ratio(&self, frequency: Megahertz) -> f64 {
        let nu = frequency.to_ghz();
        let te = self.electron_temperature;
        0.366 * nu.powf(0.1) * te.powf(-0.15) * ((4.995e-2 / nu).ln() + 1.5 * te.ln())
    }

    /// Free-free brightness temperature per Rayleigh of Hα (K/R)
    ///
    /// # Errors
    /// Returns `ForegroundError::ModelDomain` when `a(Te, ν) <= 0`, which
    /// happens above roughly 29 THz for Te = 7000 K, or when a model
    /// parameter is not positive.
    pub fn kelvin_per_rayleigh(&self, frequency: Megahertz) -> Result<f64> {
        self.check_parameters(frequency)?;
        let a = self.gaunt_ratio(frequency);
        if a.is_nan() || a <= 0.0 {
            return Err(ForegroundError::ModelDomain {
                frequency,
                reason: format!("Gaunt factor ratio a(Te, nu) = {a:.3} is not positive"),
            });
        }
        let nu = frequency.to_ghz();
        let t4 = self.electron_temperature / 1e4;
        let millikelvin =
            8.396 * a * nu.powf(-2.1) * t4.powf(0.667) * 10f64.powf(0.029 / t4) * HELIUM_FACTOR;
        Ok(millikelvin * 1e-3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dust_threshold() {
        let model = FreeFreeModel::default();
        assert_relative_eq!(model.dust_mask_threshold(), 65.59, max_relative = 1e-3);
    }

    #[test]
    fn test_dust_correction() {
        let model = FreeFreeModel::default();
        assert_eq!(model.correct_halpha(2.0, 0.0), 2.0);
        assert_relative_eq!(
            model.correct_halpha(1.0, 10.0),
            10f64.powf(10.0 * 0.0185 * 0.33),
            max_relative = 1e-12
        );
        assert!(model.correct_halpha(1.0, 100.0).is_nan());
        assert!(model.correct_halpha(1.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_ratio_positive_at_low_frequency() {
        let model = FreeFreeModel::default();
        let k_per_r = model.kelvin_per_rayleigh(Megahertz::new(120.0)).unwrap();
        assert!(k_per_r > 0.0);
        // Brightness temperature falls roughly as ν^-2.1
        let higher = model.kelvin_per_rayleigh(Megahertz::new(240.0)).unwrap();
        assert!(higher < k_per_r / 3.5);
    }

    #[test]
    fn test_ratio_matches_dickinson_eq11() {
        let model = FreeFreeModel::default();
        assert_relative_eq!(model.gaunt_ratio(Megahertz::from_ghz(30.0)), 0.937_948_5, max_relative = 1e-6);
        assert_relative_eq!(
            model.kelvin_per_rayleigh(Megahertz::from_ghz(30.0)).unwrap(),
            5.832_161e-6,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            model.kelvin_per_rayleigh(Megahertz::new(408.0)).unwrap(),
            0.051_221_57,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_non_positive_dust_fraction_is_rejected() {
        for dust_fraction in [0.0, -0.33, f64::NAN] {
            let model = FreeFreeModel {
                dust_fraction,
                ..FreeFreeModel::default()
            };
            let err = model.kelvin_per_rayleigh(Megahertz::new(150.0)).unwrap_err();
            assert!(
                matches!(&err, ForegroundError::ModelDomain { reason, .. } if reason.contains("dust fraction")),
                "{err}"
            );
        }
    }

    #[test]
    fn test_far_infrared_is_outside_domain() {
        let model = FreeFreeModel::default();
        let err = model
            .kelvin_per_rayleigh(Megahertz::new(60_000_000.0))
            .unwrap_err();
        assert!(matches!(err, ForegroundError::ModelDomain { .. }));
    }
}
