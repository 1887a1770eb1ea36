//! Semantic unit types for frequencies and map values
//!
//! Frequencies are carried as a `Megahertz` newtype so that MHz, GHz and Hz
//! are never mixed by accident. Map values carry a `MapUnit` tag, and each
//! unit knows whether it describes an extensive quantity (flux per pixel,
//! summed when pixels merge) or an intensive one (temperature, surface
//! brightness, spectral index; averaged when pixels merge).
//!
//! # Usage
//! ```
//! use foreground_sim_core::core_types::units::{FieldKind, MapUnit, Megahertz};
//!
//! let freq = Megahertz::new(1420.0);
//! assert!((freq.to_ghz() - 1.42).abs() < 1e-12);
//! assert_eq!(MapUnit::JanskyPerPixel.field_kind(), FieldKind::Extensive);
//! assert_eq!(MapUnit::Kelvin.field_kind(), FieldKind::Intensive);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, Div};

// ============================================================================
// FREQUENCY
// ============================================================================

/// Frequency in megahertz
///
/// Equality and ordering both follow `f64::total_cmp`, so `-0.0` sorts and
/// compares below `0.0` and `NaN` equals itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Megahertz(f64);

impl PartialEq for Megahertz {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Megahertz {}

impl PartialOrd for Megahertz {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Megahertz {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Megahertz {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Megahertz {
    /// Hz per MHz
    const HZ_PER_MHZ: f64 = 1.0e6;

    /// Create a new frequency. Values are validated by the run configuration,
    /// not here, so that invalid frequencies can be reported as such.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Megahertz(value)
    }

    /// Create from a value in gigahertz
    #[inline]
    #[must_use]
    pub fn from_ghz(value: f64) -> Self {
        Megahertz(value * 1.0e3)
    }

    /// Raw value in MHz
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to gigahertz
    #[inline]
    #[must_use]
    pub fn to_ghz(self) -> f64 {
        self.0 * 1.0e-3
    }

    /// Convert to hertz
    #[inline]
    #[must_use]
    pub fn to_hz(self) -> f64 {
        self.0 * Self::HZ_PER_MHZ
    }

    /// True for strictly positive, finite frequencies
    #[inline]
    #[must_use]
    pub fn is_physical(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

/// Frequency ratio ν/ν₀ (dimensionless)
impl Div for Megahertz {
    type Output = f64;
    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}

impl From<f64> for Megahertz {
    fn from(v: f64) -> Self {
        Megahertz(v)
    }
}

impl From<Megahertz> for f64 {
    fn from(f: Megahertz) -> f64 {
        f.0
    }
}

impl fmt::Display for Megahertz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(precision) = f.precision() {
            write!(f, "{:.*} MHz", precision, self.0)
        } else {
            write!(f, "{} MHz", self.0)
        }
    }
}

// ============================================================================
// MAP UNITS
// ============================================================================

/// How a field behaves when pixels are merged or split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Quantity integrated over the pixel area (flux density per pixel).
    /// Merging pixels sums; splitting is not defined without a model.
    Extensive,
    /// Quantity defined per unit area or per point (temperature, surface
    /// brightness, spectral index). Merging averages; splitting interpolates.
    Intensive,
}

/// Physical unit of a pixelized field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapUnit {
    /// Brightness temperature [K]
    Kelvin,
    /// Flux density integrated over one pixel [Jy/pixel]
    JanskyPerPixel,
    /// Hα intensity [R]
    Rayleigh,
    /// Infrared surface brightness [MJy/sr]
    MegaJanskyPerSteradian,
    /// Unitless quantity such as a spectral index
    Dimensionless,
}

impl MapUnit {
    /// Field behaviour of this unit under resampling
    #[must_use]
    pub const fn field_kind(self) -> FieldKind {
        match self {
            Self::JanskyPerPixel => FieldKind::Extensive,
            Self::Kelvin | Self::Rayleigh | Self::MegaJanskyPerSteradian | Self::Dimensionless => {
                FieldKind::Intensive
            }
        }
    }

    /// Short unit symbol used in logs and manifests
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Kelvin => "K",
            Self::JanskyPerPixel => "Jy/pixel",
            Self::Rayleigh => "R",
            Self::MegaJanskyPerSteradian => "MJy/sr",
            Self::Dimensionless => "1",
        }
    }
}

impl fmt::Display for MapUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_conversions() {
        let f = Megahertz::new(408.0);
        assert_eq!(f.to_hz(), 408.0e6);
        assert!((f.to_ghz() - 0.408).abs() < 1e-15);
        assert_eq!(Megahertz::from_ghz(1.42), Megahertz::new(1420.0));
    }

    #[test]
    fn test_frequency_ratio_and_ordering() {
        let lo = Megahertz::new(100.0);
        let hi = Megahertz::new(200.0);
        assert_eq!(hi / lo, 2.0);
        assert!(lo < hi);
        assert_eq!(lo.max(hi), hi);
    }

    #[test]
    fn test_equality_agrees_with_ordering() {
        let pos = Megahertz::new(0.0);
        let neg = Megahertz::new(-0.0);
        assert!(neg < pos);
        assert_ne!(neg, pos);
        let nan = Megahertz::new(f64::NAN);
        assert_eq!(nan, nan);
        assert_eq!(nan.cmp(&nan), Ordering::Equal);
    }

    #[test]
    fn test_is_physical() {
        assert!(Megahertz::new(150.0).is_physical());
        assert!(!Megahertz::new(0.0).is_physical());
        assert!(!Megahertz::new(-1.0).is_physical());
        assert!(!Megahertz::new(f64::NAN).is_physical());
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format!("{:.2}", Megahertz::new(158.0)), "158.00 MHz");
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(MapUnit::JanskyPerPixel.field_kind(), FieldKind::Extensive);
        for unit in [
            MapUnit::Kelvin,
            MapUnit::Rayleigh,
            MapUnit::MegaJanskyPerSteradian,
            MapUnit::Dimensionless,
        ] {
            assert_eq!(unit.field_kind(), FieldKind::Intensive);
        }
    }
}
