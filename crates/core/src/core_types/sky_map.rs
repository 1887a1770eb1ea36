//! Pixelized sky maps produced by foreground components
//!
//! A `SkyMap` is a NESTED-ordered array of pixel values tagged with its
//! frequency, resolution order, unit and origin. Undefined pixels (masked
//! input, no coverage) are stored as `NaN`. Maps are combined by element-wise
//! addition, which is only allowed between maps with identical order, unit
//! and frequency.

use super::units::{MapUnit, Megahertz};
use crate::error::{ForegroundError, Result};
use crate::grid::healpix::{pixel_count, pixel_solid_angle};
use crate::physics::convert::flux_to_brightness_temperature;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical foreground components known to the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Diffuse Galactic synchrotron emission
    Synchrotron,
    /// Diffuse Galactic free-free emission
    FreeFree,
    /// Galactic supernova remnants
    Snr,
    /// Radio halos of extragalactic galaxy clusters
    Clusters,
}

impl ComponentKind {
    /// All components in sweep order
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Synchrotron,
        ComponentKind::FreeFree,
        ComponentKind::Snr,
        ComponentKind::Clusters,
    ];

    /// Configuration / manifest name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Synchrotron => "synchrotron",
            Self::FreeFree => "freefree",
            Self::Snr => "snr",
            Self::Clusters => "clusters",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a map came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapOrigin {
    /// Output of a single component
    Component(ComponentKind),
    /// Sum of several component maps
    Combined,
}

/// How undefined (`NaN`) pixels behave when maps are summed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskPolicy {
    /// A pixel undefined in any contributing map is undefined in the sum.
    #[default]
    Propagate,
    /// Undefined contributions are left out of the sum; the pixel is
    /// undefined only if every contribution is undefined.
    Exclude,
    /// Undefined contributions count as zero; the sum is always defined.
    ZeroFill,
}

impl MaskPolicy {
    /// Sum of two pixel values under this policy
    #[inline]
    #[must_use]
    pub fn add(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Propagate => a + b,
            Self::Exclude => match (a.is_nan(), b.is_nan()) {
                (true, true) => f64::NAN,
                (true, false) => b,
                (false, true) => a,
                (false, false) => a + b,
            },
            Self::ZeroFill => {
                let a = if a.is_nan() { 0.0 } else { a };
                let b = if b.is_nan() { 0.0 } else { b };
                a + b
            }
        }
    }
}

/// Pixelized flux-density map at one frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyMap {
    data: Vec<f64>,
    order: u8,
    frequency: Megahertz,
    unit: MapUnit,
    origin: MapOrigin,
}

impl SkyMap {
    /// Create a map from pixel values
    ///
    /// # Errors
    /// Returns `ForegroundError::Resolution` if `data` does not hold exactly
    /// `12 * 4^order` pixels.
    pub fn new(
        data: Vec<f64>,
        order: u8,
        frequency: Megahertz,
        unit: MapUnit,
        origin: MapOrigin,
    ) -> Result<Self> {
        crate::grid::check_order(order)?;
        let expected = pixel_count(order);
        if data.len() != expected {
            return Err(ForegroundError::Resolution(format!(
                "map holds {} pixels, order {order} requires {expected}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            order,
            frequency,
            unit,
            origin,
        })
    }

    /// Create an all-zero map
    #[must_use]
    pub fn zeros(order: u8, frequency: Megahertz, unit: MapUnit, origin: MapOrigin) -> Self {
        Self {
            data: vec![0.0; pixel_count(order)],
            order,
            frequency,
            unit,
            origin,
        }
    }

    /// Pixel values (NESTED ordering)
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Consume the map and return its pixel values
    #[must_use]
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Resolution order
    #[must_use]
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Frequency of the map
    #[must_use]
    pub fn frequency(&self) -> Megahertz {
        self.frequency
    }

    /// Unit of the pixel values
    #[must_use]
    pub fn unit(&self) -> MapUnit {
        self.unit
    }

    /// Component origin tag
    #[must_use]
    pub fn origin(&self) -> MapOrigin {
        self.origin
    }

    /// Number of pixels
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a valid map; present for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of undefined (`NaN`) pixels
    #[must_use]
    pub fn undefined_count(&self) -> usize {
        self.data.par_iter().filter(|v| v.is_nan()).count()
    }

    /// Sum over all defined pixels
    #[must_use]
    pub fn total(&self) -> f64 {
        self.data.par_iter().filter(|v| !v.is_nan()).sum()
    }

    /// Check that `other` can be added to this map
    ///
    /// # Errors
    /// Returns `ForegroundError::UnitMismatch` if order, unit or frequency
    /// differ.
    pub fn check_combinable(&self, other: &SkyMap) -> Result<()> {
        if self.order != other.order {
            return Err(ForegroundError::UnitMismatch {
                expected: format!("order {}", self.order),
                found: format!("order {}", other.order),
            });
        }
        if self.unit != other.unit {
            return Err(ForegroundError::unit_mismatch(self.unit, other.unit));
        }
        if self.frequency != other.frequency {
            return Err(ForegroundError::UnitMismatch {
                expected: self.frequency.to_string(),
                found: other.frequency.to_string(),
            });
        }
        Ok(())
    }

    /// Add `other` into this map pixel by pixel
    ///
    /// The map is left untouched if the two are not combinable.
    ///
    /// # Errors
    /// Returns `ForegroundError::UnitMismatch` if order, unit or frequency
    /// differ.
    pub fn accumulate(&mut self, other: &SkyMap, policy: MaskPolicy) -> Result<()> {
        self.check_combinable(other)?;
        self.data
            .par_iter_mut()
            .zip(other.data.par_iter())
            .for_each(|(a, &b)| *a = policy.add(*a, b));
        self.origin = MapOrigin::Combined;
        Ok(())
    }

    /// Sum a set of maps into a new combined map
    ///
    /// Returns `Ok(None)` when `maps` is empty. All maps are checked before
    /// any arithmetic, so no partial sum is ever produced.
    ///
    /// # Errors
    /// Returns `ForegroundError::UnitMismatch` if any two maps are not
    /// combinable.
    pub fn combine(maps: &[SkyMap], policy: MaskPolicy) -> Result<Option<SkyMap>> {
        let Some((first, rest)) = maps.split_first() else {
            return Ok(None);
        };
        for map in rest {
            first.check_combinable(map)?;
        }

        let mut combined = first.clone();
        combined.origin = MapOrigin::Combined;
        if policy == MaskPolicy::ZeroFill {
            combined
                .data
                .par_iter_mut()
                .filter(|v| v.is_nan())
                .for_each(|v| *v = 0.0);
        }
        for map in rest {
            combined.accumulate(map, policy)?;
        }
        Ok(Some(combined))
    }

    /// Convert a Jy/pixel map to Rayleigh–Jeans brightness temperature
    ///
    /// # Errors
    /// Returns `ForegroundError::UnitMismatch` unless the map is in Jy/pixel.
    pub fn to_brightness_temperature(&self) -> Result<SkyMap> {
        if self.unit != MapUnit::JanskyPerPixel {
            return Err(ForegroundError::unit_mismatch(MapUnit::JanskyPerPixel, self.unit));
        }
        let omega = pixel_solid_angle(self.order);
        let frequency = self.frequency;
        let data = self
            .data
            .par_iter()
            .map(|&s| flux_to_brightness_temperature(s, omega, frequency))
            .collect();
        Ok(SkyMap {
            data,
            order: self.order,
            frequency,
            unit: MapUnit::Kelvin,
            origin: self.origin,
        })
    }
}
