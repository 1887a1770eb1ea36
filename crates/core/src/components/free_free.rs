//! Diffuse Galactic free-free emission
//!
//! The Hα template is corrected for dust absorption once per resolution
//! order and run; each frequency then only applies the Dickinson et al.
//! (2003) conversion ratio and the Rayleigh–Jeans flux conversion.

use crate::core_types::{ComponentKind, MapOrigin, MapUnit, Megahertz, SkyMap};
use crate::error::{ForegroundError, Result};
use crate::grid::pixel_solid_angle;
use crate::physics::{rayleigh_jeans_factor, FreeFreeModel};
use crate::store::{CoalescingCache, DataStores, TemplateId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Free-free component settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeFreeConfig {
    /// Hα intensity template (R)
    pub halpha: TemplateId,
    /// 100-µm dust emission template (MJy/sr)
    pub dust: TemplateId,
    /// Emission model parameters
    #[serde(default)]
    pub model: FreeFreeModel,
}

impl FreeFreeConfig {
    /// Settings with the default emission model
    pub fn new(halpha: impl Into<TemplateId>, dust: impl Into<TemplateId>) -> Self {
        Self {
            halpha: halpha.into(),
            dust: dust.into(),
            model: FreeFreeModel::default(),
        }
    }
}

/// Free-free component with its per-run dust-corrected Hα cache
pub struct FreeFree {
    config: FreeFreeConfig,
    corrected: CoalescingCache<u8, Vec<f64>>,
}

impl FreeFree {
    /// Build the component for one run
    #[must_use]
    pub fn new(config: FreeFreeConfig) -> Self {
        Self {
            config,
            corrected: CoalescingCache::new(),
        }
    }

    /// Component settings
    #[must_use]
    pub fn config(&self) -> &FreeFreeConfig {
        &self.config
    }

    /// Dust-corrected Hα intensity (R) at `order`, masked pixels `NaN`
    ///
    /// # Errors
    /// Store errors for either template, or `UnitMismatch` if the Hα map is
    /// not in R or the dust map is not in MJy/sr.
    pub fn corrected_halpha(&self, stores: &DataStores, order: u8) -> Result<Arc<Vec<f64>>> {
        self.corrected.get_or_load(&order, || {
            let halpha = stores.templates.load(&self.config.halpha, order)?;
            let dust = stores.templates.load(&self.config.dust, order)?;
            if halpha.unit() != MapUnit::Rayleigh {
                return Err(ForegroundError::unit_mismatch(MapUnit::Rayleigh, halpha.unit()));
            }
            if dust.unit() != MapUnit::MegaJanskyPerSteradian {
                return Err(ForegroundError::unit_mismatch(
                    MapUnit::MegaJanskyPerSteradian,
                    dust.unit(),
                ));
            }

            let model = self.config.model;
            let threshold = model.dust_mask_threshold();
            info!(
                "Correcting H-alpha for dust absorption (f_dust = {}, mask above {:.1} MJy/sr)",
                model.dust_fraction, threshold
            );
            let masked = dust.data().par_iter().filter(|&&d| d > threshold).count();
            if masked > 0 {
                warn!(
                    "Dust map masked fraction: {:.1}%",
                    100.0 * masked as f64 / dust.data().len() as f64
                );
            }

            Ok(halpha
                .data()
                .par_iter()
                .zip(dust.data().par_iter())
                .map(|(&h, &d)| model.correct_halpha(h, d))
                .collect())
        })
    }

    /// Simulate the free-free map at `frequency`
    ///
    /// # Errors
    /// `ModelDomain` if the frequency is outside the model's validity, plus
    /// the errors of [`FreeFree::corrected_halpha`].
    pub fn simulate(&self, stores: &DataStores, frequency: Megahertz, order: u8) -> Result<SkyMap> {
        let kelvin_per_rayleigh = self.config.model.kelvin_per_rayleigh(frequency)?;
        let halpha = self.corrected_halpha(stores, order)?;
        let factor =
            kelvin_per_rayleigh * rayleigh_jeans_factor(frequency) * pixel_solid_angle(order);
        let data = halpha.par_iter().map(|&h| h * factor).collect();
        SkyMap::new(
            data,
            order,
            frequency,
            MapUnit::JanskyPerPixel,
            MapOrigin::Component(ComponentKind::FreeFree),
        )
    }
}
