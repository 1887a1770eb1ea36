//! Diffuse Galactic synchrotron emission
//!
//! A survey template (e.g. the 408 MHz all-sky map) is extrapolated pixel by
//! pixel with a spectral index map: `T(ν) = T(ν0) · (ν/ν0)^(−β)`. Kelvin
//! templates are scaled as brightness temperature and converted to Jy/pixel
//! with the Rayleigh–Jeans law; Jy/pixel templates are scaled directly.

use crate::core_types::{ComponentKind, MapOrigin, MapUnit, Megahertz, SkyMap};
use crate::error::{ForegroundError, Result};
use crate::grid::pixel_solid_angle;
use crate::physics::{power_law, rayleigh_jeans_factor};
use crate::store::{DataStores, TemplateId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Synchrotron component settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synchrotron {
    /// Survey template (K or Jy/pixel) with a reference frequency
    pub template: TemplateId,
    /// Dimensionless spectral index map β
    pub spectral_index: TemplateId,
}

impl Synchrotron {
    /// Create a synchrotron component from its template ids
    pub fn new(template: impl Into<TemplateId>, spectral_index: impl Into<TemplateId>) -> Self {
        Self {
            template: template.into(),
            spectral_index: spectral_index.into(),
        }
    }

    /// Simulate the synchrotron map at `frequency`
    ///
    /// # Errors
    /// - Store errors for either template
    /// - `InvalidData` if the template has no reference frequency
    /// - `UnitMismatch` if the template is neither K nor Jy/pixel
    pub fn simulate(&self, stores: &DataStores, frequency: Megahertz, order: u8) -> Result<SkyMap> {
        let (template, index) =
            stores
                .templates
                .load_paired(&self.template, &self.spectral_index, order)?;
        let reference = template.reference_frequency().ok_or_else(|| {
            ForegroundError::invalid(template.id(), "synchrotron template has no reference frequency")
        })?;
        let to_flux = match template.unit() {
            MapUnit::JanskyPerPixel => 1.0,
            MapUnit::Kelvin => rayleigh_jeans_factor(frequency) * pixel_solid_angle(order),
            other => return Err(ForegroundError::unit_mismatch(MapUnit::Kelvin, other)),
        };

        let data: Vec<f64> = template
            .data()
            .par_iter()
            .zip(index.data().par_iter())
            .map(|(&value, &beta)| power_law(value, frequency, reference, beta) * to_flux)
            .collect();

        let map = SkyMap::new(
            data,
            order,
            frequency,
            MapUnit::JanskyPerPixel,
            MapOrigin::Component(ComponentKind::Synchrotron),
        )?;
        let undefined = map.undefined_count();
        if undefined > 0 {
            debug!("Synchrotron at {}: {} undefined pixels", frequency, undefined);
        }
        Ok(map)
    }
}
