//! Galactic supernova remnants rendered from a catalog

use super::render::{render_catalog, RenderModel};
use crate::core_types::{ComponentKind, Megahertz, SkyMap};
use crate::error::Result;
use crate::physics::{power_law, profiles};
use crate::store::{CatalogId, CatalogRecord, DataStores, RemnantKind, SourcePayload};
use serde::{Deserialize, Serialize};

/// Supernova remnant component settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupernovaRemnants {
    /// Remnant catalog
    pub catalog: CatalogId,
}

/// Morphology-dependent remnant profile; a uniform disk without payload
fn remnant_profile(record: &CatalogRecord, rho: f64) -> f64 {
    match record.payload {
        SourcePayload::Remnant { kind } => match kind {
            RemnantKind::Shell => profiles::shell(rho),
            RemnantKind::Filled => profiles::filled(rho),
            RemnantKind::Composite => profiles::composite(rho),
        },
        _ => profiles::disk(rho),
    }
}

fn remnant_spectrum(record: &CatalogRecord, frequency: Megahertz) -> f64 {
    power_law(
        record.flux_jy,
        frequency,
        record.reference_frequency,
        record.spectral.index,
    )
}

/// Profile and spectral law for remnants
pub const REMNANT_MODEL: RenderModel = RenderModel {
    profile: remnant_profile,
    spectral: remnant_spectrum,
};

impl SupernovaRemnants {
    /// Create the component for catalog `catalog`
    pub fn new(catalog: impl Into<CatalogId>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }

    /// Simulate the remnant map at `frequency`
    ///
    /// # Errors
    /// Catalog store errors, or `InvalidData` from rendering.
    pub fn simulate(&self, stores: &DataStores, frequency: Megahertz, order: u8) -> Result<SkyMap> {
        let records = stores.catalogs.load(&self.catalog)?;
        render_catalog(&records, order, frequency, &REMNANT_MODEL, ComponentKind::Snr)
    }
}
