//! Radio halos of galaxy clusters rendered from a catalog
//!
//! Halos use a truncated exponential profile and a curved power-law
//! spectrum, which steepens at high frequency for positive curvature.
//! Clusters listed without an angular extent get one from their mass and
//! redshift.

use super::render::{render_catalog, RenderModel};
use crate::core_types::{ComponentKind, Megahertz, SkyMap};
use crate::error::Result;
use crate::physics::{curved_power_law, profiles, Cosmology};
use crate::store::{CatalogId, CatalogRecord, DataStores, SourcePayload, SourceShape};
use serde::{Deserialize, Serialize};

/// Galaxy cluster component settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxyClusters {
    /// Cluster halo catalog
    pub catalog: CatalogId,
    /// Cosmology used to size halos from mass and redshift
    #[serde(default)]
    pub cosmology: Cosmology,
}

fn halo_profile(_: &CatalogRecord, rho: f64) -> f64 {
    profiles::halo(rho)
}

fn halo_spectrum(record: &CatalogRecord, frequency: Megahertz) -> f64 {
    curved_power_law(
        record.flux_jy,
        frequency,
        record.reference_frequency,
        record.spectral.index,
        record.spectral.curvature,
    )
}

/// Profile and spectral law for cluster halos
pub const HALO_MODEL: RenderModel = RenderModel {
    profile: halo_profile,
    spectral: halo_spectrum,
};

impl GalaxyClusters {
    /// Create the component for catalog `catalog`
    pub fn new(catalog: impl Into<CatalogId>) -> Self {
        Self {
            catalog: catalog.into(),
            cosmology: Cosmology::default(),
        }
    }

    /// `record` as rendered: a cluster without angular extent gets a
    /// circular halo of the radius implied by its mass and redshift
    #[must_use]
    pub fn sized_halo(&self, record: &CatalogRecord) -> CatalogRecord {
        let mut record = record.clone();
        if let SourcePayload::Cluster { mass_msun, redshift } = record.payload {
            if record.shape.major_arcmin == 0.0 {
                let radius = self.cosmology.halo_angular_radius(mass_msun, redshift);
                record.shape = SourceShape::circular(2.0 * radius.to_degrees() * 60.0);
            }
        }
        record
    }

    /// Simulate the cluster halo map at `frequency`
    ///
    /// # Errors
    /// Catalog store errors, or `InvalidData` from rendering.
    pub fn simulate(&self, stores: &DataStores, frequency: Megahertz, order: u8) -> Result<SkyMap> {
        let records = stores.catalogs.load(&self.catalog)?;
        let halos: Vec<CatalogRecord> = records.iter().map(|r| self.sized_halo(r)).collect();
        render_catalog(&halos, order, frequency, &HALO_MODEL, ComponentKind::Clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::SkyPosition;
    use crate::store::SpectralParams;
    use approx::assert_relative_eq;

    fn cluster(shape: SourceShape) -> CatalogRecord {
        CatalogRecord {
            name: "Coma".to_string(),
            position: SkyPosition::new(58.1, 88.0),
            shape,
            flux_jy: 0.53,
            reference_frequency: Megahertz::new(1400.0),
            spectral: SpectralParams {
                index: 1.2,
                curvature: 0.0,
            },
            payload: SourcePayload::Cluster {
                mass_msun: 1e15,
                redshift: 0.023,
            },
        }
    }

    #[test]
    fn test_unsized_halo_takes_virial_scale() {
        let clusters = GalaxyClusters::new("halos");
        let sized = clusters.sized_halo(&cluster(SourceShape::point()));
        // 0.3 R_vir of a 1e15 Msun cluster at z = 0.023 spans ~28' in radius
        assert_relative_eq!(sized.shape.major_arcmin, 2.0 * 28.03, max_relative = 1e-3);
        assert_eq!(sized.shape.major_arcmin, sized.shape.minor_arcmin);
    }

    #[test]
    fn test_catalogued_extent_is_kept() {
        let clusters = GalaxyClusters::new("halos");
        let record = cluster(SourceShape::circular(12.0));
        assert_eq!(clusters.sized_halo(&record), record);

        let mut plain = cluster(SourceShape::point());
        plain.payload = SourcePayload::None;
        assert_eq!(clusters.sized_halo(&plain).shape, SourceShape::point());
    }
}
