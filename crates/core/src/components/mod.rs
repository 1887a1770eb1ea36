//! Foreground components
//!
//! Each component turns data from the run's stores into a Jy/pixel
//! [`SkyMap`] at one frequency and resolution. Template components
//! (synchrotron, free-free) rescale survey maps; catalog components
//! (supernova remnants, cluster halos) render sources through the shared
//! [`render_catalog`] routine with their own [`RenderModel`].

pub mod clusters;
pub mod free_free;
pub mod render;
pub mod snr;
pub mod synchrotron;

pub use clusters::GalaxyClusters;
pub use free_free::{FreeFree, FreeFreeConfig};
pub use render::{render_catalog, ProfileFn, RenderModel, SpectralFn};
pub use snr::SupernovaRemnants;
pub use synchrotron::Synchrotron;

use crate::core_types::{ComponentKind, Megahertz, SkyMap};
use crate::error::{ForegroundError, Result};
use crate::store::DataStores;

/// A configured foreground component
pub enum ForegroundComponent {
    /// Diffuse Galactic synchrotron
    Synchrotron(Synchrotron),
    /// Diffuse Galactic free-free
    FreeFree(FreeFree),
    /// Galactic supernova remnants
    Snr(SupernovaRemnants),
    /// Galaxy cluster radio halos
    Clusters(GalaxyClusters),
}

impl ForegroundComponent {
    /// Which component this is
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Synchrotron(_) => ComponentKind::Synchrotron,
            Self::FreeFree(_) => ComponentKind::FreeFree,
            Self::Snr(_) => ComponentKind::Snr,
            Self::Clusters(_) => ComponentKind::Clusters,
        }
    }

    /// Load this component's inputs at `order` into the run's stores
    ///
    /// Store initializers may themselves run rayon work, so they have to be
    /// filled before the parallel batches that read them.
    ///
    /// # Errors
    /// The store error of the first input that fails to load.
    pub fn prepare(&self, stores: &DataStores, order: u8) -> Result<()> {
        match self {
            Self::Synchrotron(c) => stores
                .templates
                .load_paired(&c.template, &c.spectral_index, order)
                .map(drop),
            Self::FreeFree(c) => c.corrected_halpha(stores, order).map(drop),
            Self::Snr(c) => stores.catalogs.load(&c.catalog).map(drop),
            Self::Clusters(c) => stores.catalogs.load(&c.catalog).map(drop),
        }
    }

    /// Simulate this component at one frequency
    ///
    /// # Arguments
    /// * `stores` - Run-scoped template and catalog stores
    /// * `frequency` - Frequency to simulate
    /// * `order` - Resolution order of the output map
    ///
    /// # Returns
    /// Map in Jy/pixel at `order`
    ///
    /// # Errors
    /// Any failure is returned as `ForegroundError::ComponentFailure` naming
    /// this component and `frequency`, with the cause as its source.
    pub fn simulate(&self, stores: &DataStores, frequency: Megahertz, order: u8) -> Result<SkyMap> {
        let result = match self {
            Self::Synchrotron(c) => c.simulate(stores, frequency, order),
            Self::FreeFree(c) => c.simulate(stores, frequency, order),
            Self::Snr(c) => c.simulate(stores, frequency, order),
            Self::Clusters(c) => c.simulate(stores, frequency, order),
        };
        result.map_err(|e| ForegroundError::component(self.kind(), frequency, e))
    }
}
