//! State of one sweep
//!
//! A [`SimulationRun`] owns fresh stores and freshly built components, so
//! every cache lives exactly as long as the sweep that filled it.

use super::config::SimulationConfig;
use crate::components::ForegroundComponent;
use crate::core_types::{Megahertz, SkyMap};
use crate::error::Result;
use crate::store::{CatalogLoader, DataStores, TemplateLoader};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Stores, components and frequencies of one sweep
pub struct SimulationRun {
    stores: DataStores,
    components: Vec<ForegroundComponent>,
    frequencies: Vec<Megahertz>,
    order: u8,
}

impl SimulationRun {
    /// Validate `config` and set up a run
    ///
    /// # Errors
    /// Returns `ForegroundError::Config` if the configuration is invalid.
    pub fn new(
        config: &SimulationConfig,
        templates: Arc<dyn TemplateLoader>,
        catalogs: Arc<dyn CatalogLoader>,
    ) -> Result<Self> {
        let frequencies = config.validate()?;
        let components = config.build_components()?;
        Ok(Self {
            stores: DataStores::new(templates, catalogs),
            components,
            frequencies,
            order: config.resolution_order,
        })
    }

    /// Run-scoped stores
    #[must_use]
    pub fn stores(&self) -> &DataStores {
        &self.stores
    }

    /// Components in enabled order
    #[must_use]
    pub fn components(&self) -> &[ForegroundComponent] {
        &self.components
    }

    /// Frequencies in sweep order
    #[must_use]
    pub fn frequencies(&self) -> &[Megahertz] {
        &self.frequencies
    }

    /// Output resolution order
    #[must_use]
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Load every component's inputs at the run order, one at a time
    ///
    /// Must run before [`SimulationRun::simulate_batch`]; batches then only
    /// read filled store entries. Failures stay cached and are reported per
    /// frequency by the batches.
    pub fn prepare(&self) {
        for component in &self.components {
            if let Err(e) = component.prepare(&self.stores, self.order) {
                debug!("Inputs of {} unavailable: {}", component.kind(), e);
            }
        }
    }

    /// Simulate every component at every frequency of `batch` concurrently
    ///
    /// # Returns
    /// One row per frequency, each holding one result per component in
    /// enabled order
    #[must_use]
    pub fn simulate_batch(&self, batch: &[Megahertz]) -> Vec<Vec<Result<SkyMap>>> {
        let n = self.components.len();
        let mut flat: Vec<Result<SkyMap>> = (0..batch.len() * n)
            .into_par_iter()
            .map(|k| self.components[k % n].simulate(&self.stores, batch[k / n], self.order))
            .collect();

        let mut rows = Vec::with_capacity(batch.len());
        for _ in 0..batch.len() {
            let rest = flat.split_off(n);
            rows.push(flat);
            flat = rest;
        }
        rows
    }
}
