//! Frequency sweep driver
//!
//! The driver moves through `Idle → Running → {Completed, Failed,
//! Cancelled}`. Frequencies are processed in batches: all (frequency,
//! component) pairs of a batch run concurrently, then each frequency's maps
//! are combined and published in sweep order. Component failures are
//! recorded in the manifest and never stop the sweep; only configuration
//! and output errors fail it. The cancellation token is checked before each
//! batch.

use super::cancel::CancellationToken;
use super::config::SimulationConfig;
use super::manifest::{
    CombinedOutcome, ComponentEntry, ComponentOutcome, FrequencyManifest, SweepManifest,
    SweepState,
};
use super::output::{FrequencyProduct, OutputSink};
use super::run::SimulationRun;
use crate::components::ForegroundComponent;
use crate::core_types::{ComponentKind, MapOrigin, Megahertz, SkyMap};
use crate::error::{ForegroundError, Result};
use crate::store::{CatalogLoader, StoreStats, TemplateLoader};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs one frequency sweep from a configuration
pub struct SimulationDriver {
    config: SimulationConfig,
    state: SweepState,
    cancel: CancellationToken,
}

impl SimulationDriver {
    /// Create an idle driver
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: SweepState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Sweep configuration
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Token that cancels this driver's sweep
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the sweep
    ///
    /// # Arguments
    /// * `templates` - Source of template maps
    /// * `catalogs` - Source of catalogs
    /// * `sink` - Receives one product per processed frequency
    ///
    /// # Returns
    /// The sweep manifest; its state is `Completed` or `Cancelled`
    ///
    /// # Errors
    /// - `ForegroundError::Config` if the driver already ran or the
    ///   configuration is invalid
    /// - Any error returned by `sink`
    ///
    /// In both cases the driver ends in `Failed`, except for a repeated run,
    /// which leaves the state untouched.
    pub fn run(
        &mut self,
        templates: Arc<dyn TemplateLoader>,
        catalogs: Arc<dyn CatalogLoader>,
        sink: &mut dyn OutputSink,
    ) -> Result<SweepManifest> {
        if self.state != SweepState::Idle {
            return Err(ForegroundError::Config(format!(
                "driver cannot start from state {:?}",
                self.state
            )));
        }
        self.state = SweepState::Running;
        let started = Instant::now();

        let run = match SimulationRun::new(&self.config, templates, catalogs) {
            Ok(run) => run,
            Err(e) => {
                warn!("Sweep failed before start: {}", e);
                self.state = SweepState::Failed;
                return Err(e);
            }
        };
        info!(
            "Starting sweep: {} frequencies, {} components, order {}",
            run.frequencies().len(),
            run.components().len(),
            run.order()
        );
        if !self.cancel.is_cancelled() {
            run.prepare();
        }

        match self.sweep(&run, sink) {
            Ok(mut manifest) => {
                self.state = manifest.state;
                manifest.template_stats = run.stores().templates.stats();
                manifest.catalog_loads = run.stores().catalogs.load_count();
                info!(
                    "Sweep {:?} after {:.2?}: {} frequencies, {} component failures",
                    manifest.state,
                    started.elapsed(),
                    manifest.frequencies.len(),
                    manifest.failure_count()
                );
                Ok(manifest)
            }
            Err(e) => {
                warn!("Sweep failed: {}", e);
                self.state = SweepState::Failed;
                Err(e)
            }
        }
    }

    fn sweep(&self, run: &SimulationRun, sink: &mut dyn OutputSink) -> Result<SweepManifest> {
        let mut manifest = SweepManifest {
            state: SweepState::Running,
            resolution_order: run.order(),
            mask_policy: self.config.mask_policy,
            components: run
                .components()
                .iter()
                .map(ForegroundComponent::kind)
                .collect(),
            frequencies: Vec::with_capacity(run.frequencies().len()),
            skipped: Vec::new(),
            template_stats: StoreStats::default(),
            catalog_loads: 0,
        };

        let batch_size = self.config.frequency_batch_size;
        for (i, batch) in run.frequencies().chunks(batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                info!("Sweep cancelled before batch {}", i);
                manifest.skipped = run.frequencies()[i * batch_size..].to_vec();
                manifest.state = SweepState::Cancelled;
                return Ok(manifest);
            }
            debug!("Simulating batch {} ({} frequencies)", i, batch.len());

            let rows = run.simulate_batch(batch);
            for (&frequency, results) in batch.iter().zip(rows) {
                let product = self.assemble(run, frequency, results);
                manifest.frequencies.push(product.manifest.clone());
                sink.publish(product)?;
            }
        }

        manifest.state = SweepState::Completed;
        Ok(manifest)
    }

    /// Combine one frequency's component results into a product
    fn assemble(
        &self,
        run: &SimulationRun,
        frequency: Megahertz,
        results: Vec<Result<SkyMap>>,
    ) -> FrequencyProduct {
        let mut entries = Vec::with_capacity(results.len());
        let mut maps = Vec::with_capacity(results.len());
        for (component, result) in run.components().iter().zip(results) {
            let outcome = match result {
                Ok(map) => {
                    let outcome = ComponentOutcome::Succeeded {
                        undefined_pixels: map.undefined_count(),
                    };
                    maps.push(map);
                    outcome
                }
                Err(e) => {
                    warn!("{}", e);
                    ComponentOutcome::failure(&e)
                }
            };
            entries.push(ComponentEntry {
                component: component.kind(),
                outcome,
            });
        }

        let (combined, outcome) = match SkyMap::combine(&maps, self.config.mask_policy) {
            Ok(Some(map)) => {
                let outcome = CombinedOutcome::Combined {
                    contributors: maps.iter().filter_map(component_of).collect(),
                    undefined_pixels: map.undefined_count(),
                };
                (Some(map), outcome)
            }
            Ok(None) => (None, CombinedOutcome::NoContributors),
            Err(e) => {
                warn!("Cannot combine maps at {}: {}", frequency, e);
                (
                    None,
                    CombinedOutcome::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                )
            }
        };

        FrequencyProduct {
            frequency,
            combined,
            components: if self.config.keep_component_maps {
                maps
            } else {
                Vec::new()
            },
            manifest: FrequencyManifest {
                frequency,
                components: entries,
                combined: outcome,
            },
        }
    }
}

fn component_of(map: &SkyMap) -> Option<ComponentKind> {
    match map.origin() {
        MapOrigin::Component(kind) => Some(kind),
        MapOrigin::Combined => None,
    }
}
