//! Shared fixtures for integration tests: in-memory loaders and logging

#![allow(dead_code)]

use ctor::ctor;
use foreground_sim_core::grid::pixel_count;
use foreground_sim_core::store::{
    CatalogId, CatalogLoader, CatalogRecord, LoadError, RawTemplate, TemplateId, TemplateLoader,
};
use foreground_sim_core::{MapUnit, Megahertz};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[ctor]
fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Template loader backed by a map, counting calls per id
#[derive(Default)]
pub struct MemoryTemplates {
    maps: FxHashMap<String, RawTemplate>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every load, to widen race windows
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with(mut self, id: &str, template: RawTemplate) -> Self {
        self.maps.insert(id.to_string(), template);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TemplateLoader for MemoryTemplates {
    fn load_template(&self, id: &TemplateId) -> Result<RawTemplate, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.maps
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| LoadError::NotFound(format!("{id}.fits")))
    }
}

/// Catalog loader backed by a map
#[derive(Default)]
pub struct MemoryCatalogs {
    catalogs: FxHashMap<String, Vec<CatalogRecord>>,
}

impl MemoryCatalogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, records: Vec<CatalogRecord>) -> Self {
        self.catalogs.insert(id.to_string(), records);
        self
    }
}

impl CatalogLoader for MemoryCatalogs {
    fn load_catalog(&self, id: &CatalogId) -> Result<Vec<CatalogRecord>, LoadError> {
        self.catalogs
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| LoadError::NotFound(format!("{id}.csv")))
    }
}

/// Uniform template at `order`
pub fn uniform(order: u8, value: f64, unit: MapUnit, reference_mhz: Option<f64>) -> RawTemplate {
    RawTemplate {
        data: vec![value; pixel_count(order)],
        order,
        unit,
        reference_frequency: reference_mhz.map(Megahertz::new),
        provenance: "synthetic".to_string(),
    }
}
