//! Run-scoped data stores for templates and catalogs

pub mod cache;
pub mod catalog;
pub mod template;

pub use cache::CoalescingCache;
pub use catalog::{
    CatalogId, CatalogLoader, CatalogRecord, CatalogStore, RemnantKind, SourcePayload, SourceShape,
    SpectralParams,
};
pub use template::{
    LoadError, RawTemplate, StoreStats, TemplateId, TemplateLoader, TemplateMap, TemplateStore,
};

use std::sync::Arc;

/// Template and catalog stores shared by all components of a run
pub struct DataStores {
    /// Template maps
    pub templates: TemplateStore,
    /// Source catalogs
    pub catalogs: CatalogStore,
}

impl DataStores {
    /// Create empty stores backed by the given loaders
    pub fn new(templates: Arc<dyn TemplateLoader>, catalogs: Arc<dyn CatalogLoader>) -> Self {
        Self {
            templates: TemplateStore::new(templates),
            catalogs: CatalogStore::new(catalogs),
        }
    }

    /// Evict everything from both stores
    pub fn clear(&self) {
        self.templates.clear();
        self.catalogs.clear();
    }
}
