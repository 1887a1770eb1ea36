//! Radio Foreground Simulation Core Library
//!
//! Synthesizes all-sky maps of diffuse and discrete radio foreground emission
//! over a frequency sweep, for use as input to interferometer simulations.
//!
//! ## Components
//!
//! - Diffuse Galactic synchrotron, extrapolated from a survey template with
//!   a per-pixel spectral index
//! - Diffuse Galactic free-free, derived from dust-corrected Hα
//!   (Dickinson et al. 2003)
//! - Galactic supernova remnants and galaxy cluster radio halos, rendered
//!   from catalogs with flux-conserving source profiles
//!
//! All maps share one HEALPix NESTED pixelization and are produced in
//! Jy/pixel, so they can be summed per frequency.

// Core types and utilities
pub mod core_types;
pub mod error;

// Pixelization and physical models
pub mod grid;
pub mod physics;

// Data access, components and orchestration
pub mod components;
pub mod simulation;
pub mod store;

// Re-export core types
pub use core_types::{
    ComponentKind, FieldKind, MapOrigin, MapUnit, MaskPolicy, Megahertz, SkyMap, SkyPosition,
};
pub use error::{ErrorKind, ForegroundError, Result};

// Re-export grid
pub use grid::{SphericalGrid, MAX_ORDER};

// Re-export components and stores
pub use components::{
    render_catalog, ForegroundComponent, FreeFree, FreeFreeConfig, GalaxyClusters, RenderModel,
    SupernovaRemnants, Synchrotron,
};
pub use store::{
    CatalogId, CatalogLoader, CatalogRecord, DataStores, LoadError, RawTemplate, TemplateId,
    TemplateLoader, TemplateMap,
};

// Re-export simulation
pub use simulation::{
    CancellationToken, FrequencyProduct, FrequencySpec, MemorySink, OutputSink, SimulationConfig,
    SimulationDriver, SweepManifest, SweepState,
};
