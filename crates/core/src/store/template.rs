//! Template map store
//!
//! Templates (survey maps, spectral index maps, dust maps) are fetched from a
//! [`TemplateLoader`] once per run and kept at their native resolution.
//! Requests at other orders are resampled from the native map and cached by
//! `(id, order)`. Returned maps are shared and immutable.

use super::cache::CoalescingCache;
use crate::core_types::{FieldKind, MapUnit, Megahertz};
use crate::error::{ForegroundError, Result};
use crate::grid::{check_order, pixel_count, resample};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Identifier of a template known to the loader (e.g. "haslam408")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Create a template identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Failure reported by a loader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The source does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// The source exists but could not be decoded
    #[error("malformed: {0}")]
    Malformed(String),
}

impl LoadError {
    /// Convert into the crate error for the item `id`
    pub fn into_foreground(self, id: impl fmt::Display) -> ForegroundError {
        match self {
            Self::NotFound(reason) => ForegroundError::not_found(id, reason),
            Self::Malformed(reason) => ForegroundError::invalid(id, reason),
        }
    }
}

/// Template as decoded by a loader, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawTemplate {
    /// Pixel values in NESTED ordering; `NaN` marks undefined pixels
    pub data: Vec<f64>,
    /// Native resolution order
    pub order: u8,
    /// Unit of the pixel values
    pub unit: MapUnit,
    /// Frequency the template was observed at, if any
    pub reference_frequency: Option<Megahertz>,
    /// Free-form provenance tag (survey, reference)
    pub provenance: String,
}

/// Source of template maps (file codecs live behind this trait)
pub trait TemplateLoader: Send + Sync {
    /// Fetch the template `id` at its native resolution
    ///
    /// # Errors
    /// `LoadError::NotFound` if the template does not exist,
    /// `LoadError::Malformed` if it cannot be decoded.
    fn load_template(&self, id: &TemplateId) -> Result<RawTemplate, LoadError>;
}

/// Validated, immutable template map at one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMap {
    id: TemplateId,
    data: Vec<f64>,
    order: u8,
    unit: MapUnit,
    reference_frequency: Option<Megahertz>,
    provenance: String,
}

impl TemplateMap {
    fn from_raw(id: &TemplateId, raw: RawTemplate) -> Result<Self> {
        if check_order(raw.order).is_err() {
            return Err(ForegroundError::invalid(
                id,
                format!("unsupported native order {}", raw.order),
            ));
        }
        let expected = pixel_count(raw.order);
        if raw.data.len() != expected {
            return Err(ForegroundError::invalid(
                id,
                format!(
                    "expected {expected} pixels for order {}, got {}",
                    raw.order,
                    raw.data.len()
                ),
            ));
        }
        if let Some(pixel) = raw.data.iter().position(|v| v.is_infinite()) {
            return Err(ForegroundError::invalid(id, format!("infinite value at pixel {pixel}")));
        }
        if let Some(freq) = raw.reference_frequency {
            if !freq.is_physical() {
                return Err(ForegroundError::invalid(
                    id,
                    format!("reference frequency {freq} is not positive"),
                ));
            }
        }
        Ok(Self {
            id: id.clone(),
            data: raw.data,
            order: raw.order,
            unit: raw.unit,
            reference_frequency: raw.reference_frequency,
            provenance: raw.provenance,
        })
    }

    fn resampled(&self, order: u8) -> Result<Self> {
        let data = resample(&self.data, self.order, order, self.field_kind())?;
        Ok(Self {
            id: self.id.clone(),
            data,
            order,
            unit: self.unit,
            reference_frequency: self.reference_frequency,
            provenance: self.provenance.clone(),
        })
    }

    /// Template identifier
    #[must_use]
    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    /// Pixel values
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Resolution order of this copy
    #[must_use]
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Pixel unit
    #[must_use]
    pub fn unit(&self) -> MapUnit {
        self.unit
    }

    /// Whether values sum or average when merged
    #[must_use]
    pub fn field_kind(&self) -> FieldKind {
        self.unit.field_kind()
    }

    /// Observing frequency of the template
    #[must_use]
    pub fn reference_frequency(&self) -> Option<Megahertz> {
        self.reference_frequency
    }

    /// Provenance tag
    #[must_use]
    pub fn provenance(&self) -> &str {
        &self.provenance
    }
}

/// Loader and resample counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of loader invocations
    pub loads: usize,
    /// Number of resampling operations
    pub resamples: usize,
}

/// Run-scoped cache of template maps
pub struct TemplateStore {
    loader: Arc<dyn TemplateLoader>,
    native: CoalescingCache<TemplateId, TemplateMap>,
    resampled: CoalescingCache<(TemplateId, u8), TemplateMap>,
    loads: AtomicUsize,
    resamples: AtomicUsize,
}

impl TemplateStore {
    /// Create an empty store backed by `loader`
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self {
            loader,
            native: CoalescingCache::new(),
            resampled: CoalescingCache::new(),
            loads: AtomicUsize::new(0),
            resamples: AtomicUsize::new(0),
        }
    }

    /// Template `id` at its native resolution
    ///
    /// # Errors
    /// `DataNotFound` if the loader has no such template, `InvalidData` if
    /// the loaded data is malformed.
    pub fn native(&self, id: &TemplateId) -> Result<Arc<TemplateMap>> {
        self.native.get_or_load(id, || {
            self.loads.fetch_add(1, Ordering::Relaxed);
            let raw = self
                .loader
                .load_template(id)
                .map_err(|e| e.into_foreground(id))?;
            let map = TemplateMap::from_raw(id, raw)?;
            info!(
                "Loaded template '{}' (order {}, {}, {})",
                id,
                map.order,
                map.unit,
                map.provenance
            );
            Ok(map)
        })
    }

    /// Template `id` at resolution `order`
    ///
    /// # Arguments
    /// * `id` - Template identifier
    /// * `order` - Requested resolution order
    ///
    /// # Returns
    /// Shared map at `order`; the native map itself when the orders match
    ///
    /// # Errors
    /// - `Resolution` if `order` is unsupported, or an extensive template is
    ///   requested finer than its native order
    /// - `DataNotFound` / `InvalidData` from the underlying load
    pub fn load(&self, id: &TemplateId, order: u8) -> Result<Arc<TemplateMap>> {
        check_order(order)?;
        let native = self.native(id)?;
        if native.order == order {
            return Ok(native);
        }
        self.resampled.get_or_load(&(id.clone(), order), || {
            self.resamples.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Resampling template '{}' from order {} to {}",
                id, native.order, order
            );
            native.resampled(order)
        })
    }

    /// Template and its spectral index map at the same resolution
    ///
    /// # Errors
    /// Errors of [`TemplateStore::load`] for either map, or `UnitMismatch`
    /// if the index map is not dimensionless.
    pub fn load_paired(
        &self,
        template: &TemplateId,
        index: &TemplateId,
        order: u8,
    ) -> Result<(Arc<TemplateMap>, Arc<TemplateMap>)> {
        let template = self.load(template, order)?;
        let index = self.load(index, order)?;
        if index.unit != MapUnit::Dimensionless {
            return Err(ForegroundError::unit_mismatch(MapUnit::Dimensionless, index.unit));
        }
        Ok((template, index))
    }

    /// Loader and resample counters
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            loads: self.loads.load(Ordering::Relaxed),
            resamples: self.resamples.load(Ordering::Relaxed),
        }
    }

    /// Evict all cached maps
    pub fn clear(&self) {
        self.native.clear();
        self.resampled.clear();
    }
}
