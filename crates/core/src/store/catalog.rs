//! Source catalog store
//!
//! Catalogs (supernova remnants, galaxy clusters) carry no resolution, so
//! they are loaded and validated once per id and then shared read-only.

use super::cache::CoalescingCache;
use super::template::LoadError;
use crate::core_types::{Megahertz, SkyPosition};
use crate::error::{ForegroundError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Identifier of a catalog known to the loader (e.g. "green2014")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    /// Create a catalog identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Angular extent of a source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceShape {
    /// Major axis (full width, arcmin)
    pub major_arcmin: f64,
    /// Minor axis (full width, arcmin)
    pub minor_arcmin: f64,
    /// Position angle of the major axis, east of north (deg)
    pub position_angle_deg: f64,
}

impl SourceShape {
    /// Circular source of the given diameter
    #[must_use]
    pub const fn circular(diameter_arcmin: f64) -> Self {
        Self {
            major_arcmin: diameter_arcmin,
            minor_arcmin: diameter_arcmin,
            position_angle_deg: 0.0,
        }
    }

    /// Unresolved source
    #[must_use]
    pub const fn point() -> Self {
        Self::circular(0.0)
    }

    /// Semi-major axis (rad)
    #[must_use]
    pub fn semi_major_rad(&self) -> f64 {
        (self.major_arcmin / 120.0).to_radians()
    }

    /// Semi-minor axis (rad)
    #[must_use]
    pub fn semi_minor_rad(&self) -> f64 {
        (self.minor_arcmin / 120.0).to_radians()
    }
}

/// Spectral shape relative to the reference flux
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectralParams {
    /// Spectral index α in `S ∝ ν^(−α)`
    pub index: f64,
    /// Log-parabolic curvature (0 for a pure power law)
    #[serde(default)]
    pub curvature: f64,
}

/// Morphological class of a supernova remnant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemnantKind {
    /// Limb-brightened shell
    Shell,
    /// Centre-filled (plerion)
    Filled,
    /// Shell with a filled centre
    Composite,
}

/// Component-specific record data
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourcePayload {
    /// No extra data
    #[default]
    None,
    /// Supernova remnant
    Remnant { kind: RemnantKind },
    /// Galaxy cluster radio halo; mass and redshift size the halo when the
    /// catalog gives no angular extent
    Cluster { mass_msun: f64, redshift: f64 },
}

/// One catalogued source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Source name
    pub name: String,
    /// Galactic position
    pub position: SkyPosition,
    /// Angular extent
    pub shape: SourceShape,
    /// Flux density at the reference frequency (Jy)
    pub flux_jy: f64,
    /// Reference frequency of `flux_jy`
    pub reference_frequency: Megahertz,
    /// Spectral shape
    pub spectral: SpectralParams,
    /// Component-specific data
    #[serde(default)]
    pub payload: SourcePayload,
}

impl CatalogRecord {
    /// Check that the record is physically meaningful
    ///
    /// # Errors
    /// Returns `InvalidData` naming the record on the first failed check.
    pub fn validate(&self, catalog: &CatalogId) -> Result<()> {
        let fail = |reason: String| {
            Err(ForegroundError::invalid(
                catalog,
                format!("record '{}': {reason}", self.name),
            ))
        };
        if !self.position.is_valid() {
            return fail(format!(
                "position ({}, {}) out of range",
                self.position.lon, self.position.lat
            ));
        }
        if !self.flux_jy.is_finite() || self.flux_jy < 0.0 {
            return fail(format!("flux {} Jy is not a finite non-negative value", self.flux_jy));
        }
        if !self.reference_frequency.is_physical() {
            return fail(format!(
                "reference frequency {} is not positive",
                self.reference_frequency
            ));
        }
        let shape = &self.shape;
        if !(shape.major_arcmin.is_finite() && shape.minor_arcmin.is_finite())
            || shape.minor_arcmin < 0.0
            || shape.major_arcmin < shape.minor_arcmin
            || !shape.position_angle_deg.is_finite()
        {
            return fail(format!(
                "invalid shape {}' x {}' at {} deg",
                shape.major_arcmin, shape.minor_arcmin, shape.position_angle_deg
            ));
        }
        if !(self.spectral.index.is_finite() && self.spectral.curvature.is_finite()) {
            return fail("non-finite spectral parameters".to_string());
        }
        if let SourcePayload::Cluster { mass_msun, redshift } = self.payload {
            let positive = |v: f64| v.is_finite() && v > 0.0;
            if !(positive(mass_msun) && positive(redshift)) {
                return fail(format!(
                    "cluster mass {mass_msun} Msun at redshift {redshift} is not positive"
                ));
            }
        }
        Ok(())
    }
}

/// Source of catalogs (file codecs live behind this trait)
pub trait CatalogLoader: Send + Sync {
    /// Fetch all records of catalog `id`
    ///
    /// # Errors
    /// `LoadError::NotFound` if the catalog does not exist,
    /// `LoadError::Malformed` if it cannot be decoded.
    fn load_catalog(&self, id: &CatalogId) -> Result<Vec<CatalogRecord>, LoadError>;
}

/// Run-scoped cache of catalogs
pub struct CatalogStore {
    loader: Arc<dyn CatalogLoader>,
    catalogs: CoalescingCache<CatalogId, Arc<[CatalogRecord]>>,
    loads: AtomicUsize,
}

impl CatalogStore {
    /// Create an empty store backed by `loader`
    pub fn new(loader: Arc<dyn CatalogLoader>) -> Self {
        Self {
            loader,
            catalogs: CoalescingCache::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// All records of catalog `id`
    ///
    /// # Errors
    /// `DataNotFound` if the loader has no such catalog, `InvalidData` if it
    /// is malformed or any record fails validation.
    pub fn load(&self, id: &CatalogId) -> Result<Arc<[CatalogRecord]>> {
        let records = self.catalogs.get_or_load(id, || {
            self.loads.fetch_add(1, Ordering::Relaxed);
            let records = self
                .loader
                .load_catalog(id)
                .map_err(|e| e.into_foreground(id))?;
            for record in &records {
                record.validate(id)?;
            }
            info!("Loaded catalog '{}' ({} sources)", id, records.len());
            Ok(Arc::from(records))
        })?;
        Ok(Arc::clone(&*records))
    }

    /// Number of loader invocations
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Evict all cached catalogs
    pub fn clear(&self) {
        self.catalogs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLoader(Vec<CatalogRecord>);

    impl CatalogLoader for FixedLoader {
        fn load_catalog(&self, id: &CatalogId) -> Result<Vec<CatalogRecord>, LoadError> {
            match id.as_str() {
                "snr" => Ok(self.0.clone()),
                "broken" => Err(LoadError::Malformed("bad header".to_string())),
                _ => Err(LoadError::NotFound(id.to_string())),
            }
        }
    }

    fn record(name: &str, flux: f64) -> CatalogRecord {
        CatalogRecord {
            name: name.to_string(),
            position: SkyPosition::new(120.0, 1.5),
            shape: SourceShape::circular(30.0),
            flux_jy: flux,
            reference_frequency: Megahertz::new(1000.0),
            spectral: SpectralParams {
                index: 0.5,
                curvature: 0.0,
            },
            payload: SourcePayload::Remnant {
                kind: RemnantKind::Shell,
            },
        }
    }

    #[test]
    fn test_catalog_is_loaded_once() {
        let store = CatalogStore::new(Arc::new(FixedLoader(vec![record("a", 1.0)])));
        let a = store.load(&"snr".into()).unwrap();
        let b = store.load(&"snr".into()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_loader_errors_map_to_kinds() {
        let store = CatalogStore::new(Arc::new(FixedLoader(vec![])));
        assert!(matches!(
            store.load(&"missing".into()).unwrap_err(),
            ForegroundError::DataNotFound { .. }
        ));
        assert!(matches!(
            store.load(&"broken".into()).unwrap_err(),
            ForegroundError::InvalidData { .. }
        ));
    }

    #[test]
    fn test_non_finite_flux_is_rejected() {
        let store = CatalogStore::new(Arc::new(FixedLoader(vec![
            record("ok", 1.0),
            record("bad", f64::NAN),
        ])));
        let err = store.load(&"snr".into()).unwrap_err();
        assert!(err.to_string().contains("bad"), "{err}");
    }

    #[test]
    fn test_cluster_payload_must_be_positive() {
        let id = CatalogId::new("halos");
        let mut rec = record("A2255", 0.9);
        for (mass_msun, redshift) in [(1e15, 0.0), (0.0, 0.08), (f64::NAN, 0.08)] {
            rec.payload = SourcePayload::Cluster { mass_msun, redshift };
            assert!(rec.validate(&id).is_err(), "{mass_msun} {redshift}");
        }
        rec.payload = SourcePayload::Cluster {
            mass_msun: 1.2e15,
            redshift: 0.08,
        };
        assert!(rec.validate(&id).is_ok());
    }

    #[test]
    fn test_record_json_round_trip() {
        let rec = record("G1.9+0.3", 0.6);
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"type\":\"remnant\""), "{json}");
        let back: CatalogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_semi_axes() {
        let shape = SourceShape::circular(60.0);
        assert!((shape.semi_major_rad() - 0.5_f64.to_radians()).abs() < 1e-15);
    }
}
