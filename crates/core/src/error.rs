//! Error types for foreground simulation.
//!
//! All failures here are deterministic data or configuration problems, so
//! errors are `Clone` and can be cached alongside successful loads.

use crate::core_types::{MapUnit, Megahertz};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Serializable discriminant of [`ForegroundError`], used in sweep manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    DataNotFound,
    Resolution,
    UnitMismatch,
    InvalidData,
    ModelDomain,
    ComponentFailure,
    Config,
    Output,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors that can occur while loading data, simulating components or
/// combining maps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForegroundError {
    /// A required template or catalog does not exist
    #[error("data not found: '{id}': {reason}")]
    DataNotFound { id: String, reason: String },

    /// Requested resolution is unsupported or incompatible with the data
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Maps with different units or pixelization were combined
    #[error("unit mismatch: expected {expected}, found {found}")]
    UnitMismatch { expected: String, found: String },

    /// Loaded data is malformed (wrong length, non-finite values, ...)
    #[error("invalid data in '{id}': {reason}")]
    InvalidData { id: String, reason: String },

    /// A frequency lies outside the validity domain of a physical model
    #[error("frequency {frequency} outside model domain: {reason}")]
    ModelDomain { frequency: Megahertz, reason: String },

    /// Failure scoped to one component at one frequency
    #[error("component '{component}' failed at {frequency}: {source}")]
    ComponentFailure {
        component: String,
        frequency: Megahertz,
        #[source]
        source: Box<ForegroundError>,
    },

    /// Run-wide configuration problem
    #[error("configuration error: {0}")]
    Config(String),

    /// The output sink rejected a product
    #[error("output error: {0}")]
    Output(String),
}

impl ForegroundError {
    /// Creates a data-not-found error.
    pub fn not_found(id: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::DataNotFound {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid-data error.
    pub fn invalid(id: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a unit-mismatch error between two map units.
    pub fn unit_mismatch(expected: MapUnit, found: MapUnit) -> Self {
        Self::UnitMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Wraps an error as a failure of one component at one frequency.
    pub fn component(component: impl fmt::Display, frequency: Megahertz, source: Self) -> Self {
        Self::ComponentFailure {
            component: component.to_string(),
            frequency,
            source: Box::new(source),
        }
    }

    /// Discriminant of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DataNotFound { .. } => ErrorKind::DataNotFound,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::UnitMismatch { .. } => ErrorKind::UnitMismatch,
            Self::InvalidData { .. } => ErrorKind::InvalidData,
            Self::ModelDomain { .. } => ErrorKind::ModelDomain,
            Self::ComponentFailure { .. } => ErrorKind::ComponentFailure,
            Self::Config(_) => ErrorKind::Config,
            Self::Output(_) => ErrorKind::Output,
        }
    }

    /// Kind of the innermost error, looking through `ComponentFailure` wrappers
    #[must_use]
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            Self::ComponentFailure { source, .. } => source.root_kind(),
            other => other.kind(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = ForegroundError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_failure_wraps_source() {
        let inner = ForegroundError::not_found("haslam408", "no such file");
        let err = ForegroundError::component("synchrotron", Megahertz::new(150.0), inner);
        assert_eq!(err.kind(), ErrorKind::ComponentFailure);
        assert_eq!(err.root_kind(), ErrorKind::DataNotFound);
        let msg = err.to_string();
        assert!(msg.contains("synchrotron"), "{msg}");
        assert!(msg.contains("haslam408"), "{msg}");
    }

    #[test]
    fn test_unit_mismatch_message() {
        let err = ForegroundError::unit_mismatch(MapUnit::JanskyPerPixel, MapUnit::Kelvin);
        assert_eq!(err.to_string(), "unit mismatch: expected Jy/pixel, found K");
    }
}
