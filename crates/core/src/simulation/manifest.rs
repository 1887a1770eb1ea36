//! Sweep manifest
//!
//! Records what happened to every (frequency, component) pair of a sweep,
//! so partial results can be interpreted without the log.

use crate::core_types::{ComponentKind, MaskPolicy, Megahertz};
use crate::error::{ErrorKind, ForegroundError, Result};
use crate::store::StoreStats;
use serde::{Deserialize, Serialize};

/// Lifecycle of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepState {
    /// Not started
    #[default]
    Idle,
    /// Simulating
    Running,
    /// Every frequency was processed (component failures may be recorded)
    Completed,
    /// Stopped by a run-wide error
    Failed,
    /// Stopped by the cancellation token
    Cancelled,
}

impl SweepState {
    /// Whether the sweep has finished
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Result of one component at one frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ComponentOutcome {
    /// A map was produced
    Succeeded {
        /// Pixels left undefined by masks or missing coverage
        undefined_pixels: usize,
    },
    /// The component failed at this frequency
    Failed {
        /// Innermost error kind
        kind: ErrorKind,
        /// Full error message
        message: String,
    },
}

impl ComponentOutcome {
    /// Outcome recorded for a failed simulation
    #[must_use]
    pub fn failure(error: &ForegroundError) -> Self {
        Self::Failed {
            kind: error.root_kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one component within a frequency entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntry {
    /// Component
    pub component: ComponentKind,
    /// What happened
    #[serde(flatten)]
    pub outcome: ComponentOutcome,
}

/// Result of combining the component maps at one frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CombinedOutcome {
    /// A combined map was produced
    Combined {
        /// Components summed into the map
        contributors: Vec<ComponentKind>,
        /// Undefined pixels in the combined map
        undefined_pixels: usize,
    },
    /// Every component failed, so there was nothing to combine
    NoContributors,
    /// The component maps could not be combined
    Failed {
        /// Error kind
        kind: ErrorKind,
        /// Full error message
        message: String,
    },
}

/// Manifest entry for one frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyManifest {
    /// Frequency
    pub frequency: Megahertz,
    /// Per-component outcomes, in enabled order
    pub components: Vec<ComponentEntry>,
    /// Combination outcome
    pub combined: CombinedOutcome,
}

impl FrequencyManifest {
    /// Components that failed at this frequency
    #[must_use]
    pub fn failed_components(&self) -> Vec<ComponentKind> {
        self.components
            .iter()
            .filter(|e| matches!(e.outcome, ComponentOutcome::Failed { .. }))
            .map(|e| e.component)
            .collect()
    }

    /// Outcome of `component`, if it was enabled
    #[must_use]
    pub fn outcome(&self, component: ComponentKind) -> Option<&ComponentOutcome> {
        self.components
            .iter()
            .find(|e| e.component == component)
            .map(|e| &e.outcome)
    }

    /// Whether every component succeeded and a combined map exists
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_components().is_empty()
            && matches!(self.combined, CombinedOutcome::Combined { .. })
    }
}

/// Manifest of a whole sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepManifest {
    /// Final state
    pub state: SweepState,
    /// Output resolution order
    pub resolution_order: u8,
    /// Mask policy used for combination
    pub mask_policy: MaskPolicy,
    /// Enabled components
    pub components: Vec<ComponentKind>,
    /// Entries for processed frequencies, in sweep order
    pub frequencies: Vec<FrequencyManifest>,
    /// Frequencies never processed because the sweep was cancelled
    pub skipped: Vec<Megahertz>,
    /// Template loader and resample counters
    pub template_stats: StoreStats,
    /// Catalog loader invocations
    pub catalog_loads: usize,
}

impl SweepManifest {
    /// Entry for `frequency`, if it was processed
    #[must_use]
    pub fn entry(&self, frequency: Megahertz) -> Option<&FrequencyManifest> {
        self.frequencies.iter().find(|e| e.frequency == frequency)
    }

    /// Number of failed (frequency, component) pairs
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.frequencies
            .iter()
            .map(|e| e.failed_components().len())
            .sum()
    }

    /// Serialise to pretty-printed JSON
    ///
    /// # Errors
    /// Returns `ForegroundError::Output` if serialisation fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ForegroundError::Output(e.to_string()))
    }

    /// Parse a manifest from JSON
    ///
    /// # Errors
    /// Returns `ForegroundError::InvalidData` if the JSON is not a manifest.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ForegroundError::invalid("manifest", e.to_string()))
    }
}
