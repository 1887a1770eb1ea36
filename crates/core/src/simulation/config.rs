//! Sweep configuration
//!
//! A [`SimulationConfig`] names the enabled components, the frequencies to
//! simulate, the output resolution and how component maps are combined. It
//! is plain serde data; [`SimulationConfig::validate`] performs every check
//! the driver relies on before any data is loaded.

use crate::components::{
    FreeFree, FreeFreeConfig, ForegroundComponent, GalaxyClusters, SupernovaRemnants, Synchrotron,
};
use crate::core_types::{ComponentKind, MaskPolicy, Megahertz};
use crate::error::{ForegroundError, Result};
use crate::grid::check_order;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of frequencies a range may expand to
pub const MAX_FREQUENCIES: usize = 100_000;

/// Frequencies to simulate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencySpec {
    /// Explicit frequencies, simulated in the given order
    List(Vec<Megahertz>),
    /// Linear range from `start` to `stop` inclusive
    Range {
        start: Megahertz,
        stop: Megahertz,
        step: Megahertz,
    },
}

impl Default for FrequencySpec {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl FrequencySpec {
    /// Expand into the list of frequencies to simulate
    ///
    /// # Errors
    /// Returns `ForegroundError::Config` if the list is empty, contains a
    /// non-positive or repeated frequency, or the range is malformed.
    pub fn resolve(&self) -> Result<Vec<Megahertz>> {
        let frequencies = match self {
            Self::List(list) => list.clone(),
            Self::Range { start, stop, step } => {
                let valid = start.is_physical() && stop.is_physical() && step.is_physical();
                if !valid || stop < start {
                    return Err(ForegroundError::Config(format!(
                        "invalid frequency range {start} to {stop} in steps of {step}"
                    )));
                }
                let span = (stop.value() - start.value()) / step.value();
                if span >= MAX_FREQUENCIES as f64 {
                    return Err(ForegroundError::Config(format!(
                        "frequency range expands to more than {MAX_FREQUENCIES} frequencies"
                    )));
                }
                // Tolerate rounding so that the stop frequency is included
                let count = (span + 1e-9).floor() as usize + 1;
                (0..count)
                    .map(|i| Megahertz::new(start.value() + i as f64 * step.value()))
                    .collect()
            }
        };

        if frequencies.is_empty() {
            return Err(ForegroundError::Config("no frequencies to simulate".to_string()));
        }
        if let Some(bad) = frequencies.iter().find(|f| !f.is_physical()) {
            return Err(ForegroundError::Config(format!(
                "frequency {bad} is not a positive finite value"
            )));
        }
        let mut sorted = frequencies.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(ForegroundError::Config(format!(
                "frequency {} listed more than once",
                pair[0]
            )));
        }
        Ok(frequencies)
    }
}

/// Configuration of one frequency sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Components to simulate, in output order
    pub enabled: Vec<ComponentKind>,
    /// Frequencies to simulate
    pub frequencies: FrequencySpec,
    /// HEALPix order of all output maps (`nside = 2^order`)
    pub resolution_order: u8,
    /// Synchrotron templates
    pub synchrotron: Option<Synchrotron>,
    /// Free-free templates and model
    pub freefree: Option<FreeFreeConfig>,
    /// Supernova remnant catalog
    pub snr: Option<SupernovaRemnants>,
    /// Galaxy cluster catalog
    pub clusters: Option<GalaxyClusters>,
    /// Treatment of undefined pixels when combining components
    pub mask_policy: MaskPolicy,
    /// Publish per-component maps alongside the combined map
    pub keep_component_maps: bool,
    /// Frequencies simulated concurrently between cancellation checks
    pub frequency_batch_size: usize,
    /// Prefix of output file stems
    pub output_prefix: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            frequencies: FrequencySpec::default(),
            resolution_order: 6,
            synchrotron: None,
            freefree: None,
            snr: None,
            clusters: None,
            mask_policy: MaskPolicy::default(),
            keep_component_maps: false,
            frequency_batch_size: 1,
            output_prefix: "foreground".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Empty configuration at resolution `order`
    #[must_use]
    pub fn new(order: u8) -> Self {
        Self {
            resolution_order: order,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON
    ///
    /// # Errors
    /// Returns `ForegroundError::Config` if the JSON does not describe a
    /// configuration. The result is not validated.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ForegroundError::Config(e.to_string()))
    }

    fn enable(&mut self, kind: ComponentKind) {
        if !self.enabled.contains(&kind) {
            self.enabled.push(kind);
        }
    }

    /// Enable synchrotron with the given settings
    #[must_use]
    pub fn with_synchrotron(mut self, synchrotron: Synchrotron) -> Self {
        self.synchrotron = Some(synchrotron);
        self.enable(ComponentKind::Synchrotron);
        self
    }

    /// Enable free-free with the given settings
    #[must_use]
    pub fn with_freefree(mut self, freefree: FreeFreeConfig) -> Self {
        self.freefree = Some(freefree);
        self.enable(ComponentKind::FreeFree);
        self
    }

    /// Enable supernova remnants with the given settings
    #[must_use]
    pub fn with_snr(mut self, snr: SupernovaRemnants) -> Self {
        self.snr = Some(snr);
        self.enable(ComponentKind::Snr);
        self
    }

    /// Enable galaxy clusters with the given settings
    #[must_use]
    pub fn with_clusters(mut self, clusters: GalaxyClusters) -> Self {
        self.clusters = Some(clusters);
        self.enable(ComponentKind::Clusters);
        self
    }

    /// Simulate an explicit list of frequencies (MHz)
    #[must_use]
    pub fn with_frequencies(mut self, frequencies: &[f64]) -> Self {
        self.frequencies = FrequencySpec::List(frequencies.iter().copied().map(Megahertz::new).collect());
        self
    }

    /// Simulate a linear frequency range
    #[must_use]
    pub fn with_frequency_range(mut self, start: f64, stop: f64, step: f64) -> Self {
        self.frequencies = FrequencySpec::Range {
            start: Megahertz::new(start),
            stop: Megahertz::new(stop),
            step: Megahertz::new(step),
        };
        self
    }

    /// Set the mask policy
    #[must_use]
    pub fn with_mask_policy(mut self, policy: MaskPolicy) -> Self {
        self.mask_policy = policy;
        self
    }

    /// Keep per-component maps in the output
    #[must_use]
    pub fn with_component_maps(mut self, keep: bool) -> Self {
        self.keep_component_maps = keep;
        self
    }

    /// Set the number of frequencies per batch
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.frequency_batch_size = size;
        self
    }

    /// Check the configuration and expand the frequency list
    ///
    /// # Returns
    /// Frequencies to simulate, in order
    ///
    /// # Errors
    /// Returns `ForegroundError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<Vec<Megahertz>> {
        check_order(self.resolution_order).map_err(|e| ForegroundError::Config(e.to_string()))?;
        if self.enabled.is_empty() {
            return Err(ForegroundError::Config("no components enabled".to_string()));
        }
        for (i, kind) in self.enabled.iter().enumerate() {
            if self.enabled[..i].contains(kind) {
                return Err(ForegroundError::Config(format!("component '{kind}' enabled twice")));
            }
            let configured = match kind {
                ComponentKind::Synchrotron => self.synchrotron.is_some(),
                ComponentKind::FreeFree => self.freefree.is_some(),
                ComponentKind::Snr => self.snr.is_some(),
                ComponentKind::Clusters => self.clusters.is_some(),
            };
            if !configured {
                return Err(ForegroundError::Config(format!(
                    "component '{kind}' is enabled but not configured"
                )));
            }
        }
        if self.frequency_batch_size == 0 {
            return Err(ForegroundError::Config(
                "frequency_batch_size must be at least 1".to_string(),
            ));
        }
        self.frequencies.resolve()
    }

    /// Build the enabled components for one run
    ///
    /// # Errors
    /// Returns `ForegroundError::Config` if an enabled component has no
    /// settings.
    pub fn build_components(&self) -> Result<Vec<ForegroundComponent>> {
        let missing = |kind: ComponentKind| {
            ForegroundError::Config(format!("component '{kind}' is enabled but not configured"))
        };
        self.enabled
            .iter()
            .map(|&kind| -> Result<ForegroundComponent> {
                Ok(match kind {
                    ComponentKind::Synchrotron => ForegroundComponent::Synchrotron(
                        self.synchrotron.clone().ok_or_else(|| missing(kind))?,
                    ),
                    ComponentKind::FreeFree => ForegroundComponent::FreeFree(FreeFree::new(
                        self.freefree.clone().ok_or_else(|| missing(kind))?,
                    )),
                    ComponentKind::Snr => {
                        ForegroundComponent::Snr(self.snr.clone().ok_or_else(|| missing(kind))?)
                    }
                    ComponentKind::Clusters => ForegroundComponent::Clusters(
                        self.clusters.clone().ok_or_else(|| missing(kind))?,
                    ),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimulationConfig {
        SimulationConfig::new(3)
            .with_synchrotron(Synchrotron::new("haslam408", "synchro_index"))
            .with_frequencies(&[120.0, 150.0])
    }

    #[test]
    fn test_valid_config_resolves_frequencies() {
        let freqs = base().validate().unwrap();
        assert_eq!(freqs, vec![Megahertz::new(120.0), Megahertz::new(150.0)]);
        assert_eq!(base().build_components().unwrap().len(), 1);
    }

    #[test]
    fn test_range_includes_stop() {
        let spec = FrequencySpec::Range {
            start: Megahertz::new(100.0),
            stop: Megahertz::new(200.0),
            step: Megahertz::new(0.1),
        };
        let freqs = spec.resolve().unwrap();
        assert_eq!(freqs.len(), 1001);
        assert!((freqs[1000].value() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_range_with_non_finite_stop_is_rejected() {
        for stop in [f64::NAN, f64::INFINITY] {
            let spec = FrequencySpec::Range {
                start: Megahertz::new(100.0),
                stop: Megahertz::new(stop),
                step: Megahertz::new(1.0),
            };
            assert!(matches!(spec.resolve(), Err(ForegroundError::Config(_))), "stop {stop}");
        }
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let cases = [
            SimulationConfig::new(13)
                .with_synchrotron(Synchrotron::new("a", "b"))
                .with_frequencies(&[100.0]),
            SimulationConfig::new(3).with_frequencies(&[100.0]),
            base().with_frequencies(&[]),
            base().with_frequencies(&[100.0, -5.0]),
            base().with_frequencies(&[100.0, 100.0]),
            base().with_frequency_range(200.0, 100.0, 1.0),
            base().with_frequency_range(100.0, f64::NAN, 1.0),
            base().with_frequency_range(100.0, f64::INFINITY, 1.0),
            base().with_batch_size(0),
            SimulationConfig {
                enabled: vec![ComponentKind::Snr],
                ..base()
            },
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ForegroundError::Config(_)), "{err}");
        }
    }

    #[test]
    fn test_builder_does_not_duplicate_enabled() {
        let config = base().with_synchrotron(Synchrotron::new("x", "y"));
        assert_eq!(config.enabled, vec![ComponentKind::Synchrotron]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "enabled": ["synchrotron", "freefree"],
            "frequencies": { "range": { "start": 100.0, "stop": 110.0, "step": 5.0 } },
            "resolution_order": 4,
            "synchrotron": { "template": "haslam408", "spectral_index": "index" },
            "freefree": { "halpha": "halpha", "dust": "sfd" },
            "mask_policy": "exclude"
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.mask_policy, MaskPolicy::Exclude);
        assert_eq!(config.frequency_batch_size, 1);
        assert_eq!(config.freefree.as_ref().unwrap().model.electron_temperature, 7000.0);
        assert_eq!(config.validate().unwrap().len(), 3);

        assert!(matches!(
            SimulationConfig::from_json_str("{ not json").unwrap_err(),
            ForegroundError::Config(_)
        ));
    }
}
