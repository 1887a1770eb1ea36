//! Output of simulated products
//!
//! The driver hands one [`FrequencyProduct`] per processed frequency to an
//! [`OutputSink`]. File writers live outside this crate; [`MemorySink`]
//! keeps products in memory.

use super::manifest::FrequencyManifest;
use crate::core_types::{ComponentKind, MapOrigin, Megahertz, SkyMap};
use crate::error::Result;

/// Everything produced at one frequency
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyProduct {
    /// Frequency
    pub frequency: Megahertz,
    /// Sum of all successful component maps, if they could be combined
    pub combined: Option<SkyMap>,
    /// Successful component maps, when retention is enabled
    pub components: Vec<SkyMap>,
    /// Manifest entry for this frequency
    pub manifest: FrequencyManifest,
}

impl FrequencyProduct {
    /// File stem `{prefix}_{frequency:06.2}` used for outputs of this product
    #[must_use]
    pub fn file_stem(&self, prefix: &str) -> String {
        format!("{prefix}_{:06.2}", self.frequency.value())
    }

    /// Retained map of `component`, if any
    #[must_use]
    pub fn component(&self, component: ComponentKind) -> Option<&SkyMap> {
        self.components
            .iter()
            .find(|m| m.origin() == MapOrigin::Component(component))
    }
}

/// Destination of simulated products
pub trait OutputSink {
    /// Accept the product of one frequency
    ///
    /// # Errors
    /// Returns an error (typically `ForegroundError::Output`) if the product
    /// cannot be stored; the driver then stops the sweep.
    fn publish(&mut self, product: FrequencyProduct) -> Result<()>;
}

/// Sink that keeps every product in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    products: Vec<FrequencyProduct>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Products in publication order
    #[must_use]
    pub fn products(&self) -> &[FrequencyProduct] {
        &self.products
    }

    /// Product for `frequency`, if published
    #[must_use]
    pub fn product(&self, frequency: Megahertz) -> Option<&FrequencyProduct> {
        self.products.iter().find(|p| p.frequency == frequency)
    }

    /// Consume the sink and return its products
    #[must_use]
    pub fn into_products(self) -> Vec<FrequencyProduct> {
        self.products
    }
}

impl OutputSink for MemorySink {
    fn publish(&mut self, product: FrequencyProduct) -> Result<()> {
        self.products.push(product);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::manifest::CombinedOutcome;

    fn product(frequency: f64) -> FrequencyProduct {
        FrequencyProduct {
            frequency: Megahertz::new(frequency),
            combined: None,
            components: Vec::new(),
            manifest: FrequencyManifest {
                frequency: Megahertz::new(frequency),
                components: Vec::new(),
                combined: CombinedOutcome::NoContributors,
            },
        }
    }

    #[test]
    fn test_file_stem_is_zero_padded() {
        assert_eq!(product(50.0).file_stem("cluster"), "cluster_050.00");
        assert_eq!(product(158.126).file_stem("gsync"), "gsync_158.13");
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.publish(product(200.0)).unwrap();
        sink.publish(product(100.0)).unwrap();
        let freqs: Vec<_> = sink.products().iter().map(|p| p.frequency.value()).collect();
        assert_eq!(freqs, vec![200.0, 100.0]);
        assert!(sink.product(Megahertz::new(100.0)).is_some());
    }
}
