//! Spectral laws for extrapolating flux density across frequency
//!
//! Indices follow the radio convention `S ∝ ν^(−α)`, so a positive index
//! means flux falls with frequency.

use crate::core_types::Megahertz;

/// Scale a flux density with a simple power law
///
/// `S(ν) = S(ν0) · (ν/ν0)^(−index)`
#[must_use]
pub fn power_law(reference_flux: f64, frequency: Megahertz, reference: Megahertz, index: f64) -> f64 {
    reference_flux * (frequency / reference).powf(-index)
}

/// Scale a flux density with a log-parabolic (curved) power law
///
/// `S(ν) = S(ν0) · x^(−(index + curvature · ln x))`, `x = ν/ν0`
///
/// A zero curvature reduces to [`power_law`].
#[must_use]
pub fn curved_power_law(
    reference_flux: f64,
    frequency: Megahertz,
    reference: Megahertz,
    index: f64,
    curvature: f64,
) -> f64 {
    let x = frequency / reference;
    reference_flux * x.powf(-(index + curvature * x.ln()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_power_law_identity_at_reference() {
        let f = Megahertz::new(408.0);
        assert_eq!(power_law(10.0, f, f, 2.7), 10.0);
    }

    #[test]
    fn test_power_law_falls_with_positive_index() {
        let s = power_law(10.0, Megahertz::new(1420.0), Megahertz::new(408.0), 2.7);
        assert_relative_eq!(s, 10.0 * (1420.0_f64 / 408.0).powf(-2.7), max_relative = 1e-12);
        assert!(s < 10.0);
    }

    #[test]
    fn test_curved_law_reduces_to_power_law() {
        let (f, f0) = (Megahertz::new(200.0), Megahertz::new(1400.0));
        assert_relative_eq!(
            curved_power_law(3.0, f, f0, 1.2, 0.0),
            power_law(3.0, f, f0, 1.2),
            max_relative = 1e-12
        );
        // Positive curvature steepens the spectrum away from the reference
        assert!(curved_power_law(3.0, f, f0, 1.2, 0.1) < power_law(3.0, f, f0, 1.2));
    }
}
