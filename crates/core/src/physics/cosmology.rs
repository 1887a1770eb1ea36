//! Flat ΛCDM distances and cluster sizes
//!
//! Used to give catalogued galaxy clusters an angular extent when the
//! catalog only lists their mass and redshift. The radio halo radius is a
//! fixed fraction of the virial radius, where the virial overdensity follows
//! Bryan & Norman (1998).
//!
//! # References
//! - Bryan, G.L., Norman, M.L. (1998). "Statistical Properties of X-Ray
//!   Clusters: Analytic and Numerical Comparisons". ApJ, 495, 80
//! - Hogg, D.W. (1999). "Distance measures in cosmology". astro-ph/9905116
//! - Cassano, R., Brunetti, G., Setti, G. et al. (2007). "New scaling
//!   relations in cluster radio haloes". MNRAS, 378, 1565

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Speed of light (km/s)
const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Critical density today per h² (Msun/Mpc³)
const CRITICAL_DENSITY_H2: f64 = 2.775_366_27e11;

/// Simpson intervals for the comoving distance integral (even)
const DISTANCE_STEPS: usize = 256;

/// Radio halo radius as a fraction of the virial radius
pub const HALO_VIRIAL_FRACTION: f64 = 0.3;

/// Flat ΛCDM cosmology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cosmology {
    /// Hubble constant H0 (km/s/Mpc)
    pub hubble: f64,
    /// Matter density Ωm today (ΩΛ = 1 − Ωm)
    pub omega_matter: f64,
}

impl Default for Cosmology {
    fn default() -> Self {
        Self {
            hubble: 71.0,
            omega_matter: 0.27,
        }
    }
}

impl Cosmology {
    /// Dimensionless Hubble parameter `E(z) = H(z) / H0`
    #[must_use]
    pub fn efunc(&self, z: f64) -> f64 {
        let om = self.omega_matter;
        (om * (1.0 + z).powi(3) + (1.0 - om)).sqrt()
    }

    /// Hubble distance `c / H0` (Mpc)
    #[must_use]
    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT_KM_S / self.hubble
    }

    /// Line-of-sight comoving distance to redshift `z` (Mpc)
    #[must_use]
    pub fn comoving_distance(&self, z: f64) -> f64 {
        if z <= 0.0 {
            return 0.0;
        }
        let h = z / DISTANCE_STEPS as f64;
        let mut sum = 1.0 / self.efunc(0.0) + 1.0 / self.efunc(z);
        for i in 1..DISTANCE_STEPS {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight / self.efunc(i as f64 * h);
        }
        self.hubble_distance() * sum * h / 3.0
    }

    /// Angular diameter distance to redshift `z` (Mpc)
    #[must_use]
    pub fn angular_diameter_distance(&self, z: f64) -> f64 {
        self.comoving_distance(z) / (1.0 + z)
    }

    /// Critical density at redshift `z` (Msun/Mpc³)
    #[must_use]
    pub fn critical_density(&self, z: f64) -> f64 {
        let h = self.hubble / 100.0;
        CRITICAL_DENSITY_H2 * h * h * self.efunc(z).powi(2)
    }

    /// Virial overdensity Δc relative to the critical density
    #[must_use]
    pub fn virial_overdensity(&self, z: f64) -> f64 {
        let x = self.omega_matter * (1.0 + z).powi(3) / self.efunc(z).powi(2) - 1.0;
        18.0 * PI * PI + 82.0 * x - 39.0 * x * x
    }

    /// Virial radius of a halo of `mass` (Msun) at redshift `z` (Mpc)
    #[must_use]
    pub fn virial_radius(&self, mass: f64, z: f64) -> f64 {
        let density = self.virial_overdensity(z) * self.critical_density(z);
        (3.0 * mass / (4.0 * PI * density)).cbrt()
    }

    /// Angular radius of the radio halo of a cluster (rad)
    #[must_use]
    pub fn halo_angular_radius(&self, mass: f64, z: f64) -> f64 {
        HALO_VIRIAL_FRACTION * self.virial_radius(mass, z) / self.angular_diameter_distance(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_low_redshift_follows_hubble_law() {
        let cosmo = Cosmology::default();
        assert_eq!(cosmo.efunc(0.0), 1.0);
        assert_eq!(cosmo.comoving_distance(0.0), 0.0);
        let z = 0.001;
        assert_relative_eq!(
            cosmo.comoving_distance(z),
            z * cosmo.hubble_distance(),
            max_relative = 1e-3
        );
    }

    #[test]
    fn test_distances_at_unit_redshift() {
        let cosmo = Cosmology::default();
        assert_relative_eq!(cosmo.comoving_distance(1.0), 3317.41, max_relative = 1e-4);
        assert_relative_eq!(cosmo.angular_diameter_distance(1.0), 1658.70, max_relative = 1e-4);
    }

    #[test]
    fn test_overdensity_limits() {
        // Einstein-de Sitter universe: Δc = 18π²
        let eds = Cosmology {
            omega_matter: 1.0,
            ..Cosmology::default()
        };
        assert_relative_eq!(eds.virial_overdensity(0.7), 18.0 * PI * PI, max_relative = 1e-12);
        assert!(Cosmology::default().virial_overdensity(0.0) < 100.0);
    }

    #[test]
    fn test_coma_like_cluster() {
        let cosmo = Cosmology::default();
        assert_relative_eq!(cosmo.virial_radius(1e15, 0.023), 2.5678, max_relative = 1e-3);
        let radius_arcmin = cosmo.halo_angular_radius(1e15, 0.023).to_degrees() * 60.0;
        assert_relative_eq!(radius_arcmin, 28.03, max_relative = 1e-3);
    }

    #[test]
    fn test_halo_size_scales() {
        let cosmo = Cosmology::default();
        assert!(cosmo.halo_angular_radius(1e15, 0.1) > cosmo.halo_angular_radius(1e14, 0.1));
        assert!(cosmo.halo_angular_radius(1e15, 0.05) > cosmo.halo_angular_radius(1e15, 0.2));
    }
}
