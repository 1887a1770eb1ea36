//! Projected surface-brightness profiles for extended sources
//!
//! Each profile takes the normalised elliptical radius `rho` (1 at the
//! source edge) and returns a non-negative relative weight. Weights are
//! normalised per source during rendering, so only shapes matter here.

/// Fractional thickness of a remnant shell
pub const SHELL_THICKNESS: f64 = 0.15;

/// Share of the shell in a composite remnant (the rest is a filled centre)
pub const COMPOSITE_SHELL_SHARE: f64 = 0.5;

/// Scale of the halo exponential, in units of the halo radius
pub const HALO_SCALE: f64 = 1.0 / 3.0;

/// Uniform disk
#[must_use]
pub fn disk(rho: f64) -> f64 {
    if rho <= 1.0 {
        1.0
    } else {
        0.0
    }
}

/// Projected uniform sphere, brightest at the centre
#[must_use]
pub fn filled(rho: f64) -> f64 {
    if rho < 1.0 {
        (1.0 - rho * rho).sqrt()
    } else {
        0.0
    }
}

/// Projected thin spherical shell, limb brightened
#[must_use]
pub fn shell(rho: f64) -> f64 {
    if rho >= 1.0 {
        return 0.0;
    }
    let inner = 1.0 - SHELL_THICKNESS;
    let outer_chord = (1.0 - rho * rho).sqrt();
    if rho < inner {
        outer_chord - (inner * inner - rho * rho).sqrt()
    } else {
        outer_chord
    }
}

/// Mix of a shell and a filled centre
#[must_use]
pub fn composite(rho: f64) -> f64 {
    COMPOSITE_SHELL_SHARE * shell(rho) + (1.0 - COMPOSITE_SHELL_SHARE) * filled(rho)
}

/// Exponential radio halo truncated at the halo radius
#[must_use]
pub fn halo(rho: f64) -> f64 {
    if rho <= 1.0 {
        (-rho / HALO_SCALE).exp()
    } else {
        0.0
    }
}
