//! Flux-conserving rendering of source catalogs onto the sky grid
//!
//! Every source is spread over the pixels whose centres fall inside its
//! ellipse, weighted by a surface-brightness profile and normalised so that
//! the pixel values add up to the source's flux density at the requested
//! frequency. Sources too small to contain any pixel centre land entirely in
//! the pixel that contains their position.
//!
//! Per-source contributions are computed in parallel, then summed in a
//! canonical order (by pixel, then by value), so the rendered map does not
//! depend on the order of records in the catalog.

use crate::core_types::{angle_between, ComponentKind, MapOrigin, MapUnit, Megahertz, SkyMap};
use crate::error::{ForegroundError, Result};
use crate::grid::healpix::{angle_to_pixel, pixel_count, pixel_to_vector, query_disc};
use crate::store::CatalogRecord;
use rayon::prelude::*;
use tracing::debug;

/// Relative surface brightness at normalised elliptical radius `rho`
pub type ProfileFn = fn(&CatalogRecord, f64) -> f64;

/// Flux density (Jy) of a record at a frequency
pub type SpectralFn = fn(&CatalogRecord, Megahertz) -> f64;

/// How a component turns catalog records into pixel contributions
#[derive(Debug, Clone, Copy)]
pub struct RenderModel {
    /// Surface-brightness profile
    pub profile: ProfileFn,
    /// Spectral law
    pub spectral: SpectralFn,
}

/// Render a catalog into a Jy/pixel map
///
/// # Arguments
/// * `records` - Sources to render
/// * `order` - Resolution order of the output map
/// * `frequency` - Frequency to evaluate the spectral law at
/// * `model` - Profile and spectral law
/// * `component` - Component tag of the output map
///
/// # Errors
/// Returns `InvalidData` if the spectral law yields a non-finite or negative
/// flux for any source.
pub fn render_catalog(
    records: &[CatalogRecord],
    order: u8,
    frequency: Megahertz,
    model: &RenderModel,
    component: ComponentKind,
) -> Result<SkyMap> {
    let per_source = records
        .par_iter()
        .map(|record| source_footprint(record, order, frequency, model))
        .collect::<Result<Vec<_>>>()?;

    let mut contributions: Vec<(u64, f64)> = per_source.into_iter().flatten().collect();
    contributions.par_sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut data = vec![0.0; pixel_count(order)];
    for (pixel, flux) in contributions {
        data[pixel as usize] += flux;
    }
    debug!(
        "Rendered {} {} sources at {} (order {})",
        records.len(),
        component,
        frequency,
        order
    );
    SkyMap::new(
        data,
        order,
        frequency,
        MapUnit::JanskyPerPixel,
        MapOrigin::Component(component),
    )
}

/// Pixel contributions of one source
fn source_footprint(
    record: &CatalogRecord,
    order: u8,
    frequency: Megahertz,
    model: &RenderModel,
) -> Result<Vec<(u64, f64)>> {
    let flux = (model.spectral)(record, frequency);
    if !flux.is_finite() || flux < 0.0 {
        return Err(ForegroundError::invalid(
            &record.name,
            format!("spectral law gives flux {flux} Jy at {frequency}"),
        ));
    }
    if flux == 0.0 {
        return Ok(Vec::new());
    }

    let home = angle_to_pixel(order, &record.position);
    let semi_major = record.shape.semi_major_rad();
    if semi_major <= 0.0 {
        return Ok(vec![(home, flux)]);
    }
    let semi_minor = match record.shape.semi_minor_rad() {
        b if b > 0.0 => b,
        _ => semi_major,
    };

    let centre = record.position.to_unit_vector();
    let (east, north) = record.position.tangent_basis();
    let pa = record.shape.position_angle_deg.to_radians();

    let weights: Vec<(u64, f64)> = query_disc(order, &record.position, semi_major)
        .into_iter()
        .filter_map(|pixel| {
            let v = pixel_to_vector(order, pixel);
            let distance = angle_between(&centre, &v);
            let bearing = v.dot(&east).atan2(v.dot(&north));
            let (sin_t, cos_t) = (bearing - pa).sin_cos();
            let along = distance * cos_t / semi_major;
            let across = distance * sin_t / semi_minor;
            let rho = (along * along + across * across).sqrt();
            let w = (model.profile)(record, rho);
            (w > 0.0).then_some((pixel, w))
        })
        .collect();

    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Ok(vec![(home, flux)]);
    }
    Ok(weights
        .into_iter()
        .map(|(pixel, w)| (pixel, flux * w / total))
        .collect())
}
