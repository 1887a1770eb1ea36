//! Resolution changes for pixelized fields
//!
//! Downgrading merges the `4^Δ` NESTED children of each coarse pixel:
//! extensive fields (flux per pixel) are summed so that total flux is
//! conserved, intensive fields (temperature, surface brightness, spectral
//! index) are averaged. Undefined (`NaN`) children are skipped; a merged pixel
//! is undefined only when all of its children are.
//!
//! Upgrading is only defined for intensive fields. Each fine pixel takes a
//! Gaussian-weighted mean of the coarse pixels around its centre, which keeps
//! constant fields constant and varies continuously across coarse pixel
//! boundaries. Extensive fields cannot be split without a model of the flux
//! distribution inside a pixel, so upgrading them is an error.

use super::healpix::{check_order, children, pixel_count, pixel_to_angle, pixel_to_vector, query_disc};
use crate::core_types::position::angle_between;
use crate::core_types::FieldKind;
use crate::error::{ForegroundError, Result};
use rayon::prelude::*;

/// Resample a NESTED-ordered field from one order to another
///
/// # Arguments
/// * `data` - Field values at `from_order` (length `12 * 4^from_order`)
/// * `from_order` - Resolution order of `data`
/// * `to_order` - Requested resolution order
/// * `kind` - Whether the field is extensive or intensive
///
/// # Returns
/// New field values at `to_order`
///
/// # Errors
/// - `ForegroundError::Resolution` if either order is unsupported, or if an
///   extensive field is upgraded
/// - `ForegroundError::InvalidData` if `data` does not match `from_order`
pub fn resample(data: &[f64], from_order: u8, to_order: u8, kind: FieldKind) -> Result<Vec<f64>> {
    check_order(from_order)?;
    check_order(to_order)?;
    let expected = pixel_count(from_order);
    if data.len() != expected {
        return Err(ForegroundError::invalid(
            "resample input",
            format!(
                "expected {expected} pixels for order {from_order}, got {}",
                data.len()
            ),
        ));
    }

    match from_order.cmp(&to_order) {
        std::cmp::Ordering::Equal => Ok(data.to_vec()),
        std::cmp::Ordering::Greater => Ok(downgrade(data, from_order - to_order, to_order, kind)),
        std::cmp::Ordering::Less => match kind {
            FieldKind::Extensive => Err(ForegroundError::Resolution(format!(
                "cannot upgrade an extensive (flux per pixel) field from order {from_order} to {to_order}"
            ))),
            FieldKind::Intensive => Ok(upgrade_intensive(data, from_order, to_order)),
        },
    }
}

fn downgrade(data: &[f64], levels: u8, to_order: u8, kind: FieldKind) -> Vec<f64> {
    let mut out = vec![0.0; pixel_count(to_order)];
    out.par_iter_mut().enumerate().for_each(|(pixel, value)| {
        let range = children(pixel as u64, levels);
        let block = &data[range.start as usize..range.end as usize];
        let mut sum = 0.0;
        let mut defined = 0_usize;
        for &v in block.iter().filter(|v| !v.is_nan()) {
            sum += v;
            defined += 1;
        }
        *value = match (defined, kind) {
            (0, _) => f64::NAN,
            (_, FieldKind::Extensive) => sum,
            (n, FieldKind::Intensive) => sum / n as f64,
        };
    });
    out
}

fn upgrade_intensive(data: &[f64], from_order: u8, to_order: u8) -> Vec<f64> {
    let levels = to_order - from_order;
    let block_len = 1_usize << (2 * u32::from(levels));
    let coarse_size = super::healpix::pixel_solid_angle(from_order).sqrt();
    // Kernel width and support in units of the coarse pixel size
    let sigma = 0.5 * coarse_size;
    let support = coarse_size;

    let mut out = vec![0.0; pixel_count(to_order)];
    out.par_chunks_mut(block_len)
        .enumerate()
        .for_each(|(coarse, block)| {
            let coarse = coarse as u64;
            let neighbours = query_disc(from_order, &pixel_to_angle(from_order, coarse), 2.0 * support);
            let neighbour_vecs: Vec<_> = neighbours
                .iter()
                .map(|&p| (p, pixel_to_vector(from_order, p)))
                .collect();

            for (fine, value) in children(coarse, levels).zip(block.iter_mut()) {
                let centre = pixel_to_vector(to_order, fine);
                let mut weight_sum = 0.0;
                let mut acc = 0.0;
                for (p, v) in &neighbour_vecs {
                    let sample = data[*p as usize];
                    if sample.is_nan() {
                        continue;
                    }
                    let d = angle_between(&centre, v);
                    if d > support && *p != coarse {
                        continue;
                    }
                    let w = (-0.5 * (d / sigma).powi(2)).exp();
                    weight_sum += w;
                    acc += w * sample;
                }
                *value = if weight_sum > 0.0 {
                    acc / weight_sum
                } else {
                    f64::NAN
                };
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(order: u8) -> Vec<f64> {
        (0..pixel_count(order)).map(|i| (i % 17) as f64 + 0.25).collect()
    }

    #[test]
    fn test_identity_resample() {
        let data = ramp(2);
        let out = resample(&data, 2, 2, FieldKind::Extensive).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_extensive_downgrade_conserves_flux() {
        let data = ramp(4);
        let out = resample(&data, 4, 1, FieldKind::Extensive).unwrap();
        assert_eq!(out.len(), pixel_count(1));
        let total_in: f64 = data.iter().sum();
        let total_out: f64 = out.iter().sum();
        assert_relative_eq!(total_in, total_out, max_relative = 1e-12);
    }

    #[test]
    fn test_intensive_downgrade_averages() {
        let data = vec![3.0; pixel_count(3)];
        let out = resample(&data, 3, 1, FieldKind::Intensive).unwrap();
        assert!(out.iter().all(|&v| (v - 3.0).abs() < 1e-12));

        // One parent's children: 1, 2, 3, 4 -> mean 2.5
        let mut data = vec![0.0; pixel_count(1)];
        data[..4].copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let out = resample(&data, 1, 0, FieldKind::Intensive).unwrap();
        assert_eq!(out[0], 2.5);
    }

    #[test]
    fn test_downgrade_skips_undefined_children() {
        let mut data = vec![1.0; pixel_count(1)];
        data[0] = f64::NAN;
        data[4..8].fill(f64::NAN);

        let summed = resample(&data, 1, 0, FieldKind::Extensive).unwrap();
        assert_eq!(summed[0], 3.0);
        assert!(summed[1].is_nan());

        let averaged = resample(&data, 1, 0, FieldKind::Intensive).unwrap();
        assert_eq!(averaged[0], 1.0);
        assert!(averaged[1].is_nan());
    }

    #[test]
    fn test_extensive_upgrade_is_rejected() {
        let data = vec![1.0; pixel_count(1)];
        let err = resample(&data, 1, 2, FieldKind::Extensive).unwrap_err();
        assert!(matches!(err, ForegroundError::Resolution(_)));
    }

    #[test]
    fn test_intensive_upgrade_keeps_constant_field() {
        let data = vec![-2.7; pixel_count(1)];
        let out = resample(&data, 1, 3, FieldKind::Intensive).unwrap();
        assert_eq!(out.len(), pixel_count(3));
        for v in out {
            assert_relative_eq!(v, -2.7, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_intensive_upgrade_stays_within_neighbour_range() {
        let data = ramp(2);
        let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let out = resample(&data, 2, 4, FieldKind::Intensive).unwrap();
        assert!(out.iter().all(|&v| v >= lo - 1e-12 && v <= hi + 1e-12));
    }

    #[test]
    fn test_wrong_length_is_invalid_data() {
        let err = resample(&[1.0; 10], 0, 0, FieldKind::Intensive).unwrap_err();
        assert!(matches!(err, ForegroundError::InvalidData { .. }));
    }
}
