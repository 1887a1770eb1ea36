//! Synchrotron extrapolation from survey templates

mod common;

use approx::assert_relative_eq;
use common::{uniform, MemoryCatalogs, MemoryTemplates};
use foreground_sim_core::grid::{pixel_count, pixel_solid_angle};
use foreground_sim_core::physics::rayleigh_jeans_factor;
use foreground_sim_core::store::DataStores;
use foreground_sim_core::{ForegroundError, MapUnit, Megahertz, Synchrotron};
use std::sync::Arc;

fn stores(templates: MemoryTemplates) -> DataStores {
    DataStores::new(Arc::new(templates), Arc::new(MemoryCatalogs::new()))
}

#[test]
fn test_constant_template_scales_as_power_law() {
    let stores = stores(
        MemoryTemplates::new()
            .with("haslam", uniform(3, 10.0, MapUnit::JanskyPerPixel, Some(408.0)))
            .with("beta", uniform(3, 2.7, MapUnit::Dimensionless, None)),
    );
    let sync = Synchrotron::new("haslam", "beta");

    let map = sync.simulate(&stores, Megahertz::new(1420.0), 3).unwrap();
    let expected = 10.0 * (1420.0_f64 / 408.0).powf(-2.7);
    assert_eq!(map.unit(), MapUnit::JanskyPerPixel);
    assert_eq!(map.len(), pixel_count(3));
    for &v in map.data() {
        assert_relative_eq!(v, expected, max_relative = 1e-12);
    }
}

#[test]
fn test_reference_frequency_reproduces_template_exactly() {
    let mut template = uniform(2, 0.0, MapUnit::JanskyPerPixel, Some(408.0));
    for (i, v) in template.data.iter_mut().enumerate() {
        *v = 0.5 + (i % 13) as f64 * 1.25;
    }
    let expected = template.data.clone();
    let stores = stores(
        MemoryTemplates::new()
            .with("haslam", template)
            .with("beta", uniform(2, 2.55, MapUnit::Dimensionless, None)),
    );

    let map = Synchrotron::new("haslam", "beta")
        .simulate(&stores, Megahertz::new(408.0), 2)
        .unwrap();
    assert_eq!(map.data(), expected.as_slice());
}

#[test]
fn test_kelvin_template_is_converted_to_flux() {
    let stores = stores(
        MemoryTemplates::new()
            .with("haslam", uniform(2, 20.0, MapUnit::Kelvin, Some(408.0)))
            .with("beta", uniform(1, 2.7, MapUnit::Dimensionless, None)),
    );
    let freq = Megahertz::new(150.0);
    // Intensive templates may be refined to the run order
    let map = Synchrotron::new("haslam", "beta")
        .simulate(&stores, freq, 3)
        .unwrap();

    let temperature = 20.0 * (150.0_f64 / 408.0).powf(-2.7);
    let expected = temperature * rayleigh_jeans_factor(freq) * pixel_solid_angle(3);
    for &v in map.data() {
        assert_relative_eq!(v, expected, max_relative = 1e-9);
    }
}

#[test]
fn test_undefined_index_leaves_pixel_undefined() {
    let mut beta = uniform(1, 2.7, MapUnit::Dimensionless, None);
    beta.data[5] = f64::NAN;
    let stores = stores(
        MemoryTemplates::new()
            .with("haslam", uniform(1, 10.0, MapUnit::JanskyPerPixel, Some(408.0)))
            .with("beta", beta),
    );
    let map = Synchrotron::new("haslam", "beta")
        .simulate(&stores, Megahertz::new(150.0), 1)
        .unwrap();
    assert!(map.data()[5].is_nan());
    assert_eq!(map.undefined_count(), 1);
}

#[test]
fn test_flux_template_cannot_be_refined() {
    let stores = stores(
        MemoryTemplates::new()
            .with("haslam", uniform(2, 10.0, MapUnit::JanskyPerPixel, Some(408.0)))
            .with("beta", uniform(2, 2.7, MapUnit::Dimensionless, None)),
    );
    let err = Synchrotron::new("haslam", "beta")
        .simulate(&stores, Megahertz::new(150.0), 4)
        .unwrap_err();
    assert!(matches!(err, ForegroundError::Resolution(_)));
}

#[test]
fn test_flux_template_downgrade_conserves_total() {
    let mut template = uniform(4, 0.0, MapUnit::JanskyPerPixel, Some(408.0));
    for (i, v) in template.data.iter_mut().enumerate() {
        *v = ((i * 7919) % 101) as f64 / 10.0;
    }
    let total: f64 = template.data.iter().sum();
    let stores = stores(
        MemoryTemplates::new()
            .with("haslam", template)
            .with("beta", uniform(4, 2.7, MapUnit::Dimensionless, None)),
    );
    let map = Synchrotron::new("haslam", "beta")
        .simulate(&stores, Megahertz::new(408.0), 2)
        .unwrap();
    assert_relative_eq!(map.total(), total, max_relative = 1e-12);
}
