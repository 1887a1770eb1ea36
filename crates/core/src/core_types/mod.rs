//! Core types and utilities

pub mod position;
pub mod sky_map;
pub mod units;

// Re-export main types
pub use position::{angle_between, SkyPosition, UnitVec};
pub use sky_map::{ComponentKind, MapOrigin, MaskPolicy, SkyMap};
pub use units::{FieldKind, MapUnit, Megahertz};
