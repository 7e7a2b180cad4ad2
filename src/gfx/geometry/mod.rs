//! Procedural geometry for the showroom floor

pub mod primitives;

pub use primitives::generate_plane;
