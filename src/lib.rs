//! Showroom
//!
//! A single-model product viewer built on wgpu and winit: orbit the camera
//! around the model and cycle it through a palette of PBR material presets.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod loader;
pub mod ui;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ShowroomApp;
pub use config::{Config, ViewerConfig};
pub use viewer::Viewer;
