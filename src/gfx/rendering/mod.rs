//! Core rendering functionality
//!
//! Handles render pipelines, per-surface GPU resources and frame rendering.

pub mod draw_item;
pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use draw_item::{DrawItem, DrawItems, TransformBindings};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
