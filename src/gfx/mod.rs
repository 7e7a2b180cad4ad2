//! # Graphics Module
//!
//! This module contains all graphics-related functionality of the showroom,
//! including the orbit camera, rendering pipelines, model data and GPU
//! resource handling.
//!
//! ## Architecture Overview
//!
//! The graphics system is organized into several key components:
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped controls
//! - **Rendering Pipeline** ([`rendering`]) - PBR rendering with spotlight shadow mapping
//! - **Model Data** ([`scene`]) - Node hierarchy, meshes and surfaces
//! - **Geometry** ([`geometry`]) - Procedural floor plane
//! - **Resource Management** ([`resources`]) - Materials, textures, and GPU uniforms
//!
//! ## Usage
//!
//! The graphics system is driven through the [`RenderEngine`], which the
//! [`Viewer`] feeds through [`RenderScene`]:
//!
//! ```no_run
//! use showroom::gfx::RenderEngine;
//!
//! // The render engine is created by ShowroomApp once a window exists
//! // let render_engine = RenderEngine::new(window, width, height, light, &ground).await?;
//! ```
//!
//! [`Viewer`]: crate::viewer::Viewer
//! [`RenderScene`]: crate::viewer::lifecycle::RenderScene

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
