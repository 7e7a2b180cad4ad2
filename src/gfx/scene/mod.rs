//! # Model Data Module
//!
//! CPU-side representation of the displayed model: a tree of [`Node`]s, some
//! of which carry a drawable [`Surface`] made of a [`MeshData`] and a
//! [`SurfaceMaterial`].
//!
//! ## Key Components
//!
//! - [`Node`] - One node of the hierarchy with a local [`Transform`]
//! - [`ModelHandle`] - Exclusive owner of a loaded model's root node
//! - [`MeshData`] - Indexed triangle list
//! - [`Vertex3D`] - Vertex layout shared by every pipeline
//!
//! ## Usage
//!
//! ```no_run
//! use showroom::gfx::scene::{MeshData, ModelHandle, Node, Surface};
//!
//! let mesh = MeshData::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[], vec![0, 1, 2]);
//! let root = Node::new("root").with_surface(Surface::new(mesh));
//! let model = ModelHandle::new(root);
//! assert_eq!(model.surface_count(), 1);
//! ```
//!
//! [`SurfaceMaterial`]: crate::gfx::resources::material::SurfaceMaterial

pub mod mesh;
pub mod node;
pub mod vertex;

// Re-export main types
pub use mesh::MeshData;
pub use node::{ModelHandle, Node, Surface, Transform};
pub use vertex::Vertex3D;
