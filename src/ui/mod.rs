//! # User Interface Module
//!
//! Dear ImGui overlay for the showroom: the loading indicator and the
//! material panel.
//!
//! ## Architecture
//!
//! The [`UiManager`] handles ImGui integration with winit and wgpu, input
//! capture and frame rendering. Panels in [`panel`] read the
//! [`Viewer`](crate::viewer::Viewer) and return the [`UiAction`] the user
//! triggered, if any.
//!
//! ## Input Handling
//!
//! When ImGui wants the mouse, camera drags and zooms are not forwarded, so
//! clicking a button never spins the model.
//!
//! [`UiAction`]: crate::viewer::ui_shell::UiAction

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::viewer_panel;
