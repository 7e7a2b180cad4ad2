//! Model load lifecycle
//!
//! `Unloaded -> Loading -> Ready`, or `Loading -> Failed`. There is no way back:
//! a viewer loads at most one model, once.

use crate::error::LoadError;
use crate::gfx::scene::node::{ModelHandle, Node};

#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed(_))
    }
}

/// Outcomes reported by the loader
#[derive(Debug)]
pub enum LoadEvent {
    Progress { loaded: u64, total: u64 },
    Loaded(Node),
    Failed(LoadError),
}

/// Where a freshly loaded model gets attached for drawing
pub trait RenderScene {
    fn attach_model(&mut self, model: &ModelHandle);
}

/// Fraction complete, or `None` when the total size is unknown
pub fn progress_fraction(loaded: u64, total: u64) -> Option<f32> {
    if total == 0 {
        None
    } else {
        Some((loaded as f64 / total as f64).clamp(0.0, 1.0) as f32)
    }
}

pub fn progress_text(fraction: Option<f32>, loaded: u64) -> String {
    match fraction {
        Some(f) => format!("Loading {}%", (f * 100.0).floor() as u32),
        None => format!("Loading {} KB", loaded / 1024),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_handles_unknown_totals() {
        assert_eq!(progress_fraction(10, 0), None);
        assert_eq!(progress_fraction(50, 200), Some(0.25));
        assert_eq!(progress_fraction(300, 200), Some(1.0));
    }

    #[test]
    fn text_shows_percent_or_bytes() {
        assert_eq!(progress_text(Some(0.426), 0), "Loading 42%");
        assert_eq!(progress_text(Some(1.0), 0), "Loading 100%");
        assert_eq!(progress_text(None, 4096), "Loading 4 KB");
    }

    #[test]
    fn only_ready_and_failed_are_terminal() {
        assert!(!LoadState::Unloaded.is_terminal());
        assert!(!LoadState::Loading.is_terminal());
        assert!(LoadState::Ready.is_terminal());
        assert!(LoadState::Failed("boom".into()).is_terminal());
    }
}
