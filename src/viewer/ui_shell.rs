//! Optional display elements looked up by identifier
//!
//! The viewer writes to these; the overlay reads them when drawing. Any of them
//! may be missing (a headless run has none), and writing to a missing element
//! does nothing.

use std::collections::HashMap;

pub const PROGRESS_CONTAINER: &str = "progress-container";
pub const PROGRESS_TEXT: &str = "progress-text";
pub const MATERIAL_NAME: &str = "material-name";
pub const ROTATE_TOGGLE: &str = "rotate-toggle";

/// User intents raised by buttons and shortcuts
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    Previous,
    Next,
    Randomize,
    Select(usize),
    ToggleRotation,
    ResetCamera,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiElement {
    pub text: String,
    pub visible: bool,
}

#[derive(Clone, Debug, Default)]
pub struct UiShell {
    elements: HashMap<String, UiElement>,
}

impl UiShell {
    /// No elements at all
    pub fn headless() -> Self {
        Self::default()
    }

    /// Every element the overlay knows how to draw
    pub fn standard() -> Self {
        Self::headless()
            .with_element(PROGRESS_CONTAINER)
            .with_element(PROGRESS_TEXT)
            .with_element(MATERIAL_NAME)
            .with_element(ROTATE_TOGGLE)
    }

    pub fn with_element(mut self, id: &str) -> Self {
        self.elements.insert(
            id.to_string(),
            UiElement {
                text: String::new(),
                visible: true,
            },
        );
        self
    }

    pub fn element(&self, id: &str) -> Option<&UiElement> {
        self.elements.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id).map(|e| e.text.as_str())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.element(id).is_some_and(|e| e.visible)
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(id) {
            element.text = text.into();
        }
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_to_missing_elements_are_ignored() {
        let mut shell = UiShell::headless();
        shell.set_text(MATERIAL_NAME, "Gold");
        shell.set_visible(PROGRESS_CONTAINER, false);

        assert!(shell.element(MATERIAL_NAME).is_none());
        assert_eq!(shell.text(MATERIAL_NAME), None);
        assert!(!shell.is_visible(PROGRESS_CONTAINER));
    }

    #[test]
    fn standard_shell_exposes_all_elements() {
        let mut shell = UiShell::standard();
        shell.set_text(MATERIAL_NAME, "Gold");
        shell.set_visible(PROGRESS_CONTAINER, false);

        assert_eq!(shell.text(MATERIAL_NAME), Some("Gold"));
        assert!(!shell.is_visible(PROGRESS_CONTAINER));
        assert!(shell.is_visible(ROTATE_TOGGLE));
    }
}
