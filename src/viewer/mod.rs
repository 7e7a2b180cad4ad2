//! # Viewer
//!
//! The [`Viewer`] owns everything the user can change: the material catalog,
//! the cursor into it, the loaded model and the load state. It never touches
//! the GPU; the render engine reads the model from it each frame.
//!
//! ## Usage
//!
//! ```no_run
//! use showroom::viewer::{catalog::MaterialCatalog, ui_shell::UiShell, Viewer};
//!
//! let mut viewer = Viewer::new(MaterialCatalog::default(), UiShell::headless());
//! viewer.next();
//! assert_eq!(viewer.cursor(), 1);
//! ```

pub mod catalog;
pub mod lifecycle;
pub mod ui_shell;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{Placement, ViewerConfig};
use crate::error::{CatalogError, LoadError};
use crate::gfx::resources::material::SurfaceMaterial;
use crate::gfx::scene::node::{ModelHandle, Node};

use catalog::{MaterialCatalog, MaterialPreset};
use lifecycle::{progress_fraction, progress_text, LoadEvent, LoadState, RenderScene};
use ui_shell::{UiAction, UiShell};

pub struct Viewer {
    catalog: MaterialCatalog,
    cursor: usize,
    model: Option<ModelHandle>,
    state: LoadState,
    progress: f32,
    placement: Placement,
    auto_rotate: bool,
    ui: UiShell,
    rng: StdRng,
}

impl Viewer {
    pub fn new(catalog: MaterialCatalog, ui: UiShell) -> Self {
        let mut viewer = Self {
            catalog,
            cursor: 0,
            model: None,
            state: LoadState::Unloaded,
            progress: 0.0,
            placement: Placement::default(),
            auto_rotate: false,
            ui,
            rng: StdRng::from_os_rng(),
        };
        viewer.update_rotation_label();
        viewer
    }

    /// Builds the catalog, start index, placement and rotation state from `config`
    pub fn from_config(config: &ViewerConfig, ui: UiShell) -> Result<Self, CatalogError> {
        let catalog = match &config.materials {
            Some(presets) => MaterialCatalog::new(presets.clone())?,
            None => MaterialCatalog::default(),
        };

        let mut viewer = Self::new(catalog, ui)
            .with_placement(config.model.placement)
            .with_auto_rotate(config.camera.auto_rotate);
        viewer.select(config.initial_material);
        Ok(viewer)
    }

    /// Replaces the random source, e.g. with a seeded one
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_auto_rotate(mut self, auto_rotate: bool) -> Self {
        self.auto_rotate = auto_rotate;
        self.update_rotation_label();
        self
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_preset(&self) -> &MaterialPreset {
        self.catalog.get(self.cursor)
    }

    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.as_ref()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Fraction of the model loaded so far, never decreasing
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn ui(&self) -> &UiShell {
        &self.ui
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    // Material cursor

    /// Assigns a fresh instance of the current preset to every surface of the
    /// model and shows its name.
    pub fn apply_current(&mut self) {
        let preset = self.catalog.get(self.cursor);

        if let Some(model) = self.model.as_mut() {
            let material = SurfaceMaterial::from_preset(preset);
            for surface in model.surfaces_mut() {
                surface.material = material.clone();
            }
            log::debug!("Applied material '{}'", preset.name);
        }

        let name = preset.name.clone();
        self.ui.set_text(ui_shell::MATERIAL_NAME, name);
    }

    pub fn next(&mut self) {
        self.cursor = (self.cursor + 1) % self.catalog.len();
        self.apply_current();
    }

    pub fn previous(&mut self) {
        let len = self.catalog.len();
        self.cursor = (self.cursor + len - 1) % len;
        self.apply_current();
    }

    pub fn randomize(&mut self) {
        self.cursor = self.rng.random_range(0..self.catalog.len());
        self.apply_current();
    }

    /// Jumps to `index`, wrapping it into the catalog
    pub fn select(&mut self, index: usize) {
        self.cursor = index % self.catalog.len();
        self.apply_current();
    }

    pub fn toggle_rotation(&mut self) {
        self.auto_rotate = !self.auto_rotate;
        self.update_rotation_label();
    }

    fn update_rotation_label(&mut self) {
        let label = if self.auto_rotate {
            "Stop Rotation"
        } else {
            "Start Rotation"
        };
        self.ui.set_text(ui_shell::ROTATE_TOGGLE, label);
    }

    /// Handles the actions that concern the viewer.
    ///
    /// Returns false for actions owned by someone else (the camera).
    pub fn dispatch(&mut self, action: UiAction) -> bool {
        match action {
            UiAction::Previous => self.previous(),
            UiAction::Next => self.next(),
            UiAction::Randomize => self.randomize(),
            UiAction::Select(index) => self.select(index),
            UiAction::ToggleRotation => self.toggle_rotation(),
            UiAction::ResetCamera => return false,
        }
        true
    }

    // Load lifecycle

    pub fn begin_load(&mut self) {
        if self.state != LoadState::Unloaded {
            log::warn!("Ignoring load request in state {:?}", self.state);
            return;
        }
        self.state = LoadState::Loading;
        self.progress = 0.0;
        self.ui.set_visible(ui_shell::PROGRESS_CONTAINER, true);
        self.ui.set_text(ui_shell::PROGRESS_TEXT, progress_text(Some(0.0), 0));
    }

    pub fn on_progress(&mut self, loaded: u64, total: u64) {
        if self.state != LoadState::Loading {
            return;
        }

        let fraction = progress_fraction(loaded, total);
        if let Some(f) = fraction {
            if f < self.progress {
                return;
            }
            self.progress = f;
        }
        log::debug!("loading {:.0}%", self.progress * 100.0);
        self.ui
            .set_text(ui_shell::PROGRESS_TEXT, progress_text(fraction, loaded));
    }

    /// The `Ready` transition
    pub fn on_loaded(&mut self, root: Node, scene: &mut dyn RenderScene) {
        if self.state != LoadState::Loading {
            log::warn!("Ignoring loaded model in state {:?}", self.state);
            return;
        }

        let mut model = ModelHandle::new(root);
        model.apply_placement(&self.placement);
        self.model = Some(model);

        self.apply_current();

        if let Some(model) = self.model.as_mut() {
            for surface in model.surfaces_mut() {
                surface.cast_shadow = true;
                surface.receive_shadow = true;
            }
        }

        if let Some(model) = self.model.as_ref() {
            log::info!(
                "Model loaded: {} surfaces, {} triangles",
                model.surface_count(),
                model.triangle_count()
            );
            scene.attach_model(model);
        }

        self.progress = 1.0;
        self.state = LoadState::Ready;
        self.ui.set_visible(ui_shell::PROGRESS_CONTAINER, false);
    }

    pub fn on_failed(&mut self, error: LoadError) {
        if self.state != LoadState::Loading {
            log::warn!("Ignoring load failure in state {:?}: {error}", self.state);
            return;
        }

        log::error!("Failed to load model: {error}");
        let message = error.to_string();
        self.ui.set_text(ui_shell::PROGRESS_TEXT, message.clone());
        self.state = LoadState::Failed(message);
    }

    pub fn handle_load_event(&mut self, event: LoadEvent, scene: &mut dyn RenderScene) {
        match event {
            LoadEvent::Progress { loaded, total } => self.on_progress(loaded, total),
            LoadEvent::Loaded(root) => self.on_loaded(root, scene),
            LoadEvent::Failed(error) => self.on_failed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{mesh::MeshData, node::Surface};
    use catalog::Rgb;

    #[derive(Default)]
    struct RecordingScene {
        attached: Vec<usize>,
    }

    impl RenderScene for RecordingScene {
        fn attach_model(&mut self, model: &ModelHandle) {
            self.attached.push(model.surface_count());
        }
    }

    fn wood_gold_ruby() -> MaterialCatalog {
        MaterialCatalog::new(vec![
            MaterialPreset::new("Wood", Rgb::from_hex(0x8b5a2b), 0.8, 0.0),
            MaterialPreset::new("Gold", Rgb::from_hex(0xffd700), 0.25, 1.0),
            MaterialPreset::new("Ruby", Rgb::from_hex(0xe0115f), 0.1, 0.0).with_transmission(0.6),
        ])
        .unwrap()
    }

    fn chair() -> Node {
        let triangle = || {
            MeshData::from_flat(
                &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                &[],
                vec![0, 1, 2],
            )
        };
        let mut root = Node::new("chair");
        let mut frame = Node::new("frame");
        frame.add_child(Node::new("seat").with_surface(Surface::new(triangle())));
        frame.add_child(Node::new("back").with_surface(Surface::new(triangle())));
        root.add_child(frame);
        root.add_child(Node::new("legs").with_surface(Surface::new(triangle())));
        root
    }

    fn ready_viewer(catalog: MaterialCatalog) -> (Viewer, RecordingScene) {
        let mut viewer =
            Viewer::new(catalog, UiShell::standard()).with_rng(StdRng::seed_from_u64(7));
        let mut scene = RecordingScene::default();
        viewer.begin_load();
        viewer.on_loaded(chair(), &mut scene);
        (viewer, scene)
    }

    fn assert_all_surfaces_match(viewer: &Viewer, preset: &MaterialPreset) {
        let model = viewer.model().expect("model should be loaded");
        for surface in model.surfaces() {
            assert!(surface.material.matches(preset), "{:?}", surface.material);
        }
    }

    #[test]
    fn next_walks_the_whole_catalog_and_wraps() {
        let (mut viewer, _) = ready_viewer(MaterialCatalog::default());
        let n = viewer.catalog().len();

        for start in 0..n {
            viewer.select(start);
            for _ in 0..n {
                viewer.next();
            }
            assert_eq!(viewer.cursor(), start);
            assert_all_surfaces_match(&viewer, viewer.catalog().get(start));
        }
    }

    #[test]
    fn previous_undoes_next() {
        let (mut viewer, _) = ready_viewer(wood_gold_ruby());
        for start in 0..3 {
            viewer.select(start);
            viewer.next();
            viewer.previous();
            assert_eq!(viewer.cursor(), start);
            assert_all_surfaces_match(&viewer, viewer.catalog().get(start));
        }
    }

    #[test]
    fn previous_wraps_from_zero() {
        let mut viewer = Viewer::new(wood_gold_ruby(), UiShell::headless());
        viewer.previous();
        assert_eq!(viewer.cursor(), 2);
    }

    #[test]
    fn wood_gold_ruby_scenario() {
        let (mut viewer, _) = ready_viewer(wood_gold_ruby());
        let mut path = vec![viewer.cursor()];
        viewer.next();
        path.push(viewer.cursor());
        viewer.next();
        path.push(viewer.cursor());
        viewer.previous();
        path.push(viewer.cursor());

        assert_eq!(path, vec![0, 1, 2, 1]);
        assert_eq!(viewer.current_preset().name, "Gold");
        assert_all_surfaces_match(&viewer, viewer.catalog().get(1));
        assert_eq!(viewer.ui().text(ui_shell::MATERIAL_NAME), Some("Gold"));
    }

    #[test]
    fn randomize_stays_in_range_and_applies() {
        let (mut viewer, _) = ready_viewer(MaterialCatalog::default());
        for _ in 0..64 {
            viewer.randomize();
            let index = viewer.cursor();
            assert!(index < viewer.catalog().len());
            let name = viewer.catalog().get(index).name.clone();
            for surface in viewer.model().unwrap().surfaces() {
                assert_eq!(surface.material.name, name);
            }
        }
    }

    #[test]
    fn navigation_before_ready_moves_cursor_only() {
        let mut viewer = Viewer::new(wood_gold_ruby(), UiShell::standard());
        viewer.next();
        viewer.randomize();
        viewer.previous();
        assert!(viewer.model().is_none());
        assert_eq!(viewer.state(), &LoadState::Unloaded);

        viewer.begin_load();
        viewer.next();
        assert!(viewer.model().is_none());
        assert_eq!(viewer.state(), &LoadState::Loading);
    }

    #[test]
    fn ready_applies_current_preset_once_and_attaches() {
        let mut viewer = Viewer::new(wood_gold_ruby(), UiShell::standard());
        viewer.next();
        viewer.begin_load();
        assert!(viewer.ui().is_visible(ui_shell::PROGRESS_CONTAINER));

        let mut scene = RecordingScene::default();
        viewer.on_loaded(chair(), &mut scene);

        assert_eq!(viewer.state(), &LoadState::Ready);
        assert_eq!(scene.attached, vec![3]);
        assert_all_surfaces_match(&viewer, viewer.catalog().get(1));
        assert!(!viewer.ui().is_visible(ui_shell::PROGRESS_CONTAINER));

        let model = viewer.model().unwrap();
        assert!(model.surfaces().iter().all(|s| s.cast_shadow && s.receive_shadow));
        assert_eq!(model.root().transform.scale.x, 0.005);
    }

    #[test]
    fn failure_is_terminal_and_keeps_progress_visible() {
        let mut viewer = Viewer::new(wood_gold_ruby(), UiShell::standard());
        let mut scene = RecordingScene::default();
        viewer.begin_load();
        viewer.handle_load_event(
            LoadEvent::Failed(LoadError::UnsupportedFormat("chair.fbx".into())),
            &mut scene,
        );

        assert!(matches!(viewer.state(), LoadState::Failed(_)));
        assert!(viewer.ui().is_visible(ui_shell::PROGRESS_CONTAINER));
        assert_eq!(
            viewer.ui().text(ui_shell::PROGRESS_TEXT),
            Some("unsupported model format: chair.fbx")
        );

        viewer.next();
        assert!(viewer.model().is_none());
        assert_eq!(viewer.cursor(), 1);

        // A late success must not resurrect the viewer
        viewer.handle_load_event(LoadEvent::Loaded(chair()), &mut scene);
        assert!(viewer.model().is_none());
        assert!(scene.attached.is_empty());
    }

    #[test]
    fn load_does_not_reenter() {
        let (mut viewer, mut scene) = ready_viewer(wood_gold_ruby());
        viewer.begin_load();
        assert_eq!(viewer.state(), &LoadState::Ready);

        viewer.on_loaded(Node::new("other"), &mut scene);
        assert_eq!(scene.attached, vec![3]);
        assert_eq!(viewer.model().unwrap().surface_count(), 3);
    }

    #[test]
    fn progress_never_goes_backwards() {
        let mut viewer = Viewer::new(wood_gold_ruby(), UiShell::standard());
        viewer.on_progress(10, 100);
        assert_eq!(viewer.progress(), 0.0);

        viewer.begin_load();
        viewer.on_progress(50, 100);
        viewer.on_progress(20, 100);
        assert_eq!(viewer.progress(), 0.5);
        assert_eq!(viewer.ui().text(ui_shell::PROGRESS_TEXT), Some("Loading 50%"));

        viewer.on_progress(75, 100);
        assert_eq!(viewer.progress(), 0.75);
    }

    #[test]
    fn headless_viewer_still_works() {
        let mut viewer = Viewer::new(wood_gold_ruby(), UiShell::headless());
        let mut scene = RecordingScene::default();
        viewer.begin_load();
        viewer.on_progress(1, 2);
        viewer.on_loaded(chair(), &mut scene);
        viewer.next();
        viewer.toggle_rotation();

        assert_eq!(viewer.cursor(), 1);
        assert!(viewer.auto_rotate());
        assert_all_surfaces_match(&viewer, viewer.catalog().get(1));
        assert!(viewer.ui().element(ui_shell::MATERIAL_NAME).is_none());
    }

    #[test]
    fn rotation_toggle_updates_label() {
        let mut viewer = Viewer::new(wood_gold_ruby(), UiShell::standard());
        assert_eq!(viewer.ui().text(ui_shell::ROTATE_TOGGLE), Some("Start Rotation"));
        assert!(viewer.dispatch(UiAction::ToggleRotation));
        assert_eq!(viewer.ui().text(ui_shell::ROTATE_TOGGLE), Some("Stop Rotation"));
        assert!(!viewer.dispatch(UiAction::ResetCamera));
    }

    #[test]
    fn config_selects_initial_material() {
        let mut config = ViewerConfig::default();
        config.initial_material = 11;
        let viewer = Viewer::from_config(&config, UiShell::headless()).unwrap();
        assert_eq!(viewer.cursor(), 11 % viewer.catalog().len());

        config.materials = Some(Vec::new());
        assert!(Viewer::from_config(&config, UiShell::headless()).is_err());
    }
}
