//! Drives a headless viewer through real loads on temporary files

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use rand::{rngs::StdRng, SeedableRng};
use showroom::{
    config::ViewerConfig,
    gfx::scene::ModelHandle,
    loader::load_model_async,
    viewer::{
        catalog::MaterialCatalog,
        lifecycle::{LoadEvent, LoadState, RenderScene},
        ui_shell::{UiShell, MATERIAL_NAME, PROGRESS_CONTAINER, PROGRESS_TEXT},
        Viewer,
    },
};

#[derive(Default)]
struct RecordingScene {
    attached: Vec<usize>,
}

impl RenderScene for RecordingScene {
    fn attach_model(&mut self, model: &ModelHandle) {
        self.attached.push(model.surface_count());
    }
}

/// Runs the loader to completion and returns every event it produced
fn load_events(path: PathBuf) -> Vec<LoadEvent> {
    let (tx, rx) = mpsc::channel();
    let handle = load_model_async(path, move |event| {
        tx.send(event).ok();
    })
    .unwrap();
    handle.join().unwrap();
    rx.try_iter().collect()
}

fn load_into(viewer: &mut Viewer, scene: &mut RecordingScene, path: PathBuf) {
    viewer.begin_load();
    for event in load_events(path) {
        viewer.handle_load_event(event, scene);
    }
}

const CHAIR_OBJ: &str = "\
o seat
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
f 1 2 3 4
o back
v 0 0 0
v 1 0 0
v 1 1 0
f 5 6 7
";

/// One triangle mesh used by two nodes, with positions and indices in an
/// external buffer
fn write_gltf(dir: &Path) -> PathBuf {
    let mut bin = Vec::new();
    for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bin.extend_from_slice(&v.to_le_bytes());
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    assert_eq!(bin.len(), 42);
    std::fs::write(dir.join("chair.bin"), &bin).unwrap();

    let json = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "name": "Chair", "nodes": [0] } ],
        "nodes": [
            { "name": "frame", "mesh": 0, "children": [1] },
            { "name": "leg", "mesh": 0, "translation": [0.0, -1.0, 0.0] }
        ],
        "meshes": [
            { "name": "panel", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] }
        ],
        "buffers": [ { "uri": "chair.bin", "byteLength": 42 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;
    let path = dir.join("chair.gltf");
    std::fs::write(&path, json).unwrap();
    path
}

fn viewer() -> Viewer {
    Viewer::new(MaterialCatalog::default(), UiShell::standard()).with_rng(StdRng::seed_from_u64(7))
}

#[test]
fn obj_load_reaches_ready_with_current_material() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chair.obj");
    std::fs::write(&path, CHAIR_OBJ).unwrap();

    let mut viewer = viewer();
    viewer.select(4);
    let mut scene = RecordingScene::default();
    load_into(&mut viewer, &mut scene, path);

    assert_eq!(viewer.state(), &LoadState::Ready);
    assert_eq!(viewer.progress(), 1.0);
    assert_eq!(scene.attached, vec![2]);
    assert!(!viewer.ui().is_visible(PROGRESS_CONTAINER));

    let model = viewer.model().unwrap();
    assert_eq!(model.triangle_count(), 3);
    let preset = viewer.current_preset();
    for surface in model.surfaces() {
        assert!(surface.material.matches(preset));
        assert!(surface.cast_shadow && surface.receive_shadow);
    }
    assert_eq!(viewer.ui().text(MATERIAL_NAME), Some(preset.name.as_str()));
}

#[test]
fn gltf_with_external_buffer_loads_node_hierarchy() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gltf(dir.path());

    let mut viewer = viewer();
    let mut scene = RecordingScene::default();
    load_into(&mut viewer, &mut scene, path);

    assert_eq!(viewer.state(), &LoadState::Ready);
    assert_eq!(scene.attached, vec![2]);

    let model = viewer.model().unwrap();
    assert_eq!(model.surface_count(), 2);
    assert_eq!(model.triangle_count(), 2);
    assert_eq!(model.root().name, "Chair");
}

#[test]
fn gltf_progress_counts_only_the_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gltf(dir.path());
    let json_len = std::fs::metadata(&path).unwrap().len();

    let events = load_events(path);
    let last_progress = events.iter().rev().find_map(|event| match event {
        LoadEvent::Progress { loaded, total } => Some((*loaded, *total)),
        _ => None,
    });

    // chair.bin is read after the document has reported full progress
    assert_eq!(last_progress, Some((json_len, json_len)));
    assert!(matches!(events.last(), Some(LoadEvent::Loaded(_))));
}

#[test]
fn progress_events_end_at_full_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chair.obj");
    let mut contents = String::from(CHAIR_OBJ);
    for i in 0..10_000 {
        contents.push_str(&format!("# comment {i}\n"));
    }
    std::fs::write(&path, &contents).unwrap();

    let events = load_events(path);
    let progress: Vec<(u64, u64)> = events
        .iter()
        .filter_map(|event| match event {
            LoadEvent::Progress { loaded, total } => Some((*loaded, *total)),
            _ => None,
        })
        .collect();

    assert!(progress.len() > 1);
    assert!(progress.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(progress.last(), Some(&(contents.len() as u64, contents.len() as u64)));
    assert!(matches!(events.last(), Some(LoadEvent::Loaded(_))));
}

#[test]
fn missing_file_fails_and_keeps_progress_visible() {
    let dir = tempfile::tempdir().unwrap();
    let mut viewer = viewer();
    let mut scene = RecordingScene::default();
    load_into(&mut viewer, &mut scene, dir.path().join("chair.gltf"));

    assert!(matches!(viewer.state(), LoadState::Failed(_)));
    assert!(viewer.model().is_none());
    assert!(scene.attached.is_empty());
    assert!(viewer.ui().is_visible(PROGRESS_CONTAINER));
    assert!(viewer
        .ui()
        .text(PROGRESS_TEXT)
        .unwrap()
        .starts_with("failed to read model"));
}

#[test]
fn unknown_extension_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chair.fbx");
    std::fs::write(&path, "binary").unwrap();

    let mut viewer = viewer();
    load_into(&mut viewer, &mut RecordingScene::default(), path);

    match viewer.state() {
        LoadState::Failed(message) => assert!(message.starts_with("unsupported model format")),
        state => panic!("unexpected state {state:?}"),
    }
}

#[test]
fn cycling_materials_after_load_updates_every_surface() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chair.obj");
    std::fs::write(&path, CHAIR_OBJ).unwrap();

    let mut viewer = viewer();
    load_into(&mut viewer, &mut RecordingScene::default(), path);

    let before = viewer.model().unwrap().surfaces()[0].material.clone();
    viewer.next();
    let after_next = viewer.model().unwrap().surfaces()[0].material.clone();
    assert_ne!(before, after_next);

    viewer.previous();
    assert_eq!(viewer.model().unwrap().surfaces()[0].material, before);

    for _ in 0..20 {
        viewer.randomize();
        let preset = viewer.current_preset().clone();
        assert!(viewer
            .model()
            .unwrap()
            .surfaces()
            .iter()
            .all(|s| s.material.matches(&preset)));
    }
}

#[test]
fn viewer_from_config_starts_at_configured_material() {
    let config = ViewerConfig {
        initial_material: 10,
        ..ViewerConfig::default()
    };
    let viewer = Viewer::from_config(&config, UiShell::headless()).unwrap();

    // Eight built-in presets
    assert_eq!(viewer.cursor(), 2);
    assert_eq!(viewer.state(), &LoadState::Unloaded);
}
