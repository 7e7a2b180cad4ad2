//! Model loading
//!
//! Reads the asset in chunks so progress can be reported, then hands the bytes
//! to the matching parser. [`load_model_async`] runs the whole thing on a
//! worker thread and reports through [`LoadEvent`]s.

mod gltf_loader;
mod obj_loader;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::error::LoadError;
use crate::gfx::scene::node::Node;
use crate::viewer::lifecycle::LoadEvent;

pub use gltf_loader::parse_gltf;
pub use obj_loader::parse_obj;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    /// `.gltf` or `.glb`
    Gltf,
    Obj,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "gltf" | "glb" => Ok(ModelFormat::Gltf),
            "obj" => Ok(ModelFormat::Obj),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reads `path` fully, calling `progress(loaded, total)` after every chunk.
///
/// `total` is the file size as reported by the filesystem.
pub fn read_with_progress(
    path: &Path,
    progress: &mut dyn FnMut(u64, u64),
) -> Result<Vec<u8>, LoadError> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len();

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        progress(bytes.len() as u64, total);
    }

    if bytes.is_empty() {
        progress(0, total);
    }
    Ok(bytes)
}

/// Loads the model at `path` and returns its root node
///
/// Progress covers the file at `path` only. Buffers a `.gltf` references are
/// read afterwards, so the bar can sit at full while they load.
pub fn load_model(path: &Path, progress: &mut dyn FnMut(u64, u64)) -> Result<Node, LoadError> {
    let format = ModelFormat::from_path(path)?;
    let bytes = read_with_progress(path, progress)?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let root = match format {
        ModelFormat::Gltf => parse_gltf(&bytes, base_dir)?,
        ModelFormat::Obj => parse_obj(&bytes)?,
    };

    if root.surface_count() == 0 {
        return Err(LoadError::EmptyModel);
    }
    Ok(root)
}

/// Loads the model on a worker thread.
///
/// `sink` receives any number of `Progress` events followed by exactly one
/// `Loaded` or `Failed`.
pub fn load_model_async<F>(path: PathBuf, mut sink: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnMut(LoadEvent) + Send + 'static,
{
    std::thread::Builder::new()
        .name("model-loader".into())
        .spawn(move || {
            log::info!("Loading model from {}", path.display());
            let result = load_model(&path, &mut |loaded, total| {
                sink(LoadEvent::Progress { loaded, total })
            });
            match result {
                Ok(root) => sink(LoadEvent::Loaded(root)),
                Err(e) => sink(LoadEvent::Failed(e)),
            }
        })
}
