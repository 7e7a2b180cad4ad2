use std::path::PathBuf;

use clap::Parser;
use showroom::{Config, ShowroomApp, ViewerConfig};

/// Orbit a model and try it in different materials
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file (.toml or .ron)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to display (.gltf, .glb or .obj), overrides the configuration
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Index of the material shown first, overrides the configuration
    #[arg(long)]
    material: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            ViewerConfig::load_from_file(path)?
        }
        None => ViewerConfig::default(),
    };
    if let Some(model) = args.model {
        config.model.path = model;
    }
    if let Some(material) = args.material {
        config.initial_material = material;
    }

    ShowroomApp::new(config)?.run()
}
