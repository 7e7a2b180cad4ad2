//! Error types
//!
//! Loading the model is the only operation that can fail at runtime. Catalog and
//! configuration errors can only happen during startup.

use std::io;

/// Failure to fetch or parse the model asset.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read model: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid glTF: {0}")]
    Gltf(String),
    #[error("invalid OBJ: {0}")]
    Obj(String),
    #[error("model contains no drawable geometry")]
    EmptyModel,
}

/// Rejected material catalog definitions.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("material catalog must contain at least one preset")]
    Empty,
    #[error("duplicate material preset name: {0}")]
    DuplicateName(String),
}

/// Configuration file errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display_strings() {
        let e = LoadError::UnsupportedFormat("chair.fbx".into());
        assert_eq!(e.to_string(), "unsupported model format: chair.fbx");

        let e = LoadError::Gltf("missing positions".into());
        assert_eq!(e.to_string(), "invalid glTF: missing positions");

        assert_eq!(
            LoadError::EmptyModel.to_string(),
            "model contains no drawable geometry"
        );
    }

    #[test]
    fn load_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let e: LoadError = io_err.into();
        assert!(matches!(e, LoadError::Io(_)));
        assert!(e.to_string().contains("file missing"));
    }

    #[test]
    fn catalog_error_names_the_duplicate() {
        let e = CatalogError::DuplicateName("Gold".into());
        assert_eq!(e.to_string(), "duplicate material preset name: Gold");
    }
}
