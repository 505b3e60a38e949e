//! Asset loading: images through `image`, Wavefront OBJ models through `tobj`

pub mod image_loader;
pub mod model_loader;

pub use image_loader::ImageData;
pub use model_loader::{LoadOptions, ModelLoader};

use std::path::PathBuf;

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// File could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Image file could not be decoded
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: image::ImageError,
    },

    /// Model file could not be imported
    #[error("Failed to import model {path}: {source}")]
    MeshImport {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: tobj::LoadError,
    },

    /// Model file contained no meshes
    #[error("Model {0} contains no meshes")]
    NoMeshes(PathBuf),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
