//! Asset loading: OBJ geometry ingestion and image decoding

pub mod image_loader;
pub mod mesh_builder;
pub mod obj_loader;

pub use image_loader::{ImageData, TextureError};
pub use mesh_builder::{build_flat_mesh, load_flat_mesh};
pub use obj_loader::{PolygonSoup, Shape, VertexRef};

use thiserror::Error;

/// Errors produced while loading geometry from disk
///
/// Parsing and geometry failures are fatal to the load call and propagated
/// to the immediate caller; no partial mesh is ever returned. Recoverable
/// anomalies (unsupported directives, missing optional attributes) are
/// logged and do not abort the load.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Input file could not be opened or read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file is structurally unreadable
    #[error("Parse error: {0}")]
    Parse(String),

    /// Parse succeeded but produced zero usable geometry
    #[error("mesh contains no usable geometry")]
    EmptyMesh,
}
