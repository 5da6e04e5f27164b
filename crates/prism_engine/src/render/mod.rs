//! Rendering layer: meshes, camera, shader plumbing, and lighting
//!
//! GPU submission is abstracted behind the [`RenderDevice`] trait; the rest
//! of the module is backend-agnostic data and math. [`HeadlessDevice`] is
//! the reference device used by tests and tooling.

pub mod backend;
pub mod camera;
pub mod lighting;
pub mod mesh;
pub mod shader;

pub use backend::{BufferHandle, HeadlessDevice, MeshBuffers, RenderDevice, TextureHandle};
pub use camera::{CameraMovement, FlyCamera};
pub use lighting::{
    apply_dir_lights, apply_point_lights, apply_spot_lights, DirLight, PointLight, SceneLights,
    SpotLight,
};
pub use mesh::{Mesh, Vertex};
pub use shader::{ShaderError, ShaderProgram, UniformBinder, UniformValue};

use thiserror::Error;

/// Errors from render-device operations
#[derive(Error, Debug)]
pub enum RenderError {
    /// Operation requires GPU buffers that have not been created
    #[error("mesh has not been uploaded to the render device")]
    NotUploaded,

    /// Vertex/index data rejected by the device
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Backend-specific failure
    #[error("render device error: {0}")]
    Device(String),
}
