//! Mesh representation for 3D models
//!
//! A [`Mesh`] owns its CPU-side vertex/index data for its whole lifetime
//! and, once uploaded, exclusively owns the GPU buffers derived from it.
//! Release is explicit and idempotent.

use crate::assets::{self, LoadError};
use crate::render::backend::{MeshBuffers, RenderDevice};
use crate::render::RenderError;
use bytemuck::{Pod, Zeroable};
use std::path::Path;

/// 3D vertex data structure for rendering
///
/// Interleaved layout `[px,py,pz, nx,ny,nz, u,v]`. The `#[repr(C)]`
/// attribute keeps the memory layout stable for GPU buffer uploads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Flat normal vector, shared by all three vertices of a triangle
    pub normal: [f32; 3],

    /// Texture coordinates, zero when the source mesh has none
    pub tex_coord: [f32; 2],
}

/// Triangulated, flat-shaded mesh and its (optional) GPU residency
///
/// Built once at load time and immutable afterwards. The GPU buffers are
/// created by [`Mesh::upload`] and owned exclusively by this mesh until
/// [`Mesh::release`], which is safe to call any number of times.
#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    gpu: Option<MeshBuffers>,
}

impl Mesh {
    /// Load an OBJ file into a flat-shaded mesh
    ///
    /// Runs the full geometry pipeline: parse, fan triangulation, flat
    /// normal reconstruction with outward orientation.
    ///
    /// # Errors
    /// [`LoadError`] when the file is missing, unparseable, or contains no
    /// usable geometry. No partial mesh is returned.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let (vertices, indices) = assets::load_flat_mesh(path)?;
        Ok(Self::from_data(vertices, indices))
    }

    /// Wrap already-built vertex and index data
    pub fn from_data(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            gpu: None,
        }
    }

    /// Vertex data in interleaved layout
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle indices, in groups of three
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of indices
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Whether GPU buffers currently exist for this mesh
    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Create GPU buffers for this mesh on the given device
    ///
    /// Uploading an already-uploaded mesh is a logged no-op.
    pub fn upload(&mut self, device: &mut dyn RenderDevice) -> Result<(), RenderError> {
        if self.gpu.is_some() {
            log::warn!("mesh already uploaded, skipping");
            return Ok(());
        }
        self.gpu = Some(device.create_mesh_buffers(&self.vertices, &self.indices)?);
        Ok(())
    }

    /// Record an indexed draw of this mesh
    ///
    /// # Errors
    /// [`RenderError::NotUploaded`] when [`Mesh::upload`] has not been
    /// called (or the buffers were released).
    pub fn draw(&self, device: &mut dyn RenderDevice) -> Result<(), RenderError> {
        let buffers = self.gpu.as_ref().ok_or(RenderError::NotUploaded)?;
        device.draw_indexed(buffers)
    }

    /// Destroy this mesh's GPU buffers
    ///
    /// Safe to call more than once; further calls are no-ops.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        if let Some(buffers) = self.gpu.take() {
            device.destroy_mesh_buffers(&buffers);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        // The device reference is not available here, so buffers cannot be
        // reclaimed on drop; surface the leak instead of hiding it.
        if self.gpu.is_some() {
            log::warn!("mesh dropped while still holding GPU buffers; call release() first");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessDevice;

    fn triangle() -> Mesh {
        let v = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            tex_coord: [0.0, 0.0],
        };
        Mesh::from_data(vec![v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)], vec![0, 1, 2])
    }

    #[test]
    fn upload_draw_release_lifecycle() {
        let mut device = HeadlessDevice::new();
        let mut mesh = triangle();

        assert!(mesh.draw(&mut device).is_err());

        mesh.upload(&mut device).unwrap();
        assert!(mesh.is_uploaded());
        mesh.draw(&mut device).unwrap();
        assert_eq!(device.draw_call_count(), 1);

        mesh.release(&mut device);
        assert!(!mesh.is_uploaded());
        assert_eq!(device.live_buffer_count(), 0);
        assert!(matches!(mesh.draw(&mut device), Err(RenderError::NotUploaded)));
    }

    #[test]
    fn release_is_idempotent() {
        let mut device = HeadlessDevice::new();
        let mut mesh = triangle();
        mesh.upload(&mut device).unwrap();

        mesh.release(&mut device);
        mesh.release(&mut device);
        mesh.release(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn double_upload_is_a_no_op() {
        let mut device = HeadlessDevice::new();
        let mut mesh = triangle();
        mesh.upload(&mut device).unwrap();
        mesh.upload(&mut device).unwrap();
        assert_eq!(device.live_buffer_count(), 2);
        mesh.release(&mut device);
    }

    #[test]
    fn vertex_is_pod_with_expected_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 8 * 4);
        let mesh = triangle();
        let bytes: &[u8] = bytemuck::cast_slice(mesh.vertices());
        assert_eq!(bytes.len(), 3 * 32);
    }
}
