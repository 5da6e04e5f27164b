//! Render device abstraction
//!
//! The library never talks to a graphics API directly. Everything that
//! would touch the GPU — buffer creation, texture upload, draw submission —
//! goes through the [`RenderDevice`] trait so a real backend can be slotted
//! in by the embedding application. [`HeadlessDevice`] implements the trait
//! with pure bookkeeping and is what the tests and the demo shell use.

use crate::assets::ImageData;
use crate::render::{RenderError, Vertex};
use std::collections::HashSet;

/// Opaque handle to a device-resident buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Opaque handle to a device-resident texture
///
/// The zero handle is the null texture, returned when an image fails to
/// decode; binding it is a no-op on real backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    /// The null texture handle
    pub const NULL: Self = Self(0);

    /// Whether this is the null handle
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// GPU-side buffers backing one uploaded mesh
#[derive(Debug, Clone, Copy)]
pub struct MeshBuffers {
    /// Interleaved vertex buffer
    pub vertex_buffer: BufferHandle,
    /// Triangle index buffer
    pub index_buffer: BufferHandle,
    /// Number of indices to draw
    pub index_count: u32,
}

/// Backend seam for GPU resource management and draw submission
pub trait RenderDevice {
    /// Create vertex and index buffers for a mesh
    ///
    /// # Errors
    /// [`RenderError::InvalidGeometry`] when the data is empty or indices
    /// reference past the end of the vertex array.
    fn create_mesh_buffers(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<MeshBuffers, RenderError>;

    /// Destroy the buffers backing a mesh
    fn destroy_mesh_buffers(&mut self, buffers: &MeshBuffers);

    /// Upload a 2D texture and return its handle
    fn create_texture_2d(&mut self, image: &ImageData) -> TextureHandle;

    /// Upload a cubemap from six face images and return its handle
    fn create_cubemap(&mut self, faces: &[ImageData; 6]) -> TextureHandle;

    /// Destroy a texture; the null handle is ignored
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Record an indexed draw of the given mesh buffers
    fn draw_indexed(&mut self, buffers: &MeshBuffers) -> Result<(), RenderError>;
}

/// Bookkeeping-only device for tests and headless tooling
///
/// Allocates monotonically increasing handles, tracks which resources are
/// live, and counts draw submissions. Useful for asserting resource
/// lifetime invariants (no leaks, idempotent release) without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    next_id: u64,
    live_buffers: HashSet<u64>,
    live_textures: HashSet<u64>,
    draw_calls: u64,
    indices_drawn: u64,
}

impl HeadlessDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (created, not destroyed) buffers
    pub fn live_buffer_count(&self) -> usize {
        self.live_buffers.len()
    }

    /// Number of live textures
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    /// Number of draw submissions so far
    pub fn draw_call_count(&self) -> u64 {
        self.draw_calls
    }

    /// Total indices submitted across all draws
    pub fn indices_drawn(&self) -> u64 {
        self.indices_drawn
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_mesh_buffers(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<MeshBuffers, RenderError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(RenderError::InvalidGeometry(
                "empty vertex or index data".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::InvalidGeometry(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        let vertex_buffer = BufferHandle(self.allocate());
        let index_buffer = BufferHandle(self.allocate());
        self.live_buffers.insert(vertex_buffer.0);
        self.live_buffers.insert(index_buffer.0);

        log::trace!(
            "created mesh buffers ({} vertices, {} indices)",
            vertices.len(),
            indices.len()
        );
        Ok(MeshBuffers {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    fn destroy_mesh_buffers(&mut self, buffers: &MeshBuffers) {
        for handle in [buffers.vertex_buffer.0, buffers.index_buffer.0] {
            if !self.live_buffers.remove(&handle) {
                log::warn!("destroy of unknown or already-destroyed buffer {handle}");
            }
        }
    }

    fn create_texture_2d(&mut self, image: &ImageData) -> TextureHandle {
        let handle = TextureHandle(self.allocate());
        self.live_textures.insert(handle.0);
        log::trace!("created {}x{} texture {:?}", image.width, image.height, handle);
        handle
    }

    fn create_cubemap(&mut self, faces: &[ImageData; 6]) -> TextureHandle {
        let handle = TextureHandle(self.allocate());
        self.live_textures.insert(handle.0);
        log::trace!(
            "created cubemap {:?} ({}x{} faces)",
            handle,
            faces[0].width,
            faces[0].height
        );
        handle
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if texture.is_null() {
            return;
        }
        if !self.live_textures.remove(&texture.0) {
            log::warn!("destroy of unknown or already-destroyed texture {texture:?}");
        }
    }

    fn draw_indexed(&mut self, buffers: &MeshBuffers) -> Result<(), RenderError> {
        if !self.live_buffers.contains(&buffers.vertex_buffer.0)
            || !self.live_buffers.contains(&buffers.index_buffer.0)
        {
            return Err(RenderError::Device(
                "draw references destroyed buffers".to_string(),
            ));
        }
        self.draw_calls += 1;
        self.indices_drawn += u64::from(buffers.index_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_data() -> (Vec<Vertex>, Vec<u32>) {
        let v = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            tex_coord: [0.0, 0.0],
        };
        (
            vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn buffers_are_tracked_until_destroyed() {
        let mut device = HeadlessDevice::new();
        let (vertices, indices) = quad_data();
        let buffers = device.create_mesh_buffers(&vertices, &indices).unwrap();
        assert_eq!(device.live_buffer_count(), 2);
        device.destroy_mesh_buffers(&buffers);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let mut device = HeadlessDevice::new();
        assert!(matches!(
            device.create_mesh_buffers(&[], &[]),
            Err(RenderError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut device = HeadlessDevice::new();
        let (vertices, _) = quad_data();
        assert!(matches!(
            device.create_mesh_buffers(&vertices, &[0, 1, 9]),
            Err(RenderError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn draw_counts_submissions() {
        let mut device = HeadlessDevice::new();
        let (vertices, indices) = quad_data();
        let buffers = device.create_mesh_buffers(&vertices, &indices).unwrap();
        device.draw_indexed(&buffers).unwrap();
        device.draw_indexed(&buffers).unwrap();
        assert_eq!(device.draw_call_count(), 2);
        assert_eq!(device.indices_drawn(), 12);
    }

    #[test]
    fn draw_after_destroy_fails() {
        let mut device = HeadlessDevice::new();
        let (vertices, indices) = quad_data();
        let buffers = device.create_mesh_buffers(&vertices, &indices).unwrap();
        device.destroy_mesh_buffers(&buffers);
        assert!(device.draw_indexed(&buffers).is_err());
    }

    #[test]
    fn null_texture_destroy_is_a_no_op() {
        let mut device = HeadlessDevice::new();
        device.destroy_texture(TextureHandle::NULL);
        assert_eq!(device.live_texture_count(), 0);
    }
}
