//! The graphics-device capability the batch engine draws through.
//!
//! [`GraphicsDevice`] is the narrow slice of an immediate-submission API the
//! engine needs: buffer objects, vertex attribute bindings, texture units and
//! indexed triangle draws. [`GlowDevice`](crate::GlowDevice) implements it over
//! OpenGL; [`RecordingDevice`](crate::RecordingDevice) implements it headless.

use std::fmt::Debug;

use crate::error::RenderResult;

/// Which binding point a buffer object serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Per-vertex attribute data (`ARRAY_BUFFER`).
    Vertex,
    /// Triangle indices (`ELEMENT_ARRAY_BUFFER`).
    Index,
}

/// One vertex attribute pointer: where an attribute lives inside the
/// interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    /// Shader attribute location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: i32,
    /// Distance in bytes between consecutive vertices.
    pub stride_bytes: i32,
    /// Offset in bytes of this attribute inside one vertex.
    pub offset_bytes: i32,
}

/// A graphics device able to hold geometry, bind textures and draw indexed
/// triangle lists.
///
/// Implementations own the shader program used for batched drawing;
/// [`attribute_location`](Self::attribute_location) queries that program.
pub trait GraphicsDevice {
    /// Handle of a buffer object.
    type Buffer: Copy + Debug;
    /// Handle of a 2D RGBA texture object.
    type Texture: Copy + Debug;

    /// Allocate a buffer of `byte_len` bytes. The contents are undefined
    /// until written.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot create the buffer.
    fn create_buffer(&mut self, kind: BufferKind, byte_len: usize) -> RenderResult<Self::Buffer>;

    /// Overwrite the start of `buffer` with `data`. `data` never exceeds the
    /// size the buffer was created with.
    fn write_buffer(&mut self, kind: BufferKind, buffer: Self::Buffer, data: &[u8]);

    /// Texture units the device's batch program can sample, slot 0
    /// included.
    fn max_texture_slots(&self) -> u32;

    /// Look up an attribute location in the device's batch program.
    fn attribute_location(&mut self, name: &str) -> Option<u32>;

    /// Point an attribute location at a region of `buffer`.
    fn bind_attribute(&mut self, buffer: Self::Buffer, binding: AttributeBinding);

    /// Create a texture from tightly packed RGBA8 rows, top row first.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot create the texture.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> RenderResult<Self::Texture>;

    /// Bind `texture` to texture unit `unit`.
    fn bind_texture(&mut self, unit: u32, texture: Self::Texture);

    /// Set the viewport resolution used to map pixels to clip space.
    fn set_resolution(&mut self, width: f32, height: f32);

    /// Draw `index_count` indices from `indices` as a triangle list over
    /// `vertices`.
    fn draw_indexed_triangles(
        &mut self,
        vertices: Self::Buffer,
        indices: Self::Buffer,
        index_count: u32,
    );

    /// Release a buffer object.
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Release a texture object.
    fn delete_texture(&mut self, texture: Self::Texture);
}
