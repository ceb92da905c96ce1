//! CPU-side vertex/index mirrors and the GPU buffers they are uploaded to.

use crate::device::{BufferKind, GraphicsDevice};
use crate::error::RenderResult;
use crate::types::Vertex;

/// Fixed-capacity geometry storage for one batch.
///
/// The GPU buffers are allocated at full capacity once. Each upload writes
/// only the logical prefix `[0, count)`, so unused tail capacity is never
/// transferred and data from an earlier, larger batch never reaches a draw.
#[derive(Debug)]
pub struct GeometryBuffers<B> {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    max_vertices: usize,
    max_indices: usize,
    vertex_buffer: B,
    index_buffer: B,
}

impl<B: Copy> GeometryBuffers<B> {
    /// Allocate GPU buffers for `max_vertices` vertices and `max_indices`
    /// indices, plus matching CPU mirrors.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot create either buffer.
    pub fn new<D>(device: &mut D, max_vertices: usize, max_indices: usize) -> RenderResult<Self>
    where
        D: GraphicsDevice<Buffer = B>,
    {
        let vertex_buffer = device.create_buffer(
            BufferKind::Vertex,
            max_vertices * std::mem::size_of::<Vertex>(),
        )?;
        let index_buffer =
            device.create_buffer(BufferKind::Index, max_indices * std::mem::size_of::<u32>())?;

        Ok(Self {
            vertices: Vec::with_capacity(max_vertices),
            indices: Vec::with_capacity(max_indices),
            max_vertices,
            max_indices,
            vertex_buffer,
            index_buffer,
        })
    }

    /// Vertices staged since the last clear.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Indices staged since the last clear.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Vertex capacity.
    #[must_use]
    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    /// Index capacity.
    #[must_use]
    pub fn max_indices(&self) -> usize {
        self.max_indices
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Whether `vertices` more vertices fit.
    #[must_use]
    pub fn vertices_fit(&self, vertices: usize) -> bool {
        self.vertices.len() + vertices <= self.max_vertices
    }

    /// Whether `indices` more indices fit.
    #[must_use]
    pub fn indices_fit(&self, indices: usize) -> bool {
        self.indices.len() + indices <= self.max_indices
    }

    /// Staged vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Staged indices.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The GPU vertex buffer.
    #[must_use]
    pub fn vertex_buffer(&self) -> B {
        self.vertex_buffer
    }

    /// The GPU index buffer.
    #[must_use]
    pub fn index_buffer(&self) -> B {
        self.index_buffer
    }

    /// Append one primitive: its vertices, and its indices relative to the
    /// first appended vertex.
    ///
    /// # Panics
    ///
    /// Panics if the primitive does not fit. Callers check
    /// [`vertices_fit`](Self::vertices_fit) and
    /// [`indices_fit`](Self::indices_fit) first; overflowing here is a bug.
    pub fn push_primitive(&mut self, vertices: &[Vertex], local_indices: &[u32]) {
        assert!(
            self.vertices_fit(vertices.len()) && self.indices_fit(local_indices.len()),
            "primitive of {}/{} overflows batch at {}/{} (max {}/{})",
            vertices.len(),
            local_indices.len(),
            self.vertices.len(),
            self.indices.len(),
            self.max_vertices,
            self.max_indices,
        );

        // max_vertices is validated to fit u32.
        #[expect(clippy::cast_possible_truncation)]
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(local_indices.iter().map(|&index| base + index));
    }

    /// Upload the staged prefix of both arrays to the GPU.
    pub fn write_range<D>(&self, device: &mut D)
    where
        D: GraphicsDevice<Buffer = B>,
    {
        device.write_buffer(
            BufferKind::Vertex,
            self.vertex_buffer,
            bytemuck::cast_slice(&self.vertices),
        );
        device.write_buffer(
            BufferKind::Index,
            self.index_buffer,
            bytemuck::cast_slice(&self.indices),
        );
    }

    /// Drop all staged geometry. Capacity is kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Release the GPU buffers.
    pub fn destroy<D>(self, device: &mut D)
    where
        D: GraphicsDevice<Buffer = B>,
    {
        device.delete_buffer(self.vertex_buffer);
        device.delete_buffer(self.index_buffer);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::recording::{DeviceCommand, RecordingDevice};

    fn vertex(x: f32) -> Vertex {
        Vertex {
            position: [x, 0.0],
            color: [1.0; 4],
            uv: [0.0, 0.0],
            texture_slot: 0.0,
            text_range: 0.0,
        }
    }

    #[test]
    fn allocates_full_capacity_once() {
        let mut device = RecordingDevice::new();
        let _buffers = GeometryBuffers::new(&mut device, 8, 12).unwrap();
        assert_eq!(
            device.commands(),
            &[
                DeviceCommand::CreateBuffer {
                    buffer: 1,
                    kind: BufferKind::Vertex,
                    byte_len: 8 * 40,
                },
                DeviceCommand::CreateBuffer {
                    buffer: 2,
                    kind: BufferKind::Index,
                    byte_len: 12 * 4,
                },
            ]
        );
    }

    #[test]
    fn indices_are_rebased_onto_batch_position() {
        let mut device = RecordingDevice::new();
        let mut buffers = GeometryBuffers::new(&mut device, 8, 12).unwrap();
        buffers.push_primitive(&[vertex(0.0); 3], &[0, 1, 2]);
        buffers.push_primitive(&[vertex(1.0); 3], &[0, 1, 2]);
        assert_eq!(buffers.indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(buffers.vertex_count(), 6);
    }

    #[test]
    fn write_range_uploads_only_staged_prefix() {
        let mut device = RecordingDevice::new();
        let mut buffers = GeometryBuffers::new(&mut device, 8, 12).unwrap();
        buffers.push_primitive(&[vertex(0.0); 4], &[0, 1, 2, 2, 3, 0]);
        buffers.push_primitive(&[vertex(1.0); 4], &[0, 1, 2, 2, 3, 0]);
        buffers.write_range(&mut device);
        buffers.clear();
        buffers.push_primitive(&[vertex(2.0); 3], &[0, 1, 2]);
        buffers.write_range(&mut device);

        assert_eq!(device.uploads(BufferKind::Vertex), vec![8 * 40, 3 * 40]);
        assert_eq!(device.uploads(BufferKind::Index), vec![12 * 4, 3 * 4]);
        assert_eq!(device.last_vertices(), vec![vertex(2.0); 3]);
    }

    #[test]
    fn fit_checks_allow_filling_to_the_edge() {
        let mut device = RecordingDevice::new();
        let mut buffers = GeometryBuffers::new(&mut device, 8, 12).unwrap();
        buffers.push_primitive(&[vertex(0.0); 4], &[0, 1, 2, 2, 3, 0]);
        assert!(buffers.vertices_fit(4));
        assert!(buffers.indices_fit(6));
        buffers.push_primitive(&[vertex(0.0); 4], &[0, 1, 2, 2, 3, 0]);
        assert!(!buffers.vertices_fit(1));
        assert!(!buffers.indices_fit(1));
    }

    #[test]
    #[should_panic(expected = "overflows batch")]
    fn overflowing_push_panics() {
        let mut device = RecordingDevice::new();
        let mut buffers = GeometryBuffers::new(&mut device, 4, 6).unwrap();
        buffers.push_primitive(&[vertex(0.0); 4], &[0, 1, 2, 2, 3, 0]);
        buffers.push_primitive(&[vertex(0.0); 3], &[0, 1, 2]);
    }
}
