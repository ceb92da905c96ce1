//! The batching and draw-submission engine.
//!
//! Primitives are staged into [`GeometryBuffers`] and submitted as a single
//! indexed draw call when the batch ends or when staging the next primitive
//! would exceed vertex capacity, index capacity, or the texture units
//! available to one draw. Capacity is always checked before a primitive is
//! written, so a primitive's geometry never straddles two draw calls.

use crate::buffers::GeometryBuffers;
use crate::config::BatchConfig;
use crate::device::GraphicsDevice;
use crate::error::{RenderError, RenderResult};
use crate::layout::VertexLayout;
use crate::slots::TextureSlotCache;
use crate::texture::{Texture, TextureId};
use crate::types::{Color, Point, UvRect, Vertex, WHITE_SLOT};

/// Indices of a quad's two triangles, relative to its first vertex.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Indices of a single triangle, relative to its first vertex.
const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

/// First slot handed out to caller textures.
const FIRST_TEXTURE_SLOT: u32 = WHITE_SLOT + 1;

/// Why a batch was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The next primitive would exceed vertex capacity.
    VertexCapacity,
    /// The next primitive would exceed index capacity.
    IndexCapacity,
    /// No texture unit is left for a new texture.
    TextureSlots,
    /// [`BatchEngine::flush`] was called.
    Explicit,
    /// [`BatchEngine::end_batch`] was called.
    EndOfBatch,
}

/// Submission counters, accumulated until [`BatchEngine::take_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Vertices submitted across all draw calls.
    pub vertices: u64,
    /// Indices submitted across all draw calls.
    pub indices: u64,
    /// Non-empty flushes forced by vertex capacity.
    pub vertex_capacity_flushes: u32,
    /// Non-empty flushes forced by index capacity.
    pub index_capacity_flushes: u32,
    /// Non-empty flushes forced by texture slot exhaustion.
    pub texture_slot_flushes: u32,
}

/// Accumulates quads and triangles and submits them in as few draw calls as
/// capacity and texture units allow.
///
/// Owns its [`GraphicsDevice`], the geometry buffers, and the white texture
/// bound to slot 0. One engine serves one renderer; it is not shared across
/// threads.
pub struct BatchEngine<D: GraphicsDevice> {
    device: D,
    config: BatchConfig,
    buffers: GeometryBuffers<D::Buffer>,
    slots: TextureSlotCache,
    next_texture_slot: u32,
    white: Texture<D::Texture>,
    stats: BatchStats,
}

impl<D: GraphicsDevice> BatchEngine<D> {
    /// Create an engine drawing through `device`.
    ///
    /// Allocates the geometry buffers at full capacity, binds the vertex
    /// layout to the device's batch program, and creates the white texture.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or asks for more texture
    /// slots than the device's program samples, if the program lacks a batch
    /// attribute, or if the device cannot create a buffer or texture.
    pub fn new(mut device: D, config: BatchConfig) -> RenderResult<Self> {
        config.validate()?;
        let available = device.max_texture_slots();
        if config.max_texture_slots > available {
            return Err(RenderError::TooManyTextureSlots {
                requested: config.max_texture_slots,
                available,
            });
        }

        let buffers = GeometryBuffers::new(&mut device, config.max_vertices, config.max_indices)?;
        VertexLayout::batch().bind(&mut device, buffers.vertex_buffer())?;

        let white = Texture::white(&mut device)?;
        white.bind_to_slot(&mut device, WHITE_SLOT);

        log::info!(
            "batch engine ready: {} vertices, {} indices, {} texture slots",
            config.max_vertices,
            config.max_indices,
            config.max_texture_slots
        );

        Ok(Self {
            device,
            config,
            buffers,
            slots: TextureSlotCache::new(),
            next_texture_slot: FIRST_TEXTURE_SLOT,
            white,
            stats: BatchStats::default(),
        })
    }

    /// Reset the batch to empty. Issues no device calls.
    pub fn begin_batch(&mut self) {
        self.buffers.clear();
        self.slots.clear();
        self.next_texture_slot = FIRST_TEXTURE_SLOT;
    }

    /// Submit whatever is staged and leave the batch empty.
    pub fn end_batch(&mut self) {
        self.flush_for(FlushReason::EndOfBatch);
    }

    /// Submit staged geometry as one draw call, then reset the batch.
    ///
    /// An empty batch issues no upload and no draw call, but its texture slot
    /// assignments are still cleared.
    pub fn flush(&mut self) {
        self.flush_for(FlushReason::Explicit);
    }

    /// Stage a quad. Corners are taken in order bottom-left, bottom-right,
    /// top-right, top-left and emitted as triangles `(0, 1, 2)` and
    /// `(2, 3, 0)`.
    ///
    /// `texture_slot` must come from [`resolve_texture_slot`] in the current
    /// batch (or be [`WHITE_SLOT`]). Prefer [`draw_textured_quad`] for
    /// textured quads: a capacity flush here clears slot assignments made
    /// before the call.
    ///
    /// [`resolve_texture_slot`]: Self::resolve_texture_slot
    /// [`draw_textured_quad`]: Self::draw_textured_quad
    pub fn draw_quad(
        &mut self,
        corners: [Point; 4],
        texture_slot: u32,
        color: Color,
        text_range: f32,
        uv: UvRect,
    ) {
        self.reserve(4, QUAD_INDICES.len());
        self.push_quad(corners, texture_slot, color, text_range, uv);
    }

    /// Stage a quad sampling `texture`.
    ///
    /// Room for the quad is made first, then the texture's slot is resolved,
    /// so the slot written into the vertices is valid for the draw call that
    /// will consume them.
    pub fn draw_textured_quad(
        &mut self,
        corners: [Point; 4],
        texture: &Texture<D::Texture>,
        color: Color,
        text_range: f32,
        uv: UvRect,
    ) {
        self.reserve(4, QUAD_INDICES.len());
        let slot = self.resolve_texture_slot(texture);
        self.push_quad(corners, slot, color, text_range, uv);
    }

    /// Stage one triangle with per-corner texture coordinates.
    pub fn draw_triangle(
        &mut self,
        corners: [Point; 3],
        texture_slot: u32,
        color: Color,
        uvs: [[f32; 2]; 3],
    ) {
        self.reserve(3, TRIANGLE_INDICES.len());
        let vertices = [0, 1, 2].map(|i| Vertex {
            position: corners[i].to_array(),
            color,
            uv: uvs[i],
            texture_slot: slot_attribute(texture_slot),
            text_range: 0.0,
        });
        self.buffers.push_primitive(&vertices, &TRIANGLE_INDICES);
    }

    /// The texture unit `texture` occupies in this batch, assigning and
    /// binding one if needed.
    ///
    /// When no unit is left the batch is flushed first, which frees every
    /// slot. Call this before staging any vertex of the primitive that uses
    /// the slot.
    pub fn resolve_texture_slot(&mut self, texture: &Texture<D::Texture>) -> u32 {
        if let Some(slot) = self.slots.get(texture.id()) {
            return slot;
        }

        if self.next_texture_slot + 1 >= self.config.max_texture_slots {
            self.flush_for(FlushReason::TextureSlots);
        }

        let slot = self.next_texture_slot;
        self.next_texture_slot += 1;
        self.slots.assign(texture.id(), slot);
        texture.bind_to_slot(&mut self.device, slot);
        log::trace!("texture `{}` -> slot {slot}", texture.name());
        slot
    }

    /// Vertices staged in the current batch.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    /// Indices staged in the current batch.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.buffers.index_count()
    }

    /// Slot the next new texture will receive.
    #[must_use]
    pub fn next_texture_slot(&self) -> u32 {
        self.next_texture_slot
    }

    /// The slot `id` occupies in the current batch.
    #[must_use]
    pub fn cached_slot(&self, id: TextureId) -> Option<u32> {
        self.slots.get(id)
    }

    /// Number of caller textures bound in the current batch.
    #[must_use]
    pub fn bound_textures(&self) -> usize {
        self.slots.len()
    }

    /// Staged vertices.
    #[must_use]
    pub fn staged_vertices(&self) -> &[Vertex] {
        self.buffers.vertices()
    }

    /// Staged indices.
    #[must_use]
    pub fn staged_indices(&self) -> &[u32] {
        self.buffers.indices()
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Counters accumulated since the last [`take_stats`](Self::take_stats).
    #[must_use]
    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Return and reset the counters.
    pub fn take_stats(&mut self) -> BatchStats {
        std::mem::take(&mut self.stats)
    }

    /// The device.
    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The device, mutably. Drawing through it directly bypasses batching.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Release the engine's buffers and white texture and hand back the
    /// device. Staged geometry is discarded.
    pub fn destroy(mut self) -> D {
        self.buffers.destroy(&mut self.device);
        self.white.destroy(&mut self.device);
        self.device
    }

    /// Flush if `vertices`/`indices` more would not fit.
    fn reserve(&mut self, vertices: usize, indices: usize) {
        if !self.buffers.vertices_fit(vertices) {
            self.flush_for(FlushReason::VertexCapacity);
        } else if !self.buffers.indices_fit(indices) {
            self.flush_for(FlushReason::IndexCapacity);
        }
    }

    fn push_quad(
        &mut self,
        corners: [Point; 4],
        texture_slot: u32,
        color: Color,
        text_range: f32,
        uv: UvRect,
    ) {
        let uvs = uv.corners();
        let vertices = [0, 1, 2, 3].map(|i| Vertex {
            position: corners[i].to_array(),
            color,
            uv: uvs[i],
            texture_slot: slot_attribute(texture_slot),
            text_range,
        });
        self.buffers.push_primitive(&vertices, &QUAD_INDICES);
    }

    fn flush_for(&mut self, reason: FlushReason) {
        if !self.buffers.is_empty() {
            self.submit(reason);
        }
        self.begin_batch();
    }

    fn submit(&mut self, reason: FlushReason) {
        let vertex_count = self.buffers.vertex_count();
        let index_count = self.buffers.index_count();

        self.buffers.write_range(&mut self.device);
        self.white.bind_to_slot(&mut self.device, WHITE_SLOT);

        // BatchConfig::validate bounds max_indices to u32.
        #[expect(clippy::cast_possible_truncation)]
        self.device.draw_indexed_triangles(
            self.buffers.vertex_buffer(),
            self.buffers.index_buffer(),
            index_count as u32,
        );

        self.stats.draw_calls += 1;
        self.stats.vertices += vertex_count as u64;
        self.stats.indices += index_count as u64;
        match reason {
            FlushReason::VertexCapacity => self.stats.vertex_capacity_flushes += 1,
            FlushReason::IndexCapacity => self.stats.index_capacity_flushes += 1,
            FlushReason::TextureSlots => self.stats.texture_slot_flushes += 1,
            FlushReason::Explicit | FlushReason::EndOfBatch => {}
        }

        match reason {
            FlushReason::Explicit | FlushReason::EndOfBatch => log::trace!(
                "flush ({reason:?}): {vertex_count} vertices, {index_count} indices, {} textures",
                self.slots.len()
            ),
            _ => log::debug!(
                "mid-batch flush ({reason:?}): {vertex_count} vertices, {index_count} indices"
            ),
        }
    }
}

/// Slot numbers are below 32, so the float is exact.
#[expect(clippy::cast_precision_loss)]
fn slot_attribute(slot: u32) -> f32 {
    slot as f32
}
