//! A headless [`GraphicsDevice`] that records every call it receives.
//!
//! Buffers and textures are plain integer handles. The last bytes written to
//! each buffer are kept so callers can inspect exactly what a draw call would
//! have consumed.

use std::collections::HashMap;

use crate::config::MAX_SUPPORTED_TEXTURE_SLOTS;
use crate::device::{AttributeBinding, BufferKind, GraphicsDevice};
use crate::error::{RenderError, RenderResult};
use crate::layout::VertexLayout;
use crate::types::Vertex;

/// A command observed by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// `create_buffer`.
    CreateBuffer {
        /// Returned handle.
        buffer: u32,
        /// Binding point.
        kind: BufferKind,
        /// Allocated size.
        byte_len: usize,
    },
    /// `write_buffer`.
    WriteBuffer {
        /// Target handle.
        buffer: u32,
        /// Binding point.
        kind: BufferKind,
        /// Bytes uploaded.
        byte_len: usize,
    },
    /// `bind_attribute`.
    BindAttribute {
        /// Source buffer.
        buffer: u32,
        /// Attribute pointer.
        binding: AttributeBinding,
    },
    /// `create_texture`.
    CreateTexture {
        /// Returned handle.
        texture: u32,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// `bind_texture`.
    BindTexture {
        /// Texture unit.
        unit: u32,
        /// Bound handle.
        texture: u32,
    },
    /// `set_resolution`.
    SetResolution {
        /// Viewport width.
        width: f32,
        /// Viewport height.
        height: f32,
    },
    /// `draw_indexed_triangles`.
    Draw {
        /// Vertex buffer handle.
        vertices: u32,
        /// Index buffer handle.
        indices: u32,
        /// Indices drawn.
        index_count: u32,
    },
    /// `delete_buffer`.
    DeleteBuffer(u32),
    /// `delete_texture`.
    DeleteTexture(u32),
}

/// Headless device recording commands and buffer contents.
#[derive(Debug)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    contents: HashMap<u32, Vec<u8>>,
    attributes: Vec<&'static str>,
    max_texture_slots: u32,
    next_handle: u32,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// A device whose program declares the batch vertex attributes.
    #[must_use]
    pub fn new() -> Self {
        let attributes = VertexLayout::batch()
            .attributes()
            .iter()
            .map(|attr| attr.name)
            .collect();
        Self::with_attributes(attributes)
    }

    /// A device whose program declares exactly `attributes`, at locations
    /// matching their order.
    #[must_use]
    pub fn with_attributes(attributes: Vec<&'static str>) -> Self {
        Self {
            commands: Vec::new(),
            contents: HashMap::new(),
            attributes,
            max_texture_slots: MAX_SUPPORTED_TEXTURE_SLOTS,
            next_handle: 1,
        }
    }

    /// Report `slots` texture units instead of the shader maximum.
    #[must_use]
    pub fn with_max_texture_slots(mut self, slots: u32) -> Self {
        self.max_texture_slots = slots;
        self
    }

    /// Every command received so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Forget recorded commands. Buffer contents are kept.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Index counts of every draw call, in submission order.
    #[must_use]
    pub fn draw_calls(&self) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::Draw { index_count, .. } => Some(*index_count),
                _ => None,
            })
            .collect()
    }

    /// Units `texture` was bound to, in binding order.
    #[must_use]
    pub fn texture_binds(&self, texture: u32) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::BindTexture { unit, texture: t } if *t == texture => Some(*unit),
                _ => None,
            })
            .collect()
    }

    /// Bytes of every `write_buffer` call, in submission order.
    #[must_use]
    pub fn uploads(&self, kind: BufferKind) -> Vec<usize> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::WriteBuffer {
                    kind: k, byte_len, ..
                } if *k == kind => Some(*byte_len),
                _ => None,
            })
            .collect()
    }

    /// The bytes most recently written to `buffer`.
    #[must_use]
    pub fn buffer_contents(&self, buffer: u32) -> &[u8] {
        self.contents.get(&buffer).map_or(&[], Vec::as_slice)
    }

    /// The most recent vertex upload decoded as vertices.
    #[must_use]
    pub fn last_vertices(&self) -> Vec<Vertex> {
        self.last_written(BufferKind::Vertex)
            .map(decode::<Vertex>)
            .unwrap_or_default()
    }

    /// The most recent index upload decoded as `u32` indices.
    #[must_use]
    pub fn last_indices(&self) -> Vec<u32> {
        self.last_written(BufferKind::Index)
            .map(decode::<u32>)
            .unwrap_or_default()
    }

    fn last_written(&self, kind: BufferKind) -> Option<&[u8]> {
        self.commands.iter().rev().find_map(|command| match command {
            DeviceCommand::WriteBuffer {
                buffer, kind: k, ..
            } if *k == kind => Some(self.buffer_contents(*buffer)),
            _ => None,
        })
    }

    fn allocate_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

/// Decode tightly packed, possibly unaligned bytes into `T`s.
fn decode<T: bytemuck::AnyBitPattern>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(std::mem::size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

impl GraphicsDevice for RecordingDevice {
    type Buffer = u32;
    type Texture = u32;

    fn create_buffer(&mut self, kind: BufferKind, byte_len: usize) -> RenderResult<u32> {
        let buffer = self.allocate_handle();
        self.contents.insert(buffer, Vec::new());
        self.commands.push(DeviceCommand::CreateBuffer {
            buffer,
            kind,
            byte_len,
        });
        Ok(buffer)
    }

    fn write_buffer(&mut self, kind: BufferKind, buffer: u32, data: &[u8]) {
        self.contents.insert(buffer, data.to_vec());
        self.commands.push(DeviceCommand::WriteBuffer {
            buffer,
            kind,
            byte_len: data.len(),
        });
    }

    fn max_texture_slots(&self) -> u32 {
        self.max_texture_slots
    }

    fn attribute_location(&mut self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .position(|attr| *attr == name)
            .and_then(|index| u32::try_from(index).ok())
    }

    fn bind_attribute(&mut self, buffer: u32, binding: AttributeBinding) {
        self.commands.push(DeviceCommand::BindAttribute { buffer, binding });
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<u32> {
        if width == 0 || height == 0 {
            return Err(RenderError::creation(
                "texture",
                format!("zero-sized texture {width}x{height}"),
            ));
        }
        let texture = self.allocate_handle();
        self.contents.insert(texture, rgba.to_vec());
        self.commands.push(DeviceCommand::CreateTexture {
            texture,
            width,
            height,
        });
        Ok(texture)
    }

    fn bind_texture(&mut self, unit: u32, texture: u32) {
        self.commands.push(DeviceCommand::BindTexture { unit, texture });
    }

    fn set_resolution(&mut self, width: f32, height: f32) {
        self.commands.push(DeviceCommand::SetResolution { width, height });
    }

    fn draw_indexed_triangles(&mut self, vertices: u32, indices: u32, index_count: u32) {
        self.commands.push(DeviceCommand::Draw {
            vertices,
            indices,
            index_count,
        });
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.contents.remove(&buffer);
        self.commands.push(DeviceCommand::DeleteBuffer(buffer));
    }

    fn delete_texture(&mut self, texture: u32) {
        self.contents.remove(&texture);
        self.commands.push(DeviceCommand::DeleteTexture(texture));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_across_kinds() {
        let mut device = RecordingDevice::new();
        let a = device.create_buffer(BufferKind::Vertex, 16).unwrap();
        let b = device.create_buffer(BufferKind::Index, 16).unwrap();
        let t = device.create_texture(1, 1, &[255; 4]).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, t);
    }

    #[test]
    fn keeps_last_written_contents() {
        let mut device = RecordingDevice::new();
        let buffer = device.create_buffer(BufferKind::Index, 64).unwrap();
        device.write_buffer(BufferKind::Index, buffer, bytemuck::cast_slice(&[0u32, 1, 2]));
        device.write_buffer(BufferKind::Index, buffer, bytemuck::cast_slice(&[7u32]));
        assert_eq!(device.last_indices(), vec![7]);
        assert_eq!(device.uploads(BufferKind::Index), vec![12, 4]);
    }

    #[test]
    fn attribute_locations_follow_declaration_order() {
        let mut device = RecordingDevice::with_attributes(vec!["a", "b"]);
        assert_eq!(device.attribute_location("b"), Some(1));
        assert_eq!(device.attribute_location("c"), None);
    }

    #[test]
    fn rejects_zero_sized_textures() {
        let mut device = RecordingDevice::new();
        assert!(device.create_texture(0, 4, &[]).is_err());
    }
}
