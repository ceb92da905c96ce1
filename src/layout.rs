//! Attribute composition of one batch vertex.

use crate::device::{AttributeBinding, GraphicsDevice};
use crate::error::{RenderError, RenderResult};

/// Byte width of every attribute component (`GL_FLOAT`).
const COMPONENT_BYTES: usize = std::mem::size_of::<f32>();

/// One named attribute and its position inside a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute name in the shader program.
    pub name: &'static str,
    /// Number of `f32` components.
    pub components: usize,
    /// Offset in bytes from the start of the vertex.
    pub offset_bytes: usize,
}

/// Ordered list of vertex attributes with their computed offsets and stride.
///
/// Fixed after construction: one renderer keeps one layout for its whole
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride_components: usize,
}

impl VertexLayout {
    /// Build a layout from `(name, component count)` pairs in vertex order.
    #[must_use]
    pub fn new(attributes: &[(&'static str, usize)]) -> Self {
        let mut offset_components = 0;
        let attributes = attributes
            .iter()
            .map(|&(name, components)| {
                let attribute = VertexAttribute {
                    name,
                    components,
                    offset_bytes: offset_components * COMPONENT_BYTES,
                };
                offset_components += components;
                attribute
            })
            .collect();

        Self {
            attributes,
            stride_components: offset_components,
        }
    }

    /// The layout of [`Vertex`](crate::Vertex): position, color, uv, texture
    /// slot and text range.
    #[must_use]
    pub fn batch() -> Self {
        Self::new(&[
            ("a_position", 2),
            ("a_color", 4),
            ("a_uv", 2),
            ("a_texture_slot", 1),
            ("a_text_range", 1),
        ])
    }

    /// Attributes in vertex order.
    #[must_use]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Components per vertex.
    #[must_use]
    pub fn stride_components(&self) -> usize {
        self.stride_components
    }

    /// Bytes per vertex.
    #[must_use]
    pub fn stride_bytes(&self) -> usize {
        self.stride_components * COMPONENT_BYTES
    }

    /// Point every attribute of the device's batch program at `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingAttribute`] if the program does not
    /// declare one of the attributes.
    pub fn bind<D: GraphicsDevice>(&self, device: &mut D, buffer: D::Buffer) -> RenderResult<()> {
        let stride_bytes = gl_int(self.stride_bytes());
        for attribute in &self.attributes {
            let location = device
                .attribute_location(attribute.name)
                .ok_or(RenderError::MissingAttribute(attribute.name))?;
            device.bind_attribute(
                buffer,
                AttributeBinding {
                    location,
                    components: gl_int(attribute.components),
                    stride_bytes,
                    offset_bytes: gl_int(attribute.offset_bytes),
                },
            );
        }
        Ok(())
    }
}

/// Attribute sizes are a handful of floats; anything larger is a bug in the
/// layout declaration.
fn gl_int(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
