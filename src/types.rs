//! Plain data types shared by the batch engine and the primitive encoders.

use bytemuck::{Pod, Zeroable};

pub use lyon::math::{point, size, vector, Angle, Point, Size, Vector};

/// Linear RGBA color with components in `[0, 1]`.
pub type Color = [f32; 4];

/// Opaque white. Used as the neutral tint for textured primitives.
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// Texture unit reserved for the permanent 1×1 white texture.
pub const WHITE_SLOT: u32 = 0;

/// Text range value meaning "plain textured/colored quad".
pub const NO_TEXT_RANGE: f32 = 0.0;

/// A single vertex as laid out in the GPU vertex buffer.
///
/// Ten `f32` components: position (2), color (4), uv (2), texture slot (1)
/// and text distance-field range (1). The shader-side attribute layout is
/// described by [`VertexLayout::batch`](crate::VertexLayout::batch).
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Position in pixels, origin top-left, y down.
    pub position: [f32; 2],
    /// Straight (non-premultiplied) RGBA color.
    pub color: [f32; 4],
    /// Normalized texture coordinates within the bound texture.
    pub uv: [f32; 2],
    /// Texture unit index, integer valued. `0` samples the white texture.
    pub texture_slot: f32,
    /// `<= 0` renders a plain quad, `> 0` renders a distance-field glyph
    /// with this screen-space pixel range.
    pub text_range: f32,
}

const _: () = assert!(std::mem::size_of::<Vertex>() == 10 * std::mem::size_of::<f32>());

/// A rectangle in normalized texture space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    /// Top-left texture coordinate.
    pub min: [f32; 2],
    /// Bottom-right texture coordinate.
    pub max: [f32; 2],
}

impl UvRect {
    /// The whole texture.
    pub const FULL: Self = Self {
        min: [0.0, 0.0],
        max: [1.0, 1.0],
    };

    /// Create a UV rect from its top-left and bottom-right coordinates.
    #[must_use]
    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    /// Convert a pixel-space sub-rectangle of a `texture_size` texture into
    /// normalized coordinates.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn from_pixels(x: u32, y: u32, width: u32, height: u32, texture_size: [u32; 2]) -> Self {
        let [tw, th] = [texture_size[0] as f32, texture_size[1] as f32];
        Self {
            min: [x as f32 / tw, y as f32 / th],
            max: [(x + width) as f32 / tw, (y + height) as f32 / th],
        }
    }

    /// Per-corner coordinates in quad corner order: bottom-left,
    /// bottom-right, top-right, top-left.
    #[must_use]
    pub fn corners(&self) -> [[f32; 2]; 4] {
        let [u0, v0] = self.min;
        let [u1, v1] = self.max;
        [[u0, v1], [u1, v1], [u1, v0], [u0, v0]]
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_corners_follow_quad_order() {
        let uv = UvRect::new([0.25, 0.5], [0.75, 1.0]);
        assert_eq!(
            uv.corners(),
            [[0.25, 1.0], [0.75, 1.0], [0.75, 0.5], [0.25, 0.5]]
        );
    }

    #[test]
    fn uv_from_pixels_normalizes_against_texture_size() {
        let uv = UvRect::from_pixels(16, 0, 16, 32, [64, 32]);
        assert_eq!(uv.min, [0.25, 0.0]);
        assert_eq!(uv.max, [0.5, 1.0]);
    }

    #[test]
    fn vertex_is_ten_floats() {
        let v = Vertex {
            position: [1.0, 2.0],
            color: [0.1, 0.2, 0.3, 0.4],
            uv: [0.5, 0.6],
            texture_slot: 3.0,
            text_range: 0.0,
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 3.0, 0.0]);
    }
}
