//! The caller-facing 2D drawing API.
//!
//! [`Renderer2D`] wraps a [`BatchEngine`] and offers one operation per kind
//! of primitive. Every operation encodes its geometry with [`encode`],
//! [`tessellate`] or [`text`](crate::text) and hands the resulting quads or
//! triangles to the engine, which decides when to submit.
//!
//! [`encode`]: crate::encode
//! [`tessellate`]: crate::tessellate

use crate::batch::{BatchEngine, BatchStats};
use crate::config::BatchConfig;
use crate::device::GraphicsDevice;
use crate::encode;
use crate::error::RenderResult;
use crate::tessellate::{self, TriangleMesh};
use crate::text::{self, GlyphAtlas, TextStyle};
use crate::texture::{Texture, CIRCLE_MASK_DIAMETER};
use crate::types::{Angle, Color, Point, Size, UvRect, NO_TEXT_RANGE, WHITE_SLOT};

/// UV coordinates for solid triangles; the white texture is uniform.
const SOLID_UVS: [[f32; 2]; 3] = [[0.0, 0.0]; 3];

/// Immediate-mode 2D renderer.
///
/// # Example
///
/// ```
/// use glow_batch2d::{point, size, BatchConfig, RecordingDevice, Renderer2D};
///
/// let mut renderer = Renderer2D::new(RecordingDevice::new(), BatchConfig::default())?;
///
/// renderer.begin_frame([800, 600]);
/// renderer.fill_rect(point(10.0, 10.0), size(100.0, 50.0), [1.0, 0.0, 0.0, 1.0]);
/// renderer.draw_line(point(0.0, 0.0), point(800.0, 600.0), 2.0, [1.0; 4]);
/// renderer.end_frame();
///
/// assert_eq!(renderer.device().draw_calls(), vec![12]);
/// # Ok::<(), glow_batch2d::RenderError>(())
/// ```
pub struct Renderer2D<D: GraphicsDevice> {
    engine: BatchEngine<D>,
    circle_mask: Texture<D::Texture>,
}

impl<D: GraphicsDevice> Renderer2D<D> {
    /// Create a renderer drawing through `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch engine or the ellipse mask texture
    /// cannot be created.
    pub fn new(device: D, config: BatchConfig) -> RenderResult<Self> {
        let mut engine = BatchEngine::new(device, config)?;
        let circle_mask = Texture::circle_mask(engine.device_mut(), CIRCLE_MASK_DIAMETER)?;
        Ok(Self {
            engine,
            circle_mask,
        })
    }

    /// Start a frame for a viewport of `resolution` pixels.
    pub fn begin_frame(&mut self, resolution: [u32; 2]) {
        // Viewport sizes are far below f32's exact integer range.
        #[expect(clippy::cast_precision_loss)]
        let [width, height] = resolution.map(|v| v as f32);
        self.engine.device_mut().set_resolution(width, height);
        self.engine.begin_batch();
    }

    /// Submit everything drawn since the last submission.
    pub fn end_frame(&mut self) {
        self.engine.end_batch();
    }

    /// Solid axis-aligned rectangle with top-left corner `origin`.
    pub fn fill_rect(&mut self, origin: Point, size: Size, color: Color) {
        let corners = encode::rect_corners(origin, size);
        self.engine.draw_quad(corners, WHITE_SLOT, color, NO_TEXT_RANGE, UvRect::FULL);
    }

    /// Solid rectangle rotated about its center.
    pub fn fill_rotated_rect(&mut self, origin: Point, size: Size, rotation: Angle, color: Color) {
        let corners = encode::rotated_rect_corners(origin, size, rotation);
        self.engine.draw_quad(corners, WHITE_SLOT, color, NO_TEXT_RANGE, UvRect::FULL);
    }

    /// The whole of `texture` stretched over a rectangle, multiplied by
    /// `tint`.
    pub fn draw_texture(
        &mut self,
        texture: &Texture<D::Texture>,
        origin: Point,
        size: Size,
        tint: Color,
    ) {
        self.draw_texture_region(texture, origin, size, UvRect::FULL, tint);
    }

    /// A region of `texture` stretched over a rectangle.
    pub fn draw_texture_region(
        &mut self,
        texture: &Texture<D::Texture>,
        origin: Point,
        size: Size,
        region: UvRect,
        tint: Color,
    ) {
        let corners = encode::rect_corners(origin, size);
        self.engine.draw_textured_quad(corners, texture, tint, NO_TEXT_RANGE, region);
    }

    /// A region of `texture` over a rectangle rotated about its center.
    pub fn draw_rotated_texture(
        &mut self,
        texture: &Texture<D::Texture>,
        origin: Point,
        size: Size,
        rotation: Angle,
        region: UvRect,
        tint: Color,
    ) {
        let corners = encode::rotated_rect_corners(origin, size, rotation);
        self.engine.draw_textured_quad(corners, texture, tint, NO_TEXT_RANGE, region);
    }

    /// A straight segment of `thickness` pixels.
    pub fn draw_line(&mut self, from: Point, to: Point, thickness: f32, color: Color) {
        let corners = encode::line_corners(from, to, thickness);
        self.engine.draw_quad(corners, WHITE_SLOT, color, NO_TEXT_RANGE, UvRect::FULL);
    }

    /// A square dot of `size` pixels centered on `at`.
    pub fn draw_point(&mut self, at: Point, size: f32, color: Color) {
        let corners = encode::point_corners(at, size);
        self.engine.draw_quad(corners, WHITE_SLOT, color, NO_TEXT_RANGE, UvRect::FULL);
    }

    /// A regular polygon with `sides` vertices inscribed in a circle,
    /// drawn as a triangle fan.
    pub fn fill_ngon(
        &mut self,
        center: Point,
        radius: f32,
        sides: u32,
        rotation: Angle,
        color: Color,
    ) {
        for triangle in encode::ngon_fan(center, radius, sides, rotation) {
            self.engine.draw_triangle(triangle, WHITE_SLOT, color, SOLID_UVS);
        }
    }

    /// A convex polygon drawn as a triangle fan from its first point.
    pub fn fill_convex_polygon(&mut self, points: &[Point], color: Color) {
        for triangle in encode::convex_fan(points) {
            self.engine.draw_triangle(triangle, WHITE_SLOT, color, SOLID_UVS);
        }
    }

    /// Any simple or self-intersecting polygon, filled with the non-zero
    /// rule.
    pub fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if let Some(mesh) = tessellate::fill_polygon(points) {
            self.draw_mesh(&mesh, color);
        }
    }

    /// A polyline of `thickness` pixels with mitered joins.
    pub fn stroke_polyline(
        &mut self,
        points: &[Point],
        thickness: f32,
        closed: bool,
        color: Color,
    ) {
        if let Some(mesh) = tessellate::stroke_polyline(points, thickness, closed) {
            self.draw_mesh(&mesh, color);
        }
    }

    /// An axis-aligned ellipse, drawn as one quad masked by a disc texture.
    pub fn fill_ellipse(&mut self, center: Point, radii: Size, color: Color) {
        let corners = encode::ellipse_corners(center, radii);
        self.engine.draw_textured_quad(
            corners,
            &self.circle_mask,
            color,
            NO_TEXT_RANGE,
            UvRect::FULL,
        );
    }

    /// A circle; shorthand for [`fill_ellipse`](Self::fill_ellipse).
    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.fill_ellipse(center, Size::new(radius, radius), color);
    }

    /// Draw `text` with its first baseline starting at `origin` and return
    /// the width of its widest line.
    ///
    /// Each glyph is a separate quad, so a long string may span several
    /// draw calls.
    pub fn draw_text<A>(&mut self, atlas: &A, text: &str, origin: Point, style: &TextStyle) -> f32
    where
        A: GlyphAtlas<Texture = D::Texture> + ?Sized,
    {
        let layout = text::layout_text(atlas, text, origin, style);
        let range = text::screen_px_range(atlas, style.font_size);
        for glyph in &layout.glyphs {
            self.engine.draw_textured_quad(
                glyph.corners,
                atlas.texture(),
                style.color,
                range,
                glyph.uv,
            );
        }
        layout.width
    }

    /// Counters since the last [`take_stats`](Self::take_stats).
    #[must_use]
    pub fn stats(&self) -> &BatchStats {
        self.engine.stats()
    }

    /// Return and reset the submission counters.
    pub fn take_stats(&mut self) -> BatchStats {
        self.engine.take_stats()
    }

    /// The underlying batch engine.
    #[must_use]
    pub fn engine(&self) -> &BatchEngine<D> {
        &self.engine
    }

    /// The underlying batch engine, mutably, for custom quads.
    pub fn engine_mut(&mut self) -> &mut BatchEngine<D> {
        &mut self.engine
    }

    /// The device.
    #[must_use]
    pub fn device(&self) -> &D {
        self.engine.device()
    }

    /// The device, mutably, e.g. to create textures.
    pub fn device_mut(&mut self) -> &mut D {
        self.engine.device_mut()
    }

    /// Release the renderer's GPU resources and hand back the device.
    pub fn destroy(self) -> D {
        let mut device = self.engine.destroy();
        self.circle_mask.destroy(&mut device);
        device
    }

    fn draw_mesh(&mut self, mesh: &TriangleMesh, color: Color) {
        for triangle in mesh.triangles() {
            self.engine.draw_triangle(triangle, WHITE_SLOT, color, SOLID_UVS);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::recording::RecordingDevice;
    use crate::text::MonospaceAtlas;
    use crate::types::{point, size, WHITE};

    fn renderer() -> Renderer2D<RecordingDevice> {
        let mut renderer =
            Renderer2D::new(RecordingDevice::new(), BatchConfig::with_max_quads(64)).unwrap();
        renderer.device_mut().clear_commands();
        renderer
    }

    #[test]
    fn solid_shapes_never_bind_textures() {
        let mut r = renderer();
        r.begin_frame([100, 100]);
        r.fill_rect(point(0.0, 0.0), size(10.0, 10.0), WHITE);
        r.fill_rotated_rect(point(0.0, 0.0), size(10.0, 10.0), Angle::degrees(30.0), WHITE);
        r.draw_line(point(0.0, 0.0), point(5.0, 5.0), 1.0, WHITE);
        r.draw_point(point(1.0, 1.0), 2.0, WHITE);
        r.fill_ngon(point(50.0, 50.0), 10.0, 5, Angle::zero(), WHITE);

        assert_eq!(r.engine().bound_textures(), 0);
        assert!(r
            .engine()
            .staged_vertices()
            .iter()
            .all(|v| v.texture_slot == 0.0));
        assert_eq!(r.engine().vertex_count(), 4 * 4 + 5 * 3);
    }

    #[test]
    fn begin_frame_sets_resolution_only() {
        let mut r = renderer();
        r.begin_frame([640, 480]);
        assert_eq!(
            r.device().commands(),
            &[crate::DeviceCommand::SetResolution {
                width: 640.0,
                height: 480.0,
            }]
        );
    }

    #[test]
    fn ellipse_samples_circle_mask() {
        let mut r = renderer();
        r.begin_frame([100, 100]);
        r.fill_circle(point(50.0, 50.0), 10.0, WHITE);
        assert_eq!(r.engine().cached_slot(r.circle_mask.id()), Some(1));
        let xs: Vec<f32> = r
            .engine()
            .staged_vertices()
            .iter()
            .map(|v| v.position[0])
            .collect();
        assert_eq!(xs, vec![40.0, 60.0, 60.0, 40.0]);
    }

    #[test]
    fn textured_rect_carries_region_uvs() {
        let mut r = renderer();
        let texture = Texture::from_rgba(r.device_mut(), "sprite", 4, 4, &[0; 64]).unwrap();
        r.begin_frame([100, 100]);
        let region = texture.region(0, 0, 2, 2);
        r.draw_texture_region(&texture, point(0.0, 0.0), size(8.0, 8.0), region, WHITE);
        let uvs: Vec<[f32; 2]> = r.engine().staged_vertices().iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![[0.0, 0.5], [0.5, 0.5], [0.5, 0.0], [0.0, 0.0]]);
        assert!(r
            .engine()
            .staged_vertices()
            .iter()
            .all(|v| v.texture_slot == 1.0));
    }

    #[test]
    fn text_returns_width_and_marks_sdf_range() {
        let mut r = renderer();
        let texture = Texture::from_rgba(r.device_mut(), "font", 80, 8, &[0; 80 * 8 * 4]).unwrap();
        let atlas = MonospaceAtlas::new(texture, 'a', 10, [8, 8]).with_distance_range(2.0);

        r.begin_frame([100, 100]);
        let width = r.draw_text(&atlas, "abc", point(0.0, 20.0), &TextStyle::new(16.0, WHITE));
        assert!((width - 48.0).abs() < 1e-4);
        assert_eq!(r.engine().vertex_count(), 12);
        assert!(r
            .engine()
            .staged_vertices()
            .iter()
            .all(|v| (v.text_range - 4.0).abs() < 1e-4));
        assert_eq!(r.engine().bound_textures(), 1);
    }

    #[test]
    fn long_text_spans_several_draw_calls() {
        let config = BatchConfig::with_max_quads(4);
        let mut r = Renderer2D::new(RecordingDevice::new(), config).unwrap();
        let texture = Texture::from_rgba(r.device_mut(), "font", 80, 8, &[0; 80 * 8 * 4]).unwrap();
        let atlas = MonospaceAtlas::new(texture, 'a', 10, [8, 8]);

        r.begin_frame([100, 100]);
        r.draw_text(&atlas, "abcdefghij", point(0.0, 10.0), &TextStyle::default());
        r.end_frame();
        assert_eq!(r.device().draw_calls(), vec![24, 24, 12]);
        // Every batch rebinds the atlas, since a flush clears slot assignments.
        assert_eq!(
            r.device().texture_binds(atlas.texture().handle()),
            vec![1, 1, 1]
        );
    }

    #[test]
    fn polygon_and_polyline_emit_triangles() {
        let mut r = renderer();
        r.begin_frame([100, 100]);
        let square = [
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(0.0, 10.0),
        ];
        r.fill_polygon(&square, WHITE);
        assert_eq!(r.engine().index_count(), 6);
        r.fill_convex_polygon(&square, WHITE);
        assert_eq!(r.engine().index_count(), 12);
        r.stroke_polyline(&square, 1.0, true, WHITE);
        assert!(r.engine().index_count() > 12);
        assert_eq!(r.engine().index_count() % 3, 0);
    }

    #[test]
    fn destroy_releases_mask_texture() {
        let r = renderer();
        let mask = r.circle_mask.handle();
        let device = r.destroy();
        assert!(device
            .commands()
            .contains(&crate::DeviceCommand::DeleteTexture(mask)));
    }
}
