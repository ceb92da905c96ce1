//! Glyph-run layout on top of textured quads.
//!
//! Font parsing and rasterization live outside this crate. A font is anything
//! implementing [`GlyphAtlas`]: an atlas texture plus per-glyph metrics. This
//! module turns a string into positioned glyph quads (kerning, line breaks,
//! alignment); [`Renderer2D::draw_text`](crate::Renderer2D::draw_text) then
//! emits one quad per glyph.

use crate::texture::Texture;
use crate::types::{point, Color, Point, Size, UvRect, Vector, WHITE};

/// Metrics of one glyph, in atlas units (pixels at [`GlyphAtlas::em_size`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Horizontal pen advance after this glyph.
    pub advance: f32,
    /// Offset from the pen position on the baseline to the quad's top-left
    /// corner. `y` is negative for glyphs rising above the baseline.
    pub bearing: Vector,
    /// Quad size. Empty for whitespace.
    pub size: Size,
    /// Region of the atlas texture holding the glyph.
    pub uv: UvRect,
}

/// A font atlas: one texture and metrics for the glyphs it contains.
pub trait GlyphAtlas {
    /// Device texture handle type of the atlas.
    type Texture: Copy;

    /// The atlas texture.
    fn texture(&self) -> &Texture<Self::Texture>;

    /// Font size, in pixels, the metrics are expressed at.
    fn em_size(&self) -> f32;

    /// Baseline-to-baseline distance in atlas units.
    fn line_height(&self) -> f32;

    /// Signed-distance-field range of the atlas in atlas pixels. Zero for
    /// plain bitmap atlases.
    fn distance_range(&self) -> f32 {
        0.0
    }

    /// Metrics for `ch`, or `None` if the atlas lacks it.
    fn glyph(&self, ch: char) -> Option<Glyph>;

    /// Extra advance between `left` and `right`, in atlas units.
    fn kerning(&self, _left: char, _right: char) -> f32 {
        0.0
    }
}

/// Horizontal alignment of each line relative to the text origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Lines start at the origin.
    #[default]
    Left,
    /// Lines are centered on the origin.
    Center,
    /// Lines end at the origin.
    Right,
}

/// How a text run is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Fill color.
    pub color: Color,
    /// Line alignment.
    pub align: TextAlign,
}

impl TextStyle {
    /// Left-aligned text of `font_size` in `color`.
    #[must_use]
    pub fn new(font_size: f32, color: Color) -> Self {
        Self {
            font_size,
            color,
            align: TextAlign::Left,
        }
    }

    /// Replace the alignment.
    #[must_use]
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(16.0, WHITE)
    }
}

/// A glyph quad ready for the batch engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    /// Quad corners, bottom-left first.
    pub corners: [Point; 4],
    /// Atlas region.
    pub uv: UvRect,
}

/// Result of laying out a text run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    /// Visible glyph quads in drawing order.
    pub glyphs: Vec<PlacedGlyph>,
    /// Width of the widest line, in pixels.
    pub width: f32,
    /// Number of lines.
    pub lines: usize,
}

/// Scale from atlas units to screen pixels.
fn scale_for<A: GlyphAtlas + ?Sized>(atlas: &A, font_size: f32) -> f32 {
    font_size / atlas.em_size()
}

/// Advance width of one line in atlas units, kerning included.
fn line_advance<A: GlyphAtlas + ?Sized>(atlas: &A, line: &str) -> f32 {
    let mut width = 0.0;
    let mut previous = None;
    for ch in line.chars() {
        let Some(glyph) = atlas.glyph(ch) else {
            previous = None;
            continue;
        };
        if let Some(prev) = previous {
            width += atlas.kerning(prev, ch);
        }
        width += glyph.advance;
        previous = Some(ch);
    }
    width
}

/// Width in pixels of the widest line of `text` at `font_size`.
pub fn measure_text<A: GlyphAtlas + ?Sized>(atlas: &A, text: &str, font_size: f32) -> f32 {
    let scale = scale_for(atlas, font_size);
    text.split('\n')
        .map(|line| line_advance(atlas, line) * scale)
        .fold(0.0, f32::max)
}

/// The screen-space distance-field range for glyphs drawn at `font_size`,
/// or `0.0` for bitmap atlases.
pub fn screen_px_range<A: GlyphAtlas + ?Sized>(atlas: &A, font_size: f32) -> f32 {
    let range = atlas.distance_range();
    if range > 0.0 {
        (range * scale_for(atlas, font_size)).max(1.0)
    } else {
        0.0
    }
}

/// Position every glyph of `text`. `origin` is the pen position on the
/// first line's baseline; following lines move down by the atlas line
/// height. Characters missing from the atlas are skipped.
pub fn layout_text<A: GlyphAtlas + ?Sized>(
    atlas: &A,
    text: &str,
    origin: Point,
    style: &TextStyle,
) -> TextLayout {
    let scale = scale_for(atlas, style.font_size);
    let mut layout = TextLayout::default();

    for (row, line) in text.split('\n').enumerate() {
        let line_width = line_advance(atlas, line) * scale;
        let start_x = match style.align {
            TextAlign::Left => origin.x,
            TextAlign::Center => origin.x - line_width / 2.0,
            TextAlign::Right => origin.x - line_width,
        };
        // Line counts stay far below f32 precision limits.
        #[expect(clippy::cast_precision_loss)]
        let baseline = origin.y + row as f32 * atlas.line_height() * scale;

        let mut pen = 0.0;
        let mut previous = None;
        for ch in line.chars() {
            let Some(glyph) = atlas.glyph(ch) else {
                log::trace!("glyph {ch:?} missing from atlas, skipped");
                previous = None;
                continue;
            };
            if let Some(prev) = previous {
                pen += atlas.kerning(prev, ch);
            }

            if !glyph.size.is_empty() {
                let top_left = point(
                    start_x + (pen + glyph.bearing.x) * scale,
                    baseline + glyph.bearing.y * scale,
                );
                layout.glyphs.push(PlacedGlyph {
                    corners: crate::encode::rect_corners(top_left, glyph.size * scale),
                    uv: glyph.uv,
                });
            }

            pen += glyph.advance;
            previous = Some(ch);
        }

        layout.width = layout.width.max(line_width);
        layout.lines += 1;
    }

    layout
}

/// A fixed-cell bitmap or distance-field font: glyphs for a contiguous run
/// of characters laid out left to right, top to bottom in equal cells.
#[derive(Debug)]
pub struct MonospaceAtlas<T> {
    texture: Texture<T>,
    first_char: char,
    glyph_count: u32,
    columns: u32,
    cell: [u32; 2],
    distance_range: f32,
}

impl<T: Copy> MonospaceAtlas<T> {
    /// An atlas whose cells are `cell` pixels, holding `glyph_count`
    /// characters starting at `first_char`.
    ///
    /// # Panics
    ///
    /// Panics if a cell has zero width or height, or is wider than the
    /// texture.
    #[must_use]
    pub fn new(texture: Texture<T>, first_char: char, glyph_count: u32, cell: [u32; 2]) -> Self {
        assert!(cell[0] > 0 && cell[1] > 0, "atlas cell must not be empty");
        let columns = texture.width() / cell[0];
        assert!(columns > 0, "cell wider than atlas texture");
        Self {
            texture,
            first_char,
            glyph_count,
            columns,
            cell,
            distance_range: 0.0,
        }
    }

    /// Mark the atlas as a distance field with `range` pixels of spread.
    #[must_use]
    pub fn with_distance_range(mut self, range: f32) -> Self {
        self.distance_range = range;
        self
    }

    /// Give the texture back.
    pub fn into_texture(self) -> Texture<T> {
        self.texture
    }
}

impl<T: Copy> GlyphAtlas for MonospaceAtlas<T> {
    type Texture = T;

    fn texture(&self) -> &Texture<T> {
        &self.texture
    }

    #[expect(clippy::cast_precision_loss)]
    fn em_size(&self) -> f32 {
        self.cell[1] as f32
    }

    fn line_height(&self) -> f32 {
        self.em_size()
    }

    fn distance_range(&self) -> f32 {
        self.distance_range
    }

    #[expect(clippy::cast_precision_loss)]
    fn glyph(&self, ch: char) -> Option<Glyph> {
        let index = u32::from(ch).checked_sub(u32::from(self.first_char))?;
        if index >= self.glyph_count {
            return None;
        }
        let [w, h] = self.cell;
        let (col, row) = (index % self.columns, index / self.columns);
        Some(Glyph {
            advance: w as f32,
            bearing: Vector::new(0.0, -(h as f32)),
            size: Size::new(w as f32, h as f32),
            uv: self.texture.region(col * w, row * h, w, h),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::recording::RecordingDevice;

    /// 8x8 cells, 16 columns, printable ASCII.
    fn ascii_atlas() -> MonospaceAtlas<u32> {
        let mut device = RecordingDevice::new();
        let texture = Texture::from_rgba(&mut device, "font", 128, 48, &[0; 128 * 48 * 4]).unwrap();
        MonospaceAtlas::new(texture, ' ', 95, [8, 8])
    }

    /// Kerns "AV" together by two units and reports space as empty.
    struct Proportional(MonospaceAtlas<u32>);

    impl GlyphAtlas for Proportional {
        type Texture = u32;

        fn texture(&self) -> &Texture<u32> {
            self.0.texture()
        }
        fn em_size(&self) -> f32 {
            self.0.em_size()
        }
        fn line_height(&self) -> f32 {
            self.0.line_height()
        }
        fn glyph(&self, ch: char) -> Option<Glyph> {
            let glyph = self.0.glyph(ch)?;
            if ch == ' ' {
                return Some(Glyph {
                    size: Size::zero(),
                    ..glyph
                });
            }
            Some(glyph)
        }
        fn kerning(&self, left: char, right: char) -> f32 {
            if (left, right) == ('A', 'V') {
                -2.0
            } else {
                0.0
            }
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn width_scales_with_font_size() {
        let atlas = ascii_atlas();
        assert!(approx(measure_text(&atlas, "abc", 8.0), 24.0));
        assert!(approx(measure_text(&atlas, "abc", 16.0), 48.0));
    }

    #[test]
    fn width_is_widest_line() {
        let atlas = ascii_atlas();
        let style = TextStyle::new(8.0, WHITE);
        let layout = layout_text(&atlas, "ab\nabcd\n", point(0.0, 0.0), &style);
        assert!(approx(layout.width, 32.0));
        assert_eq!(layout.lines, 3);
    }

    #[test]
    fn empty_glyphs_advance_without_quads() {
        let atlas = Proportional(ascii_atlas());
        let layout = layout_text(&atlas, "a b", point(0.0, 0.0), &TextStyle::new(8.0, WHITE));
        assert_eq!(layout.glyphs.len(), 2);
        assert!(approx(layout.glyphs[1].corners[0].x, 16.0));
        assert!(approx(layout.width, 24.0));
    }

    #[test]
    fn glyphs_sit_on_the_baseline() {
        let atlas = ascii_atlas();
        let layout = layout_text(&atlas, "A", point(10.0, 20.0), &TextStyle::new(16.0, WHITE));
        let [bottom_left, _, top_right, top_left] = layout.glyphs[0].corners;
        assert!(approx(bottom_left.y, 20.0));
        assert!(approx(top_left.y, 4.0));
        assert!(approx(top_left.x, 10.0));
        assert!(approx(top_right.x, 26.0));
    }

    #[test]
    fn kerning_tightens_pairs() {
        let atlas = Proportional(ascii_atlas());
        assert!(approx(measure_text(&atlas, "AV", 8.0), 14.0));
        let layout = layout_text(&atlas, "AV", point(0.0, 0.0), &TextStyle::new(8.0, WHITE));
        assert!(approx(layout.glyphs[1].corners[0].x, 6.0));
    }

    #[test]
    fn alignment_offsets_each_line() {
        let atlas = ascii_atlas();
        let style = TextStyle::new(8.0, WHITE);
        let origin = point(100.0, 0.0);
        let center = layout_text(&atlas, "abcd", origin, &style.with_align(TextAlign::Center));
        assert!(approx(center.glyphs[0].corners[0].x, 84.0));
        let right = layout_text(&atlas, "abcd", origin, &style.with_align(TextAlign::Right));
        assert!(approx(right.glyphs[3].corners[1].x, 100.0));
    }

    #[test]
    fn missing_glyphs_are_skipped() {
        let atlas = ascii_atlas();
        let layout = layout_text(&atlas, "a\u{e9}b", point(0.0, 0.0), &TextStyle::new(8.0, WHITE));
        assert_eq!(layout.glyphs.len(), 2);
        assert!(approx(layout.width, 16.0));
    }

    #[test]
    fn glyph_uv_follows_grid() {
        let atlas = ascii_atlas();
        // '0' is index 16: second row, first column.
        let glyph = atlas.glyph('0').unwrap();
        assert_eq!(glyph.uv, UvRect::from_pixels(0, 8, 8, 8, [128, 48]));
        assert!(atlas.glyph('\u{7f}').is_none());
        assert!(atlas.glyph('\n').is_none());
    }

    #[test]
    #[should_panic(expected = "atlas cell must not be empty")]
    fn zero_width_cell_is_rejected() {
        let mut device = RecordingDevice::new();
        let texture = Texture::from_rgba(&mut device, "font", 8, 8, &[0; 8 * 8 * 4]).unwrap();
        let _ = MonospaceAtlas::new(texture, 'a', 1, [0, 8]);
    }

    #[test]
    fn px_range_depends_on_atlas_kind() {
        let bitmap = ascii_atlas();
        assert!(approx(screen_px_range(&bitmap, 32.0), 0.0));
        let sdf = ascii_atlas().with_distance_range(4.0);
        assert!(approx(screen_px_range(&sdf, 32.0), 16.0));
        assert!(approx(screen_px_range(&sdf, 1.0), 1.0));
    }
}
