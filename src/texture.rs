//! Texture resources the batch engine can bind to texture slots.
//!
//! Every [`Texture`] receives a process-unique [`TextureId`] when created.
//! The slot cache keys on that id, never on the texture's name.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::device::GraphicsDevice;
use crate::error::{RenderError, RenderResult};
use crate::types::UvRect;

/// Default diameter of the disc texture used for ellipses.
pub const CIRCLE_MASK_DIAMETER: u32 = 256;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw integer value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A 2D RGBA texture living on a [`GraphicsDevice`].
///
/// The batch engine only borrows textures: it reads the id and asks the
/// texture to bind itself to a slot. Creating and destroying them is the
/// caller's business.
#[derive(Debug)]
pub struct Texture<T> {
    id: TextureId,
    name: String,
    handle: T,
    width: u32,
    height: u32,
}

impl<T: Copy> Texture<T> {
    /// Upload tightly packed RGBA8 pixels, top row first.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TextureSize`] if `pixels` does not hold exactly
    /// `width * height` RGBA pixels, or the device error if creation fails.
    pub fn from_rgba<D>(
        device: &mut D,
        name: impl Into<String>,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> RenderResult<Self>
    where
        D: GraphicsDevice<Texture = T>,
    {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::TextureSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        let handle = device.create_texture(width, height, pixels)?;
        let texture = Self {
            id: TextureId::next(),
            name: name.into(),
            handle,
            width,
            height,
        };
        log::debug!(
            "created texture `{}` ({}x{}) as {:?}",
            texture.name,
            width,
            height,
            texture.id
        );
        Ok(texture)
    }

    /// Decode an encoded image (PNG or JPEG) and upload it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ImageDecode`] if the bytes cannot be decoded,
    /// or the device error if creation fails.
    pub fn from_image_bytes<D>(
        device: &mut D,
        name: impl Into<String>,
        bytes: &[u8],
    ) -> RenderResult<Self>
    where
        D: GraphicsDevice<Texture = T>,
    {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        Self::from_rgba(device, name, width, height, &image.into_raw())
    }

    /// The 1×1 opaque white texture sampled by untextured primitives.
    ///
    /// # Errors
    ///
    /// Returns the device error if creation fails.
    pub fn white<D>(device: &mut D) -> RenderResult<Self>
    where
        D: GraphicsDevice<Texture = T>,
    {
        Self::from_rgba(device, "white", 1, 1, &[255; 4])
    }

    /// A white disc on a transparent background with a one-pixel
    /// anti-aliased rim. Stretched over a quad it draws an ellipse.
    ///
    /// # Errors
    ///
    /// Returns the device error if creation fails.
    pub fn circle_mask<D>(device: &mut D, diameter: u32) -> RenderResult<Self>
    where
        D: GraphicsDevice<Texture = T>,
    {
        let image = circle_mask_image(diameter.max(1));
        Self::from_rgba(device, "circle-mask", image.width(), image.height(), image.as_raw())
    }

    /// Identity used as the slot cache key.
    #[must_use]
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Human-readable name, for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device handle.
    #[must_use]
    pub fn handle(&self) -> T {
        self.handle
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Normalized UV rect of a pixel region of this texture.
    #[must_use]
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> UvRect {
        UvRect::from_pixels(x, y, width, height, [self.width, self.height])
    }

    /// Bind this texture to texture unit `slot`.
    pub fn bind_to_slot<D>(&self, device: &mut D, slot: u32)
    where
        D: GraphicsDevice<Texture = T>,
    {
        device.bind_texture(slot, self.handle);
    }

    /// Release the device texture.
    pub fn destroy<D>(self, device: &mut D)
    where
        D: GraphicsDevice<Texture = T>,
    {
        device.delete_texture(self.handle);
    }
}

/// Rasterize the circle mask: alpha is the pixel's coverage of a disc
/// inscribed in the image, approximated by distance to the rim.
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn circle_mask_image(diameter: u32) -> image::RgbaImage {
    let radius = diameter as f32 / 2.0;
    image::RgbaImage::from_fn(diameter, diameter, |x, y| {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        let coverage = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
        image::Rgba([255, 255, 255, (coverage * 255.0).round() as u8])
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::recording::{DeviceCommand, RecordingDevice};

    #[test]
    fn ids_are_unique() {
        let mut device = RecordingDevice::new();
        let a = Texture::white(&mut device).unwrap();
        let b = Texture::white(&mut device).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn rejects_mismatched_pixel_data() {
        let mut device = RecordingDevice::new();
        let err = Texture::from_rgba(&mut device, "bad", 2, 2, &[0; 12]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TextureSize {
                expected: 16,
                actual: 12,
                ..
            }
        ));
        assert!(device.commands().is_empty());
    }

    #[test]
    fn decodes_png_bytes() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut device = RecordingDevice::new();
        let texture = Texture::from_image_bytes(&mut device, "png", &png).unwrap();
        assert_eq!((texture.width(), texture.height()), (3, 2));
        assert_eq!(device.buffer_contents(texture.handle())[..4], [10, 20, 30, 255]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let mut device = RecordingDevice::new();
        let err = Texture::from_image_bytes(&mut device, "junk", b"not an image").unwrap_err();
        assert!(matches!(err, RenderError::ImageDecode(_)));
    }

    #[test]
    fn circle_mask_is_opaque_inside_and_clear_in_corners() {
        let image = circle_mask_image(64);
        assert_eq!(image.get_pixel(32, 32)[3], 255);
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(63, 63)[3], 0);
        let rim = image.get_pixel(0, 32)[3];
        assert!(rim > 0 && rim < 255, "rim alpha {rim}");
    }

    #[test]
    fn bind_to_slot_targets_requested_unit() {
        let mut device = RecordingDevice::new();
        let texture = Texture::white(&mut device).unwrap();
        texture.bind_to_slot(&mut device, 5);
        assert_eq!(
            device.commands().last(),
            Some(&DeviceCommand::BindTexture {
                unit: 5,
                texture: texture.handle(),
            })
        );
    }

    #[test]
    fn region_normalizes_pixels() {
        let mut device = RecordingDevice::new();
        let texture = Texture::from_rgba(&mut device, "atlas", 4, 2, &[0; 32]).unwrap();
        let uv = texture.region(2, 1, 2, 1);
        assert_eq!(uv, UvRect::new([0.5, 0.5], [1.0, 1.0]));
    }
}
