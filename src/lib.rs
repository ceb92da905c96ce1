//! An immediate-mode 2D renderer that batches draw calls over OpenGL via
//! [glow].
//!
//! Callers issue many small drawing operations per frame (rectangles,
//! lines, polygons, sprites, text) through [`Renderer2D`]. Each operation is
//! encoded into quads or triangles and staged by a [`BatchEngine`], which
//! submits the staged geometry as a single indexed draw call when the frame
//! ends or when one of three limits would be exceeded:
//!
//! - **vertex capacity** of the batch buffers,
//! - **index capacity** of the batch buffers,
//! - **texture units**: every textured primitive references its texture by
//!   a slot number baked into its vertices, and one draw can only sample as
//!   many textures as the shader declares.
//!
//! Slot 0 always holds a 1×1 white texture so untextured primitives sample
//! validly without touching the slot cache.
//!
//! # Devices
//!
//! All GPU work goes through the [`GraphicsDevice`] trait. [`GlowDevice`]
//! (feature `glow`, on by default) implements it over OpenGL 3.1;
//! [`RecordingDevice`] implements it headless, recording every command,
//! which is how the crate's own tests observe draw calls.
//!
//! # Safety
//!
//! Creating a [`GlowDevice`] requires a valid, current OpenGL context that
//! stays current for the device's lifetime. GL objects are not released on
//! drop: call [`Renderer2D::destroy`] and then [`GlowDevice::destroy`].
//!
//! [glow]: https://docs.rs/glow

mod batch;
mod buffers;
mod config;
mod device;
pub mod encode;
mod error;
#[cfg(feature = "glow")]
mod glow_device;
mod layout;
mod recording;
mod renderer;
#[cfg(feature = "glow")]
pub mod shaders;
mod slots;
pub mod tessellate;
pub mod text;
mod texture;
mod types;

pub use batch::{BatchEngine, BatchStats, FlushReason};
pub use buffers::GeometryBuffers;
pub use config::{
    BatchConfig, DEFAULT_MAX_QUADS, DEFAULT_MAX_TEXTURE_SLOTS, MAX_SUPPORTED_TEXTURE_SLOTS,
};
pub use device::{AttributeBinding, BufferKind, GraphicsDevice};
pub use error::{RenderError, RenderResult};
#[cfg(feature = "glow")]
pub use glow_device::GlowDevice;
pub use layout::{VertexAttribute, VertexLayout};
pub use recording::{DeviceCommand, RecordingDevice};
pub use renderer::Renderer2D;
pub use slots::TextureSlotCache;
pub use text::{GlyphAtlas, MonospaceAtlas, TextAlign, TextStyle};
pub use texture::{Texture, TextureId, CIRCLE_MASK_DIAMETER};
pub use types::{
    point, size, vector, Angle, Color, Point, Size, UvRect, Vector, Vertex, NO_TEXT_RANGE, WHITE,
    WHITE_SLOT,
};
