//! [`GraphicsDevice`] over OpenGL via [glow].
//!
//! [glow]: https://docs.rs/glow

use std::sync::Arc;

use glow::{HasContext, PixelUnpackData};

use crate::config::BatchConfig;
use crate::device::{AttributeBinding, BufferKind, GraphicsDevice};
use crate::error::{RenderError, RenderResult};
use crate::shaders;

/// GL internal format for RGBA8 textures, pre-cast to the `i32` that
/// `tex_image_2d` expects.
#[expect(clippy::cast_possible_wrap)]
const RGBA8_INTERNAL_FORMAT: i32 = glow::RGBA8 as i32;

/// Convert a `u32` to `i32` for GL API calls.
///
/// # Panics
///
/// Panics if `value > i32::MAX`. In practice, this is unreachable for
/// texture dimensions and batch capacities.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).expect("dimension exceeds i32::MAX")
}

/// Convert a byte length to the `i32` GL buffer APIs take.
///
/// # Errors
///
/// Returns [`RenderError::ResourceCreation`] for buffers above 2 GiB.
fn gl_len(len: usize) -> RenderResult<i32> {
    i32::try_from(len)
        .map_err(|_| RenderError::creation("buffer", format!("{len} bytes exceed i32::MAX")))
}

fn target(kind: BufferKind) -> u32 {
    match kind {
        BufferKind::Vertex => glow::ARRAY_BUFFER,
        BufferKind::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

/// OpenGL implementation of [`GraphicsDevice`].
///
/// Owns the batch shader program and the vertex array object recording the
/// attribute bindings. Draws use premultiplied-alpha blending.
///
/// # Example
///
/// ```no_run
/// # use glow_batch2d::{BatchConfig, GlowDevice, Renderer2D};
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>) -> Result<(), glow_batch2d::RenderError> {
/// let config = BatchConfig::default();
/// // During setup (with a current GL context):
/// let device = unsafe { GlowDevice::new(gl, &config) }?;
/// let mut renderer = Renderer2D::new(device, config)?;
///
/// // Each frame:
/// renderer.begin_frame([800, 600]);
/// renderer.fill_circle(glow_batch2d::point(400.0, 300.0), 50.0, [0.2, 0.6, 1.0, 1.0]);
/// renderer.end_frame();
/// # Ok(())
/// # }
/// ```
pub struct GlowDevice {
    /// The OpenGL context, shared via [`Arc`] so the caller can keep using
    /// it for its own drawing.
    gl: Arc<glow::Context>,
    /// Compiled batch program.
    program: glow::Program,
    /// Vertex array object holding the batch attribute layout.
    vao: glow::VertexArray,
    /// Location of `u_resolution`, the viewport size in pixels.
    resolution: glow::UniformLocation,
    /// Samplers declared by the fragment shader.
    texture_slots: u32,
}

impl GlowDevice {
    /// Compile the batch program for `config.max_texture_slots` texture
    /// units and create the vertex array object.
    ///
    /// # Safety
    ///
    /// The `gl` context must be current and valid for every later call on
    /// this device. The caller must ensure that [`destroy`](Self::destroy) is
    /// called before the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the device exposes fewer texture units than
    /// configured, or if program compilation or VAO creation fails.
    pub unsafe fn new(gl: Arc<glow::Context>, config: &BatchConfig) -> RenderResult<Self> {
        let available = unsafe { gl.get_parameter_i32(glow::MAX_TEXTURE_IMAGE_UNITS) };
        let available = u32::try_from(available).unwrap_or(0);
        if config.max_texture_slots > available {
            return Err(RenderError::TooManyTextureSlots {
                requested: config.max_texture_slots,
                available,
            });
        }

        let fragment_src = shaders::batch_fragment_src(config.max_texture_slots);
        let program =
            unsafe { shaders::compile_program(&gl, shaders::BATCH_VERTEX_SRC, &fragment_src)? };

        let resolution = unsafe { gl.get_uniform_location(program, "u_resolution") }
            .ok_or_else(|| RenderError::creation("uniform", "u_resolution missing"))?;

        unsafe {
            gl.use_program(Some(program));
            for slot in 0..config.max_texture_slots {
                let name = format!("u_textures[{slot}]");
                match gl.get_uniform_location(program, &name) {
                    Some(location) => gl.uniform_1_i32(Some(&location), gl_size(slot)),
                    None => log::warn!("sampler `{name}` inactive in batch program"),
                }
            }
            gl.use_program(None);
        }

        let vao = unsafe { gl.create_vertex_array() }
            .map_err(|e| RenderError::creation("vertex array", e))?;

        log::info!(
            "GL batch program ready: {} of {} texture units",
            config.max_texture_slots,
            available
        );

        Ok(Self {
            gl,
            program,
            vao,
            resolution,
            texture_slots: config.max_texture_slots,
        })
    }

    /// The shared GL context.
    #[must_use]
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    /// Set default texture filtering and wrapping parameters.
    unsafe fn set_default_tex_params(gl: &glow::Context) {
        // GL constant values are small enough that the cast is always safe.
        #[expect(clippy::cast_possible_wrap)]
        unsafe {
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
        }
    }

    /// Clean up the program and vertex array.
    ///
    /// Buffers and textures are released by their owners
    /// ([`Renderer2D::destroy`](crate::Renderer2D::destroy) returns this
    /// device after releasing its own).
    ///
    /// # Safety
    ///
    /// Must be called with the same GL context that was used to create the
    /// device, and must be called exactly once.
    pub unsafe fn destroy(&self) {
        let gl = &self.gl;
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vao);
        }
    }
}

// SAFETY (all methods): `GlowDevice::new` requires the context to stay
// current and valid for the device's lifetime.
impl GraphicsDevice for GlowDevice {
    type Buffer = glow::Buffer;
    type Texture = glow::Texture;

    fn create_buffer(&mut self, kind: BufferKind, byte_len: usize) -> RenderResult<glow::Buffer> {
        let size = gl_len(byte_len)?;
        let gl = &self.gl;
        unsafe {
            let buffer = gl
                .create_buffer()
                .map_err(|e| RenderError::creation("buffer", e))?;
            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(target(kind), Some(buffer));
            gl.buffer_data_size(target(kind), size, glow::DYNAMIC_DRAW);
            gl.bind_vertex_array(None);
            Ok(buffer)
        }
    }

    fn write_buffer(&mut self, kind: BufferKind, buffer: glow::Buffer, data: &[u8]) {
        let gl = &self.gl;
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(target(kind), Some(buffer));
            gl.buffer_sub_data_u8_slice(target(kind), 0, data);
            gl.bind_vertex_array(None);
        }
    }

    fn max_texture_slots(&self) -> u32 {
        self.texture_slots
    }

    fn attribute_location(&mut self, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(self.program, name) }
    }

    fn bind_attribute(&mut self, buffer: glow::Buffer, binding: AttributeBinding) {
        let gl = &self.gl;
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.enable_vertex_attrib_array(binding.location);
            gl.vertex_attrib_pointer_f32(
                binding.location,
                binding.components,
                glow::FLOAT,
                false,
                binding.stride_bytes,
                binding.offset_bytes,
            );
            gl.bind_vertex_array(None);
        }
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> RenderResult<glow::Texture> {
        let gl = &self.gl;
        unsafe {
            let texture = gl
                .create_texture()
                .map_err(|e| RenderError::creation("texture", e))?;
            // Unit 0 holds the white texture, which is rebound before every
            // draw, so uploading through it cannot disturb caller slots.
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                RGBA8_INTERNAL_FORMAT,
                gl_size(width),
                gl_size(height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(rgba)),
            );
            Self::set_default_tex_params(gl);
            Ok(texture)
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: glow::Texture) {
        let gl = &self.gl;
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.active_texture(glow::TEXTURE0);
        }
    }

    fn set_resolution(&mut self, width: f32, height: f32) {
        let gl = &self.gl;
        unsafe {
            gl.use_program(Some(self.program));
            gl.uniform_2_f32(Some(&self.resolution), width, height);
        }
    }

    fn draw_indexed_triangles(
        &mut self,
        _vertices: glow::Buffer,
        indices: glow::Buffer,
        index_count: u32,
    ) {
        let gl = &self.gl;
        unsafe {
            gl.use_program(Some(self.program));
            // Set up blending for premultiplied alpha.
            gl.enable(glow::BLEND);
            gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);

            // The VAO already points its attributes at the vertex buffer.
            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(indices));
            gl.draw_elements(
                glow::TRIANGLES,
                gl_size(index_count),
                glow::UNSIGNED_INT,
                0,
            );
            gl.bind_vertex_array(None);
        }
    }

    fn delete_buffer(&mut self, buffer: glow::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn delete_texture(&mut self, texture: glow::Texture) {
        unsafe { self.gl.delete_texture(texture) };
    }
}
