//! GLSL sources for the batch program and compilation helpers.
//!
//! All shaders target GLSL 1.40 (OpenGL 3.1), which is widely supported on
//! desktop platforms.

use std::fmt::Write as _;

use glow::HasContext;

use crate::error::{RenderError, RenderResult};

/// Vertex shader for batched primitives.
///
/// Maps pixel positions (origin top-left, y down) to clip space and forwards
/// color, UV, texture slot and text range to the fragment stage.
///
/// # Uniforms
///
/// | Name           | Type   | Description             |
/// |----------------|--------|-------------------------|
/// | `u_resolution` | `vec2` | Viewport size in pixels |
pub const BATCH_VERTEX_SRC: &str = r"#version 140

in vec2 a_position;
in vec4 a_color;
in vec2 a_uv;
in float a_texture_slot;
in float a_text_range;

uniform vec2 u_resolution;

out vec4 v_color;
out vec2 v_uv;
out float v_texture_slot;
out float v_text_range;

void main() {
    v_color = a_color;
    v_uv = a_uv;
    v_texture_slot = a_texture_slot;
    v_text_range = a_text_range;

    // Convert from [0, resolution] to [-1, 1] (flip Y for GL)
    vec2 ndc = (a_position / u_resolution) * 2.0 - 1.0;
    ndc.y = -ndc.y;

    gl_Position = vec4(ndc, 0.0, 1.0);
}
";

/// Build the fragment shader for a program with `slots` texture units.
///
/// GLSL 1.40 does not allow indexing a sampler array with a varying, so the
/// sampler is selected through an unrolled chain of constant indices.
///
/// Two modes, chosen per vertex by `v_text_range`:
///
/// | Range  | Mode                                                      |
/// |--------|-----------------------------------------------------------|
/// | `<= 0` | `texel * color`                                           |
/// | `> 0`  | distance-field glyph: RGB median thresholded at 0.5       |
///
/// Glyph coverage is scaled by the screen-space range before clamping.
///
/// All output colors are premultiplied by alpha before writing.
///
/// # Uniforms
///
/// | Name            | Type                 | Description                   |
/// |-----------------|----------------------|-------------------------------|
/// | `u_textures[N]` | `sampler2D[slots]`   | Unit `i` bound to index `i`   |
#[must_use]
pub fn batch_fragment_src(slots: u32) -> String {
    let mut src = format!(
        r"#version 140

in vec4 v_color;
in vec2 v_uv;
in float v_texture_slot;
in float v_text_range;

uniform sampler2D u_textures[{slots}];

out vec4 frag_color;

vec4 sample_slot(int slot, vec2 uv) {{
"
    );
    for slot in 0..slots {
        // Writing to a String cannot fail.
        let _ = writeln!(
            src,
            "    if (slot == {slot}) return texture(u_textures[{slot}], uv);"
        );
    }
    src.push_str(
        r"    return vec4(1.0);
}

float median(float r, float g, float b) {
    return max(min(r, g), min(max(r, g), b));
}

void main() {
    vec4 texel = sample_slot(int(v_texture_slot + 0.5), v_uv);

    if (v_text_range > 0.0) {
        float distance = median(texel.r, texel.g, texel.b) - 0.5;
        float alpha = clamp(distance * v_text_range + 0.5, 0.0, 1.0);
        frag_color = vec4(v_color.rgb, v_color.a * alpha);
    } else {
        frag_color = texel * v_color;
    }

    // Premultiply alpha for correct blending
    frag_color.rgb *= frag_color.a;
}
",
    );
    src
}

/// Compile a shader program from vertex and fragment source strings.
///
/// The compiled shader objects are detached and deleted after successful
/// linking, so only the program handle needs to be cleaned up by the caller.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns [`RenderError::ShaderCompile`] or [`RenderError::ProgramLink`]
/// with the driver's info log.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> RenderResult<glow::Program> {
    let program =
        unsafe { gl.create_program() }.map_err(|e| RenderError::creation("program", e))?;

    let vs = unsafe { compile_shader(gl, glow::VERTEX_SHADER, vertex_src) }?;
    let fs = unsafe { compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src) }?;

    unsafe {
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(RenderError::ProgramLink(log));
        }

        // Shaders can be detached and deleted after successful linking.
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
    }

    Ok(program)
}

/// Compile a single shader stage (vertex or fragment) from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> RenderResult<glow::Shader> {
    unsafe {
        let shader = gl
            .create_shader(shader_type)
            .map_err(|e| RenderError::creation("shader", e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile(log));
        }

        Ok(shader)
    }
}
