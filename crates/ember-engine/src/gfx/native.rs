//! Desktop OpenGL backend over `glow`.

use std::ffi::c_void;
use std::num::NonZeroU32;

use anyhow::{ensure, Result};
use glow::HasContext;

use super::consts::{MAX_TEXTURE_SIZE, VIEWPORT};
use super::handles::{Buffer, Program, Shader, Texture, UniformLocation, VertexArray};
use super::{Capabilities, GraphicsContext};

/// [`GraphicsContext`] backed by a desktop GL 3.3+ context.
///
/// The native context must stay current on the calling thread for as long as
/// this value is used.
pub struct NativeContext {
    gl: glow::Context,
}

impl NativeContext {
    /// Loads GL entry points through `loader` (typically the windowing
    /// library's `get_proc_address`).
    ///
    /// # Safety
    /// A GL context must be current on this thread and `loader` must return
    /// valid function pointers for it.
    pub unsafe fn from_loader_function<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        let version = gl.version();
        ensure!(
            version.major >= 3,
            "OpenGL 3.0 or newer is required, driver reports {}.{}",
            version.major,
            version.minor
        );
        log::info!(
            "native GL context {}.{} ({})",
            version.major,
            version.minor,
            version.vendor_info
        );
        Ok(Self { gl })
    }

    /// Wraps an already-loaded `glow` context.
    pub fn from_glow(gl: glow::Context) -> Self {
        Self { gl }
    }
}

// ── handle conversions ────────────────────────────────────────────────────

#[inline]
fn id(raw: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(raw)
}

#[inline]
fn native_buffer(b: Buffer) -> Option<glow::NativeBuffer> {
    id(b.0).map(glow::NativeBuffer)
}

#[inline]
fn native_shader(s: Shader) -> Option<glow::NativeShader> {
    id(s.0).map(glow::NativeShader)
}

#[inline]
fn native_program(p: Program) -> Option<glow::NativeProgram> {
    id(p.0).map(glow::NativeProgram)
}

#[inline]
fn native_texture(t: Texture) -> Option<glow::NativeTexture> {
    id(t.0).map(glow::NativeTexture)
}

#[inline]
fn native_vao(v: VertexArray) -> Option<glow::NativeVertexArray> {
    id(v.0).map(glow::NativeVertexArray)
}

#[inline]
fn native_location(l: UniformLocation) -> Option<glow::NativeUniformLocation> {
    l.is_valid().then(|| glow::NativeUniformLocation(l.0 as u32))
}

fn created<T>(what: &str, result: std::result::Result<T, String>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            log::error!("glCreate{what} failed: {e}");
            None
        }
    }
}

impl GraphicsContext for NativeContext {
    fn capabilities(&self) -> Capabilities {
        let v = self.gl.version();
        let max_texture_size = unsafe { self.gl.get_parameter_i32(MAX_TEXTURE_SIZE) };
        Capabilities {
            version: format!("{}.{} {}", v.major, v.minor, v.vendor_info),
            vertex_arrays: v.major >= 3,
            max_texture_size: max_texture_size.max(0) as u32,
        }
    }

    fn error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Buffer {
        created("Buffer", unsafe { self.gl.create_buffer() })
            .map_or(Buffer::INVALID, |b| Buffer(b.0.get()))
    }

    fn delete_buffer(&self, buffer: Buffer) {
        if let Some(b) = native_buffer(buffer) {
            unsafe { self.gl.delete_buffer(b) };
        }
    }

    fn bind_buffer(&self, target: u32, buffer: Buffer) {
        unsafe { self.gl.bind_buffer(target, native_buffer(buffer)) };
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) };
    }

    fn buffer_data_size(&self, target: u32, size: usize, usage: u32) {
        unsafe { self.gl.buffer_data_size(target, size as i32, usage) };
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        unsafe { self.gl.buffer_sub_data_u8_slice(target, offset as i32, data) };
    }

    // ── shaders and programs ──────────────────────────────────────────────

    fn create_shader(&self, stage: u32) -> Shader {
        created("Shader", unsafe { self.gl.create_shader(stage) })
            .map_or(Shader::INVALID, |s| Shader(s.0.get()))
    }

    fn delete_shader(&self, shader: Shader) {
        if let Some(s) = native_shader(shader) {
            unsafe { self.gl.delete_shader(s) };
        }
    }

    fn shader_source(&self, shader: Shader, source: &str) {
        if let Some(s) = native_shader(shader) {
            unsafe { self.gl.shader_source(s, source) };
        }
    }

    fn compile_shader(&self, shader: Shader) {
        if let Some(s) = native_shader(shader) {
            unsafe { self.gl.compile_shader(s) };
        }
    }

    fn shader_compile_status(&self, shader: Shader) -> bool {
        native_shader(shader).is_some_and(|s| unsafe { self.gl.get_shader_compile_status(s) })
    }

    fn shader_info_log(&self, shader: Shader) -> String {
        native_shader(shader)
            .map(|s| unsafe { self.gl.get_shader_info_log(s) })
            .unwrap_or_default()
    }

    fn create_program(&self) -> Program {
        created("Program", unsafe { self.gl.create_program() })
            .map_or(Program::INVALID, |p| Program(p.0.get()))
    }

    fn delete_program(&self, program: Program) {
        if let Some(p) = native_program(program) {
            unsafe { self.gl.delete_program(p) };
        }
    }

    fn attach_shader(&self, program: Program, shader: Shader) {
        if let (Some(p), Some(s)) = (native_program(program), native_shader(shader)) {
            unsafe { self.gl.attach_shader(p, s) };
        }
    }

    fn link_program(&self, program: Program) {
        if let Some(p) = native_program(program) {
            unsafe { self.gl.link_program(p) };
        }
    }

    fn program_link_status(&self, program: Program) -> bool {
        native_program(program).is_some_and(|p| unsafe { self.gl.get_program_link_status(p) })
    }

    fn program_info_log(&self, program: Program) -> String {
        native_program(program)
            .map(|p| unsafe { self.gl.get_program_info_log(p) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: Program) {
        unsafe { self.gl.use_program(native_program(program)) };
    }

    fn uniform_location(&self, program: Program, name: &str) -> UniformLocation {
        native_program(program)
            .and_then(|p| unsafe { self.gl.get_uniform_location(p, name) })
            .map_or(UniformLocation::INVALID, |l| UniformLocation(l.0 as i32))
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    fn uniform_1i(&self, location: UniformLocation, v: i32) {
        if let Some(l) = native_location(location) {
            unsafe { self.gl.uniform_1_i32(Some(&l), v) };
        }
    }

    fn uniform_1f(&self, location: UniformLocation, v: f32) {
        if let Some(l) = native_location(location) {
            unsafe { self.gl.uniform_1_f32(Some(&l), v) };
        }
    }

    fn uniform_2f(&self, location: UniformLocation, x: f32, y: f32) {
        if let Some(l) = native_location(location) {
            unsafe { self.gl.uniform_2_f32(Some(&l), x, y) };
        }
    }

    fn uniform_4f(&self, location: UniformLocation, v: [f32; 4]) {
        if let Some(l) = native_location(location) {
            unsafe { self.gl.uniform_4_f32(Some(&l), v[0], v[1], v[2], v[3]) };
        }
    }

    fn uniform_matrix_4fv(&self, location: UniformLocation, m: &[f32; 16]) {
        if let Some(l) = native_location(location) {
            unsafe { self.gl.uniform_matrix_4_f32_slice(Some(&l), false, m) };
        }
    }

    // ── vertex arrays ─────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> VertexArray {
        created("VertexArray", unsafe { self.gl.create_vertex_array() })
            .map_or(VertexArray::INVALID, |v| VertexArray(v.0.get()))
    }

    fn delete_vertex_array(&self, vao: VertexArray) {
        if let Some(v) = native_vao(vao) {
            unsafe { self.gl.delete_vertex_array(v) };
        }
    }

    fn bind_vertex_array(&self, vao: VertexArray) {
        unsafe { self.gl.bind_vertex_array(native_vao(vao)) };
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, data_type, normalized, stride, offset)
        };
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Texture {
        created("Texture", unsafe { self.gl.create_texture() })
            .map_or(Texture::INVALID, |t| Texture(t.0.get()))
    }

    fn delete_texture(&self, texture: Texture) {
        if let Some(t) = native_texture(texture) {
            unsafe { self.gl.delete_texture(t) };
        }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(unit) };
    }

    fn bind_texture(&self, target: u32, texture: Texture) {
        unsafe { self.gl.bind_texture(target, native_texture(texture)) };
    }

    fn tex_parameter(&self, target: u32, name: u32, value: u32) {
        unsafe { self.gl.tex_parameter_i32(target, name, value as i32) };
    }

    fn pixel_store(&self, name: u32, value: i32) {
        unsafe { self.gl.pixel_store_i32(name, value) };
    }

    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        width: u32,
        height: u32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            self.gl.tex_image_2d(
                target,
                level,
                format as i32,
                width as i32,
                height as i32,
                0,
                format,
                data_type,
                pixels,
            )
        };
    }

    fn tex_sub_image_2d(
        &self,
        target: u32,
        level: i32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        format: u32,
        data_type: u32,
        pixels: &[u8],
    ) {
        unsafe {
            self.gl.tex_sub_image_2d(
                target,
                level,
                x,
                y,
                width as i32,
                height as i32,
                format,
                data_type,
                glow::PixelUnpackData::Slice(pixels),
            )
        };
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) };
    }

    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32) {
        unsafe { self.gl.draw_elements(mode, count, index_type, offset) };
    }

    // ── global state ──────────────────────────────────────────────────────

    fn enable(&self, cap: u32) {
        unsafe { self.gl.enable(cap) };
    }

    fn disable(&self, cap: u32) {
        unsafe { self.gl.disable(cap) };
    }

    fn blend_func(&self, src: u32, dst: u32) {
        unsafe { self.gl.blend_func(src, dst) };
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) };
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) };
    }

    fn get_viewport(&self) -> [i32; 4] {
        let mut out = [0i32; 4];
        unsafe { self.gl.get_parameter_i32_slice(VIEWPORT, &mut out) };
        out
    }
}
