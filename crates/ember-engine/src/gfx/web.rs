//! Browser WebGL2 backend over `web-sys`.
//!
//! WebGL hands out JS objects instead of integers, so every object kind gets
//! a table mapping our `u32` handles to the live JS value.

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{anyhow, Context as _, Result};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::consts::{FRAMEBUFFER_SRGB, MAX_TEXTURE_SIZE, VIEWPORT};
use super::handles::{
    Buffer, HandleCounter, Program, Shader, Texture, UniformCache, UniformLocation, VertexArray,
};
use super::program::glsl_es_source;
use super::{Capabilities, GraphicsContext};

struct HandleTable<T> {
    objects: RefCell<HashMap<u32, T>>,
}

impl<T: Clone> HandleTable<T> {
    fn new() -> Self {
        Self { objects: RefCell::new(HashMap::new()) }
    }

    fn insert(&self, id: u32, object: T) {
        self.objects.borrow_mut().insert(id, object);
    }

    fn get(&self, id: u32) -> Option<T> {
        self.objects.borrow().get(&id).cloned()
    }

    fn remove(&self, id: u32) -> Option<T> {
        self.objects.borrow_mut().remove(&id)
    }
}

/// [`GraphicsContext`] backed by a canvas's `webgl2` context.
pub struct WebContext {
    gl: Gl,
    ids: HandleCounter,
    buffers: HandleTable<WebGlBuffer>,
    shaders: HandleTable<WebGlShader>,
    programs: HandleTable<WebGlProgram>,
    textures: HandleTable<WebGlTexture>,
    vaos: HandleTable<WebGlVertexArrayObject>,
    locations: HandleTable<WebGlUniformLocation>,
    uniforms: UniformCache,
}

impl WebContext {
    /// Acquires the `webgl2` context of `canvas`.
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self> {
        let gl = canvas
            .get_context("webgl2")
            .map_err(|e| anyhow!("getContext(\"webgl2\") threw: {e:?}"))?
            .context("canvas has no webgl2 context")?
            .dyn_into::<Gl>()
            .map_err(|_| anyhow!("webgl2 context has an unexpected type"))?;
        Ok(Self::from_context(gl))
    }

    pub fn from_context(gl: Gl) -> Self {
        log::info!("WebGL2 context acquired");
        Self {
            gl,
            ids: HandleCounter::new(),
            buffers: HandleTable::new(),
            shaders: HandleTable::new(),
            programs: HandleTable::new(),
            textures: HandleTable::new(),
            vaos: HandleTable::new(),
            locations: HandleTable::new(),
            uniforms: UniformCache::new(),
        }
    }

    fn location(&self, l: UniformLocation) -> Option<WebGlUniformLocation> {
        if l.is_valid() { self.locations.get(l.0 as u32) } else { None }
    }
}

impl GraphicsContext for WebContext {
    fn capabilities(&self) -> Capabilities {
        let version = self
            .gl
            .get_parameter(Gl::VERSION)
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_else(|| "WebGL 2.0".to_owned());
        let max_texture_size = self
            .gl
            .get_parameter(MAX_TEXTURE_SIZE)
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(2048.0);
        Capabilities { version, vertex_arrays: true, max_texture_size: max_texture_size as u32 }
    }

    fn error(&self) -> u32 {
        self.gl.get_error()
    }

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Buffer {
        let Some(obj) = self.gl.create_buffer() else {
            log::error!("createBuffer returned null");
            return Buffer::INVALID;
        };
        let id = self.ids.next();
        self.buffers.insert(id, obj);
        Buffer(id)
    }

    fn delete_buffer(&self, buffer: Buffer) {
        if let Some(obj) = self.buffers.remove(buffer.0) {
            self.gl.delete_buffer(Some(&obj));
        }
    }

    fn bind_buffer(&self, target: u32, buffer: Buffer) {
        self.gl.bind_buffer(target, self.buffers.get(buffer.0).as_ref());
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.gl.buffer_data_with_u8_array(target, data, usage);
    }

    fn buffer_data_size(&self, target: u32, size: usize, usage: u32) {
        self.gl.buffer_data_with_i32(target, size as i32, usage);
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        self.gl.buffer_sub_data_with_i32_and_u8_array(target, offset as i32, data);
    }

    // ── shaders and programs ──────────────────────────────────────────────

    fn create_shader(&self, stage: u32) -> Shader {
        let Some(obj) = self.gl.create_shader(stage) else {
            log::error!("createShader returned null");
            return Shader::INVALID;
        };
        let id = self.ids.next();
        self.shaders.insert(id, obj);
        Shader(id)
    }

    fn delete_shader(&self, shader: Shader) {
        if let Some(obj) = self.shaders.remove(shader.0) {
            self.gl.delete_shader(Some(&obj));
        }
    }

    fn shader_source(&self, shader: Shader, source: &str) {
        if let Some(obj) = self.shaders.get(shader.0) {
            self.gl.shader_source(&obj, &glsl_es_source(source));
        }
    }

    fn compile_shader(&self, shader: Shader) {
        if let Some(obj) = self.shaders.get(shader.0) {
            self.gl.compile_shader(&obj);
        }
    }

    fn shader_compile_status(&self, shader: Shader) -> bool {
        self.shaders.get(shader.0).is_some_and(|obj| {
            self.gl
                .get_shader_parameter(&obj, Gl::COMPILE_STATUS)
                .as_bool()
                .unwrap_or(false)
        })
    }

    fn shader_info_log(&self, shader: Shader) -> String {
        self.shaders
            .get(shader.0)
            .and_then(|obj| self.gl.get_shader_info_log(&obj))
            .unwrap_or_default()
    }

    fn create_program(&self) -> Program {
        let Some(obj) = self.gl.create_program() else {
            log::error!("createProgram returned null");
            return Program::INVALID;
        };
        let id = self.ids.next();
        self.programs.insert(id, obj);
        Program(id)
    }

    fn delete_program(&self, program: Program) {
        for id in self.uniforms.forget_program(program) {
            self.locations.remove(id as u32);
        }
        if let Some(obj) = self.programs.remove(program.0) {
            self.gl.delete_program(Some(&obj));
        }
    }

    fn attach_shader(&self, program: Program, shader: Shader) {
        if let (Some(p), Some(s)) = (self.programs.get(program.0), self.shaders.get(shader.0)) {
            self.gl.attach_shader(&p, &s);
        }
    }

    fn link_program(&self, program: Program) {
        if let Some(p) = self.programs.get(program.0) {
            self.gl.link_program(&p);
        }
    }

    fn program_link_status(&self, program: Program) -> bool {
        self.programs.get(program.0).is_some_and(|p| {
            self.gl
                .get_program_parameter(&p, Gl::LINK_STATUS)
                .as_bool()
                .unwrap_or(false)
        })
    }

    fn program_info_log(&self, program: Program) -> String {
        self.programs
            .get(program.0)
            .and_then(|p| self.gl.get_program_info_log(&p))
            .unwrap_or_default()
    }

    fn use_program(&self, program: Program) {
        self.gl.use_program(self.programs.get(program.0).as_ref());
    }

    fn uniform_location(&self, program: Program, name: &str) -> UniformLocation {
        let Some(p) = self.programs.get(program.0) else {
            return UniformLocation::INVALID;
        };
        self.uniforms.get_or_resolve(program, name, || {
            let obj = self.gl.get_uniform_location(&p, name)?;
            let id = self.ids.next();
            self.locations.insert(id, obj);
            Some(id as i32)
        })
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    fn uniform_1i(&self, location: UniformLocation, v: i32) {
        if let Some(l) = self.location(location) {
            self.gl.uniform1i(Some(&l), v);
        }
    }

    fn uniform_1f(&self, location: UniformLocation, v: f32) {
        if let Some(l) = self.location(location) {
            self.gl.uniform1f(Some(&l), v);
        }
    }

    fn uniform_2f(&self, location: UniformLocation, x: f32, y: f32) {
        if let Some(l) = self.location(location) {
            self.gl.uniform2f(Some(&l), x, y);
        }
    }

    fn uniform_4f(&self, location: UniformLocation, v: [f32; 4]) {
        if let Some(l) = self.location(location) {
            self.gl.uniform4f(Some(&l), v[0], v[1], v[2], v[3]);
        }
    }

    fn uniform_matrix_4fv(&self, location: UniformLocation, m: &[f32; 16]) {
        if let Some(l) = self.location(location) {
            self.gl.uniform_matrix4fv_with_f32_array(Some(&l), false, m);
        }
    }

    // ── vertex arrays ─────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> VertexArray {
        let Some(obj) = self.gl.create_vertex_array() else {
            log::error!("createVertexArray returned null");
            return VertexArray::INVALID;
        };
        let id = self.ids.next();
        self.vaos.insert(id, obj);
        VertexArray(id)
    }

    fn delete_vertex_array(&self, vao: VertexArray) {
        if let Some(obj) = self.vaos.remove(vao.0) {
            self.gl.delete_vertex_array(Some(&obj));
        }
    }

    fn bind_vertex_array(&self, vao: VertexArray) {
        self.gl.bind_vertex_array(self.vaos.get(vao.0).as_ref());
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.gl.enable_vertex_attrib_array(index);
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
        self.gl
            .vertex_attrib_pointer_with_i32(index, size, data_type, normalized, stride, offset);
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Texture {
        let Some(obj) = self.gl.create_texture() else {
            log::error!("createTexture returned null");
            return Texture::INVALID;
        };
        let id = self.ids.next();
        self.textures.insert(id, obj);
        Texture(id)
    }

    fn delete_texture(&self, texture: Texture) {
        if let Some(obj) = self.textures.remove(texture.0) {
            self.gl.delete_texture(Some(&obj));
        }
    }

    fn active_texture(&self, unit: u32) {
        self.gl.active_texture(unit);
    }

    fn bind_texture(&self, target: u32, texture: Texture) {
        self.gl.bind_texture(target, self.textures.get(texture.0).as_ref());
    }

    fn tex_parameter(&self, target: u32, name: u32, value: u32) {
        self.gl.tex_parameteri(target, name, value as i32);
    }

    fn pixel_store(&self, name: u32, value: i32) {
        self.gl.pixel_storei(name, value);
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
        let result = self
            .gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                target,
                level,
                format as i32,
                width as i32,
                height as i32,
                0,
                format,
                data_type,
                pixels,
            );
        if let Err(e) = result {
            log::warn!("texImage2D failed: {e:?}");
        }
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
        let result = self
            .gl
            .tex_sub_image_2d_with_i32_and_i32_and_u32_and_type_and_opt_u8_array(
                target,
                level,
                x,
                y,
                width as i32,
                height as i32,
                format,
                data_type,
                Some(pixels),
            );
        if let Err(e) = result {
            log::warn!("texSubImage2D failed: {e:?}");
        }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.gl.draw_arrays(mode, first, count);
    }

    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32) {
        self.gl.draw_elements_with_i32(mode, count, index_type, offset);
    }

    // ── global state ──────────────────────────────────────────────────────

    // WebGL2 has no FRAMEBUFFER_SRGB capability; toggling it is a no-op.
    fn enable(&self, cap: u32) {
        if cap != FRAMEBUFFER_SRGB {
            self.gl.enable(cap);
        }
    }

    fn disable(&self, cap: u32) {
        if cap != FRAMEBUFFER_SRGB {
            self.gl.disable(cap);
        }
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.gl.blend_func(src, dst);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.scissor(x, y, width, height);
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear(&self, mask: u32) {
        self.gl.clear(mask);
    }

    fn get_viewport(&self) -> [i32; 4] {
        let Ok(value) = self.gl.get_parameter(VIEWPORT) else {
            return [0; 4];
        };
        let Ok(array) = value.dyn_into::<js_sys::Int32Array>() else {
            return [0; 4];
        };
        let mut out = [0i32; 4];
        if array.length() >= 4 {
            array.slice(0, 4).copy_to(&mut out);
        }
        out
    }
}
