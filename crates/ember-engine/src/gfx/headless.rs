use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use super::consts::{COMPILE_STATUS, NO_ERROR};
use super::handles::{
    Buffer, HandleCounter, Program, Shader, Texture, UniformCache, UniformLocation, VertexArray,
};
use super::{Capabilities, GraphicsContext};

/// One recorded call on a [`HeadlessContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateBuffer(Buffer),
    DeleteBuffer(Buffer),
    BindBuffer { target: u32, buffer: Buffer },
    BufferData { target: u32, len: usize, usage: u32 },
    BufferDataSize { target: u32, size: usize, usage: u32 },
    BufferSubData { target: u32, offset: usize, data: Vec<u8> },

    CreateShader(Shader),
    DeleteShader(Shader),
    CompileShader(Shader),
    CreateProgram(Program),
    DeleteProgram(Program),
    LinkProgram(Program),
    UseProgram(Program),

    Uniform1i { location: UniformLocation, value: i32 },
    Uniform1f { location: UniformLocation, value: f32 },
    Uniform2f { location: UniformLocation, x: f32, y: f32 },
    Uniform4f { location: UniformLocation, value: [f32; 4] },
    UniformMatrix4 { location: UniformLocation },

    CreateVertexArray(VertexArray),
    DeleteVertexArray(VertexArray),
    BindVertexArray(VertexArray),
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, stride: i32, offset: i32 },

    CreateTexture(Texture),
    DeleteTexture(Texture),
    ActiveTexture(u32),
    BindTexture { target: u32, texture: Texture },
    TexParameter { name: u32, value: u32 },
    PixelStore { name: u32, value: i32 },
    TexImage2D { width: u32, height: u32, format: u32, pixels: Option<Vec<u8>> },
    TexSubImage2D { x: i32, y: i32, width: u32, height: u32, len: usize },

    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawElements { mode: u32, count: i32, offset: i32 },

    Enable(u32),
    Disable(u32),
    BlendFunc { src: u32, dst: u32 },
    Viewport([i32; 4]),
    Scissor([i32; 4]),
    ClearColor([f32; 4]),
    Clear(u32),
}

/// Context without a GPU: hands out handles and records every call.
///
/// Used by the unit tests and for dry runs where no window exists. Shader
/// compilation succeeds unless told otherwise; uniform locations resolve
/// unless hidden with [`HeadlessContext::hide_uniform`].
#[derive(Debug)]
pub struct HeadlessContext {
    calls: RefCell<Vec<GlCall>>,
    handles: HandleCounter,
    live: RefCell<HashSet<u32>>,

    sources: RefCell<HashMap<u32, String>>,
    fail_compile: RefCell<Option<String>>,
    fail_link: Cell<bool>,

    uniforms: UniformCache,
    next_uniform: Cell<i32>,
    hidden_uniforms: RefCell<HashSet<String>>,

    viewport: Cell<[i32; 4]>,
    vertex_arrays: Cell<bool>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            handles: HandleCounter::new(),
            live: RefCell::new(HashSet::new()),
            sources: RefCell::new(HashMap::new()),
            fail_compile: RefCell::new(None),
            fail_link: Cell::new(false),
            uniforms: UniformCache::new(),
            next_uniform: Cell::new(0),
            hidden_uniforms: RefCell::new(HashSet::new()),
            viewport: Cell::new([0, 0, 0, 0]),
            vertex_arrays: Cell::new(true),
        }
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    /// Returns and clears the call log.
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Number of objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.live.borrow().len()
    }

    /// Any shader whose source contains `needle` fails to compile.
    pub fn fail_compile_containing(&self, needle: &str) {
        *self.fail_compile.borrow_mut() = Some(needle.to_owned());
    }

    pub fn fail_link(&self) {
        self.fail_link.set(true);
    }

    /// Makes `name` resolve to the invalid location, as if the driver
    /// optimized it out.
    pub fn hide_uniform(&self, name: &str) {
        self.hidden_uniforms.borrow_mut().insert(name.to_owned());
    }

    /// Reports no vertex array support from [`GraphicsContext::capabilities`].
    pub fn disable_vertex_arrays(&self) {
        self.vertex_arrays.set(false);
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn create(&self) -> u32 {
        let id = self.handles.next();
        self.live.borrow_mut().insert(id);
        id
    }

    fn release(&self, id: u32) {
        self.live.borrow_mut().remove(&id);
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for HeadlessContext {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            version: "headless".to_owned(),
            vertex_arrays: self.vertex_arrays.get(),
            max_texture_size: 8192,
        }
    }

    fn error(&self) -> u32 {
        NO_ERROR
    }

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Buffer {
        let b = Buffer(self.create());
        self.record(GlCall::CreateBuffer(b));
        b
    }

    fn delete_buffer(&self, buffer: Buffer) {
        self.release(buffer.0);
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: u32, buffer: Buffer) {
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.record(GlCall::BufferData { target, len: data.len(), usage });
    }

    fn buffer_data_size(&self, target: u32, size: usize, usage: u32) {
        self.record(GlCall::BufferDataSize { target, size, usage });
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        self.record(GlCall::BufferSubData { target, offset, data: data.to_vec() });
    }

    // ── shaders and programs ──────────────────────────────────────────────

    fn create_shader(&self, _stage: u32) -> Shader {
        let s = Shader(self.create());
        self.record(GlCall::CreateShader(s));
        s
    }

    fn delete_shader(&self, shader: Shader) {
        self.release(shader.0);
        self.sources.borrow_mut().remove(&shader.0);
        self.record(GlCall::DeleteShader(shader));
    }

    fn shader_source(&self, shader: Shader, source: &str) {
        self.sources.borrow_mut().insert(shader.0, source.to_owned());
    }

    fn compile_shader(&self, shader: Shader) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: Shader) -> bool {
        let fail = self.fail_compile.borrow();
        let sources = self.sources.borrow();
        match (fail.as_deref(), sources.get(&shader.0)) {
            (Some(needle), Some(src)) => !src.contains(needle),
            (_, None) => false,
            (None, Some(_)) => true,
        }
    }

    fn shader_info_log(&self, shader: Shader) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            format!("0:1(1): error: headless compile failure (status {COMPILE_STATUS:#x})")
        }
    }

    fn create_program(&self) -> Program {
        let p = Program(self.create());
        self.record(GlCall::CreateProgram(p));
        p
    }

    fn delete_program(&self, program: Program) {
        self.release(program.0);
        self.uniforms.forget_program(program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn attach_shader(&self, _program: Program, _shader: Shader) {}

    fn link_program(&self, program: Program) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: Program) -> bool {
        !self.fail_link.get()
    }

    fn program_info_log(&self, _program: Program) -> String {
        if self.fail_link.get() {
            "error: headless link failure".to_owned()
        } else {
            String::new()
        }
    }

    fn use_program(&self, program: Program) {
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_location(&self, program: Program, name: &str) -> UniformLocation {
        if self.hidden_uniforms.borrow().contains(name) {
            return UniformLocation::INVALID;
        }
        self.uniforms.get_or_resolve(program, name, || {
            let id = self.next_uniform.get();
            self.next_uniform.set(id + 1);
            Some(id)
        })
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    fn uniform_1i(&self, location: UniformLocation, value: i32) {
        if location.is_valid() {
            self.record(GlCall::Uniform1i { location, value });
        }
    }

    fn uniform_1f(&self, location: UniformLocation, value: f32) {
        if location.is_valid() {
            self.record(GlCall::Uniform1f { location, value });
        }
    }

    fn uniform_2f(&self, location: UniformLocation, x: f32, y: f32) {
        if location.is_valid() {
            self.record(GlCall::Uniform2f { location, x, y });
        }
    }

    fn uniform_4f(&self, location: UniformLocation, value: [f32; 4]) {
        if location.is_valid() {
            self.record(GlCall::Uniform4f { location, value });
        }
    }

    fn uniform_matrix_4fv(&self, location: UniformLocation, _m: &[f32; 16]) {
        if location.is_valid() {
            self.record(GlCall::UniformMatrix4 { location });
        }
    }

    // ── vertex arrays ─────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> VertexArray {
        let v = VertexArray(self.create());
        self.record(GlCall::CreateVertexArray(v));
        v
    }

    fn delete_vertex_array(&self, vao: VertexArray) {
        self.release(vao.0);
        self.record(GlCall::DeleteVertexArray(vao));
    }

    fn bind_vertex_array(&self, vao: VertexArray) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer { index, size, stride, offset });
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Texture {
        let t = Texture(self.create());
        self.record(GlCall::CreateTexture(t));
        t
    }

    fn delete_texture(&self, texture: Texture) {
        self.release(texture.0);
        self.record(GlCall::DeleteTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Texture) {
        self.record(GlCall::BindTexture { target, texture });
    }

    fn tex_parameter(&self, _target: u32, name: u32, value: u32) {
        self.record(GlCall::TexParameter { name, value });
    }

    fn pixel_store(&self, name: u32, value: i32) {
        self.record(GlCall::PixelStore { name, value });
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        width: u32,
        height: u32,
        format: u32,
        _data_type: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D { width, height, format, pixels: pixels.map(<[u8]>::to_vec) });
    }

    fn tex_sub_image_2d(
        &self,
        _target: u32,
        _level: i32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        _format: u32,
        _data_type: u32,
        pixels: &[u8],
    ) {
        self.record(GlCall::TexSubImage2D { x, y, width, height, len: pixels.len() });
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: u32, count: i32, _index_type: u32, offset: i32) {
        self.record(GlCall::DrawElements { mode, count, offset });
    }

    // ── global state ──────────────────────────────────────────────────────

    fn enable(&self, cap: u32) {
        self.record(GlCall::Enable(cap));
    }

    fn disable(&self, cap: u32) {
        self.record(GlCall::Disable(cap));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(GlCall::BlendFunc { src, dst });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport.set([x, y, width, height]);
        self.record(GlCall::Viewport([x, y, width, height]));
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor([x, y, width, height]));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn get_viewport(&self) -> [i32; 4] {
        self.viewport.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::consts::{ARRAY_BUFFER, VERTEX_SHADER};

    #[test]
    fn handles_are_unique_and_tracked() {
        let gl = HeadlessContext::new();
        let a = gl.create_buffer();
        let b = gl.create_buffer();
        let t = gl.create_texture();
        assert_ne!(a, b);
        assert_ne!(a.0, t.0);
        assert_eq!(gl.live_objects(), 3);

        gl.delete_buffer(a);
        gl.delete_buffer(a);
        assert_eq!(gl.live_objects(), 2);
    }

    #[test]
    fn invalid_uniform_uploads_are_skipped() {
        let gl = HeadlessContext::new();
        gl.hide_uniform("u_gone");
        let program = gl.create_program();
        let loc = gl.uniform_location(program, "u_gone");
        assert!(!loc.is_valid());

        gl.take_calls();
        gl.uniform_2f(loc, 1.0, 2.0);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn uniform_locations_are_stable_per_name() {
        let gl = HeadlessContext::new();
        let program = gl.create_program();
        let a = gl.uniform_location(program, "u_a");
        let b = gl.uniform_location(program, "u_b");
        assert_ne!(a, b);
        assert_eq!(gl.uniform_location(program, "u_a"), a);
    }

    #[test]
    fn deleting_program_drops_its_uniform_locations() {
        let gl = HeadlessContext::new();
        let program = gl.create_program();
        let other = gl.create_program();
        gl.uniform_location(program, "u_a");
        gl.uniform_location(program, "u_b");
        let kept = gl.uniform_location(other, "u_a");

        gl.delete_program(program);
        assert_eq!(gl.uniforms.len(), 1);
        assert_eq!(gl.uniform_location(other, "u_a"), kept);
    }

    #[test]
    fn viewport_query_reflects_last_set() {
        let gl = HeadlessContext::new();
        gl.viewport(0, 0, 1600, 1200);
        assert_eq!(gl.get_viewport(), [0, 0, 1600, 1200]);
    }

    #[test]
    fn shader_without_source_fails() {
        let gl = HeadlessContext::new();
        let s = gl.create_shader(VERTEX_SHADER);
        assert!(!gl.shader_compile_status(s));
        gl.shader_source(s, "void main() {}");
        assert!(gl.shader_compile_status(s));
    }

    #[test]
    fn sub_data_keeps_bytes() {
        let gl = HeadlessContext::new();
        gl.buffer_sub_data(ARRAY_BUFFER, 8, &[1, 2, 3]);
        assert_eq!(
            gl.calls(),
            vec![GlCall::BufferSubData { target: ARRAY_BUFFER, offset: 8, data: vec![1, 2, 3] }]
        );
    }
}
