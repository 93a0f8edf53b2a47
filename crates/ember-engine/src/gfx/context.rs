use super::handles::{Buffer, Program, Shader, Texture, UniformLocation, VertexArray};

/// What the active context can do, queried once at backend init.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// Driver-reported version string.
    pub version: String,
    /// Vertex array objects are available (GL 3.0+, WebGL2).
    pub vertex_arrays: bool,
    /// Largest texture edge in texels.
    pub max_texture_size: u32,
}

/// Thin, backend-neutral graphics API.
///
/// Methods mirror the GL call they wrap and take the shared literals from
/// [`consts`](super::consts). All calls are synchronous and never fail at the
/// call site: object creation returns the `INVALID` handle (and logs) when the
/// driver refuses, uniform uploads to an invalid location are skipped, and
/// anything else is reported later through [`GraphicsContext::error`].
///
/// Implementations are bound to the thread that owns the native context.
pub trait GraphicsContext {
    fn capabilities(&self) -> Capabilities;
    /// Pops the oldest pending error flag (`NO_ERROR` when clean).
    fn error(&self) -> u32;

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Buffer;
    fn delete_buffer(&self, buffer: Buffer);
    fn bind_buffer(&self, target: u32, buffer: Buffer);
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    /// Allocates `size` bytes of undefined content, orphaning the old storage.
    fn buffer_data_size(&self, target: u32, size: usize, usage: u32);
    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]);

    // ── shaders and programs ──────────────────────────────────────────────

    fn create_shader(&self, stage: u32) -> Shader;
    fn delete_shader(&self, shader: Shader);
    fn shader_source(&self, shader: Shader, source: &str);
    fn compile_shader(&self, shader: Shader);
    fn shader_compile_status(&self, shader: Shader) -> bool;
    fn shader_info_log(&self, shader: Shader) -> String;

    fn create_program(&self) -> Program;
    fn delete_program(&self, program: Program);
    fn attach_shader(&self, program: Program, shader: Shader);
    fn link_program(&self, program: Program);
    fn program_link_status(&self, program: Program) -> bool;
    fn program_info_log(&self, program: Program) -> String;
    fn use_program(&self, program: Program);
    fn uniform_location(&self, program: Program, name: &str) -> UniformLocation;

    // ── uniforms ──────────────────────────────────────────────────────────

    fn uniform_1i(&self, location: UniformLocation, v: i32);
    fn uniform_1f(&self, location: UniformLocation, v: f32);
    fn uniform_2f(&self, location: UniformLocation, x: f32, y: f32);
    fn uniform_4f(&self, location: UniformLocation, v: [f32; 4]);
    fn uniform_matrix_4fv(&self, location: UniformLocation, m: &[f32; 16]);

    // ── vertex arrays ─────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> VertexArray;
    fn delete_vertex_array(&self, vao: VertexArray);
    fn bind_vertex_array(&self, vao: VertexArray);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Texture;
    fn delete_texture(&self, texture: Texture);
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Texture);
    fn tex_parameter(&self, target: u32, name: u32, value: u32);
    fn pixel_store(&self, name: u32, value: i32);
    /// Allocates the level and optionally fills it. `format` is used for both
    /// the internal and the client format.
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        width: u32,
        height: u32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    );
    #[allow(clippy::too_many_arguments)]
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
    );

    // ── drawing ───────────────────────────────────────────────────────────

    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    fn draw_elements(&self, mode: u32, count: i32, index_type: u32, offset: i32);

    // ── global state ──────────────────────────────────────────────────────

    fn enable(&self, cap: u32);
    fn disable(&self, cap: u32);
    fn blend_func(&self, src: u32, dst: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: u32);
    /// Current viewport as `[x, y, width, height]`.
    fn get_viewport(&self) -> [i32; 4];
}
