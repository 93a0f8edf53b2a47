use super::consts::{FRAGMENT_SHADER, VERTEX_SHADER};
use super::handles::{Program, Shader};
use super::{GfxError, GraphicsContext};

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    #[inline]
    pub const fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => VERTEX_SHADER,
            ShaderStage::Fragment => FRAGMENT_SHADER,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Compiles one stage. The shader object is deleted again on failure.
pub fn compile_shader(
    gl: &dyn GraphicsContext,
    stage: ShaderStage,
    source: &str,
) -> Result<Shader, GfxError> {
    let shader = gl.create_shader(stage.gl_enum());
    if !shader.is_valid() {
        return Err(GfxError::ResourceCreation("shader"));
    }

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(GfxError::ShaderCompile { stage, log });
    }

    Ok(shader)
}

/// Compiles both stages and links them into a program.
///
/// Stage objects are released once linking is done, whatever the outcome.
pub fn link_program(
    gl: &dyn GraphicsContext,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<Program, GfxError> {
    let vs = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
    let fs = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
        Ok(fs) => fs,
        Err(e) => {
            gl.delete_shader(vs);
            return Err(e);
        }
    };

    let program = gl.create_program();
    if !program.is_valid() {
        gl.delete_shader(vs);
        gl.delete_shader(fs);
        return Err(GfxError::ResourceCreation("program"));
    }

    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    gl.link_program(program);

    let linked = gl.program_link_status(program);
    gl.delete_shader(vs);
    gl.delete_shader(fs);

    if !linked {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        return Err(GfxError::ProgramLink { log });
    }

    log::debug!("shader program {} linked", program.0);
    Ok(program)
}

/// Rewrites a desktop `#version NNN core` header for GLSL ES 3.00 and adds
/// the default float precision ES fragment shaders require.
///
/// Sources without a version line get the ES header prepended.
pub fn glsl_es_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 48);
    out.push_str("#version 300 es\nprecision mediump float;\n");

    let mut lines = source.lines().peekable();
    // Skip leading blank lines before looking for the header.
    while lines.peek().is_some_and(|l| l.trim().is_empty()) {
        lines.next();
    }
    if lines.peek().is_some_and(|l| l.trim_start().starts_with("#version")) {
        lines.next();
    }

    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
