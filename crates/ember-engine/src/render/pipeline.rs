use crate::coords::Viewport;
use crate::gfx::{link_program, GfxError, GraphicsContext, Program, UniformLocation};

const VERTEX_SRC: &str = include_str!("shaders/primitive.vert");
const FRAGMENT_SRC: &str = include_str!("shaders/primitive.frag");

/// Texture unit the glyph atlas is bound to.
pub(crate) const ATLAS_UNIT: i32 = 0;

/// The SDF primitive program and its uniform locations.
///
/// One instance is shared by the batched buffer and every shape draw.
#[derive(Debug)]
pub struct PrimitivePipeline {
    program: Program,
    u_screen_size: UniformLocation,
    u_msdf_params: UniformLocation,
    u_msdf_atlas: UniformLocation,
}

impl PrimitivePipeline {
    /// Compiles and links the embedded shaders. Failure is fatal to the caller.
    pub fn new(gl: &dyn GraphicsContext) -> Result<Self, GfxError> {
        let program = link_program(gl, VERTEX_SRC, FRAGMENT_SRC)?;

        let pipeline = Self {
            program,
            u_screen_size: gl.uniform_location(program, "u_screen_size"),
            u_msdf_params: gl.uniform_location(program, "u_msdf_params"),
            u_msdf_atlas: gl.uniform_location(program, "u_msdf_atlas"),
        };

        for (name, loc) in [
            ("u_screen_size", pipeline.u_screen_size),
            ("u_msdf_params", pipeline.u_msdf_params),
            ("u_msdf_atlas", pipeline.u_msdf_atlas),
        ] {
            if !loc.is_valid() {
                log::debug!("uniform {name} is inactive; uploads to it are skipped");
            }
        }

        Ok(pipeline)
    }

    #[inline]
    pub fn program(&self) -> Program {
        self.program
    }

    /// Makes the program current and uploads per-draw uniforms.
    pub(crate) fn bind(&self, gl: &dyn GraphicsContext, viewport: Viewport, msdf_params: [f32; 4]) {
        gl.use_program(self.program);
        gl.uniform_2f(self.u_screen_size, viewport.width, viewport.height);
        gl.uniform_4f(self.u_msdf_params, msdf_params);
        gl.uniform_1i(self.u_msdf_atlas, ATLAS_UNIT);
    }

    pub(crate) fn dispose(&mut self, gl: &dyn GraphicsContext) {
        if self.program.is_valid() {
            gl.delete_program(self.program);
            self.program = Program::INVALID;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{GlCall, HeadlessContext};

    #[test]
    fn shader_sources_agree_on_attribute_and_uniform_names() {
        for name in ["u_screen_size", "a_tex_coords", "a_half_size"] {
            assert!(VERTEX_SRC.contains(name), "{name} missing from vertex stage");
        }
        for name in ["u_msdf_params", "u_msdf_atlas", "OP_TEXT = 4", "OP_LINE = 3"] {
            assert!(FRAGMENT_SRC.contains(name), "{name} missing from fragment stage");
        }
    }

    #[test]
    fn inactive_uniform_is_skipped_not_fatal() {
        let gl = HeadlessContext::new();
        gl.hide_uniform("u_screen_size");
        let pipeline = PrimitivePipeline::new(&gl).unwrap();

        gl.take_calls();
        pipeline.bind(&gl, Viewport::new(800.0, 600.0), [4.0, 1.0, 1.0, 0.0]);

        let calls = gl.calls();
        assert!(!calls.iter().any(|c| matches!(c, GlCall::Uniform2f { .. })));
        assert!(calls.iter().any(|c| matches!(c, GlCall::Uniform4f { .. })));
        assert!(calls.iter().any(|c| matches!(c, GlCall::Uniform1i { value: 0, .. })));
    }

    #[test]
    fn broken_shader_fails_construction() {
        let gl = HeadlessContext::new();
        gl.fail_compile_containing("median");
        assert!(matches!(PrimitivePipeline::new(&gl), Err(GfxError::ShaderCompile { .. })));
    }
}
