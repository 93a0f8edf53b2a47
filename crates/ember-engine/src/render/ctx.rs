use crate::coords::Viewport;
use crate::gfx::GraphicsContext;

/// Everything a draw needs for one frame: the context, the logical surface
/// size and the framebuffer size in physical pixels.
#[derive(Copy, Clone)]
pub struct RenderCtx<'a> {
    pub gl: &'a dyn GraphicsContext,
    pub viewport: Viewport,
    pub framebuffer: (u32, u32),
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(gl: &'a dyn GraphicsContext, viewport: Viewport, framebuffer: (u32, u32)) -> Self {
        Self { gl, viewport, framebuffer }
    }

    /// Framebuffer size taken from the context's current viewport.
    pub fn from_current_viewport(gl: &'a dyn GraphicsContext, viewport: Viewport) -> Self {
        let [_, _, w, h] = gl.get_viewport();
        Self { gl, viewport, framebuffer: (w.max(0) as u32, h.max(0) as u32) }
    }
}
