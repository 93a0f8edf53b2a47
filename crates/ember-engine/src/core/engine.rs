use anyhow::{Context, Result};

use crate::coords::{ClipRect, Color, Vec2, Viewport};
use crate::gfx::consts::{BLEND, COLOR_BUFFER_BIT, ONE_MINUS_SRC_ALPHA, SCISSOR_TEST, SRC_ALPHA};
use crate::gfx::{GfxError, GraphicsContext};
use crate::render::{Primitive, PrimitiveBuffer, RenderCtx, Shape};
use crate::scene::RenderQueue;
use crate::surface::{Surface, Window};
use crate::text::{append_text_primitives, AtlasImage, Font};
use crate::time::{FrameClock, FrameTime};

use super::EngineConfig;

/// Immediate-mode 2D renderer bound to one graphics context.
///
/// Frame protocol:
/// 1. [`begin_frame`](Self::begin_frame)
/// 2. `draw_*`, clip push/pop and [`render_shape`](Self::render_shape), in paint order
/// 3. [`end_frame`](Self::end_frame), then present with the platform
pub struct Engine {
    gl: Box<dyn GraphicsContext>,
    surface: Surface,
    buffer: PrimitiveBuffer,
    queue: RenderQueue,
    clock: FrameClock,
    config: EngineConfig,

    font: Option<Font>,
    text_scratch: Vec<Primitive>,
    last_frame: Option<FrameTime>,
    disposed: bool,
}

impl Engine {
    /// Checks the context and builds the primitive pipeline.
    ///
    /// Fails on contexts without vertex array objects and when the embedded
    /// shaders do not compile or link.
    pub fn new(gl: Box<dyn GraphicsContext>, surface: Surface, config: EngineConfig) -> Result<Self> {
        let caps = gl.capabilities();
        anyhow::ensure!(
            caps.vertex_arrays,
            "graphics context {:?} has no vertex array objects",
            caps.version
        );

        let mut buffer = PrimitiveBuffer::new(gl.as_ref(), config.buffer.clone())
            .context("failed to build the primitive pipeline")?;
        buffer.set_msdf_mode(config.msdf_mode);

        log::info!(
            "engine ready on {} ({}x{} logical, max texture {})",
            caps.version,
            surface.size().0,
            surface.size().1,
            caps.max_texture_size
        );

        Ok(Self {
            gl,
            surface,
            buffer,
            queue: RenderQueue::new(),
            clock: FrameClock::new(),
            config,
            font: None,
            text_scratch: Vec::new(),
            last_frame: None,
            disposed: false,
        })
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn gl(&self) -> &dyn GraphicsContext {
        self.gl.as_ref()
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    #[inline]
    pub fn buffer(&self) -> &PrimitiveBuffer {
        &self.buffer
    }

    #[inline]
    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Timing of the frame in progress.
    #[inline]
    pub fn frame_time(&self) -> Option<FrameTime> {
        self.last_frame
    }

    #[inline]
    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Drops last frame's draws, ticks the clock and clears the framebuffer.
    pub fn begin_frame(&mut self) -> FrameTime {
        self.buffer.prepare_frame();
        self.queue.prepare_frame();

        let time = self.clock.tick();
        self.last_frame = Some(time);

        if let Some(color) = self.config.clear_color {
            self.clear(color);
        }
        time
    }

    /// Clears the whole framebuffer to `color`.
    pub fn clear(&self, color: Color) {
        if self.disposed {
            return;
        }
        self.gl.disable(SCISSOR_TEST);
        self.gl.clear_color(color.r, color.g, color.b, color.a);
        self.gl.clear(COLOR_BUFFER_BIT);
    }

    /// Paints everything queued this frame onto the window's framebuffer.
    pub fn end_frame(&mut self, window: &dyn Window) {
        if self.disposed {
            return;
        }

        let (fb_w, fb_h) = window.framebuffer_size();
        if fb_w == 0 || fb_h == 0 {
            log::trace!("framebuffer is {fb_w}x{fb_h}; skipping frame");
            return;
        }

        let gl = self.gl.as_ref();
        gl.viewport(0, 0, fb_w as i32, fb_h as i32);
        gl.enable(BLEND);
        gl.blend_func(SRC_ALPHA, ONE_MINUS_SRC_ALPHA);

        let ctx = RenderCtx::new(gl, self.surface.viewport(), (fb_w, fb_h));
        self.queue.render(&ctx, &mut self.buffer);
    }

    /// Follows a window resize; ignored while the surface size is locked.
    ///
    /// Only immediate-mode draws pick up the new size. A live [`Shape`] keeps
    /// the projection it was built with until its owner calls
    /// `shape.set_viewport(engine.gl(), engine.viewport())`.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.surface.resize(width, height) {
            log::debug!("surface resized to {width}x{height}");
        }
    }

    /// Pins the logical coordinate space to `width × height`. Live shapes
    /// need re-projecting as after [`Engine::resize`].
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface.set_size(width, height);
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[inline]
    pub fn draw_primitive(&mut self, primitive: Primitive) {
        self.queue.draw_primitive(primitive);
    }

    pub fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.draw_primitive(Primitive::rect(x, y, w, h, color));
    }

    pub fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.draw_primitive(Primitive::circle(cx, cy, radius, color));
    }

    pub fn draw_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        self.draw_primitive(Primitive::rounded_rect(x, y, w, h, radius, color));
    }

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color) {
        self.draw_primitive(Primitive::line(x1, y1, x2, y2, width, color));
    }

    /// Lays out `text` with the active font, top-left at `(x, y)`.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        let Some(font) = self.font.as_ref() else {
            log::warn!("draw_text called before a font was set");
            return;
        };

        self.text_scratch.clear();
        append_text_primitives(&mut self.text_scratch, font, text, Vec2::new(x, y), font_size, color);
        self.queue.draw_primitives(self.text_scratch.drain(..));
    }

    /// Width of `text` in the active font; 0 without a font.
    pub fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        self.font.as_ref().map_or(0.0, |f| f.measure_text(text, font_size))
    }

    // ── clipping ──────────────────────────────────────────────────────────

    pub fn push_clip_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.queue.push_clip_rect(ClipRect::new(x, y, width, height));
    }

    pub fn pop_clip_rect(&mut self) {
        self.queue.pop_clip_rect();
    }

    #[inline]
    pub fn current_clip_rect(&self) -> Option<ClipRect> {
        self.queue.current_clip_rect()
    }

    // ── shapes ────────────────────────────────────────────────────────────

    /// Persistent shape drawn like `primitive`, placed on the current surface.
    pub fn create_shape(&self, primitive: &Primitive) -> Result<Shape, GfxError> {
        Shape::from_primitive(self.gl.as_ref(), self.surface.viewport(), primitive)
    }

    /// Queues `shape` after everything drawn so far, under the current clip.
    pub fn render_shape(&mut self, shape: &mut Shape) {
        shape.render(&mut self.queue);
    }

    // ── text ──────────────────────────────────────────────────────────────

    /// Uploads an atlas bitmap without changing the active font.
    pub fn set_font_atlas(&mut self, image: &AtlasImage, px_range: f32) {
        self.buffer.set_msdf_atlas(self.gl.as_ref(), image, px_range);
    }

    /// Makes `font` the active font and uploads its atlas.
    pub fn set_font(&mut self, font: Font) {
        self.buffer.set_msdf_atlas(self.gl.as_ref(), font.image(), font.px_range());
        self.font = Some(font);
    }

    pub fn set_msdf_mode(&mut self, mode: u32) {
        self.config.msdf_mode = mode;
        self.buffer.set_msdf_mode(mode);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Releases the batch renderer's GPU objects. Shapes are disposed by their
    /// owners. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.buffer.dispose(self.gl.as_ref());
        self.queue.prepare_frame();
        self.disposed = true;
        log::debug!("engine disposed");
    }
}
