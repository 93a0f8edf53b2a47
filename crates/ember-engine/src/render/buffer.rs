use crate::coords::{ClipRect, Viewport};
use crate::gfx::consts::{
    ARRAY_BUFFER, BLEND, CLAMP_TO_EDGE, DYNAMIC_DRAW, FRAMEBUFFER_SRGB, LINEAR,
    ONE_MINUS_SRC_ALPHA, RGBA, SCISSOR_TEST, SRC_ALPHA, TEXTURE0, TEXTURE_2D,
    TEXTURE_MAG_FILTER, TEXTURE_MIN_FILTER, TEXTURE_WRAP_S, TEXTURE_WRAP_T, TRIANGLES,
    UNPACK_ALIGNMENT, UNSIGNED_BYTE,
};
use crate::gfx::{Buffer, GfxError, GraphicsContext, Texture, VertexArray};
use crate::text::AtlasImage;

use super::convert::{append_clip_rects, append_vertices};
use super::runs::build_clip_runs;
use super::scissor::{apply_scissor, clip_to_scissor};
use super::shape::ShapeDraw;
use super::{BufferConfig, ClipRectRun, Primitive, PrimitivePipeline, PrimitiveVertex, RenderCtx};

/// `u_msdf_params` before any atlas is installed: px range 4, 1×1 atlas, MSDF mode.
const DEFAULT_MSDF_PARAMS: [f32; 4] = [4.0, 1.0, 1.0, 0.0];

/// Per-frame batched primitive renderer.
///
/// Owns one vertex array, one dynamic vertex buffer and the glyph atlas
/// texture. Vertices accumulate through the `update_*` methods, are drawn by
/// [`render`](Self::render) or [`flush_immediate`](Self::flush_immediate), and
/// are dropped by [`prepare_frame`](Self::prepare_frame).
///
/// Draw calls follow the clip-rect run table: one call per run of consecutive
/// primitives sharing a clip box, in submission order.
pub struct PrimitiveBuffer {
    pipeline: PrimitivePipeline,
    vao: VertexArray,
    vbo: Buffer,
    atlas: Texture,

    vertices: Vec<PrimitiveVertex>,
    clip_runs: Vec<ClipRectRun>,
    clip_scratch: Vec<Option<ClipRect>>,

    /// GPU buffer capacity in vertices.
    capacity: usize,
    msdf_params: [f32; 4],

    config: BufferConfig,
    frame_peak: usize,
    idle_frames: u32,

    disposed: bool,
}

impl PrimitiveBuffer {
    /// Builds the shader program and GPU objects.
    ///
    /// Fails when the program does not compile or link, or when the driver
    /// refuses to create the buffer objects.
    pub fn new(gl: &dyn GraphicsContext, config: BufferConfig) -> Result<Self, GfxError> {
        let mut pipeline = PrimitivePipeline::new(gl)?;

        let vao = gl.create_vertex_array();
        let vbo = gl.create_buffer();
        if !vao.is_valid() || !vbo.is_valid() {
            gl.delete_vertex_array(vao);
            gl.delete_buffer(vbo);
            pipeline.dispose(gl);
            return Err(GfxError::ResourceCreation("primitive vertex buffer"));
        }

        let capacity = config.initial_vertices.max(1);

        gl.bind_vertex_array(vao);
        gl.bind_buffer(ARRAY_BUFFER, vbo);
        gl.buffer_data_size(ARRAY_BUFFER, capacity * PrimitiveVertex::STRIDE, DYNAMIC_DRAW);
        PrimitiveVertex::bind_layout(gl);
        gl.bind_vertex_array(VertexArray::INVALID);
        gl.bind_buffer(ARRAY_BUFFER, Buffer::INVALID);

        let atlas = create_placeholder_atlas(gl);

        log::debug!(
            "primitive buffer ready: {capacity} vertices ({} bytes)",
            capacity * PrimitiveVertex::STRIDE
        );

        Ok(Self {
            pipeline,
            vao,
            vbo,
            atlas,
            vertices: Vec::with_capacity(capacity),
            clip_runs: Vec::new(),
            clip_scratch: Vec::new(),
            capacity,
            msdf_params: DEFAULT_MSDF_PARAMS,
            config,
            frame_peak: 0,
            idle_frames: 0,
            disposed: false,
        })
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn vertices(&self) -> &[PrimitiveVertex] {
        &self.vertices
    }

    #[inline]
    pub fn clip_runs(&self) -> &[ClipRectRun] {
        &self.clip_runs
    }

    /// GPU-side capacity in vertices.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn msdf_params(&self) -> [f32; 4] {
        self.msdf_params
    }

    #[inline]
    pub fn pipeline(&self) -> &PrimitivePipeline {
        &self.pipeline
    }

    #[inline]
    pub fn atlas_texture(&self) -> Texture {
        self.atlas
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── accumulation ──────────────────────────────────────────────────────

    /// Replaces the contents with `primitives`, drawn as one unclipped run.
    pub fn update_primitives(&mut self, gl: &dyn GraphicsContext, viewport: Viewport, primitives: &[Primitive]) {
        self.vertices.clear();
        self.clip_runs.clear();
        append_vertices(&mut self.vertices, primitives, viewport);
        self.upload(gl);
    }

    /// Replaces the contents with `primitives`, honoring each one's clip rect.
    pub fn update_primitives_with_clip_rects(
        &mut self,
        gl: &dyn GraphicsContext,
        viewport: Viewport,
        primitives: &[Primitive],
    ) {
        self.vertices.clear();
        append_vertices(&mut self.vertices, primitives, viewport);

        self.clip_scratch.clear();
        if !self.vertices.is_empty() {
            append_clip_rects(&mut self.clip_scratch, primitives);
        }
        build_clip_runs(self.vertices.len(), &self.clip_scratch, &mut self.clip_runs);
        self.upload(gl);
    }

    /// Replaces the contents with prebuilt vertices, drawn as one unclipped run.
    pub fn update_vertex_buffer(&mut self, gl: &dyn GraphicsContext, vertices: &[PrimitiveVertex]) {
        self.vertices.clear();
        self.clip_runs.clear();
        self.vertices.extend_from_slice(vertices);
        self.upload(gl);
    }

    /// Replaces the contents with prebuilt vertices and one clip rect per vertex.
    pub fn update_vertex_buffer_with_clip_rects(
        &mut self,
        gl: &dyn GraphicsContext,
        vertices: &[PrimitiveVertex],
        clip_rects: &[Option<ClipRect>],
    ) {
        if clip_rects.len() != vertices.len() {
            log::warn!(
                "{} clip rects for {} vertices; missing entries draw unclipped",
                clip_rects.len(),
                vertices.len()
            );
        }

        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        build_clip_runs(self.vertices.len(), clip_rects, &mut self.clip_runs);
        self.upload(gl);
    }

    fn upload(&mut self, gl: &dyn GraphicsContext) {
        if self.disposed || self.vertices.is_empty() {
            return;
        }

        let needed = self.vertices.len();
        self.frame_peak = self.frame_peak.max(needed);

        if needed > self.capacity {
            let grown = (self.capacity * 2).max(needed);
            log::debug!("primitive buffer grows {} -> {grown} vertices", self.capacity);
            self.capacity = grown;
        }

        // Orphan the old storage so the driver never waits on in-flight draws.
        gl.bind_buffer(ARRAY_BUFFER, self.vbo);
        gl.buffer_data_size(ARRAY_BUFFER, self.capacity * PrimitiveVertex::STRIDE, DYNAMIC_DRAW);
        gl.buffer_sub_data(ARRAY_BUFFER, 0, bytemuck::cast_slice(&self.vertices));
        gl.bind_buffer(ARRAY_BUFFER, Buffer::INVALID);
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Draws the accumulated vertices, one call per clip run.
    pub fn render(&self, ctx: &RenderCtx<'_>) {
        if self.disposed || self.vertices.is_empty() {
            return;
        }
        let gl = ctx.gl;

        self.bind_state(ctx);
        gl.bind_vertex_array(self.vao);

        if self.clip_runs.is_empty() {
            gl.disable(SCISSOR_TEST);
            gl.draw_arrays(TRIANGLES, 0, self.vertices.len() as i32);
        } else {
            for run in &self.clip_runs {
                let scissor = clip_to_scissor(run.clip_rect, ctx.viewport, ctx.framebuffer);
                if apply_scissor(gl, scissor) {
                    gl.draw_arrays(TRIANGLES, run.start as i32, run.count as i32);
                } else {
                    log::trace!("run at {} has an empty clip; skipped", run.start);
                }
            }
        }

        gl.bind_vertex_array(VertexArray::INVALID);
        gl.disable(SCISSOR_TEST);
    }

    /// Renders with alpha blending, then empties the accumulator.
    ///
    /// Call before drawing anything that must stack above the batch.
    pub fn flush_immediate(&mut self, ctx: &RenderCtx<'_>) {
        ctx.gl.enable(BLEND);
        ctx.gl.blend_func(SRC_ALPHA, ONE_MINUS_SRC_ALPHA);
        self.render(ctx);
        self.vertices.clear();
        self.clip_runs.clear();
    }

    /// Draws a persistent shape with the shared program and atlas.
    pub fn render_shape(&self, ctx: &RenderCtx<'_>, draw: &ShapeDraw) {
        if self.disposed || !draw.vao.is_valid() || draw.vertex_count == 0 {
            return;
        }
        let gl = ctx.gl;

        let scissor = clip_to_scissor(draw.clip_rect, ctx.viewport, ctx.framebuffer);
        if !apply_scissor(gl, scissor) {
            return;
        }

        self.bind_state(ctx);
        gl.bind_vertex_array(draw.vao);
        gl.draw_arrays(TRIANGLES, 0, draw.vertex_count as i32);
        gl.bind_vertex_array(VertexArray::INVALID);
        gl.disable(SCISSOR_TEST);
    }

    fn bind_state(&self, ctx: &RenderCtx<'_>) {
        let gl = ctx.gl;
        gl.disable(FRAMEBUFFER_SRGB);
        self.pipeline.bind(gl, ctx.viewport, self.msdf_params);
        gl.active_texture(TEXTURE0);
        gl.bind_texture(TEXTURE_2D, self.atlas);
    }

    // ── frame lifecycle ───────────────────────────────────────────────────

    /// Empties the accumulator for a new frame. GPU storage is kept, unless
    /// the shrink policy decides the buffer has been oversized long enough.
    pub fn prepare_frame(&mut self) {
        self.vertices.clear();
        self.clip_runs.clear();

        if let Some(limit) = self.config.shrink_after_idle_frames {
            let floor = self.config.initial_vertices.max(1);
            if self.capacity > floor && self.frame_peak * 4 <= self.capacity {
                self.idle_frames += 1;
                if self.idle_frames >= limit {
                    let shrunk = (self.frame_peak * 2).max(floor);
                    log::debug!("primitive buffer shrinks {} -> {shrunk} vertices", self.capacity);
                    self.capacity = shrunk;
                    self.idle_frames = 0;
                }
            } else {
                self.idle_frames = 0;
            }
        }

        self.frame_peak = 0;
    }

    // ── glyph atlas ───────────────────────────────────────────────────────

    /// Replaces the glyph atlas texture contents.
    ///
    /// `px_range` is the distance range the atlas was generated with, in texels.
    pub fn set_msdf_atlas(&mut self, gl: &dyn GraphicsContext, image: &AtlasImage, px_range: f32) {
        if self.disposed {
            return;
        }
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
            log::warn!(
                "ignoring malformed atlas image {}x{} with {} bytes",
                image.width,
                image.height,
                image.pixels.len()
            );
            return;
        }

        gl.bind_texture(TEXTURE_2D, self.atlas);
        gl.pixel_store(UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            TEXTURE_2D,
            0,
            image.width,
            image.height,
            RGBA,
            UNSIGNED_BYTE,
            Some(image.pixels.as_slice()),
        );
        set_atlas_sampling(gl);
        gl.bind_texture(TEXTURE_2D, Texture::INVALID);

        self.msdf_params[0] = px_range;
        self.msdf_params[1] = image.width as f32;
        self.msdf_params[2] = image.height as f32;

        log::debug!("msdf atlas installed: {}x{}, px range {px_range}", image.width, image.height);
    }

    /// Selects the distance decoding: 0 = MSDF median, 1 = single-channel alpha.
    pub fn set_msdf_mode(&mut self, mode: u32) {
        self.msdf_params[3] = mode as f32;
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Releases every GPU object. Later calls do nothing.
    pub fn dispose(&mut self, gl: &dyn GraphicsContext) {
        if self.disposed {
            return;
        }
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.vbo);
        gl.delete_texture(self.atlas);
        self.pipeline.dispose(gl);

        self.vao = VertexArray::INVALID;
        self.vbo = Buffer::INVALID;
        self.atlas = Texture::INVALID;
        self.vertices.clear();
        self.clip_runs.clear();
        self.disposed = true;

        log::debug!("primitive buffer disposed");
    }
}

fn set_atlas_sampling(gl: &dyn GraphicsContext) {
    gl.tex_parameter(TEXTURE_2D, TEXTURE_MIN_FILTER, LINEAR);
    gl.tex_parameter(TEXTURE_2D, TEXTURE_MAG_FILTER, LINEAR);
    gl.tex_parameter(TEXTURE_2D, TEXTURE_WRAP_S, CLAMP_TO_EDGE);
    gl.tex_parameter(TEXTURE_2D, TEXTURE_WRAP_T, CLAMP_TO_EDGE);
}

/// 1×1 transparent black texture. Text drawn before a font is installed
/// samples zero distance and stays invisible.
fn create_placeholder_atlas(gl: &dyn GraphicsContext) -> Texture {
    let texture = gl.create_texture();
    gl.bind_texture(TEXTURE_2D, texture);
    gl.tex_image_2d(TEXTURE_2D, 0, 1, 1, RGBA, UNSIGNED_BYTE, Some(&[0u8, 0, 0, 0][..]));
    set_atlas_sampling(gl);
    gl.bind_texture(TEXTURE_2D, Texture::INVALID);
    texture
}
