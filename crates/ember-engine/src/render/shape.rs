use std::f32::consts::TAU;

use crate::coords::{ClipRect, Color, Vec2, Viewport};
use crate::gfx::consts::{ARRAY_BUFFER, DYNAMIC_DRAW};
use crate::gfx::{Buffer, GfxError, GraphicsContext, VertexArray};
use crate::scene::RenderQueue;

use super::convert::convert_primitives_to_vertices;
use super::{OpCode, Primitive, PrimitiveVertex};

/// What the queue needs to draw a shape: its vertex array, vertex count and
/// the clip rect that was current when [`Shape::render`] ran.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShapeDraw {
    pub vao: VertexArray,
    pub vertex_count: usize,
    pub clip_rect: Option<ClipRect>,
}

/// Persistent shape with its own vertex buffer.
///
/// Keeps the screen-space position of every vertex so it can be moved,
/// rotated and scaled around its centroid across frames. Topology and op code
/// are fixed at construction; mutations rewrite positions and colors only.
///
/// GPU objects are released by [`Shape::dispose`], never on drop.
#[derive(Debug)]
pub struct Shape {
    vao: VertexArray,
    vbo: Buffer,
    vertices: Vec<PrimitiveVertex>,
    screen_positions: Vec<Vec2>,
    viewport: Viewport,
    clip_rect: Option<ClipRect>,
    visible: bool,
    disposed: bool,
}

impl Shape {
    // ── builders ──────────────────────────────────────────────────────────

    /// Shape drawn exactly like `primitive` would be in the batch.
    pub fn from_primitive(
        gl: &dyn GraphicsContext,
        viewport: Viewport,
        primitive: &Primitive,
    ) -> Result<Self, GfxError> {
        let vertices = convert_primitives_to_vertices(std::slice::from_ref(primitive), viewport);
        if vertices.is_empty() {
            return Err(GfxError::InvalidGeometry(format!(
                "cannot place a shape on a {}x{} surface",
                viewport.width, viewport.height
            )));
        }

        let (l, t) = (primitive.x, primitive.y);
        let (r, b) = (primitive.x + primitive.w, primitive.y + primitive.h);
        let screen_positions = vec![
            Vec2::new(l, b),
            Vec2::new(r, b),
            Vec2::new(l, t),
            Vec2::new(l, t),
            Vec2::new(r, b),
            Vec2::new(r, t),
        ];

        Self::upload_new(gl, viewport, vertices, screen_positions)
    }

    /// Solid triangle.
    pub fn triangle(
        gl: &dyn GraphicsContext,
        viewport: Viewport,
        points: [Vec2; 3],
        color: Color,
    ) -> Result<Self, GfxError> {
        let bary = [[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        Self::solid(gl, viewport, points.to_vec(), &bary, color)
    }

    /// Solid axis-aligned rectangle.
    pub fn rectangle(
        gl: &dyn GraphicsContext,
        viewport: Viewport,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    ) -> Result<Self, GfxError> {
        let tl = Vec2::new(x, y);
        let tr = Vec2::new(x + w, y);
        let bl = Vec2::new(x, y + h);
        let br = Vec2::new(x + w, y + h);

        let points = vec![tl, bl, tr, bl, br, tr];
        let bary = [[1.0, 0.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        Self::solid(gl, viewport, points, &bary, color)
    }

    /// Solid regular polygon, fanned out from `center`. `diameter` spans
    /// opposite vertices.
    pub fn polygon(
        gl: &dyn GraphicsContext,
        viewport: Viewport,
        center: Vec2,
        diameter: f32,
        sides: u32,
        color: Color,
    ) -> Result<Self, GfxError> {
        if sides < 3 {
            return Err(GfxError::InvalidGeometry(format!("polygon with {sides} sides")));
        }

        let radius = diameter * 0.5;
        let step = TAU / sides as f32;
        let rim = |i: u32| center + Vec2::new(radius, 0.0).rotated(step * i as f32);

        let mut points = Vec::with_capacity(sides as usize * 3);
        let mut bary = Vec::with_capacity(sides as usize * 3);
        for i in 0..sides {
            points.extend([center, rim(i), rim(i + 1)]);
            bary.extend([[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]);
        }

        Self::solid(gl, viewport, points, &bary, color)
    }

    fn solid(
        gl: &dyn GraphicsContext,
        viewport: Viewport,
        points: Vec<Vec2>,
        bary: &[[f32; 2]],
        color: Color,
    ) -> Result<Self, GfxError> {
        if !viewport.is_valid() {
            return Err(GfxError::InvalidGeometry(format!(
                "cannot place a shape on a {}x{} surface",
                viewport.width, viewport.height
            )));
        }

        let vertices = points
            .iter()
            .zip(bary)
            .map(|(&p, &local)| {
                let ndc = viewport.to_ndc(p);
                PrimitiveVertex {
                    position: [ndc.x, ndc.y, 0.0],
                    local_position: local,
                    op_code: OpCode::Solid.to_gpu(),
                    color: color.to_array(),
                    ..PrimitiveVertex::default()
                }
            })
            .collect();

        Self::upload_new(gl, viewport, vertices, points)
    }

    fn upload_new(
        gl: &dyn GraphicsContext,
        viewport: Viewport,
        vertices: Vec<PrimitiveVertex>,
        screen_positions: Vec<Vec2>,
    ) -> Result<Self, GfxError> {
        let vao = gl.create_vertex_array();
        let vbo = gl.create_buffer();
        if !vao.is_valid() || !vbo.is_valid() {
            gl.delete_vertex_array(vao);
            gl.delete_buffer(vbo);
            return Err(GfxError::ResourceCreation("shape vertex buffer"));
        }

        gl.bind_vertex_array(vao);
        gl.bind_buffer(ARRAY_BUFFER, vbo);
        gl.buffer_data(ARRAY_BUFFER, bytemuck::cast_slice(&vertices), DYNAMIC_DRAW);
        PrimitiveVertex::bind_layout(gl);
        gl.bind_vertex_array(VertexArray::INVALID);
        gl.bind_buffer(ARRAY_BUFFER, Buffer::INVALID);

        log::debug!("shape created: vao {} with {} vertices", vao.0, vertices.len());

        Ok(Self {
            vao,
            vbo,
            vertices,
            screen_positions,
            viewport,
            clip_rect: None,
            visible: true,
            disposed: false,
        })
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn vertices(&self) -> &[PrimitiveVertex] {
        &self.vertices
    }

    #[inline]
    pub fn screen_positions(&self) -> &[Vec2] {
        &self.screen_positions
    }

    #[inline]
    pub fn centroid(&self) -> Vec2 {
        Vec2::centroid(&self.screen_positions)
    }

    /// Clip rect captured by the latest [`Shape::render`].
    #[inline]
    pub fn clip_rect(&self) -> Option<ClipRect> {
        self.clip_rect
    }

    /// `false` after [`Shape::hide`] until the next render.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── transforms ────────────────────────────────────────────────────────

    /// Moves the shape so its centroid lands on `(x, y)`.
    pub fn move_to(&mut self, gl: &dyn GraphicsContext, x: f32, y: f32) {
        let delta = Vec2::new(x, y) - self.centroid();
        self.transform(gl, |p| p + delta);
    }

    /// Rotates around the centroid, clockwise on screen for positive angles.
    pub fn rotate(&mut self, gl: &dyn GraphicsContext, radians: f32) {
        let c = self.centroid();
        self.transform(gl, |p| c + (p - c).rotated(radians));
    }

    /// Scales around the centroid.
    pub fn scale(&mut self, gl: &dyn GraphicsContext, sx: f32, sy: f32) {
        let c = self.centroid();
        self.transform(gl, |p| c + (p - c).scaled(sx, sy));
    }

    pub fn set_color(&mut self, gl: &dyn GraphicsContext, color: Color) {
        if self.disposed {
            return;
        }
        for v in &mut self.vertices {
            v.color = color.to_array();
        }
        self.sync(gl);
    }

    /// Marks the shape hidden. Vertex colors are untouched; the next
    /// [`Shape::render`] shows it again.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Re-projects the cached screen positions onto a resized surface. The
    /// engine never calls this; owners do after [`crate::core::Engine::resize`].
    pub fn set_viewport(&mut self, gl: &dyn GraphicsContext, viewport: Viewport) {
        if viewport == self.viewport || !viewport.is_valid() {
            return;
        }
        self.viewport = viewport;
        self.transform(gl, |p| p);
    }

    fn transform(&mut self, gl: &dyn GraphicsContext, f: impl Fn(Vec2) -> Vec2) {
        if self.disposed {
            return;
        }
        for p in &mut self.screen_positions {
            *p = f(*p);
        }
        self.sync(gl);
    }

    /// Rebuilds NDC positions from screen positions and re-uploads.
    fn sync(&mut self, gl: &dyn GraphicsContext) {
        for (v, &p) in self.vertices.iter_mut().zip(&self.screen_positions) {
            let ndc = self.viewport.to_ndc(p);
            v.position = [ndc.x, ndc.y, 0.0];
        }

        gl.bind_buffer(ARRAY_BUFFER, self.vbo);
        gl.buffer_sub_data(ARRAY_BUFFER, 0, bytemuck::cast_slice(&self.vertices));
        gl.bind_buffer(ARRAY_BUFFER, Buffer::INVALID);
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Queues this shape under the queue's current clip rect.
    ///
    /// The clip is read now, on every call, so the same shape can be clipped
    /// differently from one frame to the next.
    pub fn render(&mut self, queue: &mut RenderQueue) {
        let clip = queue.current_clip_rect();
        self.render_clipped(queue, clip);
    }

    /// Queues this shape under an explicit clip rect.
    pub fn render_clipped(&mut self, queue: &mut RenderQueue, clip: Option<ClipRect>) {
        if self.disposed {
            return;
        }
        self.visible = true;
        self.clip_rect = clip;
        queue.add_to_render_queue(self.draw_record());
    }

    #[inline]
    pub fn draw_record(&self) -> ShapeDraw {
        ShapeDraw {
            vao: self.vao,
            vertex_count: self.vertices.len(),
            clip_rect: self.clip_rect,
        }
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Releases the vertex array and buffer. Later calls do nothing.
    pub fn dispose(&mut self, gl: &dyn GraphicsContext) {
        if self.disposed {
            return;
        }
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.vbo);
        self.vao = VertexArray::INVALID;
        self.vbo = Buffer::INVALID;
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{GlCall, HeadlessContext};

    const VP: Viewport = Viewport::new(800.0, 600.0);

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    fn uploads(gl: &HeadlessContext) -> Vec<Vec<u8>> {
        gl.calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::BufferSubData { data, .. } => Some(data),
                _ => None,
            })
            .collect()
    }

    // ── builders ──────────────────────────────────────────────────────────

    #[test]
    fn primitive_shape_keeps_corner_order() {
        let gl = HeadlessContext::new();
        let shape =
            Shape::from_primitive(&gl, VP, &Primitive::circle(100.0, 100.0, 20.0, Color::RED)).unwrap();

        assert_eq!(shape.vertices().len(), 6);
        assert!(close(shape.centroid(), Vec2::new(100.0, 100.0)));
        for (v, &p) in shape.vertices().iter().zip(shape.screen_positions()) {
            let ndc = VP.to_ndc(p);
            assert!(close(Vec2::new(v.position[0], v.position[1]), ndc));
            assert_eq!(v.op_code(), Some(OpCode::Circle));
        }
    }

    #[test]
    fn polygon_fans_around_center() {
        let gl = HeadlessContext::new();
        let shape =
            Shape::polygon(&gl, VP, Vec2::new(300.0, 200.0), 50.0, 6, Color::BLUE).unwrap();
        assert_eq!(shape.vertices().len(), 18);
        assert!(close(shape.centroid(), Vec2::new(300.0, 200.0)));
    }

    #[test]
    fn polygon_needs_three_sides() {
        let gl = HeadlessContext::new();
        let err = Shape::polygon(&gl, VP, Vec2::zero(), 10.0, 2, Color::BLUE).unwrap_err();
        assert!(matches!(err, GfxError::InvalidGeometry(_)));
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn rectangle_uses_barycentric_locals() {
        let gl = HeadlessContext::new();
        let shape = Shape::rectangle(&gl, VP, 0.0, 0.0, 40.0, 20.0, Color::GREEN).unwrap();
        let locals: Vec<_> = shape.vertices().iter().map(|v| v.local_position).collect();
        assert_eq!(locals[0], [1.0, 0.0]);
        assert_eq!(locals[1], [0.0, 1.0]);
        assert_eq!(locals[2], [0.0, 0.0]);
        assert!(close(shape.centroid(), Vec2::new(20.0, 10.0)));
    }

    // ── transforms ────────────────────────────────────────────────────────

    #[test]
    fn move_to_places_centroid_and_reuploads() {
        let gl = HeadlessContext::new();
        let mut shape = Shape::rectangle(&gl, VP, 0.0, 0.0, 40.0, 20.0, Color::GREEN).unwrap();

        gl.take_calls();
        shape.move_to(&gl, 400.0, 300.0);
        assert!(close(shape.centroid(), Vec2::new(400.0, 300.0)));

        let up = uploads(&gl);
        assert_eq!(up.len(), 1);
        let uploaded: &[PrimitiveVertex] = bytemuck::cast_slice(&up[0]);
        assert_eq!(uploaded, shape.vertices());
    }

    #[test]
    fn rotate_half_turn_swaps_corners() {
        let gl = HeadlessContext::new();
        let mut shape = Shape::rectangle(&gl, VP, 0.0, 0.0, 40.0, 20.0, Color::GREEN).unwrap();
        let before = shape.screen_positions().to_vec();

        shape.rotate(&gl, std::f32::consts::PI);
        let after = shape.screen_positions();
        // Top-left ends up where bottom-right was.
        assert!(close(after[0], Vec2::new(40.0, 20.0)));
        assert!(close(shape.centroid(), Vec2::centroid(&before)));
    }

    #[test]
    fn scale_around_centroid() {
        let gl = HeadlessContext::new();
        let mut shape = Shape::rectangle(&gl, VP, 10.0, 10.0, 20.0, 20.0, Color::GREEN).unwrap();
        shape.scale(&gl, 2.0, 0.5);
        assert!(close(shape.screen_positions()[0], Vec2::new(0.0, 15.0)));
        assert!(close(shape.centroid(), Vec2::new(20.0, 20.0)));
    }

    #[test]
    fn recolor_updates_every_vertex() {
        let gl = HeadlessContext::new();
        let mut shape = Shape::triangle(
            &gl,
            VP,
            [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)],
            Color::RED,
        )
        .unwrap();

        shape.set_color(&gl, Color::BLUE);
        assert!(shape.vertices().iter().all(|v| v.color == Color::BLUE.to_array()));

        assert_eq!(shape.vertices()[0].op_code(), Some(OpCode::Solid));
    }

    #[test]
    fn hide_keeps_colors_and_render_shows_again() {
        let gl = HeadlessContext::new();
        let half_red = Color::new(1.0, 0.0, 0.0, 0.5);
        let mut shape = Shape::rectangle(&gl, VP, 0.0, 0.0, 10.0, 10.0, half_red).unwrap();

        gl.take_calls();
        shape.hide();
        assert!(!shape.is_visible());
        assert!(gl.calls().is_empty());

        let mut queue = RenderQueue::new();
        shape.render(&mut queue);
        assert!(shape.is_visible());
        assert_eq!(queue.shape_draws().count(), 1);
        assert!(shape.vertices().iter().all(|v| v.color == half_red.to_array()));
    }

    // ── render ────────────────────────────────────────────────────────────

    #[test]
    fn render_snapshots_clip_each_call() {
        let gl = HeadlessContext::new();
        let mut shape = Shape::rectangle(&gl, VP, 0.0, 0.0, 10.0, 10.0, Color::RED).unwrap();
        let mut queue = RenderQueue::new();

        let clip = ClipRect::new(0, 0, 5, 5);
        queue.push_clip_rect(clip);
        shape.render(&mut queue);
        assert_eq!(shape.clip_rect(), Some(clip));

        queue.pop_clip_rect();
        shape.render(&mut queue);
        assert_eq!(shape.clip_rect(), None);

        let clips: Vec<_> = queue.shape_draws().map(|d| d.clip_rect).collect();
        assert_eq!(clips, vec![Some(clip), None]);
    }

    // ── dispose ───────────────────────────────────────────────────────────

    #[test]
    fn dispose_releases_once() {
        let gl = HeadlessContext::new();
        let mut shape = Shape::rectangle(&gl, VP, 0.0, 0.0, 10.0, 10.0, Color::RED).unwrap();
        assert_eq!(gl.live_objects(), 2);

        shape.dispose(&gl);
        assert_eq!(gl.live_objects(), 0);

        gl.take_calls();
        shape.dispose(&gl);
        shape.move_to(&gl, 1.0, 1.0);
        shape.set_color(&gl, Color::WHITE);
        assert!(gl.calls().is_empty());

        let mut queue = RenderQueue::new();
        shape.render(&mut queue);
        assert_eq!(queue.shape_draws().count(), 0);
    }
}
