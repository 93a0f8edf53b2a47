use std::ops::Range;

use crate::coords::ClipRect;
use crate::render::{Primitive, PrimitiveBuffer, RenderCtx, ShapeDraw};

use super::ClipStack;

/// One entry of the frame's draw stream.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem {
    /// Range into the queued primitives, drawn as one batch.
    Batch(Range<usize>),
    Shape(ShapeDraw),
}

/// Draw stream for a frame.
///
/// Primitives pile up into the pending batch. Adding a shape seals that
/// batch first, so everything queued before the shape is painted before it.
///
/// ```ignore
/// queue.draw_primitive(a);
/// shape.render(&mut queue);
/// queue.draw_primitive(c);
/// // paints: [a], shape, [c]
/// ```
#[derive(Debug, Default)]
pub struct RenderQueue {
    primitives: Vec<Primitive>,
    items: Vec<QueueItem>,
    /// Start of the batch that has not been sealed yet.
    pending: usize,
    clips: ClipStack,
}

impl RenderQueue {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a primitive under the current clip rect.
    ///
    /// A primitive that already carries a clip is narrowed by the stack.
    pub fn draw_primitive(&mut self, mut primitive: Primitive) {
        if let Some(current) = self.clips.current() {
            primitive.clip_rect = Some(match primitive.clip_rect {
                Some(own) => own.intersect(current).unwrap_or(ClipRect::zero()),
                None => current,
            });
        }
        self.primitives.push(primitive);
    }

    pub fn draw_primitives(&mut self, primitives: impl IntoIterator<Item = Primitive>) {
        for p in primitives {
            self.draw_primitive(p);
        }
    }

    // ── clip stack ────────────────────────────────────────────────────────

    #[inline]
    pub fn push_clip_rect(&mut self, rect: ClipRect) {
        self.clips.push(rect);
    }

    #[inline]
    pub fn pop_clip_rect(&mut self) {
        self.clips.pop();
    }

    #[inline]
    pub fn current_clip_rect(&self) -> Option<ClipRect> {
        self.clips.current()
    }

    // ── shapes ────────────────────────────────────────────────────────────

    /// Appends a shape draw after everything queued so far.
    pub fn add_to_render_queue(&mut self, draw: ShapeDraw) {
        self.seal();
        self.items.push(QueueItem::Shape(draw));
    }

    fn seal(&mut self) {
        let end = self.primitives.len();
        if end > self.pending {
            self.items.push(QueueItem::Batch(self.pending..end));
            self.pending = end;
        }
    }

    // ── inspection ────────────────────────────────────────────────────────

    #[inline]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Draw stream in paint order, including the unsealed tail batch.
    pub fn items(&self) -> impl Iterator<Item = QueueItem> + '_ {
        let end = self.primitives.len();
        let tail = (end > self.pending).then(|| QueueItem::Batch(self.pending..end));
        self.items.iter().cloned().chain(tail)
    }

    pub fn shape_draws(&self) -> impl Iterator<Item = &ShapeDraw> + '_ {
        self.items.iter().filter_map(|item| match item {
            QueueItem::Shape(draw) => Some(draw),
            QueueItem::Batch(_) => None,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.items.is_empty()
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Paints the stream through `buffer`: each batch is uploaded with its
    /// clip runs and flushed, each shape drawn with the shared program.
    pub fn render(&self, ctx: &RenderCtx<'_>, buffer: &mut PrimitiveBuffer) {
        for item in self.items() {
            match item {
                QueueItem::Batch(range) => {
                    buffer.update_primitives_with_clip_rects(ctx.gl, ctx.viewport, &self.primitives[range]);
                    buffer.flush_immediate(ctx);
                }
                QueueItem::Shape(draw) => buffer.render_shape(ctx, &draw),
            }
        }
    }

    /// Empties the stream and the clip stack, keeping allocations.
    pub fn prepare_frame(&mut self) {
        if self.clips.depth() > 0 {
            log::warn!("{} clip rects still pushed at frame start", self.clips.depth());
        }
        self.primitives.clear();
        self.items.clear();
        self.pending = 0;
        self.clips.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Color, Viewport};
    use crate::gfx::consts::{SCISSOR_TEST, TRIANGLES};
    use crate::gfx::{GlCall, HeadlessContext, VertexArray};
    use crate::render::BufferConfig;

    fn rect(x: f32) -> Primitive {
        Primitive::rect(x, 0.0, 10.0, 10.0, Color::WHITE)
    }

    fn shape(vao: u32) -> ShapeDraw {
        ShapeDraw { vao: VertexArray(vao), vertex_count: 3, clip_rect: None }
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn shape_seals_pending_batch() {
        let mut queue = RenderQueue::new();
        queue.draw_primitive(rect(0.0));
        queue.draw_primitive(rect(1.0));
        queue.add_to_render_queue(shape(7));
        queue.draw_primitive(rect(2.0));

        let items: Vec<_> = queue.items().collect();
        assert_eq!(
            items,
            vec![QueueItem::Batch(0..2), QueueItem::Shape(shape(7)), QueueItem::Batch(2..3)]
        );
    }

    #[test]
    fn back_to_back_shapes_have_no_empty_batch() {
        let mut queue = RenderQueue::new();
        queue.add_to_render_queue(shape(1));
        queue.add_to_render_queue(shape(2));
        let items: Vec<_> = queue.items().collect();
        assert_eq!(items, vec![QueueItem::Shape(shape(1)), QueueItem::Shape(shape(2))]);
    }

    #[test]
    fn render_paints_in_call_order() {
        let gl = HeadlessContext::new();
        let mut buffer = PrimitiveBuffer::new(&gl, BufferConfig::default()).unwrap();
        let ctx = RenderCtx::new(&gl, Viewport::new(800.0, 600.0), (800, 600));

        let mut queue = RenderQueue::new();
        queue.draw_primitive(rect(0.0));
        queue.add_to_render_queue(shape(99));
        queue.draw_primitive(rect(20.0));
        queue.draw_primitive(rect(40.0));

        gl.take_calls();
        queue.render(&ctx, &mut buffer);

        let sequence: Vec<_> = gl
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::BindVertexArray(vao) if vao.is_valid() => Some(format!("vao {}", vao.0)),
                GlCall::DrawArrays { mode: TRIANGLES, first, count } => Some(format!("draw {first}+{count}")),
                _ => None,
            })
            .collect();

        let batch_vao = sequence[0].clone();
        assert_eq!(
            sequence,
            vec![
                batch_vao.clone(),
                "draw 0+6".to_string(),
                "vao 99".to_string(),
                "draw 0+3".to_string(),
                batch_vao,
                "draw 0+12".to_string(),
            ]
        );
        // Each batch is flushed after drawing.
        assert!(buffer.vertices().is_empty());
    }

    #[test]
    fn shape_keeps_equal_clips_apart() {
        let gl = HeadlessContext::new();
        let mut buffer = PrimitiveBuffer::new(&gl, BufferConfig::default()).unwrap();
        let ctx = RenderCtx::new(&gl, Viewport::new(800.0, 600.0), (800, 600));
        let clip = ClipRect::new(10, 20, 100, 50);

        let mut queue = RenderQueue::new();
        queue.push_clip_rect(clip);
        queue.draw_primitive(rect(0.0));
        queue.pop_clip_rect();
        queue.add_to_render_queue(shape(42));
        queue.push_clip_rect(clip);
        queue.draw_primitive(rect(20.0));
        queue.pop_clip_rect();

        gl.take_calls();
        queue.render(&ctx, &mut buffer);

        // Scissor state in effect at each draw, in draw order.
        let mut scissor = None;
        let mut draws = Vec::new();
        for call in gl.calls() {
            match call {
                GlCall::Enable(SCISSOR_TEST) => scissor = Some([0; 4]),
                GlCall::Disable(SCISSOR_TEST) => scissor = None,
                GlCall::Scissor(r) => scissor = Some(r),
                GlCall::DrawArrays { mode: TRIANGLES, count, .. } => draws.push((scissor, count)),
                _ => {}
            }
        }

        let x = Some([10, 530, 100, 50]);
        assert_eq!(draws, vec![(x, 6), (None, 3), (x, 6)]);
    }

    // ── clipping ──────────────────────────────────────────────────────────

    #[test]
    fn primitives_take_the_current_clip() {
        let mut queue = RenderQueue::new();
        let outer = ClipRect::new(0, 0, 100, 100);

        queue.draw_primitive(rect(0.0));
        queue.push_clip_rect(outer);
        queue.draw_primitive(rect(1.0));
        queue.push_clip_rect(ClipRect::new(50, 50, 100, 100));
        queue.draw_primitive(rect(2.0));
        queue.pop_clip_rect();
        queue.pop_clip_rect();
        queue.draw_primitive(rect(3.0));

        let clips: Vec<_> = queue.primitives().iter().map(|p| p.clip_rect).collect();
        assert_eq!(
            clips,
            vec![None, Some(outer), Some(ClipRect::new(50, 50, 50, 50)), None]
        );
    }

    #[test]
    fn own_clip_is_narrowed_by_stack() {
        let mut queue = RenderQueue::new();
        queue.push_clip_rect(ClipRect::new(0, 0, 20, 20));
        queue.draw_primitive(rect(0.0).with_clip(Some(ClipRect::new(10, 10, 50, 50))));
        assert_eq!(queue.primitives()[0].clip_rect, Some(ClipRect::new(10, 10, 10, 10)));
    }

    #[test]
    fn prepare_frame_resets_everything() {
        let mut queue = RenderQueue::new();
        queue.push_clip_rect(ClipRect::new(0, 0, 1, 1));
        queue.draw_primitive(rect(0.0));
        queue.add_to_render_queue(shape(1));

        queue.prepare_frame();
        assert!(queue.is_empty());
        assert_eq!(queue.current_clip_rect(), None);
        assert_eq!(queue.items().count(), 0);
    }
}
