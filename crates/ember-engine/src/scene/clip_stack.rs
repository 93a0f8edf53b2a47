use crate::coords::ClipRect;

/// Nested clip boxes. The top is always the effective clip, already
/// intersected with every parent.
#[derive(Debug, Default, Clone)]
pub struct ClipStack {
    stack: Vec<ClipRect>,
}

impl ClipStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `rect` intersected with the current top. A box that does not
    /// overlap its parent becomes zero-area, so everything under it is skipped.
    pub fn push(&mut self, rect: ClipRect) {
        let effective = match self.stack.last() {
            None => rect,
            Some(&parent) => parent.intersect(rect).unwrap_or(ClipRect::zero()),
        };
        self.stack.push(effective);
    }

    /// Pops the top. Popping an empty stack does nothing.
    pub fn pop(&mut self) {
        if self.stack.pop().is_none() {
            log::warn!("pop_clip_rect without a matching push");
        }
    }

    #[inline]
    pub fn current(&self) -> Option<ClipRect> {
        self.stack.last().copied()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
