/// Clip box in logical pixels (top-left origin).
///
/// Integer coordinates keep equality exact: consecutive primitives are batched
/// into one scissor run only when their clip boxes compare equal.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ClipRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlap of two boxes. Disjoint or touching boxes give `None`.
    ///
    /// Edges are computed in `i64`, so huge boxes never overflow; the
    /// resulting extent saturates at `i32::MAX`.
    pub fn intersect(self, other: ClipRect) -> Option<ClipRect> {
        let right = |c: ClipRect| c.x as i64 + c.width as i64;
        let bottom = |c: ClipRect| c.y as i64 + c.height as i64;

        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = right(self).min(right(other));
        let y1 = bottom(self).min(bottom(other));

        if x1 <= x0 as i64 || y1 <= y0 as i64 {
            return None;
        }

        let extent = |hi: i64, lo: i32| (hi - lo as i64).min(i32::MAX as i64) as i32;
        Some(ClipRect::new(x0, y0, extent(x1, x0), extent(y1, y0)))
    }
}
