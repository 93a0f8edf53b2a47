use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x * 0.5, self.origin.y + self.size.y * 0.5)
    }

    #[inline]
    pub fn half_size(self) -> Vec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Smallest rectangle containing every point; `None` for an empty iterator.
    pub fn bounding(points: impl IntoIterator<Item = Vec2>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    /// Corners in screen order: top-left, top-right, bottom-left, bottom-right.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let max = self.max();
        [
            self.origin,
            Vec2::new(max.x, self.origin.y),
            Vec2::new(self.origin.x, max.y),
            max,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── bounding ──────────────────────────────────────────────────────────

    #[test]
    fn bounding_of_scattered_points() {
        let b = Rect::bounding([
            Vec2::new(4.0, -2.0),
            Vec2::new(-1.0, 3.0),
            Vec2::new(2.0, 8.0),
        ])
        .unwrap();
        assert_eq!(b, r(-1.0, -2.0, 5.0, 10.0));
    }

    #[test]
    fn bounding_of_nothing() {
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[test]
    fn center_and_half_size() {
        let rect = r(10.0, 10.0, 100.0, 50.0);
        assert_eq!(rect.center(), Vec2::new(60.0, 35.0));
        assert_eq!(rect.half_size(), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
