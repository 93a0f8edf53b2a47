use super::Vec2;

/// Logical surface size, the coordinate basis for NDC conversion.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Logical pixels to normalized device coordinates. Y flips: screen grows
    /// downward, NDC grows upward.
    #[inline]
    pub fn to_ndc(self, p: Vec2) -> Vec2 {
        Vec2::new(
            (p.x / self.width) * 2.0 - 1.0,
            1.0 - (p.y / self.height) * 2.0,
        )
    }

    /// Inverse of [`Viewport::to_ndc`].
    #[inline]
    pub fn from_ndc(self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}
