use crate::coords::{ClipRect, Color, Rect, Vec2};

/// Shape kind of a primitive, as the fragment stage sees it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpCode {
    Solid,
    Circle,
    RoundedRect,
    Line,
    Text,
}

impl OpCode {
    /// Numeric tag written into the vertex stream. Must match the `OP_*`
    /// constants in `primitive.frag`.
    #[inline]
    pub(crate) const fn to_gpu(self) -> f32 {
        match self {
            OpCode::Solid => 0.0,
            OpCode::Circle => 1.0,
            OpCode::RoundedRect => 2.0,
            OpCode::Line => 3.0,
            OpCode::Text => 4.0,
        }
    }

    pub(crate) fn from_gpu(tag: f32) -> Option<Self> {
        match tag.round() as i32 {
            0 => Some(OpCode::Solid),
            1 => Some(OpCode::Circle),
            2 => Some(OpCode::RoundedRect),
            3 => Some(OpCode::Line),
            4 => Some(OpCode::Text),
            _ => None,
        }
    }
}

/// Kind-specific payload. Each variant carries exactly the data its shader
/// branch reads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PrimitiveKind {
    Solid,
    Circle,
    RoundedRect,
    /// `direction` is `(cos, sin) * half_length` of the segment.
    Line { direction: Vec2 },
    /// Atlas UV rectangle: top-left origin and size.
    Text { uv_origin: Vec2, uv_size: Vec2 },
}

impl PrimitiveKind {
    #[inline]
    pub fn op_code(self) -> OpCode {
        match self {
            PrimitiveKind::Solid => OpCode::Solid,
            PrimitiveKind::Circle => OpCode::Circle,
            PrimitiveKind::RoundedRect => OpCode::RoundedRect,
            PrimitiveKind::Line { .. } => OpCode::Line,
            PrimitiveKind::Text { .. } => OpCode::Text,
        }
    }
}

/// One drawable before vertex expansion.
///
/// The box is in logical pixels with a top-left origin. `radius` means corner
/// radius, circle radius or half line width depending on `kind`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Primitive {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: Color,
    pub radius: f32,
    pub kind: PrimitiveKind,
    pub clip_rect: Option<ClipRect>,
}

impl Default for Primitive {
    /// Zero box, solid, fully transparent: draws nothing.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            color: Color::TRANSPARENT,
            radius: 0.0,
            kind: PrimitiveKind::Solid,
            clip_rect: None,
        }
    }
}

impl Primitive {
    /// Solid axis-aligned rectangle.
    pub fn rect(x: f32, y: f32, w: f32, h: f32, color: Color) -> Self {
        Self { x, y, w, h, color, ..Self::default() }
    }

    /// SDF circle centered on `(cx, cy)`.
    pub fn circle(cx: f32, cy: f32, r: f32, color: Color) -> Self {
        Self {
            x: cx - r,
            y: cy - r,
            w: r * 2.0,
            h: r * 2.0,
            color,
            radius: r,
            kind: PrimitiveKind::Circle,
            clip_rect: None,
        }
    }

    /// SDF rectangle with uniform corner radius. Negative radii clamp to zero.
    pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) -> Self {
        Self {
            x,
            y,
            w,
            h,
            color,
            radius: radius.max(0.0),
            kind: PrimitiveKind::RoundedRect,
            clip_rect: None,
        }
    }

    /// Capsule of thickness `width` from `(x1, y1)` to `(x2, y2)`.
    ///
    /// Coincident endpoints give [`Primitive::default`], an invisible no-op.
    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color) -> Self {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 || !length.is_finite() {
            return Self::default();
        }

        let sin = dy / length;
        let cos = dx / length;
        let half_width = width * 0.5;
        let half_length = length * 0.5;

        let side = Vec2::new(-sin * half_width, cos * half_width);
        let (p1, p2) = (Vec2::new(x1, y1), Vec2::new(x2, y2));
        let corners = [p1 + side, p2 + side, p2 - side, p1 - side];

        // Four corners always yield a box.
        let bounds = Rect::bounding(corners).unwrap_or_default();

        Self {
            x: bounds.origin.x,
            y: bounds.origin.y,
            w: bounds.size.x,
            h: bounds.size.y,
            color,
            radius: half_width,
            kind: PrimitiveKind::Line {
                direction: Vec2::new(cos * half_length, sin * half_length),
            },
            clip_rect: None,
        }
    }

    /// MSDF glyph quad sampling the atlas region `uv_origin .. uv_origin + uv_size`.
    pub fn glyph(x: f32, y: f32, w: f32, h: f32, uv_origin: Vec2, uv_size: Vec2, color: Color) -> Self {
        Self {
            x,
            y,
            w,
            h,
            color,
            radius: 0.0,
            kind: PrimitiveKind::Text { uv_origin, uv_size },
            clip_rect: None,
        }
    }

    #[inline]
    pub fn with_clip(mut self, clip: Option<ClipRect>) -> Self {
        self.clip_rect = clip;
        self
    }

    #[inline]
    pub fn op_code(&self) -> OpCode {
        self.kind.op_code()
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ── constructors ──────────────────────────────────────────────────────

    #[test]
    fn circle_box_is_centered() {
        let c = Primitive::circle(50.0, 40.0, 10.0, Color::WHITE);
        assert_eq!(c.bounds(), Rect::new(40.0, 30.0, 20.0, 20.0));
        assert_eq!(c.radius, 10.0);
        assert_eq!(c.op_code(), OpCode::Circle);
    }

    #[test]
    fn rounded_rect_clamps_negative_radius() {
        let r = Primitive::rounded_rect(0.0, 0.0, 10.0, 10.0, -3.0, Color::WHITE);
        assert_eq!(r.radius, 0.0);
        assert_eq!(r.op_code(), OpCode::RoundedRect);
    }

    #[test]
    fn rect_is_solid_without_radius() {
        let r = Primitive::rect(10.0, 10.0, 100.0, 50.0, Color::RED);
        assert_eq!(r.op_code(), OpCode::Solid);
        assert_eq!(r.radius, 0.0);
        assert_eq!(r.clip_rect, None);
    }

    // ── line ──────────────────────────────────────────────────────────────

    #[test]
    fn horizontal_line_box_and_direction() {
        let l = Primitive::line(10.0, 20.0, 110.0, 20.0, 4.0, Color::BLACK);
        assert!(approx(l.x, 10.0) && approx(l.y, 18.0));
        assert!(approx(l.w, 100.0) && approx(l.h, 4.0));
        assert_eq!(l.radius, 2.0);
        match l.kind {
            PrimitiveKind::Line { direction } => {
                assert!(approx(direction.x, 50.0));
                assert!(approx(direction.y, 0.0));
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn diagonal_line_box_covers_rotated_capsule() {
        let l = Primitive::line(0.0, 0.0, 30.0, 40.0, 10.0, Color::BLACK);
        // sin = 0.8, cos = 0.6, half width 5: side offset (-4, 3).
        assert!(approx(l.x, -4.0));
        assert!(approx(l.y, -3.0));
        assert!(approx(l.w, 38.0));
        assert!(approx(l.h, 46.0));
    }

    #[test]
    fn degenerate_line_is_invisible_noop() {
        let l = Primitive::line(5.0, 5.0, 5.0, 5.0, 3.0, Color::RED);
        assert_eq!(l.w, 0.0);
        assert_eq!(l.h, 0.0);
        assert_eq!(l.op_code(), OpCode::Solid);
        assert_eq!(l.color.a, 0.0);
        assert!(l.x.is_finite() && l.y.is_finite());
    }

    // ── gpu tag ───────────────────────────────────────────────────────────

    #[test]
    fn gpu_tags_decode_back() {
        for op in [
            OpCode::Solid,
            OpCode::Circle,
            OpCode::RoundedRect,
            OpCode::Line,
            OpCode::Text,
        ] {
            assert_eq!(OpCode::from_gpu(op.to_gpu()), Some(op));
        }
        assert_eq!(OpCode::from_gpu(9.0), None);
    }
}
