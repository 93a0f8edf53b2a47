use crate::coords::{Color, Vec2};
use crate::render::Primitive;

use super::GlyphSource;

/// Baseline offset below the layout origin, as a fraction of the ascender.
/// Puts `origin.y` roughly at the cap height.
const CAP_HEIGHT_RATIO: f32 = 0.68;

/// Line advance, in multiples of the font size.
const LINE_SPACING: f32 = 1.2;

/// Lays out `text` and returns one Text primitive per visible glyph.
///
/// `origin` is the top-left of the first line. See [`append_text_primitives`].
pub fn layout_text<S>(source: &S, text: &str, origin: Vec2, font_size: f32, color: Color) -> Vec<Primitive>
where
    S: GlyphSource + ?Sized,
{
    let mut out = Vec::with_capacity(text.len());
    append_text_primitives(&mut out, source, text, origin, font_size, color);
    out
}

/// Appends one Text primitive per visible glyph of `text` to `out`.
///
/// Codepoints missing from `source` advance the pen by the space glyph's
/// advance and emit nothing. Each glyph box has its top-left corner snapped
/// to the pixel grid while width and height stay exact.
pub fn append_text_primitives<S>(
    out: &mut Vec<Primitive>,
    source: &S,
    text: &str,
    origin: Vec2,
    font_size: f32,
    color: Color,
) where
    S: GlyphSource + ?Sized,
{
    let metrics = source.metrics();
    let scale = font_size / metrics.em_size;
    let fallback = space_advance(source);

    let mut pen = Vec2::new(origin.x, origin.y + metrics.ascender / metrics.em_size * CAP_HEIGHT_RATIO * font_size);

    for ch in text.chars() {
        if ch == '\n' {
            pen.x = origin.x;
            pen.y += font_size * LINE_SPACING;
            continue;
        }

        let Some(glyph) = source.glyph(ch) else {
            pen.x += fallback * scale;
            continue;
        };

        let p = glyph.plane;
        let w = (p.right - p.left) * scale;
        let h = (p.top - p.bottom) * scale;

        if w > 0.0 && h > 0.0 {
            let x = snap(pen.x + p.left * scale);
            let y = snap(pen.y - p.top * scale);
            out.push(Primitive::glyph(x, y, w, h, glyph.uv_min, glyph.uv_max - glyph.uv_min, color));
        }

        pen.x += glyph.advance * scale;
    }
}

/// Width of the longest line of `text`, in logical pixels.
pub fn measure_text<S>(source: &S, text: &str, font_size: f32) -> f32
where
    S: GlyphSource + ?Sized,
{
    let scale = font_size / source.metrics().em_size;
    let fallback = space_advance(source);

    text.split('\n')
        .map(|line| {
            line.chars()
                .map(|ch| source.glyph(ch).map_or(fallback, |g| g.advance) * scale)
                .sum::<f32>()
        })
        .fold(0.0, f32::max)
}

#[inline]
fn space_advance<S: GlyphSource + ?Sized>(source: &S) -> f32 {
    source.glyph(' ').map_or(0.0, |g| g.advance)
}

#[inline]
fn snap(v: f32) -> f32 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PrimitiveKind;
    use crate::text::atlas_fixture::atlas;

    fn boxes(prims: &[Primitive]) -> Vec<(f32, f32, f32, f32)> {
        let r = |v: f32| (v * 1000.0).round() / 1000.0;
        prims.iter().map(|p| (r(p.x), r(p.y), r(p.w), r(p.h))).collect()
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn snaps_origin_keeps_exact_size() {
        let prims = layout_text(&atlas(), "AB", Vec2::new(10.3, 5.0), 20.0, Color::WHITE);
        assert_eq!(boxes(&prims), vec![(10.0, 5.0, 10.0, 14.0), (23.0, 5.0, 8.0, 16.0)]);

        match prims[0].kind {
            PrimitiveKind::Text { uv_origin, uv_size } => {
                assert_eq!(uv_origin, Vec2::new(0.0, 0.0));
                assert_eq!(uv_size, Vec2::new(0.125, 0.5));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn same_position_same_boxes() {
        let a = layout_text(&atlas(), "AB", Vec2::new(3.49, 7.51), 17.0, Color::WHITE);
        let b = layout_text(&atlas(), "AB", Vec2::new(3.49, 7.51), 17.0, Color::WHITE);
        assert_eq!(a, b);
    }

    #[test]
    fn newline_returns_to_origin() {
        let prims = layout_text(&atlas(), "A\nA", Vec2::new(10.3, 5.0), 20.0, Color::WHITE);
        assert_eq!(prims.len(), 2);
        assert_eq!(prims[1].x, 10.0);
        assert_eq!(prims[1].y, 29.0);
    }

    #[test]
    fn missing_glyph_advances_by_space() {
        let prims = layout_text(&atlas(), "ZA", Vec2::new(10.3, 5.0), 20.0, Color::WHITE);
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].x, 15.0);
    }

    #[test]
    fn blank_glyph_emits_nothing() {
        let prims = layout_text(&atlas(), " A", Vec2::new(0.0, 0.0), 20.0, Color::WHITE);
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].x, 5.0);
    }

    // ── measure ───────────────────────────────────────────────────────────

    #[test]
    fn measure_takes_longest_line() {
        let a = atlas();
        assert!((measure_text(&a, "AB\nA", 20.0) - 22.0).abs() < 1e-4);
        assert!((measure_text(&a, "Z", 20.0) - 5.0).abs() < 1e-4);
        assert_eq!(measure_text(&a, "", 20.0), 0.0);
    }
}
