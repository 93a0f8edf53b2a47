//! Primitive → vertex expansion.

use crate::coords::{ClipRect, Vec2, Viewport};

use super::{Primitive, PrimitiveKind, PrimitiveVertex};

/// Vertices emitted per primitive (two triangles).
pub const VERTICES_PER_PRIMITIVE: usize = 6;

/// Corner order of the six vertices: BL, BR, TL, TL, BR, TR.
const LOCAL_POSITIONS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

/// Index into the 4-entry texcoord table for each of the six vertices.
const TEX_INDEX: [usize; 6] = [0, 1, 2, 2, 1, 3];

/// Expands `primitives` into six vertices each, in order.
///
/// Vertices `6k..6k+6` belong to primitive `k`.
pub fn convert_primitives_to_vertices(
    primitives: &[Primitive],
    viewport: Viewport,
) -> Vec<PrimitiveVertex> {
    let mut out = Vec::with_capacity(primitives.len() * VERTICES_PER_PRIMITIVE);
    append_vertices(&mut out, primitives, viewport);
    out
}

/// Like [`convert_primitives_to_vertices`] but appends into a reused buffer.
///
/// An invalid viewport appends nothing.
pub fn append_vertices(out: &mut Vec<PrimitiveVertex>, primitives: &[Primitive], viewport: Viewport) {
    if primitives.is_empty() {
        return;
    }
    if !viewport.is_valid() {
        log::warn!(
            "skipping {} primitives: invalid viewport {}x{}",
            primitives.len(),
            viewport.width,
            viewport.height
        );
        return;
    }

    out.reserve(primitives.len() * VERTICES_PER_PRIMITIVE);
    for p in primitives {
        expand(out, p, viewport);
    }
}

fn expand(out: &mut Vec<PrimitiveVertex>, p: &Primitive, viewport: Viewport) {
    let top_left = viewport.to_ndc(Vec2::new(p.x, p.y));
    let bottom_right = viewport.to_ndc(Vec2::new(p.x + p.w, p.y + p.h));
    let (left, top) = (top_left.x, top_left.y);
    let (right, bottom) = (bottom_right.x, bottom_right.y);

    let half_w = p.w * 0.5;
    let half_h = p.h * 0.5;

    let corners = [
        [left, bottom],
        [right, bottom],
        [left, top],
        [left, top],
        [right, bottom],
        [right, top],
    ];

    let tex = match p.kind {
        PrimitiveKind::Text { uv_origin: o, uv_size: s } => [
            [o.x, o.y + s.y],
            [o.x + s.x, o.y + s.y],
            [o.x, o.y],
            [o.x + s.x, o.y],
        ],
        PrimitiveKind::Line { direction: d } => [[d.x, d.y]; 4],
        PrimitiveKind::Solid | PrimitiveKind::Circle | PrimitiveKind::RoundedRect => {
            [[half_w, half_h]; 4]
        }
    };

    let op_code = p.op_code().to_gpu();
    let color = p.color.to_array();

    for i in 0..VERTICES_PER_PRIMITIVE {
        out.push(PrimitiveVertex {
            position: [corners[i][0], corners[i][1], 0.0],
            local_position: LOCAL_POSITIONS[i],
            op_code,
            radius: p.radius,
            color,
            tex_coords: tex[TEX_INDEX[i]],
            half_size: [half_w, half_h],
        });
    }
}

/// One clip rect per vertex: each primitive's clip repeated six times.
pub fn extract_clip_rects(primitives: &[Primitive]) -> Vec<Option<ClipRect>> {
    let mut out = Vec::with_capacity(primitives.len() * VERTICES_PER_PRIMITIVE);
    append_clip_rects(&mut out, primitives);
    out
}

pub fn append_clip_rects(out: &mut Vec<Option<ClipRect>>, primitives: &[Primitive]) {
    for p in primitives {
        out.extend(std::iter::repeat_n(p.clip_rect, VERTICES_PER_PRIMITIVE));
    }
}
