use crate::coords::{ClipRect, Viewport};
use crate::gfx::consts::SCISSOR_TEST;
use crate::gfx::GraphicsContext;

/// Scissor state for one draw, in framebuffer pixels (bottom-left origin).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Scissor {
    Disabled,
    Rect { x: i32, y: i32, width: i32, height: i32 },
    /// Clip with no area: the draw is skipped.
    Empty,
}

/// Maps a logical clip box onto the framebuffer.
///
/// Axes scale independently by `framebuffer / viewport` so high-DPI surfaces
/// clip at the right physical pixels; Y flips to GL's bottom-left origin.
pub(crate) fn clip_to_scissor(
    clip: Option<ClipRect>,
    viewport: Viewport,
    framebuffer: (u32, u32),
) -> Scissor {
    let Some(clip) = clip else {
        return Scissor::Disabled;
    };
    if clip.is_empty() || !viewport.is_valid() {
        return Scissor::Empty;
    }

    let sx = framebuffer.0 as f32 / viewport.width;
    let sy = framebuffer.1 as f32 / viewport.height;

    let x = (clip.x as f32 * sx) as i32;
    let y = (clip.y as f32 * sy) as i32;
    let width = (clip.width as f32 * sx) as i32;
    let height = (clip.height as f32 * sy) as i32;

    if width <= 0 || height <= 0 {
        return Scissor::Empty;
    }

    Scissor::Rect { x, y: framebuffer.1 as i32 - y - height, width, height }
}

/// Applies `scissor` and reports whether the draw should go ahead.
pub(crate) fn apply_scissor(gl: &dyn GraphicsContext, scissor: Scissor) -> bool {
    match scissor {
        Scissor::Disabled => {
            gl.disable(SCISSOR_TEST);
            true
        }
        Scissor::Rect { x, y, width, height } => {
            gl.enable(SCISSOR_TEST);
            gl.scissor(x, y, width, height);
            true
        }
        Scissor::Empty => false,
    }
}
