//! Logical drawing surface and the window collaborator.
//!
//! The surface size is the coordinate space primitives are written in. The
//! window only reports the framebuffer size, which differs on high-DPI
//! displays and scales viewport and scissor boxes.

mod window;

pub use window::Window;

use crate::coords::Viewport;

/// Logical surface size, in logical pixels.
///
/// [`Surface::set_size`] pins the size; later [`Surface::resize`] calls from
/// window events are ignored, so content keeps its coordinate space and is
/// stretched to the framebuffer instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    locked: bool,
}

impl Surface {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height, locked: false }
    }

    /// Surface matching the window's current logical size.
    pub fn from_winit(window: &winit::window::Window) -> Self {
        let size = window.inner_size().to_logical::<u32>(window.scale_factor());
        Self::new(size.width, size.height)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32, self.height as f32)
    }

    /// Sets the size and locks it against [`Surface::resize`].
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.locked = true;
    }

    /// Follows a window resize. Returns `false` when the size is locked.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.locked {
            log::trace!("surface locked at {}x{}; ignoring resize", self.width, self.height);
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn unlock(&mut self) {
        self.locked = false;
    }
}
