/// Source of the framebuffer size in physical pixels.
pub trait Window {
    fn framebuffer_size(&self) -> (u32, u32);
}

impl Window for winit::window::Window {
    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.inner_size();
        (size.width, size.height)
    }
}

/// Fixed framebuffer size, for offscreen and headless use.
impl Window for (u32, u32) {
    #[inline]
    fn framebuffer_size(&self) -> (u32, u32) {
        *self
    }
}
