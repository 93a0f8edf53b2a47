use std::path::Path;

use crate::coords::{Color, Vec2};
use crate::render::Primitive;

use super::{layout_text, measure_text, AtlasError, AtlasImage, FontMetrics, Glyph, GlyphSource, MsdfAtlas};

/// A pregenerated MSDF font: glyph table plus atlas bitmap.
///
/// The bitmap is handed to the renderer with
/// [`Engine::set_font_atlas`](crate::core::Engine::set_font_atlas); layout only
/// needs the glyph table.
#[derive(Debug, Clone)]
pub struct Font {
    atlas: MsdfAtlas,
    image: AtlasImage,
}

impl Font {
    pub fn new(atlas: MsdfAtlas, image: AtlasImage) -> Self {
        if atlas.size() != (image.width, image.height) {
            log::warn!(
                "atlas metadata says {:?} but the image is {}x{}; UVs follow the metadata",
                atlas.size(),
                image.width,
                image.height
            );
        }
        Self { atlas, image }
    }

    /// Loads msdf-atlas-gen output: the PNG bitmap and its JSON description.
    pub fn from_files(png: impl AsRef<Path>, json: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let image = AtlasImage::open(png)?;
        let atlas = MsdfAtlas::open(json)?;
        Ok(Self::new(atlas, image))
    }

    pub fn from_bytes(png: &[u8], json: &str) -> Result<Self, AtlasError> {
        Ok(Self::new(MsdfAtlas::from_json(json)?, AtlasImage::decode(png)?))
    }

    #[inline]
    pub fn atlas(&self) -> &MsdfAtlas {
        &self.atlas
    }

    #[inline]
    pub fn image(&self) -> &AtlasImage {
        &self.image
    }

    /// Distance range in atlas texels, as expected by the text shader.
    #[inline]
    pub fn px_range(&self) -> f32 {
        self.atlas.distance_range()
    }

    /// One Text primitive per visible glyph; `(x, y)` is the top-left of the
    /// first line.
    pub fn render_text_primitives(&self, text: &str, x: f32, y: f32, font_size: f32, color: Color) -> Vec<Primitive> {
        layout_text(self, text, Vec2::new(x, y), font_size, color)
    }

    /// Width of the longest line.
    pub fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        measure_text(self, text, font_size)
    }
}

impl GlyphSource for Font {
    #[inline]
    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.atlas.glyph(ch)
    }

    #[inline]
    fn metrics(&self) -> FontMetrics {
        self.atlas.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::atlas_fixture::{png, ATLAS_JSON};

    #[test]
    fn from_bytes_pairs_atlas_and_image() {
        let font = Font::from_bytes(&png(256, 128), ATLAS_JSON).unwrap();
        assert_eq!((font.image().width, font.image().height), (256, 128));
        assert_eq!(font.px_range(), 8.0);
    }

    #[test]
    fn text_matches_layout_over_atlas() {
        let font = Font::from_bytes(&png(4, 4), ATLAS_JSON).unwrap();
        let via_font = font.render_text_primitives("AB A", 3.0, 4.0, 16.0, Color::RED);
        let via_atlas = layout_text(font.atlas(), "AB A", Vec2::new(3.0, 4.0), 16.0, Color::RED);
        assert_eq!(via_font, via_atlas);
        assert_eq!(via_font.len(), 3);
        assert!(via_font.iter().all(|p| p.color == Color::RED));
    }

    #[test]
    fn measure_uses_font_size() {
        let font = Font::from_bytes(&png(4, 4), ATLAS_JSON).unwrap();
        let w10 = font.measure_text("AB", 10.0);
        let w20 = font.measure_text("AB", 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-4);
    }

    #[test]
    fn missing_png_is_io_error() {
        let err = Font::from_files("/nonexistent/font.png", "/nonexistent/font.json").unwrap_err();
        assert!(matches!(err, AtlasError::Io { .. }));
    }
}
