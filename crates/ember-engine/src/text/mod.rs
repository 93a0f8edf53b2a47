//! MSDF text: atlas loading and glyph layout.
//!
//! Atlases come pregenerated from msdf-atlas-gen (PNG + JSON). Layout turns a
//! string into Text primitives that go through the same batch as shapes.

mod atlas;
mod font;
mod layout;

#[cfg(test)]
pub(crate) mod atlas_fixture;

pub use atlas::{AtlasError, AtlasImage, AtlasKind, Bounds, FontMetrics, Glyph, GlyphSource, MsdfAtlas};
pub use font::Font;
pub use layout::{append_text_primitives, layout_text, measure_text};
