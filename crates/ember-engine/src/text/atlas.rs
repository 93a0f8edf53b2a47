use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::coords::Vec2;

/// Error returned while loading a glyph atlas.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode atlas image")]
    Image(#[from] image::ImageError),

    #[error("failed to parse atlas metadata")]
    Json(#[from] serde_json::Error),

    #[error("invalid atlas metrics: {0}")]
    InvalidMetrics(String),
}

fn read_file(path: &Path) -> Result<Vec<u8>, AtlasError> {
    std::fs::read(path).map_err(|source| AtlasError::Io { path: path.to_path_buf(), source })
}

// ── image ─────────────────────────────────────────────────────────────────

/// Atlas bitmap as tightly packed RGBA8 rows, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl AtlasImage {
    /// Decodes an encoded image (PNG) and converts it to RGBA8.
    ///
    /// Single-channel SDF atlases expand to grey RGB with opaque alpha, which
    /// the median decode reads the same way.
    pub fn decode(bytes: &[u8]) -> Result<Self, AtlasError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self { width, height, pixels: rgba.into_raw() })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        Self::decode(&read_file(path.as_ref())?)
    }
}

// ── metadata ──────────────────────────────────────────────────────────────

/// Distance field flavor the atlas was generated with.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtlasKind {
    Hardmask,
    Softmask,
    Sdf,
    Psdf,
    #[default]
    Msdf,
    Mtsdf,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum YOrigin {
    #[default]
    Bottom,
    Top,
}

/// Font-wide metrics in em units.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    pub em_size: f32,
    pub line_height: f32,
    pub ascender: f32,
    pub descender: f32,
}

/// Box edges as written by msdf-atlas-gen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

/// Placement and atlas region for one codepoint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Pen advance, em units.
    pub advance: f32,
    /// Glyph box relative to the pen on the baseline, em units, +Y up.
    /// All zero for blank glyphs such as space.
    pub plane: Bounds,
    /// Top-left atlas UV.
    pub uv_min: Vec2,
    /// Bottom-right atlas UV.
    pub uv_max: Vec2,
}

impl Glyph {
    /// Blank glyph that only moves the pen.
    pub fn blank(advance: f32) -> Self {
        Self { advance, plane: Bounds::default(), uv_min: Vec2::zero(), uv_max: Vec2::zero() }
    }
}

/// Glyph lookup used by text layout.
pub trait GlyphSource {
    fn glyph(&self, ch: char) -> Option<&Glyph>;
    fn metrics(&self) -> FontMetrics;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasHeader {
    #[serde(rename = "type", default)]
    kind: AtlasKind,
    distance_range: f32,
    #[serde(default)]
    size: f32,
    width: u32,
    height: u32,
    #[serde(default)]
    y_origin: YOrigin,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlyphEntry {
    unicode: u32,
    advance: f32,
    plane_bounds: Option<Bounds>,
    atlas_bounds: Option<Bounds>,
}

#[derive(Deserialize)]
struct AtlasFile {
    atlas: AtlasHeader,
    metrics: FontMetrics,
    glyphs: Vec<GlyphEntry>,
}

/// Glyph table parsed from msdf-atlas-gen JSON.
#[derive(Debug, Clone)]
pub struct MsdfAtlas {
    kind: AtlasKind,
    distance_range: f32,
    glyph_size: f32,
    width: u32,
    height: u32,
    metrics: FontMetrics,
    glyphs: HashMap<char, Glyph>,
}

impl MsdfAtlas {
    pub fn from_json(json: &str) -> Result<Self, AtlasError> {
        let file: AtlasFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let bytes = read_file(path.as_ref())?;
        let file: AtlasFile = serde_json::from_slice(&bytes)?;
        Self::from_file(file)
    }

    fn from_file(file: AtlasFile) -> Result<Self, AtlasError> {
        let AtlasFile { atlas, metrics, glyphs: entries } = file;

        if !(metrics.em_size > 0.0) {
            return Err(AtlasError::InvalidMetrics(format!("emSize {}", metrics.em_size)));
        }
        if atlas.width == 0 || atlas.height == 0 {
            return Err(AtlasError::InvalidMetrics(format!(
                "atlas size {}x{}",
                atlas.width, atlas.height
            )));
        }

        let (w, h) = (atlas.width as f32, atlas.height as f32);
        let mut glyphs = HashMap::with_capacity(entries.len());

        for entry in entries {
            let Some(ch) = char::from_u32(entry.unicode) else {
                log::warn!("skipping glyph with invalid codepoint {:#x}", entry.unicode);
                continue;
            };

            let glyph = match (entry.plane_bounds, entry.atlas_bounds) {
                (Some(plane), Some(region)) => match atlas.y_origin {
                    YOrigin::Bottom => Glyph {
                        advance: entry.advance,
                        plane,
                        uv_min: Vec2::new(region.left / w, 1.0 - region.top / h),
                        uv_max: Vec2::new(region.right / w, 1.0 - region.bottom / h),
                    },
                    // Y-down output: flip plane bounds back to +Y up.
                    YOrigin::Top => Glyph {
                        advance: entry.advance,
                        plane: Bounds {
                            left: plane.left,
                            bottom: -plane.bottom,
                            right: plane.right,
                            top: -plane.top,
                        },
                        uv_min: Vec2::new(region.left / w, region.top / h),
                        uv_max: Vec2::new(region.right / w, region.bottom / h),
                    },
                },
                _ => Glyph::blank(entry.advance),
            };

            glyphs.insert(ch, glyph);
        }

        log::debug!(
            "loaded {:?} atlas {}x{} with {} glyphs",
            atlas.kind,
            atlas.width,
            atlas.height,
            glyphs.len()
        );

        Ok(Self {
            kind: atlas.kind,
            distance_range: atlas.distance_range,
            glyph_size: atlas.size,
            width: atlas.width,
            height: atlas.height,
            metrics,
            glyphs,
        })
    }

    #[inline]
    pub fn kind(&self) -> AtlasKind {
        self.kind
    }

    /// Distance range the atlas was generated with, in atlas texels.
    #[inline]
    pub fn distance_range(&self) -> f32 {
        self.distance_range
    }

    /// Em size in atlas pixels at generation time.
    #[inline]
    pub fn glyph_size(&self) -> f32 {
        self.glyph_size
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl GlyphSource for MsdfAtlas {
    #[inline]
    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    #[inline]
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::atlas_fixture::ATLAS_JSON;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn parses_header_and_metrics() {
        let atlas = MsdfAtlas::from_json(ATLAS_JSON).unwrap();
        assert_eq!(atlas.kind(), AtlasKind::Mtsdf);
        assert_eq!(atlas.distance_range(), 8.0);
        assert_eq!(atlas.size(), (256, 128));
        assert_eq!(atlas.len(), 3);
        assert_eq!(atlas.metrics().ascender, 1.0);
    }

    #[test]
    fn uvs_flip_bottom_origin() {
        let atlas = MsdfAtlas::from_json(ATLAS_JSON).unwrap();
        let a = atlas.glyph('A').unwrap();
        assert!(close(a.uv_min.x, 0.0));
        assert!(close(a.uv_min.y, 0.0));
        assert!(close(a.uv_max.x, 0.125));
        assert!(close(a.uv_max.y, 0.5));
        assert_eq!(a.plane.top, 0.7);
    }

    #[test]
    fn blank_glyph_keeps_advance() {
        let atlas = MsdfAtlas::from_json(ATLAS_JSON).unwrap();
        assert_eq!(*atlas.glyph(' ').unwrap(), Glyph::blank(0.25));
        assert!(atlas.glyph('Z').is_none());
    }

    #[test]
    fn top_origin_is_normalized() {
        let json = r#"{
            "atlas": { "distanceRange": 4, "width": 100, "height": 100, "yOrigin": "top" },
            "metrics": { "emSize": 1, "lineHeight": 1.2, "ascender": 0.9, "descender": -0.2 },
            "glyphs": [
                { "unicode": 97, "advance": 0.5,
                  "planeBounds": { "left": 0.0, "bottom": 0.1, "right": 0.4, "top": -0.5 },
                  "atlasBounds": { "left": 10.0, "bottom": 40.0, "right": 30.0, "top": 20.0 } }
            ]
        }"#;
        let atlas = MsdfAtlas::from_json(json).unwrap();
        assert_eq!(atlas.kind(), AtlasKind::Msdf);

        let g = atlas.glyph('a').unwrap();
        assert_eq!(g.plane.top, 0.5);
        assert_eq!(g.plane.bottom, -0.1);
        assert!(close(g.uv_min.y, 0.2));
        assert!(close(g.uv_max.y, 0.4));
    }

    #[test]
    fn zero_em_size_is_rejected() {
        let json = ATLAS_JSON.replace(r#""emSize": 1"#, r#""emSize": 0"#);
        let err = MsdfAtlas::from_json(&json).unwrap_err();
        assert!(matches!(err, AtlasError::InvalidMetrics(_)));
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(MsdfAtlas::from_json("{"), Err(AtlasError::Json(_))));
    }

    #[test]
    fn missing_file_names_path() {
        let err = MsdfAtlas::open("/nonexistent/atlas.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/atlas.json"));
    }

    #[test]
    fn decodes_png_to_rgba() {
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(1, 0, image::Rgb([10, 20, 30]));

        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = AtlasImage::decode(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.pixels.len(), 3 * 2 * 4);
        assert_eq!(&decoded.pixels[4..8], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_image_is_an_error() {
        assert!(matches!(AtlasImage::decode(&[1, 2, 3]), Err(AtlasError::Image(_))));
    }
}
