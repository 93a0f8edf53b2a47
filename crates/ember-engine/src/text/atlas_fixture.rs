//! Small hand-written atlas shared by the text and engine tests.

use super::{AtlasImage, Font, MsdfAtlas};

/// 256x128 bottom-origin MTSDF atlas, emSize 1:
/// space (blank, advance 0.25), `A` and `B`.
pub(crate) const ATLAS_JSON: &str = r#"{
    "atlas": { "type": "mtsdf", "distanceRange": 8, "size": 64, "width": 256, "height": 128, "yOrigin": "bottom" },
    "metrics": { "emSize": 1, "lineHeight": 1.2, "ascender": 1.0, "descender": -0.25 },
    "glyphs": [
        { "unicode": 32, "advance": 0.25 },
        { "unicode": 65, "advance": 0.6,
          "planeBounds": { "left": 0.0, "bottom": 0.0, "right": 0.5, "top": 0.7 },
          "atlasBounds": { "left": 0.0, "bottom": 64.0, "right": 32.0, "top": 128.0 } },
        { "unicode": 66, "advance": 0.5,
          "planeBounds": { "left": 0.05, "bottom": -0.1, "right": 0.45, "top": 0.7 },
          "atlasBounds": { "left": 32.0, "bottom": 0.0, "right": 64.0, "top": 64.0 } }
    ]
}"#;

/// Blank PNG of the given size.
pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    image::RgbaImage::new(width, height)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

pub(crate) fn atlas() -> MsdfAtlas {
    MsdfAtlas::from_json(ATLAS_JSON).unwrap()
}

pub(crate) fn font() -> Font {
    Font::new(atlas(), AtlasImage::decode(&png(256, 128)).unwrap())
}
