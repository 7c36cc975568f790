use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ab_glyph::{Font as _, FontArc, GlyphId, PxScale, ScaleFont as _, point};

use crate::Pt;
use crate::canvas::TextRasterizer;
use crate::font::FontSet;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Single-channel coverage bitmap of a line of text.
///
/// Every texture gets a unique id so the renderer can cache its GPU copy.
/// `scale` is pixels per logical point; [`TextTexture::size`] divides it out.
#[derive(Clone, PartialEq)]
pub struct TextTexture {
    id: u64,
    width: u32,
    height: u32,
    scale: f32,
    coverage: Vec<u8>,
}

impl fmt::Debug for TextTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextTexture")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .finish()
    }
}

impl TextTexture {
    pub fn new(width: u32, height: u32, mut coverage: Vec<u8>) -> Self {
        coverage.resize(width as usize * height as usize, 0);
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            scale: 1.0,
            coverage,
        }
    }

    /// Marks the bitmap as rendered at `scale` pixels per point.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        self
    }

    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    /// Size in logical points.
    pub fn size(&self) -> [Pt; 2] {
        [
            Pt::from(self.width as f32 / self.scale),
            Pt::from(self.height as f32 / self.scale),
        ]
    }

    /// White RGBA pixels with the coverage in the alpha channel.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.coverage
            .iter()
            .flat_map(|&a| [255, 255, 255, a])
            .collect()
    }
}

/// [`TextRasterizer`] backed by ab_glyph outlines.
///
/// Bold requests use the bold face when one was found and otherwise smear the
/// regular face horizontally. Glyphs are drawn at the display scale factor so
/// text stays sharp on high-density screens.
pub struct GlyphRasterizer {
    fonts: FontSet,
    scale_factor: f32,
}

impl GlyphRasterizer {
    pub fn new(fonts: FontSet) -> Self {
        if fonts.is_empty() {
            tracing::warn!("no font available, labels will render empty");
        }
        Self {
            fonts,
            scale_factor: 1.0,
        }
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Later textures are rasterized at `scale_factor` pixels per point.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor as f32
        } else {
            1.0
        };
    }
}

impl TextRasterizer for GlyphRasterizer {
    fn rasterize(&mut self, text: &str, font_size: f32, bold: bool) -> Arc<TextTexture> {
        let font_size = font_size * self.scale_factor;
        let texture = match (bold, &self.fonts.bold, &self.fonts.regular) {
            (true, Some(face), _) => rasterize_line(face, text, font_size, 0),
            (true, None, Some(face)) => {
                let smear = (font_size / 30.0).round().max(1.0) as u32;
                rasterize_line(face, text, font_size, smear)
            }
            (false, _, Some(face)) | (false, Some(face), None) => {
                rasterize_line(face, text, font_size, 0)
            }
            _ => TextTexture::empty(),
        };
        Arc::new(texture.with_scale(self.scale_factor))
    }
}

/// Lays `text` out on a single baseline and draws it into a coverage bitmap.
///
/// `smear` widens every glyph by that many pixels to fake a bold weight.
pub(crate) fn rasterize_line(font: &FontArc, text: &str, font_size: f32, smear: u32) -> TextTexture {
    let scale = PxScale::from(font_size.max(1.0));
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();
    let descent = scaled.descent();

    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let mut glyphs = Vec::with_capacity(text.len());
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    let width = (caret.ceil().max(0.0) as u32).saturating_add(smear);
    let height = (ascent - descent).ceil().max(0.0) as u32;
    let mut coverage = vec![0u8; width as usize * height as usize];

    for glyph in glyphs {
        let Some(outlined) = scaled.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let origin_x = bounds.min.x.floor() as i64;
        let origin_y = bounds.min.y.floor() as i64;
        outlined.draw(|x, y, v| {
            let alpha = (v * 255.0).round().clamp(0.0, 255.0) as u8;
            let py = origin_y + y as i64;
            if py < 0 || py >= height as i64 {
                return;
            }
            for dx in 0..=smear as i64 {
                let px = origin_x + x as i64 + dx;
                if px < 0 || px >= width as i64 {
                    continue;
                }
                let idx = py as usize * width as usize + px as usize;
                coverage[idx] = coverage[idx].max(alpha);
            }
        });
    }

    TextTexture::new(width, height, coverage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_get_distinct_ids() {
        let a = TextTexture::empty();
        let b = TextTexture::empty();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn coverage_is_padded_to_dimensions() {
        let tex = TextTexture::new(3, 2, vec![255]);
        assert_eq!(tex.coverage(), &[255, 0, 0, 0, 0, 0]);
        assert_eq!(tex.size(), [Pt(3.0), Pt(2.0)]);
    }

    #[test]
    fn rgba_expansion_keeps_coverage_in_alpha() {
        let tex = TextTexture::new(2, 1, vec![10, 200]);
        assert_eq!(tex.to_rgba8(), vec![255, 255, 255, 10, 255, 255, 255, 200]);
    }

    #[test]
    fn scaled_textures_report_logical_size() {
        let tex = TextTexture::new(200, 40, Vec::new()).with_scale(2.0);
        assert_eq!(tex.size(), [Pt(100.0), Pt(20.0)]);
        assert_eq!((tex.width(), tex.height()), (200, 40));

        let bad = TextTexture::new(10, 10, Vec::new()).with_scale(0.0);
        assert_eq!(bad.scale(), 1.0);
    }

    #[test]
    fn rasterizer_tags_textures_with_scale_factor() {
        let mut r = GlyphRasterizer::new(FontSet::default());
        r.set_scale_factor(2.0);
        assert_eq!(r.scale_factor(), 2.0);
        assert_eq!(r.rasterize("Mohit", 100.0, true).scale(), 2.0);

        r.set_scale_factor(f64::NAN);
        assert_eq!(r.scale_factor(), 1.0);
    }

    #[test]
    fn missing_fonts_rasterize_to_empty_textures() {
        let mut r = GlyphRasterizer::new(FontSet::default());
        let tex = r.rasterize("00:00:00.000", 120.0, true);
        assert_eq!((tex.width(), tex.height()), (0, 0));
    }
}
