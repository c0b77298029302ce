//! Font loading, measurement and glyph rasterization.
//!
//! Fonts are loaded from disk at startup; nothing is bundled. A store with
//! no faces still measures (heuristically) so planning keeps working, but
//! the rasterizer will skip text commands with a warning.

use crate::{
    core::Color,
    error::{VeneerError, VeneerResult},
    scene::{HeuristicMeasure, TextMeasure},
};

/// A rasterized line of text: premultiplied RGBA pixels plus the ascent
/// needed to place the top edge relative to the baseline.
pub struct GlyphImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major.
    pub data: Vec<u8>,
    pub ascent: f64,
}

#[derive(Default)]
pub struct FontStore {
    regular: Option<fontdue::Font>,
    mono: Option<fontdue::Font>,
}

impl FontStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load_regular(&mut self, path: &std::path::Path) -> VeneerResult<()> {
        self.regular = Some(load_font(path)?);
        Ok(())
    }

    pub fn load_mono(&mut self, path: &std::path::Path) -> VeneerResult<()> {
        self.mono = Some(load_font(path)?);
        Ok(())
    }

    pub fn has_any(&self) -> bool {
        self.regular.is_some() || self.mono.is_some()
    }

    /// The face for a style, falling back to the other face when only one
    /// is loaded.
    fn face(&self, mono: bool) -> Option<&fontdue::Font> {
        if mono {
            self.mono.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.mono.as_ref())
        }
    }

    pub fn ascent(&self, size: f64, mono: bool) -> f64 {
        self.face(mono)
            .and_then(|f| f.horizontal_line_metrics(size as f32))
            .map(|m| f64::from(m.ascent))
            .unwrap_or(size * 0.8)
    }

    /// Rasterize one line into a premultiplied RGBA image tinted with
    /// `color`. Returns `None` when no face is loaded or the line is empty.
    pub fn rasterize_line(
        &self,
        text: &str,
        size: f64,
        mono: bool,
        color: Color,
    ) -> Option<GlyphImage> {
        let font = self.face(mono)?;
        if text.is_empty() {
            return None;
        }

        let px = size as f32;
        let line = font.horizontal_line_metrics(px)?;
        let ascent = line.ascent.ceil();
        let height = (line.ascent - line.descent).ceil().max(1.0) as u32;
        let width = text
            .chars()
            .map(|c| font.metrics(c, px).advance_width)
            .sum::<f32>()
            .ceil()
            .max(1.0) as u32;

        let mut data = vec![0u8; (width * height * 4) as usize];
        let mut pen = 0.0f32;
        for c in text.chars() {
            let (metrics, bitmap) = font.rasterize(c, px);
            let x0 = (pen + metrics.xmin as f32).round() as i64;
            let y0 = (ascent - metrics.height as f32 - metrics.ymin as f32).round() as i64;
            blit_coverage(
                &mut data,
                width,
                height,
                &bitmap,
                metrics.width as u32,
                metrics.height as u32,
                x0,
                y0,
                color,
            );
            pen += metrics.advance_width;
        }

        Some(GlyphImage {
            width,
            height,
            data,
            ascent: f64::from(ascent),
        })
    }
}

fn load_font(path: &std::path::Path) -> VeneerResult<fontdue::Font> {
    let bytes = std::fs::read(path).map_err(|e| {
        VeneerError::config(format!("failed to read font '{}': {e}", path.display()))
    })?;
    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(|e| {
        VeneerError::config(format!("failed to parse font '{}': {e}", path.display()))
    })
}

/// Composite an 8-bit coverage bitmap into a premul RGBA buffer, max-
/// blending where glyphs overlap.
#[allow(clippy::too_many_arguments)]
fn blit_coverage(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    coverage: &[u8],
    src_w: u32,
    src_h: u32,
    x0: i64,
    y0: i64,
    color: Color,
) {
    for sy in 0..src_h {
        let dy = y0 + i64::from(sy);
        if dy < 0 || dy >= i64::from(dst_h) {
            continue;
        }
        for sx in 0..src_w {
            let dx = x0 + i64::from(sx);
            if dx < 0 || dx >= i64::from(dst_w) {
                continue;
            }
            let cov = coverage[(sy * src_w + sx) as usize] as u32;
            if cov == 0 {
                continue;
            }
            let a = (u32::from(color.a) * cov) / 255;
            let idx = ((dy as u32 * dst_w + dx as u32) * 4) as usize;
            let premul = |c: u8| ((u32::from(c) * a) / 255) as u8;
            if a as u8 > dst[idx + 3] {
                dst[idx] = premul(color.r);
                dst[idx + 1] = premul(color.g);
                dst[idx + 2] = premul(color.b);
                dst[idx + 3] = a as u8;
            }
        }
    }
}

impl TextMeasure for FontStore {
    fn width(&self, text: &str, size: f64, mono: bool) -> f64 {
        match self.face(mono) {
            Some(font) => text
                .chars()
                .map(|c| f64::from(font.metrics(c, size as f32).advance_width))
                .sum(),
            None => HeuristicMeasure.width(text, size, mono),
        }
    }
}
