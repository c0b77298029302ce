//! CPU raster backend: consumes a [`FramePlan`] and produces RGBA pixels
//! via `vello_cpu`. The only component allowed to touch pixels, fonts, or
//! the filesystem; everything upstream stays pure.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kurbo::Shape as _;

use crate::{
    core::{Canvas, Color, FrameIndex},
    error::{VeneerError, VeneerResult},
    scene::{DrawCmd, FramePlan, PostFx},
};

pub mod fonts;

use fonts::FontStore;

/// One rasterized frame. Data is premultiplied RGBA8, row-major.
#[derive(Clone, Debug)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl RasterFrame {
    /// Straight-alpha copy of the pixel data, for encoders that expect
    /// unpremultiplied input.
    pub fn unpremultiplied(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = px[3] as u32;
                if a > 0 && a < 255 {
                    for c in px.iter_mut().take(3) {
                        *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
                    }
                }
            }
        }
        out
    }
}

/// Decoded-image cache entry. `Failed` is remembered so a bad source is
/// decoded (and logged) once, not once per frame.
enum ImageEntry {
    Ready {
        paint: vello_cpu::Image,
        width: u32,
        height: u32,
    },
    Failed,
}

pub struct CpuRasterizer {
    canvas: Canvas,
    asset_root: PathBuf,
    fonts: FontStore,
    images: HashMap<String, ImageEntry>,
}

impl CpuRasterizer {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            asset_root: PathBuf::from("."),
            fonts: FontStore::empty(),
            images: HashMap::new(),
        }
    }

    /// Directory that image overlay `src` paths are resolved against.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn fonts(&self) -> &FontStore {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontStore {
        &mut self.fonts
    }

    #[tracing::instrument(skip_all, fields(frame = plan.frame.0))]
    pub fn rasterize(&mut self, plan: &FramePlan) -> VeneerResult<RasterFrame> {
        let width: u16 = self
            .canvas
            .width
            .try_into()
            .map_err(|_| VeneerError::config("canvas width exceeds u16"))?;
        let height: u16 = self
            .canvas
            .height
            .try_into()
            .map_err(|_| VeneerError::config("canvas height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        let mut ctx = vello_cpu::RenderContext::new(width, height);

        for pass in &plan.passes {
            let layered = pass.opacity < 1.0;
            if layered {
                ctx.push_opacity_layer(pass.opacity as f32);
            }
            for cmd in &pass.cmds {
                self.draw_cmd(&mut ctx, pass.transform, cmd)?;
            }
            if layered {
                ctx.pop_layer();
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        for fx in &plan.post {
            apply_post(&mut data, self.canvas, fx, plan.frame);
        }

        Ok(RasterFrame {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn draw_cmd(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        transform: kurbo::Affine,
        cmd: &DrawCmd,
    ) -> VeneerResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match cmd {
            DrawCmd::FillPath { path, color } => {
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            DrawCmd::StrokePath {
                path,
                color,
                width,
                dash,
            } => {
                // expand to a fill with kurbo so dashes come for free
                let mut style = kurbo::Stroke::new(*width);
                if let Some(dash) = dash {
                    style = style.with_dashes(0.0, dash.iter().copied());
                }
                let stroked =
                    kurbo::stroke(path.iter(), &style, &kurbo::StrokeOpts::default(), 0.25);
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(&stroked));
            }
            DrawCmd::FillRect {
                rect,
                color,
                radius,
            } => {
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(color_to_cpu(*color));
                if *radius > 0.0 {
                    ctx.fill_path(&bezpath_to_cpu(
                        &rect.to_rounded_rect(*radius).to_path(0.1),
                    ));
                } else {
                    ctx.fill_rect(&rect_to_cpu(*rect));
                }
            }
            DrawCmd::Text {
                origin,
                text,
                size,
                mono,
                color,
                stroke,
                glow,
            } => {
                if !self.fonts.has_any() {
                    tracing::warn!("no font loaded; skipping text command");
                    return Ok(());
                }
                if let Some(glow) = glow {
                    let halo = glow.mul_alpha(0.4);
                    if let Some(img) = self.fonts.rasterize_line(text, *size, *mono, halo) {
                        for (dx, dy) in [(-2.0, 0.0), (2.0, 0.0), (0.0, -2.0), (0.0, 2.0)] {
                            draw_glyph_image(ctx, transform, *origin, &img, dx, dy);
                        }
                    }
                }
                if let Some(stroke) = stroke {
                    let d = stroke.width.max(1.0);
                    if let Some(img) =
                        self.fonts.rasterize_line(text, *size, *mono, stroke.color)
                    {
                        for (dx, dy) in [(-d, 0.0), (d, 0.0), (0.0, -d), (0.0, d)] {
                            draw_glyph_image(ctx, transform, *origin, &img, dx, dy);
                        }
                    }
                }
                if let Some(img) = self.fonts.rasterize_line(text, *size, *mono, *color) {
                    draw_glyph_image(ctx, transform, *origin, &img, 0.0, 0.0);
                }
            }
            DrawCmd::Image { src, rect } => {
                let Some((paint, natural_w, natural_h)) = self.image_paint(src) else {
                    return Ok(()); // decode failure already logged
                };
                let place = kurbo::Affine::translate((rect.x0, rect.y0));
                let scaled = if rect.area() > 0.0 {
                    place
                        * kurbo::Affine::scale_non_uniform(
                            rect.width() / natural_w,
                            rect.height() / natural_h,
                        )
                } else {
                    place
                };
                ctx.set_transform(affine_to_cpu(transform * scaled));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, natural_w, natural_h));
            }
            DrawCmd::Scanlines {
                rect,
                spacing,
                alpha,
            } => {
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(color_to_cpu(Color::BLACK.mul_alpha(*alpha)));
                let mut y = rect.y0;
                while y < rect.y1 {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        rect.x0,
                        y,
                        rect.x1,
                        (y + 1.0).min(rect.y1),
                    ));
                    y += spacing.max(1.0);
                }
            }
        }
        Ok(())
    }

    /// Lazily decode and cache an image source. Failures are cached too so
    /// a missing file warns once instead of every frame.
    fn image_paint(&mut self, src: &str) -> Option<(vello_cpu::Image, f64, f64)> {
        if !self.images.contains_key(src) {
            let entry = match decode_image(&self.asset_root.join(src)) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(src, error = %e, "image decode failed");
                    ImageEntry::Failed
                }
            };
            self.images.insert(src.to_string(), entry);
        }
        match self.images.get(src) {
            Some(ImageEntry::Ready {
                paint,
                width,
                height,
            }) => Some((paint.clone(), f64::from(*width), f64::from(*height))),
            _ => None,
        }
    }
}

fn decode_image(path: &Path) -> VeneerResult<ImageEntry> {
    let decoded = image::open(path)
        .map_err(|e| VeneerError::content(format!("'{}': {e}", path.display())))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();

    let mut premul = decoded.into_raw();
    for px in premul.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        for c in px.iter_mut().take(3) {
            *c = ((u32::from(*c) * a) / 255) as u8;
        }
    }
    let pixmap = premul_bytes_to_pixmap(&premul, width, height)?;
    Ok(ImageEntry::Ready {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        width,
        height,
    })
}

fn draw_glyph_image(
    ctx: &mut vello_cpu::RenderContext,
    transform: kurbo::Affine,
    origin: kurbo::Point,
    img: &fonts::GlyphImage,
    dx: f64,
    dy: f64,
) {
    let Ok(pixmap) = premul_bytes_to_pixmap(&img.data, img.width, img.height) else {
        return;
    };
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    let place = kurbo::Affine::translate((origin.x + dx, origin.y - img.ascent + dy));
    ctx.set_transform(affine_to_cpu(transform * place));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(img.width),
        f64::from(img.height),
    ));
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> VeneerResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VeneerError::content("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VeneerError::content("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(VeneerError::content("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: kurbo::Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Full-frame pixel passes. All deterministic: flicker derives its phase
/// from the frame index, never a clock.
fn apply_post(data: &mut [u8], canvas: Canvas, fx: &PostFx, frame: FrameIndex) {
    let (w, h) = (canvas.width as usize, canvas.height as usize);
    match fx {
        PostFx::Scanlines { spacing, alpha } => {
            let step = spacing.max(1.0).round() as usize;
            let keep = 1.0 - alpha.clamp(0.0, 1.0);
            for y in (0..h).step_by(step) {
                let row = &mut data[y * w * 4..(y + 1) * w * 4];
                for px in row.chunks_exact_mut(4) {
                    for c in px.iter_mut().take(3) {
                        *c = (f64::from(*c) * keep) as u8;
                    }
                }
            }
        }
        PostFx::Vignette { strength } => {
            let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
            let max_d2 = cx * cx + cy * cy;
            for y in 0..h {
                for x in 0..w {
                    let d2 = {
                        let (dx, dy) = (x as f64 - cx, y as f64 - cy);
                        dx * dx + dy * dy
                    };
                    let keep = 1.0 - strength.clamp(0.0, 1.0) * (d2 / max_d2);
                    let idx = (y * w + x) * 4;
                    for c in &mut data[idx..idx + 3] {
                        *c = (f64::from(*c) * keep) as u8;
                    }
                }
            }
        }
        PostFx::Flicker { amount } => {
            // hash the frame index into [0, 1) for a stable per-frame dimming
            let noise = ((frame.0 as f64 * 12.9898).sin() * 43_758.545).fract().abs();
            let keep = 1.0 - amount.clamp(0.0, 1.0) * noise;
            for px in data.chunks_exact_mut(4) {
                for c in px.iter_mut().take(3) {
                    *c = (f64::from(*c) * keep) as u8;
                }
            }
        }
    }
}
