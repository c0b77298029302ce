use kurbo::{Affine, BezPath, Point, Rect};

use crate::core::{Color, FrameIndex};
use crate::hit::InteractionArea;

/// One drawing command. Renderers are pure: commands carry everything the
/// raster backend needs, and emitting them has no side effects.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    FillPath {
        path: BezPath,
        color: Color,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        width: f64,
        dash: Option<Vec<f64>>,
    },
    FillRect {
        rect: Rect,
        color: Color,
        radius: f64,
    },
    Text {
        origin: Point, // baseline-left
        text: String,
        size: f64,
        mono: bool,
        color: Color,
        stroke: Option<TextStroke>,
        glow: Option<Color>,
    },
    Image {
        src: String,
        rect: Rect,
    },
    /// Per-overlay scanline pass, layered over the commands before it.
    Scanlines {
        rect: Rect,
        spacing: f64,
        alpha: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStroke {
    pub color: Color,
    pub width: f64,
}

/// Commands for one rendered overlay, drawn in plan order (store order):
/// later passes paint on top.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPass {
    pub id: String,
    /// Center rotate/scale transform; identity for most overlays.
    pub transform: Affine,
    pub opacity: f64,
    pub cmds: Vec<DrawCmd>,
}

/// Full-frame post-processing applied over the composited result.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostFx {
    Scanlines { spacing: f64, alpha: f64 },
    Vignette { strength: f64 },
    Flicker { amount: f64 },
}

/// Deterministic output of one render call: what to draw, in what order,
/// and which hit-test areas exist this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub frame: FrameIndex,
    pub passes: Vec<OverlayPass>,
    pub post: Vec<PostFx>,
    pub areas: Vec<InteractionArea>,
}

impl FramePlan {
    pub fn empty(frame: FrameIndex) -> Self {
        Self {
            frame,
            passes: Vec::new(),
            post: Vec::new(),
            areas: Vec::new(),
        }
    }
}

/// Text metrics seam. Planning needs widths (caption backgrounds, popup
/// word wrap) but must stay pure; the raster backend supplies a
/// font-backed implementation, tests and headless planning use
/// [`HeuristicMeasure`].
pub trait TextMeasure {
    /// Advance width of `text` at `size` px. `mono` selects the
    /// fixed-width face.
    fn width(&self, text: &str, size: f64, mono: bool) -> f64;
}

/// Advance-factor estimate: monospace glyphs at 0.6 em, proportional at
/// 0.5 em. Deterministic and font-free.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasure;

impl TextMeasure for HeuristicMeasure {
    fn width(&self, text: &str, size: f64, mono: bool) -> f64 {
        let factor = if mono { 0.6 } else { 0.5 };
        text.chars().count() as f64 * size * factor
    }
}
