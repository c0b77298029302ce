use kurbo::Point;

use crate::{
    core::{FrameIndex, FrameSpan},
    curve::CurvePath,
    style::Style,
};

/// Closed set of overlay types. Adding a variant is a compile-time-checked
/// change: the render dispatcher matches exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayType {
    Text,
    Caption,
    Shape,
    Ascii,
    Outline,
    Qte,
    Popup,
    Image,
    TerminalText,
    Arrow,
    Line,
}

impl OverlayType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Caption => "caption",
            Self::Shape => "shape",
            Self::Ascii => "ascii",
            Self::Outline => "outline",
            Self::Qte => "qte",
            Self::Popup => "popup",
            Self::Image => "image",
            Self::TerminalText => "terminal_text",
            Self::Arrow => "arrow",
            Self::Line => "line",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rect,
    Circle,
    Polygon,
}

/// Anchor/control points for arrow and line overlays. A single control
/// point selects a quadratic curve, a pair selects a cubic; with neither
/// the path is a straight segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveGeometry {
    pub start_point: Point,
    pub end_point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_point: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_point1: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_point2: Option<Point>,
}

impl CurveGeometry {
    pub fn straight(start: Point, end: Point) -> Self {
        Self {
            start_point: start,
            end_point: end,
            control_point: None,
            control_point1: None,
            control_point2: None,
        }
    }

    pub fn to_curve(&self) -> CurvePath {
        if let (Some(c1), Some(c2)) = (self.control_point1, self.control_point2) {
            CurvePath::Cubic {
                start: self.start_point,
                control1: c1,
                control2: c2,
                end: self.end_point,
            }
        } else if let Some(c) = self.control_point {
            CurvePath::Quadratic {
                start: self.start_point,
                control: c,
                end: self.end_point,
            }
        } else {
            CurvePath::Straight {
                start: self.start_point,
                end: self.end_point,
            }
        }
    }
}

/// Type tag plus type-specific payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayKind {
    Text,
    Caption,
    Shape {
        #[serde(default)]
        shape: ShapeKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        points: Option<Vec<Point>>,
    },
    Ascii,
    Outline {
        points: Vec<Point>,
        #[serde(default)]
        closed: bool,
    },
    Qte {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<String>,
    },
    Popup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pointer: Option<Point>,
    },
    Image {
        src: String,
    },
    TerminalText,
    Arrow(CurveGeometry),
    Line(CurveGeometry),
}

impl OverlayKind {
    pub fn overlay_type(&self) -> OverlayType {
        match self {
            Self::Text => OverlayType::Text,
            Self::Caption => OverlayType::Caption,
            Self::Shape { .. } => OverlayType::Shape,
            Self::Ascii => OverlayType::Ascii,
            Self::Outline { .. } => OverlayType::Outline,
            Self::Qte { .. } => OverlayType::Qte,
            Self::Popup { .. } => OverlayType::Popup,
            Self::Image { .. } => OverlayType::Image,
            Self::TerminalText => OverlayType::TerminalText,
            Self::Arrow(_) => OverlayType::Arrow,
            Self::Line(_) => OverlayType::Line,
        }
    }
}

/// A time-bounded graphical annotation drawn atop video frames.
///
/// Frame bounds stay unset until the store's `add` normalizes them; every
/// overlay inside a store has a concrete activation window.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(flatten)]
    pub kind: OverlayKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_start: Option<FrameIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_end: Option<FrameIndex>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "style_is_default")]
    pub style: Style,

    /// Governs hit-test registration; `true` unless explicitly disabled.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub interactive: bool,

    // tracked-object binding (weak, by id; a deleted track means the
    // overlay falls back to its own stored geometry)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_offset: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_size: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn style_is_default(s: &Style) -> bool {
    *s == Style::default()
}

impl Overlay {
    pub fn new(kind: OverlayKind) -> Self {
        Self {
            id: String::new(),
            kind,
            frame_start: None,
            frame_end: None,
            x: None,
            y: None,
            width: None,
            height: None,
            content: None,
            style: Style::default(),
            interactive: true,
            track_id: None,
            track_offset: None,
            track_size: None,
        }
    }

    pub fn overlay_type(&self) -> OverlayType {
        self.kind.overlay_type()
    }

    /// Activation window, if both bounds are set and ordered.
    pub fn span(&self) -> Option<FrameSpan> {
        match (self.frame_start, self.frame_end) {
            (Some(s), Some(e)) if s.0 <= e.0 => Some(FrameSpan { start: s, end: e }),
            _ => None,
        }
    }

    /// Start frame for animation math; overlays outside a store default to 0.
    pub fn start_frame(&self) -> FrameIndex {
        self.frame_start.unwrap_or(FrameIndex(0))
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_span(mut self, start: i64, end: i64) -> Self {
        self.frame_start = Some(FrameIndex(start));
        self.frame_end = Some(FrameIndex(end));
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}
