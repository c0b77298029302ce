use crate::{core::Color, overlay::OverlayType};

/// Per-overlay style options as stored.
///
/// Every field is optional; defaults are applied by [`Style::resolve`] at
/// render time, never at creation time, so stored overlays stay portable
/// across renderer default changes.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    // arrow/line animation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_frames: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrowhead: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_size: Option<f64>,

    // typewriter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chars_per_frame: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_delay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_cursor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glow: Option<Color>,

    // scanlines (terminal_text per-overlay pass)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanlines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanline_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanline_alpha: Option<f64>,

    // qte pulse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_amplitude: Option<f64>,

    // popup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
}

/// Style with every option concretized against the per-type default table.
/// Produced once per render; the stored [`Style`] is never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStyle {
    pub color: Color,
    pub background: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: f64,
    pub font_size: f64,
    pub line_height: f64,
    pub padding: f64,
    pub corner_radius: f64,
    pub dash: Option<Vec<f64>>,
    pub fill: bool,
    pub opacity: f64,
    pub rotation_deg: f64,
    pub scale: f64,
    pub animation: bool,
    pub animation_frames: i64,
    pub arrowhead: bool,
    pub arrow_size: f64,
    pub chars_per_frame: f64,
    pub start_delay: i64,
    pub cursor: bool,
    pub static_cursor: bool,
    pub glow: Option<Color>,
    pub scanlines: bool,
    pub scanline_spacing: f64,
    pub scanline_alpha: f64,
    pub pulse_speed: f64,
    pub pulse_amplitude: f64,
    pub max_width: f64,
}

impl Style {
    /// Apply the per-type default table. Pure; call once per render.
    pub fn resolve(&self, kind: OverlayType) -> ResolvedStyle {
        use OverlayType as T;

        let default_color = match kind {
            T::Ascii => Color::rgb(0x00, 0xff, 0x66),
            T::TerminalText => Color::rgb(0x33, 0xff, 0x33),
            T::Qte => Color::rgb(0xff, 0x3b, 0x30),
            T::Popup => Color::BLACK,
            T::Arrow | T::Line | T::Outline => Color::rgb(0xff, 0xd6, 0x0a),
            _ => Color::WHITE,
        };
        let default_background = match kind {
            T::Caption => Some(Color::BLACK.with_alpha(200)),
            T::Popup => Some(Color::WHITE),
            _ => None,
        };
        let default_font = match kind {
            T::Caption => 28.0,
            T::Ascii => 16.0,
            T::TerminalText => 18.0,
            T::Popup => 18.0,
            T::Qte => 24.0,
            _ => 36.0,
        };
        let font_size = self.font_size.unwrap_or(default_font);

        ResolvedStyle {
            color: self.color.unwrap_or(default_color),
            background: self.background.or(default_background),
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width.unwrap_or(match kind {
                T::Arrow | T::Line => 3.0,
                T::Outline => 2.0,
                _ => 2.0,
            }),
            font_size,
            line_height: self.line_height.unwrap_or(font_size * 1.2),
            padding: self.padding.unwrap_or(match kind {
                T::Popup => 12.0,
                _ => 10.0,
            }),
            corner_radius: self.corner_radius.unwrap_or(match kind {
                T::Popup => 8.0,
                _ => 0.0,
            }),
            dash: self.dash.clone(),
            fill: self.fill.unwrap_or(!matches!(kind, T::Outline)),
            opacity: self.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            rotation_deg: self.rotation_deg.unwrap_or(0.0),
            scale: self.scale.unwrap_or(1.0),
            animation: self.animation.unwrap_or(true),
            animation_frames: self.animation_frames.unwrap_or(30).max(1),
            arrowhead: self.arrowhead.unwrap_or(true),
            arrow_size: self.arrow_size.unwrap_or(12.0),
            chars_per_frame: self.chars_per_frame.unwrap_or(0.5),
            start_delay: self.start_delay.unwrap_or(0),
            cursor: self.cursor.unwrap_or(true),
            static_cursor: self.static_cursor.unwrap_or(false),
            glow: self.glow,
            scanlines: self.scanlines.unwrap_or(false),
            scanline_spacing: self.scanline_spacing.unwrap_or(4.0).max(1.0),
            scanline_alpha: self.scanline_alpha.unwrap_or(0.15).clamp(0.0, 1.0),
            pulse_speed: self.pulse_speed.unwrap_or(0.008),
            pulse_amplitude: self.pulse_amplitude.unwrap_or(6.0),
            max_width: self.max_width.unwrap_or(260.0),
        }
    }
}
