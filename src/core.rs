use crate::error::{VeneerError, VeneerResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// 0-based frame index in video timeline space.
///
/// Signed so that pre-roll queries (e.g. a track lookup at frame -1) are
/// expressible; the playback clamp keeps the current frame non-negative.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct FrameIndex(pub i64);

impl FrameIndex {
    /// Offset by a signed delta.
    pub fn offset(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

/// Activation window `[start, end]`, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    pub start: FrameIndex,
    pub end: FrameIndex, // inclusive
}

impl FrameSpan {
    /// Create a validated span with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> VeneerResult<Self> {
        if start.0 > end.0 {
            return Err(VeneerError::content("FrameSpan start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the span (both boundary frames count).
    pub fn len_frames(self) -> i64 {
        self.end.0 - self.start.0 + 1
    }

    /// Return `true` when `f` is inside `[start, end]`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 <= self.end.0
    }

    /// Clamp a frame index into this span.
    pub fn clamp(self, f: FrameIndex) -> FrameIndex {
        FrameIndex(f.0.clamp(self.start.0, self.end.0))
    }
}

/// Frames-per-second. Must be finite and > 0; anything else is a
/// configuration error surfaced at setup time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fps(pub f64);

impl Fps {
    /// Create a validated FPS value.
    pub fn new(value: f64) -> VeneerResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(VeneerError::config("fps must be finite and > 0"));
        }
        Ok(Self(value))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Nearest whole frame count for one second, used for default overlay
    /// duration (never below 1).
    pub fn whole_frames(self) -> i64 {
        (self.0.round() as i64).max(1)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        1.0 / self.0
    }
}

/// Video canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> VeneerResult<Self> {
        if width == 0 || height == 0 {
            return Err(VeneerError::config("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }
}

/// Straight-alpha RGBA8 color, serialized as `"#RRGGBB"` / `"#RRGGBBAA"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by `f` in `[0,1]`.
    pub fn mul_alpha(self, f: f64) -> Self {
        let a = (f64::from(self.a) * f.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn parse_hex(s: &str) -> VeneerResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let expand = |c: u8| c << 4 | c;
        let nib = |c: char| -> VeneerResult<u8> {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| VeneerError::content(format!("invalid hex color '{s}'")))
        };

        let digits: Vec<char> = hex.chars().collect();
        match digits.len() {
            3 | 4 => {
                let r = expand(nib(digits[0])?);
                let g = expand(nib(digits[1])?);
                let b = expand(nib(digits[2])?);
                let a = if digits.len() == 4 {
                    expand(nib(digits[3])?)
                } else {
                    255
                };
                Ok(Self { r, g, b, a })
            }
            6 | 8 => {
                let byte = |i: usize| -> VeneerResult<u8> {
                    Ok(nib(digits[i])? << 4 | nib(digits[i + 1])?)
                };
                let r = byte(0)?;
                let g = byte(2)?;
                let b = byte(4)?;
                let a = if digits.len() == 8 { byte(6)? } else { 255 };
                Ok(Self { r, g, b, a })
            }
            _ => Err(VeneerError::content(format!("invalid hex color '{s}'"))),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}
