use crate::{
    core::{FrameIndex, Fps},
    error::{VeneerError, VeneerResult},
};

/// Temporal mapper plus playback frame state.
///
/// All frame/time conversion goes through this type; nothing else in the
/// crate is allowed to assign the current frame directly.
#[derive(Clone, Debug)]
pub struct Timeline {
    fps: Fps,
    total_frames: i64,
    current: FrameIndex,
    playing: bool,
}

impl Timeline {
    pub fn new(fps: Fps, total_frames: i64) -> VeneerResult<Self> {
        if total_frames <= 0 {
            return Err(VeneerError::config("total_frames must be > 0"));
        }
        Ok(Self {
            fps,
            total_frames,
            current: FrameIndex(0),
            playing: false,
        })
    }

    /// Derive the frame count from a media duration in seconds.
    pub fn from_duration(fps: Fps, duration_secs: f64) -> VeneerResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(VeneerError::config("duration must be finite and > 0"));
        }
        let total = (duration_secs * fps.as_f64()).floor().max(1.0) as i64;
        Self::new(fps, total)
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn total_frames(&self) -> i64 {
        self.total_frames
    }

    pub fn current(&self) -> FrameIndex {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// `floor(secs * fps)`, never negative.
    pub fn frame_at_secs(&self, secs: f64) -> FrameIndex {
        FrameIndex((secs * self.fps.as_f64()).floor().max(0.0) as i64)
    }

    /// `frame / fps`.
    pub fn secs_at_frame(&self, frame: FrameIndex) -> f64 {
        frame.0 as f64 / self.fps.as_f64()
    }

    /// Clamp-seek to `[0, total_frames - 1]`. Returns the new current frame.
    pub fn seek(&mut self, frame: FrameIndex) -> FrameIndex {
        self.current = FrameIndex(frame.0.clamp(0, self.total_frames - 1));
        self.current
    }

    /// Step by a signed frame delta with the seek clamp.
    pub fn step(&mut self, delta: i64) -> FrameIndex {
        self.seek(self.current.offset(delta))
    }

    /// Playback tick: map elapsed media time to a frame and report it only
    /// if it differs from the current frame. Re-rendering an unchanged
    /// frame would re-roll wall-clock decorations, so equal frames are
    /// swallowed here rather than left to callers.
    pub fn tick(&mut self, media_secs: f64) -> Option<FrameIndex> {
        let implied = FrameIndex(
            self.frame_at_secs(media_secs)
                .0
                .clamp(0, self.total_frames - 1),
        );
        if implied != self.current {
            self.current = implied;
            Some(implied)
        } else {
            None
        }
    }

    /// Parse `HH:MM:SS:FF` (frame-exact, non-drop: seconds count
    /// `whole_frames()` frames each, so format/parse round-trips at any
    /// fps) or `HH:MM:SS.mmm` (millisecond-exact, converted by rounding,
    /// not truncation).
    pub fn parse_timecode(&self, s: &str) -> VeneerResult<FrameIndex> {
        parse_timecode(self.fps, s)
    }

    /// Format a frame as `HH:MM:SS:FF`.
    pub fn format_timecode(&self, frame: FrameIndex) -> String {
        let fps = self.fps.whole_frames();
        let f = frame.0.max(0);
        let total_secs = f / fps;
        let ff = f % fps;
        let h = total_secs / 3600;
        let m = (total_secs % 3600) / 60;
        let sec = total_secs % 60;
        format!("{h:02}:{m:02}:{sec:02}:{ff:02}")
    }
}

pub fn parse_timecode(fps: Fps, s: &str) -> VeneerResult<FrameIndex> {
    let bad = || VeneerError::content(format!("invalid timecode '{s}'"));

    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        // HH:MM:SS:FF
        4 => {
            let h: i64 = parts[0].parse().map_err(|_| bad())?;
            let m: i64 = parts[1].parse().map_err(|_| bad())?;
            let sec: i64 = parts[2].parse().map_err(|_| bad())?;
            let ff: i64 = parts[3].parse().map_err(|_| bad())?;
            if m >= 60 || sec >= 60 || h < 0 || m < 0 || sec < 0 || ff < 0 {
                return Err(bad());
            }
            if ff >= fps.whole_frames() {
                return Err(VeneerError::content(format!(
                    "timecode '{s}' frame field exceeds fps"
                )));
            }
            // same integer frame base as format_timecode
            Ok(FrameIndex((h * 3600 + m * 60 + sec) * fps.whole_frames() + ff))
        }
        // HH:MM:SS.mmm
        3 => {
            let h: i64 = parts[0].parse().map_err(|_| bad())?;
            let m: i64 = parts[1].parse().map_err(|_| bad())?;
            let sec: f64 = parts[2].parse().map_err(|_| bad())?;
            if m >= 60 || !(0.0..60.0).contains(&sec) || h < 0 || m < 0 {
                return Err(bad());
            }
            let secs = (h * 3600 + m * 60) as f64 + sec;
            Ok(FrameIndex((secs * fps.as_f64()).round() as i64))
        }
        _ => Err(bad()),
    }
}
