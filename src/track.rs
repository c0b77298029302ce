use crate::{
    core::FrameIndex,
    error::{VeneerError, VeneerResult},
};

/// Axis-aligned bounding box in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Component-wise linear interpolation.
    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let l = |a: f64, b: f64| a + (b - a) * t;
        Self {
            x: l(a.x, b.x),
            y: l(a.y, b.y),
            width: l(a.width, b.width),
            height: l(a.height, b.height),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackKeyframe {
    pub frame: FrameIndex,
    pub bounds: Bounds,
}

/// A named keyframe sequence describing a moving bounding box over time.
/// Keyframes are unique per frame and sorted ascending after every insert.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
    pub keyframes: Vec<TrackKeyframe>,
}

impl Track {
    pub fn validate(&self) -> VeneerResult<()> {
        if self.start_frame.0 > self.end_frame.0 {
            return Err(VeneerError::content(format!(
                "track '{}' has start_frame > end_frame",
                self.id
            )));
        }
        if !self
            .keyframes
            .windows(2)
            .all(|w| w[0].frame.0 < w[1].frame.0)
        {
            return Err(VeneerError::content(format!(
                "track '{}' keyframes must be strictly increasing by frame",
                self.id
            )));
        }
        Ok(())
    }
}

/// Exclusive owner of tracked-object records. Overlays reference tracks
/// by id; a miss is "no tracked bounds", never an error.
#[derive(Clone, Debug, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
    next_id: u64,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracks(tracks: Vec<Track>) -> VeneerResult<Self> {
        let mut store = Self::new();
        for t in &tracks {
            t.validate()?;
            store.bump_counter_past(&t.id);
        }
        store.tracks = tracks;
        Ok(store)
    }

    /// Create a track, generating an id when absent, and seed one keyframe
    /// at `start_frame` with the initial bounds.
    pub fn create(
        &mut self,
        id: Option<String>,
        start_frame: FrameIndex,
        end_frame: FrameIndex,
        initial: Bounds,
    ) -> VeneerResult<String> {
        if start_frame.0 > end_frame.0 {
            return Err(VeneerError::content("track start_frame must be <= end_frame"));
        }
        let id = match id {
            Some(id) if !id.is_empty() => {
                if self.tracks.iter().any(|t| t.id == id) {
                    return Err(VeneerError::content(format!(
                        "track id '{id}' already exists"
                    )));
                }
                self.bump_counter_past(&id);
                id
            }
            _ => {
                self.next_id += 1;
                format!("track-{}", self.next_id)
            }
        };

        self.tracks.push(Track {
            id: id.clone(),
            start_frame,
            end_frame,
            keyframes: vec![TrackKeyframe {
                frame: start_frame,
                bounds: initial,
            }],
        });
        Ok(id)
    }

    /// Add or replace the keyframe at `frame`, then re-sort ascending.
    /// Idempotent for repeated calls with the same frame.
    pub fn add_keyframe(
        &mut self,
        track_id: &str,
        frame: FrameIndex,
        bounds: Bounds,
    ) -> VeneerResult<()> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or_else(|| VeneerError::content(format!("no track with id '{track_id}'")))?;

        track.keyframes.retain(|k| k.frame != frame);
        track.keyframes.push(TrackKeyframe { frame, bounds });
        track.keyframes.sort_by_key(|k| k.frame);
        Ok(())
    }

    pub fn get(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn remove(&mut self, track_id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != track_id);
        self.tracks.len() != before
    }

    pub fn list(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    /// Interpolated bounds at `frame`, with the four-branch policy:
    /// unknown track / no keyframes / frame outside the validity window
    /// yields `None`; before the first keyframe holds its bounds; past the
    /// last keyframe holds its bounds; otherwise linear interpolation
    /// between the bracketing keyframes.
    pub fn bounds_at(&self, track_id: &str, frame: FrameIndex) -> Option<Bounds> {
        let track = self.get(track_id)?;
        if track.keyframes.is_empty() {
            return None;
        }
        if frame.0 < track.start_frame.0 || frame.0 > track.end_frame.0 {
            return None;
        }

        let first = &track.keyframes[0];
        if frame.0 <= first.frame.0 {
            return Some(first.bounds);
        }
        let last = track.keyframes.last()?;
        if frame.0 >= last.frame.0 {
            return Some(last.bounds);
        }

        let idx = track.keyframes.partition_point(|k| k.frame.0 <= frame.0);
        let prev = &track.keyframes[idx - 1];
        let next = &track.keyframes[idx];
        let denom = (next.frame.0 - prev.frame.0) as f64;
        let t = (frame.0 - prev.frame.0) as f64 / denom;
        Some(Bounds::lerp(&prev.bounds, &next.bounds, t))
    }

    fn bump_counter_past(&mut self, id: &str) {
        if let Some(n) = id
            .strip_prefix("track-")
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.next_id = self.next_id.max(n);
        }
    }
}
