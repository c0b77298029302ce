use crate::{
    core::{FrameIndex, Fps},
    error::{VeneerError, VeneerResult},
    overlay::Overlay,
    style::Style,
};

/// Partial overlay update, shallow-merged by [`OverlayStore::update`].
///
/// Present fields replace the stored value; absent fields are untouched.
/// A present `style` replaces the whole stored style object, so partial
/// style edits must send the complete style they want to keep.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayPatch {
    pub frame_start: Option<FrameIndex>,
    pub frame_end: Option<FrameIndex>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content: Option<String>,
    pub style: Option<Style>,
    pub interactive: Option<bool>,
    pub track_id: Option<String>,
    pub track_offset: Option<kurbo::Point>,
    pub track_size: Option<bool>,
}

/// Ordered, exclusively-owning collection of overlay records.
///
/// Insertion order is draw order: later-inserted overlays paint on top.
/// Other components hold overlay ids only, never references.
#[derive(Clone, Debug, Default)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
    next_id: u64,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from already-normalized overlays (project import). Ids are
    /// assigned where missing; the id counter is advanced past any
    /// `overlay-N` ids so later adds stay unique.
    pub fn from_overlays(overlays: Vec<Overlay>, current: FrameIndex, fps: Fps) -> Self {
        let mut store = Self::new();
        for o in overlays {
            store.add(o, current, fps);
        }
        store
    }

    /// Insert an overlay, assigning defaults:
    /// a generated id when absent, `frame_start` = current frame when
    /// absent, `frame_end` = `frame_start` + one second of frames. An
    /// explicit `frame_end` before `frame_start` is discarded with a
    /// warning and replaced by the default window.
    /// Returns the overlay's id.
    pub fn add(&mut self, mut overlay: Overlay, current: FrameIndex, fps: Fps) -> String {
        if overlay.id.is_empty() {
            overlay.id = self.generate_id();
        } else {
            self.bump_counter_past(&overlay.id);
        }

        let start = overlay.frame_start.unwrap_or(current);
        let end = match overlay.frame_end {
            Some(e) if e.0 >= start.0 => e,
            Some(e) => {
                tracing::warn!(
                    id = %overlay.id,
                    "frame_end {} precedes frame_start {}, using the default window",
                    e.0,
                    start.0
                );
                start.offset(fps.whole_frames())
            }
            None => start.offset(fps.whole_frames()),
        };
        overlay.frame_start = Some(start);
        overlay.frame_end = Some(end);

        let id = overlay.id.clone();
        self.overlays.push(overlay);
        id
    }

    pub fn remove(&mut self, id: &str) -> VeneerResult<Overlay> {
        let idx = self
            .overlays
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| VeneerError::content(format!("no overlay with id '{id}'")))?;
        Ok(self.overlays.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Shallow merge of a partial update. See [`OverlayPatch`] for the
    /// style-replacement semantic.
    pub fn update(&mut self, id: &str, patch: OverlayPatch) -> VeneerResult<()> {
        let overlay = self
            .overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| VeneerError::content(format!("no overlay with id '{id}'")))?;

        if let Some(v) = patch.frame_start {
            overlay.frame_start = Some(v);
        }
        if let Some(v) = patch.frame_end {
            overlay.frame_end = Some(v);
        }
        if let Some(v) = patch.x {
            overlay.x = Some(v);
        }
        if let Some(v) = patch.y {
            overlay.y = Some(v);
        }
        if let Some(v) = patch.width {
            overlay.width = Some(v);
        }
        if let Some(v) = patch.height {
            overlay.height = Some(v);
        }
        if let Some(v) = patch.content {
            overlay.content = Some(v);
        }
        if let Some(v) = patch.style {
            overlay.style = v;
        }
        if let Some(v) = patch.interactive {
            overlay.interactive = v;
        }
        if let Some(v) = patch.track_id {
            overlay.track_id = Some(v);
        }
        if let Some(v) = patch.track_offset {
            overlay.track_offset = Some(v);
        }
        if let Some(v) = patch.track_size {
            overlay.track_size = Some(v);
        }

        if let (Some(s), Some(e)) = (overlay.frame_start, overlay.frame_end) {
            if e.0 < s.0 {
                return Err(VeneerError::content(format!(
                    "overlay '{id}' update left frame_end < frame_start"
                )));
            }
        }
        Ok(())
    }

    /// Defensive copy of the overlay list, never the backing collection.
    pub fn list(&self) -> Vec<Overlay> {
        self.overlays.clone()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Overlays whose inclusive `[frame_start, frame_end]` window contains
    /// `frame`, in insertion order.
    pub fn active_at(&self, frame: FrameIndex) -> Vec<&Overlay> {
        self.overlays
            .iter()
            .filter(|o| o.span().is_some_and(|s| s.contains(frame)))
            .collect()
    }

    fn generate_id(&mut self) -> String {
        self.next_id += 1;
        format!("overlay-{}", self.next_id)
    }

    fn bump_counter_past(&mut self, id: &str) {
        if let Some(n) = id
            .strip_prefix("overlay-")
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.next_id = self.next_id.max(n);
        }
    }
}
