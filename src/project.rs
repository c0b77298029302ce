use crate::{
    core::{Canvas, Fps},
    error::{VeneerError, VeneerResult},
    overlay::Overlay,
    scene::PostFx,
    track::Track,
};

pub const PROJECT_VERSION: u32 = 1;

fn default_version() -> u32 {
    PROJECT_VERSION
}

/// Serializable project document: timeline settings plus every overlay and
/// tracked object. The JSON schema is the interchange format for external
/// producers, so unknown overlay types fail here, at import, not mid-render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "default_version")]
    pub version: u32,
    pub fps: f64,
    pub video_width: u32,
    pub video_height: u32,
    pub total_frames: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<Overlay>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracked_objects: Vec<Track>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post: Vec<PostFx>,
}

impl Project {
    pub fn new(fps: f64, video_width: u32, video_height: u32, total_frames: i64) -> Self {
        Self {
            version: PROJECT_VERSION,
            fps,
            video_width,
            video_height,
            total_frames,
            overlays: Vec::new(),
            tracked_objects: Vec::new(),
            post: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> VeneerResult<Self> {
        let project: Self =
            serde_json::from_str(json).map_err(|e| VeneerError::serde(e.to_string()))?;
        project.validate()?;
        Ok(project)
    }

    pub fn to_json(&self) -> VeneerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VeneerError::serde(e.to_string()))
    }

    /// Structural checks that serde cannot express: positive timeline
    /// settings, unique ids, ordered track keyframes.
    pub fn validate(&self) -> VeneerResult<()> {
        if self.version > PROJECT_VERSION {
            return Err(VeneerError::config(format!(
                "unsupported project version {}",
                self.version
            )));
        }
        self.fps()?;
        self.canvas()?;
        if self.total_frames < 1 {
            return Err(VeneerError::config("totalFrames must be >= 1"));
        }

        let mut seen = std::collections::HashSet::new();
        for o in &self.overlays {
            if !o.id.is_empty() && !seen.insert(o.id.as_str()) {
                return Err(VeneerError::content(format!(
                    "duplicate overlay id '{}'",
                    o.id
                )));
            }
        }
        seen.clear();
        for t in &self.tracked_objects {
            t.validate()?;
            if !seen.insert(t.id.as_str()) {
                return Err(VeneerError::content(format!(
                    "duplicate track id '{}'",
                    t.id
                )));
            }
        }
        Ok(())
    }

    pub fn fps(&self) -> VeneerResult<Fps> {
        Fps::new(self.fps)
    }

    pub fn canvas(&self) -> VeneerResult<Canvas> {
        Canvas::new(self.video_width, self.video_height)
    }
}
