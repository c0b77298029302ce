/// Hit-testable region derived from an interactive overlay during a
/// render pass. Ephemeral; rebuilt wholesale every render and never
/// persisted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionArea {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl InteractionArea {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// The set of hit-test areas for the currently rendered frame.
///
/// Input events are injected explicitly (`hit_test`, `match_key`); the
/// registry knows nothing about any host windowing system.
#[derive(Clone, Debug, Default)]
pub struct InteractionRegistry {
    areas: Vec<InteractionArea>,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole area set. Always replace, never append: stale
    /// areas from overlays that became inactive must not survive a render.
    pub fn replace(&mut self, areas: Vec<InteractionArea>) {
        self.areas = areas;
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }

    /// Topmost area containing the point. Areas are stored in draw order,
    /// so the last hit wins.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&InteractionArea> {
        self.areas.iter().rev().find(|a| a.contains(x, y))
    }

    /// First area whose QTE key matches (case-insensitive).
    pub fn match_key(&self, key: &str) -> Option<&InteractionArea> {
        self.areas
            .iter()
            .find(|a| a.key.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionArea> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
