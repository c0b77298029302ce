pub type VeneerResult<T> = Result<T, VeneerError>;

#[derive(thiserror::Error, Debug)]
pub enum VeneerError {
    /// Setup-time failures (non-positive fps, zero-sized canvas). Fatal to the caller.
    #[error("configuration error: {0}")]
    Config(String),

    /// Per-overlay/per-query failures (malformed geometry, bad timecode,
    /// out-of-range track data). Non-fatal; the renderer no-ops the one overlay.
    #[error("content error: {0}")]
    Content(String),

    /// Import/export failures. Surfaced to the caller of the load operation.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VeneerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
