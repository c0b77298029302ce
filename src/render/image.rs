//! Image overlay renderer. Decoding happens in the raster backend; the
//! plan only carries the source reference and destination rect.

use crate::{overlay::Overlay, render::Placement, scene::DrawCmd};

/// A zero-sized destination rect means "natural image size", resolved once
/// the backend has decoded the pixels.
pub(crate) fn image(overlay: &Overlay, src: &str, place: &Placement) -> Vec<DrawCmd> {
    if src.is_empty() {
        tracing::warn!(id = %overlay.id, "image overlay has an empty src");
        return Vec::new();
    }
    vec![DrawCmd::Image {
        src: src.to_string(),
        rect: place.rect_or(0.0, 0.0),
    }]
}
