#![forbid(unsafe_code)]

pub mod core;
pub mod curve;
pub mod engine;
pub mod error;
pub mod hit;
pub mod overlay;
pub mod project;
pub mod raster;
pub mod render;
pub mod scene;
pub mod store;
pub mod style;
pub mod time;
pub mod track;

pub use core::{Canvas, Color, Fps, FrameIndex, FrameSpan};
pub use engine::{Engine, EngineHooks, NoHooks};
pub use error::{VeneerError, VeneerResult};
pub use hit::{InteractionArea, InteractionRegistry};
pub use overlay::{CurveGeometry, Overlay, OverlayKind, OverlayType, ShapeKind};
pub use project::Project;
pub use raster::{fonts::FontStore, CpuRasterizer, RasterFrame};
pub use render::{plan_frame, RenderCtx};
pub use scene::{DrawCmd, FramePlan, HeuristicMeasure, OverlayPass, PostFx, TextMeasure};
pub use store::{OverlayPatch, OverlayStore};
pub use style::{ResolvedStyle, Style};
pub use time::Timeline;
pub use track::{Bounds, Track, TrackKeyframe, TrackStore};
