use kurbo::{Affine, Point};

use crate::{
    core::{Canvas, FrameIndex, Fps},
    hit::InteractionArea,
    overlay::{Overlay, OverlayKind},
    scene::{DrawCmd, FramePlan, OverlayPass, PostFx, TextMeasure},
    store::OverlayStore,
    style::ResolvedStyle,
    track::TrackStore,
};

pub mod arrow;
pub mod image;
pub mod marker;
pub mod shape;
pub mod text;

/// Inputs for one render call. `wall_clock_ms` is the only non-frame time
/// source and feeds exactly two decorations (QTE pulse, cursor blink);
/// everything else is a pure function of `frame`.
pub struct RenderCtx<'a> {
    pub frame: FrameIndex,
    pub wall_clock_ms: u64,
    pub canvas: Canvas,
    pub fps: Fps,
    pub measure: &'a dyn TextMeasure,
}

/// Effective geometry for this render only. Track-resolved values are
/// never written back to the stored overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Placement {
    pub fn origin_or(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x.unwrap_or(dx), self.y.unwrap_or(dy))
    }

    pub fn size_or(&self, dw: f64, dh: f64) -> (f64, f64) {
        (self.width.unwrap_or(dw), self.height.unwrap_or(dh))
    }

    pub fn rect_or(&self, dw: f64, dh: f64) -> kurbo::Rect {
        let origin = self.origin_or(0.0, 0.0);
        let (w, h) = self.size_or(dw, dh);
        kurbo::Rect::new(origin.x, origin.y, origin.x + w, origin.y + h)
    }
}

/// Select active overlays, resolve tracked bounds and styles, and dispatch
/// to the per-type renderers in store order. Per-overlay failures are
/// isolated: a malformed overlay logs and contributes nothing.
#[tracing::instrument(skip_all, fields(frame = ctx.frame.0))]
pub fn plan_frame(
    store: &OverlayStore,
    tracks: &TrackStore,
    ctx: &RenderCtx<'_>,
    post: &[PostFx],
) -> FramePlan {
    let mut plan = FramePlan::empty(ctx.frame);

    for overlay in store.active_at(ctx.frame) {
        let style = overlay.style.resolve(overlay.overlay_type());
        let place = resolve_placement(overlay, tracks, ctx.frame);
        let cmds = dispatch(overlay, &style, &place, ctx);
        if cmds.is_empty() {
            continue;
        }

        if overlay.interactive {
            if let Some(area) = interaction_area(overlay, &style, &place) {
                plan.areas.push(area);
            }
        }

        plan.passes.push(OverlayPass {
            id: overlay.id.clone(),
            transform: center_transform(&style, overlay_center(overlay, &place)),
            opacity: style.opacity,
            cmds,
        });
    }

    plan.post = post.to_vec();
    plan
}

/// Exhaustive per-type dispatch. Adding an overlay type will not compile
/// until a renderer arm exists here.
fn dispatch(
    overlay: &Overlay,
    style: &ResolvedStyle,
    place: &Placement,
    ctx: &RenderCtx<'_>,
) -> Vec<DrawCmd> {
    match &overlay.kind {
        OverlayKind::Text => text::text(overlay, style, place),
        OverlayKind::Caption => text::caption(overlay, style, place, ctx),
        OverlayKind::Ascii => text::ascii(overlay, style, place),
        OverlayKind::TerminalText => text::terminal_text(overlay, style, place, ctx),
        OverlayKind::Shape { shape, points } => {
            shape::shape(overlay, *shape, points.as_deref(), style, place)
        }
        OverlayKind::Outline { points, closed } => shape::outline(overlay, points, *closed, style),
        OverlayKind::Qte { key, .. } => marker::qte(key, style, place, ctx),
        OverlayKind::Popup { pointer } => marker::popup(overlay, *pointer, style, place, ctx),
        OverlayKind::Image { src } => image::image(overlay, src, place),
        OverlayKind::Arrow(geometry) => arrow::arrow(overlay, geometry, style, ctx, true),
        OverlayKind::Line(geometry) => arrow::arrow(overlay, geometry, style, ctx, false),
    }
}

/// Track-bound overlays take the interpolated bounds for this render; a
/// lookup miss (deleted track, frame outside its window) falls back to the
/// overlay's own stored geometry.
fn resolve_placement(overlay: &Overlay, tracks: &TrackStore, frame: FrameIndex) -> Placement {
    if let Some(track_id) = &overlay.track_id {
        if let Some(b) = tracks.bounds_at(track_id, frame) {
            let off = overlay.track_offset.unwrap_or(Point::ZERO);
            let adopt_size = overlay.track_size.unwrap_or(true);
            return Placement {
                x: Some(b.x + off.x),
                y: Some(b.y + off.y),
                width: if adopt_size { Some(b.width) } else { overlay.width },
                height: if adopt_size {
                    Some(b.height)
                } else {
                    overlay.height
                },
            };
        }
    }
    Placement {
        x: overlay.x,
        y: overlay.y,
        width: overlay.width,
        height: overlay.height,
    }
}

fn overlay_center(overlay: &Overlay, place: &Placement) -> Option<Point> {
    if let (Some(x), Some(y)) = (place.x, place.y) {
        let (w, h) = place.size_or(0.0, 0.0);
        return Some(Point::new(x + w / 2.0, y + h / 2.0));
    }
    match &overlay.kind {
        OverlayKind::Arrow(g) | OverlayKind::Line(g) => Some(Point::new(
            (g.start_point.x + g.end_point.x) / 2.0,
            (g.start_point.y + g.end_point.y) / 2.0,
        )),
        OverlayKind::Outline { points, .. } if !points.is_empty() => {
            let n = points.len() as f64;
            let sum = points
                .iter()
                .fold((0.0, 0.0), |acc, p| (acc.0 + p.x, acc.1 + p.y));
            Some(Point::new(sum.0 / n, sum.1 / n))
        }
        _ => None,
    }
}

/// Rotate (degrees) then uniformly scale about the overlay center.
fn center_transform(style: &ResolvedStyle, center: Option<Point>) -> Affine {
    if style.rotation_deg == 0.0 && style.scale == 1.0 {
        return Affine::IDENTITY;
    }
    let Some(c) = center else {
        return Affine::IDENTITY;
    };
    Affine::translate(c.to_vec2())
        * Affine::rotate(style.rotation_deg.to_radians())
        * Affine::scale(style.scale)
        * Affine::translate(-c.to_vec2())
}

/// Hit-test area for an interactive overlay. QTE areas are sized to the
/// prompt's base circle (pulse excluded, so the registry stays frame-pure);
/// other types register their resolved rect when fully specified.
fn interaction_area(
    overlay: &Overlay,
    style: &ResolvedStyle,
    place: &Placement,
) -> Option<InteractionArea> {
    match &overlay.kind {
        OverlayKind::Qte { key, action } => {
            let (center, radius) = marker::qte_circle(style, place);
            Some(InteractionArea {
                id: overlay.id.clone(),
                kind: overlay.overlay_type().name().to_string(),
                x: center.x - radius,
                y: center.y - radius,
                width: radius * 2.0,
                height: radius * 2.0,
                key: Some(key.clone()),
                action: action.clone(),
            })
        }
        _ => {
            let (x, y, w, h) = (place.x?, place.y?, place.width?, place.height?);
            Some(InteractionArea {
                id: overlay.id.clone(),
                kind: overlay.overlay_type().name().to_string(),
                x,
                y,
                width: w,
                height: h,
                key: None,
                action: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::overlay::CurveGeometry;
    use crate::scene::HeuristicMeasure;
    use crate::style::Style;
    use crate::track::Bounds;

    fn ctx(frame: i64, wall_ms: u64) -> RenderCtx<'static> {
        RenderCtx {
            frame: FrameIndex(frame),
            wall_clock_ms: wall_ms,
            canvas: Canvas {
                width: 1280,
                height: 720,
            },
            fps: Fps::new(30.0).unwrap(),
            measure: &HeuristicMeasure,
        }
    }

    fn fps30() -> Fps {
        Fps::new(30.0).unwrap()
    }

    #[test]
    fn inactive_overlays_are_not_planned() {
        let mut store = OverlayStore::new();
        store.add(
            Overlay::new(OverlayKind::Text)
                .with_content("hi")
                .with_span(10, 20)
                .at(0.0, 0.0),
            FrameIndex(0),
            fps30(),
        );
        let tracks = TrackStore::new();

        let plan = plan_frame(&store, &tracks, &ctx(9, 0), &[]);
        assert!(plan.passes.is_empty());
        let plan = plan_frame(&store, &tracks, &ctx(10, 0), &[]);
        assert_eq!(plan.passes.len(), 1);
        let plan = plan_frame(&store, &tracks, &ctx(20, 0), &[]);
        assert_eq!(plan.passes.len(), 1);
        let plan = plan_frame(&store, &tracks, &ctx(21, 0), &[]);
        assert!(plan.passes.is_empty());
    }

    #[test]
    fn passes_follow_store_order() {
        let mut store = OverlayStore::new();
        let a = store.add(
            Overlay::new(OverlayKind::Text)
                .with_content("a")
                .with_span(0, 99)
                .at(0.0, 0.0),
            FrameIndex(0),
            fps30(),
        );
        let b = store.add(
            Overlay::new(OverlayKind::Text)
                .with_content("b")
                .with_span(0, 99)
                .at(0.0, 0.0),
            FrameIndex(0),
            fps30(),
        );
        let plan = plan_frame(&store, &TrackStore::new(), &ctx(5, 0), &[]);
        assert_eq!(plan.passes[0].id, a);
        assert_eq!(plan.passes[1].id, b);
    }

    #[test]
    fn track_binding_overrides_geometry_without_persisting() {
        let mut tracks = TrackStore::new();
        let tid = tracks
            .create(
                None,
                FrameIndex(0),
                FrameIndex(10),
                Bounds::new(0.0, 0.0, 50.0, 50.0),
            )
            .unwrap();
        tracks
            .add_keyframe(&tid, FrameIndex(10), Bounds::new(100.0, 0.0, 50.0, 50.0))
            .unwrap();

        let mut store = OverlayStore::new();
        let mut o = Overlay::new(OverlayKind::Shape {
            shape: crate::overlay::ShapeKind::Rect,
            points: None,
        })
        .with_span(0, 10)
        .at(7.0, 7.0)
        .sized(10.0, 10.0);
        o.track_id = Some(tid.clone());
        let oid = store.add(o, FrameIndex(0), fps30());

        let plan = plan_frame(&store, &tracks, &ctx(5, 0), &[]);
        // halfway between keyframes: x interpolates to 50
        match &plan.passes[0].cmds[0] {
            DrawCmd::FillRect { rect, .. } => {
                assert_eq!(rect.x0, 50.0);
                assert_eq!(rect.width(), 50.0);
            }
            other => panic!("expected FillRect, got {other:?}"),
        }
        // the stored overlay keeps its own geometry
        assert_eq!(store.get(&oid).unwrap().x, Some(7.0));
    }

    #[test]
    fn deleted_track_falls_back_to_stored_geometry() {
        let mut store = OverlayStore::new();
        let mut o = Overlay::new(OverlayKind::Shape {
            shape: crate::overlay::ShapeKind::Rect,
            points: None,
        })
        .with_span(0, 10)
        .at(7.0, 8.0)
        .sized(10.0, 10.0);
        o.track_id = Some("gone".to_string());
        store.add(o, FrameIndex(0), fps30());

        let plan = plan_frame(&store, &TrackStore::new(), &ctx(5, 0), &[]);
        match &plan.passes[0].cmds[0] {
            DrawCmd::FillRect { rect, .. } => assert_eq!((rect.x0, rect.y0), (7.0, 8.0)),
            other => panic!("expected FillRect, got {other:?}"),
        }
    }

    #[test]
    fn qte_registers_area_and_inactive_frame_clears_it() {
        let mut store = OverlayStore::new();
        store.add(
            Overlay::new(OverlayKind::Qte {
                key: "X".to_string(),
                action: None,
            })
            .with_span(10, 20)
            .at(100.0, 100.0)
            .sized(80.0, 80.0),
            FrameIndex(0),
            fps30(),
        );
        let tracks = TrackStore::new();

        let plan = plan_frame(&store, &tracks, &ctx(15, 0), &[]);
        assert_eq!(plan.areas.len(), 1);
        assert_eq!(plan.areas[0].key.as_deref(), Some("X"));

        let plan = plan_frame(&store, &tracks, &ctx(25, 0), &[]);
        assert!(plan.areas.is_empty());
    }

    #[test]
    fn non_interactive_overlays_register_nothing() {
        let mut store = OverlayStore::new();
        let mut o = Overlay::new(OverlayKind::Qte {
            key: "X".to_string(),
            action: None,
        })
        .with_span(0, 10)
        .at(0.0, 0.0);
        o.interactive = false;
        store.add(o, FrameIndex(0), fps30());

        let plan = plan_frame(&store, &TrackStore::new(), &ctx(5, 0), &[]);
        assert_eq!(plan.passes.len(), 1);
        assert!(plan.areas.is_empty());
    }

    #[test]
    fn frame_pure_types_ignore_wall_clock() {
        let mut store = OverlayStore::new();
        store.add(
            Overlay::new(OverlayKind::Arrow(CurveGeometry::straight(
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
            )))
            .with_span(0, 60),
            FrameIndex(0),
            fps30(),
        );
        store.add(
            Overlay::new(OverlayKind::Text)
                .with_content("pure")
                .with_span(0, 60)
                .at(10.0, 10.0),
            FrameIndex(0),
            fps30(),
        );
        let tracks = TrackStore::new();
        let a = plan_frame(&store, &tracks, &ctx(30, 0), &[]);
        let b = plan_frame(&store, &tracks, &ctx(30, 987_654), &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn rotation_builds_center_transform() {
        let mut store = OverlayStore::new();
        store.add(
            Overlay::new(OverlayKind::Shape {
                shape: crate::overlay::ShapeKind::Rect,
                points: None,
            })
            .with_span(0, 10)
            .at(0.0, 0.0)
            .sized(100.0, 100.0)
            .with_style(Style {
                rotation_deg: Some(90.0),
                color: Some(Color::WHITE),
                ..Style::default()
            }),
            FrameIndex(0),
            fps30(),
        );
        let plan = plan_frame(&store, &TrackStore::new(), &ctx(5, 0), &[]);
        let t = plan.passes[0].transform;
        assert_ne!(t, Affine::IDENTITY);
        // rotation about (50,50) keeps the center fixed
        let c = t * Point::new(50.0, 50.0);
        assert!((c.x - 50.0).abs() < 1e-9 && (c.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn post_passes_are_carried_into_the_plan() {
        let store = OverlayStore::new();
        let post = vec![PostFx::Vignette { strength: 0.4 }];
        let plan = plan_frame(&store, &TrackStore::new(), &ctx(0, 0), &post);
        assert_eq!(plan.post, post);
    }
}
