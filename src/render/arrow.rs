//! Animated arrow and line renderers.

use kurbo::{BezPath, Point, Vec2};

use crate::{
    overlay::{CurveGeometry, Overlay},
    render::RenderCtx,
    scene::DrawCmd,
    style::ResolvedStyle,
};

/// Progress below which no arrowhead is drawn; the tangent proxy is too
/// unstable near the start of the curve.
const ARROWHEAD_MIN_PROGRESS: f64 = 0.1;

/// Barb angle off the reversed tip direction, radians (about 26 degrees).
const BARB_ANGLE: f64 = 0.45;

/// Draw progress at `frame`: `min(1, elapsed / animation_frames)` when
/// animated, otherwise the full curve.
pub(crate) fn draw_progress(frame: i64, start: i64, style: &ResolvedStyle) -> f64 {
    if !style.animation {
        return 1.0;
    }
    let elapsed = (frame - start) as f64;
    (elapsed / style.animation_frames as f64).clamp(0.0, 1.0)
}

fn path_from_points(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }
    path
}

fn arrowhead_path(tip: Point, dir: Vec2, size: f64) -> BezPath {
    let back = dir.atan2() + std::f64::consts::PI;
    let barb = |angle: f64| tip + Vec2::from_angle(angle) * size;
    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(barb(back + BARB_ANGLE));
    path.line_to(barb(back - BARB_ANGLE));
    path.close_path();
    path
}

/// Stroke the curve up to the current draw progress; arrows additionally
/// get a filled triangular head at the moving tip once progress passes the
/// stability threshold. Lines never get a head regardless of style.
pub(crate) fn arrow(
    overlay: &Overlay,
    geometry: &CurveGeometry,
    style: &ResolvedStyle,
    ctx: &RenderCtx<'_>,
    head_allowed: bool,
) -> Vec<DrawCmd> {
    let curve = geometry.to_curve();
    let progress = draw_progress(ctx.frame.0, overlay.start_frame().0, style);
    let points = curve.partial_polyline(progress);
    if points.len() < 2 {
        return Vec::new();
    }

    let mut cmds = vec![DrawCmd::StrokePath {
        path: path_from_points(&points),
        color: style.color,
        width: style.stroke_width,
        dash: style.dash.clone(),
    }];

    if head_allowed && style.arrowhead && progress > ARROWHEAD_MIN_PROGRESS {
        if let Some(dir) = curve.end_direction(progress) {
            cmds.push(DrawCmd::FillPath {
                path: arrowhead_path(curve.point_at(progress), dir, style.arrow_size),
                color: style.color,
            });
        }
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Canvas, FrameIndex, Fps};
    use crate::overlay::{OverlayKind, OverlayType};
    use crate::scene::HeuristicMeasure;
    use crate::style::Style;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn ctx(frame: i64) -> RenderCtx<'static> {
        RenderCtx {
            frame: FrameIndex(frame),
            wall_clock_ms: 0,
            canvas: Canvas {
                width: 640,
                height: 480,
            },
            fps: Fps::new(30.0).unwrap(),
            measure: &HeuristicMeasure,
        }
    }

    fn straight_arrow() -> (Overlay, CurveGeometry) {
        let g = CurveGeometry::straight(p(0.0, 0.0), p(100.0, 0.0));
        let o = Overlay::new(OverlayKind::Arrow(g.clone())).with_span(0, 60);
        (o, g)
    }

    #[test]
    fn progress_clamps_to_one() {
        let style = Style::default().resolve(OverlayType::Arrow);
        assert_eq!(draw_progress(0, 0, &style), 0.0);
        assert_eq!(draw_progress(15, 0, &style), 0.5); // 30-frame default
        assert_eq!(draw_progress(30, 0, &style), 1.0);
        assert_eq!(draw_progress(500, 0, &style), 1.0);
    }

    #[test]
    fn animation_disabled_draws_full_curve() {
        let style = Style {
            animation: Some(false),
            ..Style::default()
        }
        .resolve(OverlayType::Arrow);
        assert_eq!(draw_progress(0, 0, &style), 1.0);
    }

    #[test]
    fn zero_progress_draws_nothing() {
        let (o, g) = straight_arrow();
        let style = Style::default().resolve(OverlayType::Arrow);
        assert!(arrow(&o, &g, &style, &ctx(0), true).is_empty());
    }

    #[test]
    fn early_progress_suppresses_arrowhead() {
        let (o, g) = straight_arrow();
        let style = Style::default().resolve(OverlayType::Arrow);
        // frame 3 of 30: progress 0.1, at the threshold, head suppressed
        let cmds = arrow(&o, &g, &style, &ctx(3), true);
        assert_eq!(cmds.len(), 1);
        // frame 15: progress 0.5, head present
        let cmds = arrow(&o, &g, &style, &ctx(15), true);
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[1], DrawCmd::FillPath { .. }));
    }

    #[test]
    fn line_never_gets_a_head() {
        let (o, g) = straight_arrow();
        let style = Style {
            arrowhead: Some(true),
            ..Style::default()
        }
        .resolve(OverlayType::Line);
        let cmds = arrow(&o, &g, &style, &ctx(60), false);
        assert_eq!(cmds.len(), 1);
        assert!(matches!(cmds[0], DrawCmd::StrokePath { .. }));
    }

    #[test]
    fn head_sits_at_the_moving_tip() {
        let (o, g) = straight_arrow();
        let style = Style::default().resolve(OverlayType::Arrow);
        let cmds = arrow(&o, &g, &style, &ctx(15), true);
        match &cmds[1] {
            DrawCmd::FillPath { path, .. } => {
                let bbox = kurbo::Shape::bounding_box(path);
                // tip at x = 50 (progress 0.5 on a 100px segment)
                assert!((bbox.max_x() - 50.0).abs() < 1e-9);
            }
            other => panic!("expected FillPath, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_curve_skips_the_head() {
        let g = CurveGeometry::straight(p(5.0, 5.0), p(5.0, 5.0));
        let o = Overlay::new(OverlayKind::Arrow(g.clone())).with_span(0, 60);
        let style = Style::default().resolve(OverlayType::Arrow);
        let cmds = arrow(&o, &g, &style, &ctx(60), true);
        // stroke of a zero-length segment still has two points; no head
        assert_eq!(cmds.len(), 1);
    }
}
