//! Shape and outline renderers.

use kurbo::{BezPath, Circle, Point, Shape as _};

use crate::{
    overlay::{Overlay, ShapeKind},
    render::Placement,
    scene::DrawCmd,
    style::ResolvedStyle,
};

/// Alpha factor applied to the stroke color for translucent interior fills.
const FILL_ALPHA: f64 = 0.25;

fn polyline_path(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }
    if closed {
        path.close_path();
    }
    path
}

/// Rect, circle or polygon. Circles are inscribed in the placement rect as
/// an ellipse; polygon points are absolute canvas coordinates.
pub(crate) fn shape(
    overlay: &Overlay,
    kind: ShapeKind,
    points: Option<&[Point]>,
    style: &ResolvedStyle,
    place: &Placement,
) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();
    match kind {
        ShapeKind::Rect => {
            let rect = place.rect_or(100.0, 100.0);
            if style.fill {
                cmds.push(DrawCmd::FillRect {
                    rect,
                    color: style.color,
                    radius: style.corner_radius,
                });
            }
            if let Some(stroke) = style.stroke_color {
                let path = if style.corner_radius > 0.0 {
                    rect.to_rounded_rect(style.corner_radius).to_path(0.1)
                } else {
                    rect.to_path(0.1)
                };
                cmds.push(DrawCmd::StrokePath {
                    path,
                    color: stroke,
                    width: style.stroke_width,
                    dash: style.dash.clone(),
                });
            }
        }
        ShapeKind::Circle => {
            let rect = place.rect_or(100.0, 100.0);
            let radius = rect.width().min(rect.height()) / 2.0;
            let path = Circle::new(rect.center(), radius).to_path(0.1);
            if style.fill {
                cmds.push(DrawCmd::FillPath {
                    path: path.clone(),
                    color: style.color,
                });
            }
            if let Some(stroke) = style.stroke_color {
                cmds.push(DrawCmd::StrokePath {
                    path,
                    color: stroke,
                    width: style.stroke_width,
                    dash: style.dash.clone(),
                });
            }
        }
        ShapeKind::Polygon => {
            let Some(points) = points.filter(|p| p.len() >= 3) else {
                tracing::warn!(id = %overlay.id, "polygon shape needs at least 3 points");
                return Vec::new();
            };
            let path = polyline_path(points, true);
            if style.fill {
                cmds.push(DrawCmd::FillPath {
                    path: path.clone(),
                    color: style.color,
                });
            }
            if let Some(stroke) = style.stroke_color {
                cmds.push(DrawCmd::StrokePath {
                    path,
                    color: stroke,
                    width: style.stroke_width,
                    dash: style.dash.clone(),
                });
            }
        }
    }
    cmds
}

/// Freeform stroked outline through absolute points, optionally closed,
/// with an optional translucent interior fill at a quarter of the stroke
/// color's alpha.
pub(crate) fn outline(
    overlay: &Overlay,
    points: &[Point],
    closed: bool,
    style: &ResolvedStyle,
) -> Vec<DrawCmd> {
    if points.len() < 2 {
        tracing::warn!(id = %overlay.id, "outline needs at least 2 points");
        return Vec::new();
    }

    let path = polyline_path(points, closed);
    let mut cmds = Vec::new();
    if style.fill && closed {
        cmds.push(DrawCmd::FillPath {
            path: path.clone(),
            color: style.color.mul_alpha(FILL_ALPHA),
        });
    }
    cmds.push(DrawCmd::StrokePath {
        path,
        color: style.color,
        width: style.stroke_width,
        dash: style.dash.clone(),
    });
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::overlay::{OverlayKind, OverlayType};
    use crate::style::Style;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn overlay(kind: OverlayKind) -> Overlay {
        Overlay::new(kind).with_span(0, 10)
    }

    #[test]
    fn rect_fill_and_stroke_order() {
        let o = overlay(OverlayKind::Shape {
            shape: ShapeKind::Rect,
            points: None,
        });
        let style = Style {
            stroke_color: Some(Color::BLACK),
            ..Style::default()
        }
        .resolve(OverlayType::Shape);
        let place = Placement {
            x: Some(10.0),
            y: Some(10.0),
            width: Some(50.0),
            height: Some(20.0),
        };
        let cmds = shape(&o, ShapeKind::Rect, None, &style, &place);
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], DrawCmd::FillRect { .. }));
        assert!(matches!(cmds[1], DrawCmd::StrokePath { .. }));
    }

    #[test]
    fn circle_is_inscribed_in_placement() {
        let o = overlay(OverlayKind::Shape {
            shape: ShapeKind::Circle,
            points: None,
        });
        let style = Style::default().resolve(OverlayType::Shape);
        let place = Placement {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(100.0),
            height: Some(40.0),
        };
        let cmds = shape(&o, ShapeKind::Circle, None, &style, &place);
        match &cmds[0] {
            DrawCmd::FillPath { path, .. } => {
                // radius follows the smaller dimension
                let bbox = path.bounding_box();
                assert!((bbox.height() - 40.0).abs() < 0.5);
            }
            other => panic!("expected FillPath, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_polygon_renders_nothing() {
        let o = overlay(OverlayKind::Shape {
            shape: ShapeKind::Polygon,
            points: Some(vec![p(0.0, 0.0), p(1.0, 1.0)]),
        });
        let style = Style::default().resolve(OverlayType::Shape);
        let pts = [p(0.0, 0.0), p(1.0, 1.0)];
        assert!(shape(&o, ShapeKind::Polygon, Some(&pts), &style, &Placement::default()).is_empty());
    }

    #[test]
    fn outline_strokes_and_optionally_fills_when_closed() {
        let o = overlay(OverlayKind::Outline {
            points: vec![],
            closed: true,
        });
        let pts = [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0)];

        let plain = Style::default().resolve(OverlayType::Outline);
        let cmds = outline(&o, &pts, true, &plain);
        assert_eq!(cmds.len(), 1); // outline default is no fill
        assert!(matches!(cmds[0], DrawCmd::StrokePath { .. }));

        let filled = Style {
            fill: Some(true),
            ..Style::default()
        }
        .resolve(OverlayType::Outline);
        let cmds = outline(&o, &pts, true, &filled);
        assert_eq!(cmds.len(), 2);
        match &cmds[0] {
            DrawCmd::FillPath { color, .. } => assert!(color.a < 255),
            other => panic!("expected FillPath, got {other:?}"),
        }
    }

    #[test]
    fn outline_with_one_point_renders_nothing() {
        let o = overlay(OverlayKind::Outline {
            points: vec![],
            closed: false,
        });
        let style = Style::default().resolve(OverlayType::Outline);
        assert!(outline(&o, &[p(1.0, 1.0)], false, &style).is_empty());
    }

    #[test]
    fn dash_pattern_reaches_the_stroke() {
        let o = overlay(OverlayKind::Outline {
            points: vec![],
            closed: false,
        });
        let style = Style {
            dash: Some(vec![6.0, 4.0]),
            ..Style::default()
        }
        .resolve(OverlayType::Outline);
        let cmds = outline(&o, &[p(0.0, 0.0), p(10.0, 0.0)], false, &style);
        match &cmds[0] {
            DrawCmd::StrokePath { dash, .. } => assert_eq!(dash.as_deref(), Some(&[6.0, 4.0][..])),
            other => panic!("expected StrokePath, got {other:?}"),
        }
    }
}
