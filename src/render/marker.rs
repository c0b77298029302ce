//! Interactive markers: QTE prompts and annotation popups.

use kurbo::{BezPath, Circle, Point, Shape as _};

use crate::{
    core::Color,
    overlay::Overlay,
    render::{Placement, RenderCtx},
    scene::DrawCmd,
    style::ResolvedStyle,
};

/// Alpha factor for the translucent circle interior.
const QTE_FILL_ALPHA: f64 = 0.25;

/// Default QTE circle bounding box when the overlay gives no size.
const QTE_DEFAULT_SIZE: f64 = 80.0;

/// Half-width of the popup tail where it meets the bubble edge.
const TAIL_HALF_WIDTH: f64 = 8.0;

/// Base circle for a QTE prompt: center and radius before the pulse is
/// applied. Shared with hit-test registration so the interaction area
/// matches the drawn prompt.
pub(crate) fn qte_circle(_style: &ResolvedStyle, place: &Placement) -> (Point, f64) {
    let rect = place.rect_or(QTE_DEFAULT_SIZE, QTE_DEFAULT_SIZE);
    (rect.center(), rect.width().min(rect.height()) / 2.0)
}

/// Pulsing key prompt: translucent disc, ring, and the key label centered
/// inside. The pulse is the one deliberate wall-clock dependency here.
pub(crate) fn qte(
    key: &str,
    style: &ResolvedStyle,
    place: &Placement,
    ctx: &RenderCtx<'_>,
) -> Vec<DrawCmd> {
    let (center, base_radius) = qte_circle(style, place);
    let pulse =
        style.pulse_amplitude * (ctx.wall_clock_ms as f64 * style.pulse_speed).sin();
    let radius = (base_radius + pulse).max(1.0);
    let disc = Circle::new(center, radius).to_path(0.1);

    let mut cmds = vec![
        DrawCmd::FillPath {
            path: disc.clone(),
            color: style.color.mul_alpha(QTE_FILL_ALPHA),
        },
        DrawCmd::StrokePath {
            path: disc,
            color: style.color,
            width: style.stroke_width,
            dash: None,
        },
    ];

    if !key.is_empty() {
        let key_w = ctx.measure.width(key, style.font_size, false);
        cmds.push(DrawCmd::Text {
            // baseline nudged so the label sits on the circle center
            origin: Point::new(center.x - key_w / 2.0, center.y + style.font_size * 0.35),
            text: key.to_string(),
            size: style.font_size,
            mono: false,
            color: style.color,
            stroke: None,
            glow: None,
        });
    }
    cmds
}

/// Greedy word wrap against the measured advance width. A word wider than
/// the limit gets a line of its own rather than being split.
pub(crate) fn wrap_words(
    content: &str,
    limit: f64,
    size: f64,
    ctx: &RenderCtx<'_>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in content.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && ctx.measure.width(&candidate, size, false) > limit {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Speech-bubble popup: rounded background, wrapped text, and an optional
/// triangular tail toward a pointer target.
pub(crate) fn popup(
    overlay: &Overlay,
    pointer: Option<Point>,
    style: &ResolvedStyle,
    place: &Placement,
    ctx: &RenderCtx<'_>,
) -> Vec<DrawCmd> {
    let Some(content) = overlay.content.as_deref() else {
        tracing::warn!(id = %overlay.id, "popup overlay has no content");
        return Vec::new();
    };

    let limit = style.max_width - 2.0 * style.padding;
    let lines = wrap_words(content, limit, style.font_size, ctx);
    if lines.is_empty() {
        return Vec::new();
    }

    let widest = lines
        .iter()
        .map(|l| ctx.measure.width(l, style.font_size, false))
        .fold(0.0f64, f64::max);
    let origin = place.origin_or(0.0, 0.0);
    let bubble = kurbo::Rect::new(
        origin.x,
        origin.y,
        origin.x + widest + 2.0 * style.padding,
        origin.y + lines.len() as f64 * style.line_height + 2.0 * style.padding,
    );
    let background = style.background.unwrap_or(Color::WHITE);

    let mut cmds = Vec::new();
    if let Some(target) = pointer {
        // tail base hugs the bubble's bottom edge under the target x
        let base_x = target
            .x
            .clamp(bubble.x0 + TAIL_HALF_WIDTH, bubble.x1 - TAIL_HALF_WIDTH);
        let mut tail = BezPath::new();
        tail.move_to((base_x - TAIL_HALF_WIDTH, bubble.y1));
        tail.line_to((base_x + TAIL_HALF_WIDTH, bubble.y1));
        tail.line_to(target);
        tail.close_path();
        cmds.push(DrawCmd::FillPath {
            path: tail,
            color: background,
        });
    }

    cmds.push(DrawCmd::FillRect {
        rect: bubble,
        color: background,
        radius: style.corner_radius,
    });
    if let Some(stroke) = style.stroke_color {
        cmds.push(DrawCmd::StrokePath {
            path: bubble.to_rounded_rect(style.corner_radius).to_path(0.1),
            color: stroke,
            width: style.stroke_width,
            dash: None,
        });
    }

    for (i, line) in lines.iter().enumerate() {
        cmds.push(DrawCmd::Text {
            origin: Point::new(
                bubble.x0 + style.padding,
                bubble.y0 + style.padding + style.font_size + i as f64 * style.line_height,
            ),
            text: line.clone(),
            size: style.font_size,
            mono: false,
            color: style.color,
            stroke: None,
            glow: None,
        });
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Canvas, FrameIndex, Fps};
    use crate::overlay::{OverlayKind, OverlayType};
    use crate::scene::{HeuristicMeasure, TextMeasure};
    use crate::style::Style;

    fn ctx(wall_ms: u64) -> RenderCtx<'static> {
        RenderCtx {
            frame: FrameIndex(0),
            wall_clock_ms: wall_ms,
            canvas: Canvas {
                width: 640,
                height: 480,
            },
            fps: Fps::new(30.0).unwrap(),
            measure: &HeuristicMeasure,
        }
    }

    #[test]
    fn qte_pulse_varies_with_wall_clock_only() {
        let style = Style::default().resolve(OverlayType::Qte);
        let place = Placement {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(80.0),
            height: Some(80.0),
        };
        let a = qte("X", &style, &place, &ctx(0));
        let b = qte("X", &style, &place, &ctx(200));
        assert_ne!(a, b);
        // pulse amplitude bounds the radius excursion
        for cmds in [&a, &b] {
            match &cmds[0] {
                DrawCmd::FillPath { path, .. } => {
                    let r = path.bounding_box().width() / 2.0;
                    assert!((r - 40.0).abs() <= style.pulse_amplitude + 0.5);
                }
                other => panic!("expected FillPath, got {other:?}"),
            }
        }
    }

    #[test]
    fn qte_base_circle_ignores_the_pulse() {
        let style = Style::default().resolve(OverlayType::Qte);
        let place = Placement {
            x: Some(100.0),
            y: Some(100.0),
            width: Some(60.0),
            height: Some(60.0),
        };
        let (center, radius) = qte_circle(&style, &place);
        assert_eq!(center, Point::new(130.0, 130.0));
        assert_eq!(radius, 30.0);
    }

    #[test]
    fn qte_label_is_centered() {
        let style = Style::default().resolve(OverlayType::Qte);
        let place = Placement {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(80.0),
            height: Some(80.0),
        };
        let cmds = qte("X", &style, &place, &ctx(0));
        match cmds.last().unwrap() {
            DrawCmd::Text { origin, text, .. } => {
                assert_eq!(text, "X");
                let w = HeuristicMeasure.width("X", style.font_size, false);
                assert!((origin.x - (40.0 - w / 2.0)).abs() < 1e-9);
            }
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn wrap_respects_the_width_limit() {
        let c = ctx(0);
        let lines = wrap_words("alpha beta gamma delta", 60.0, 18.0, &c);
        assert!(lines.len() > 1);
        for line in &lines {
            // each committed line fits, except single overlong words
            if line.contains(' ') {
                assert!(c.measure.width(line, 18.0, false) <= 60.0);
            }
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta");
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let c = ctx(0);
        let lines = wrap_words("hi incomprehensibilities yo", 50.0, 18.0, &c);
        assert!(lines.iter().any(|l| l == "incomprehensibilities"));
    }

    #[test]
    fn popup_draws_tail_then_bubble_then_text() {
        let o = Overlay::new(OverlayKind::Popup {
            pointer: Some(Point::new(60.0, 200.0)),
        })
        .with_content("hello world")
        .with_span(0, 10)
        .at(20.0, 20.0);
        let style = o.style.resolve(OverlayType::Popup);
        let place = Placement {
            x: Some(20.0),
            y: Some(20.0),
            width: None,
            height: None,
        };
        let cmds = popup(&o, Some(Point::new(60.0, 200.0)), &style, &place, &ctx(0));
        assert!(matches!(cmds[0], DrawCmd::FillPath { .. })); // tail
        assert!(matches!(cmds[1], DrawCmd::FillRect { .. })); // bubble
        assert!(matches!(cmds.last().unwrap(), DrawCmd::Text { .. }));
    }

    #[test]
    fn popup_without_pointer_has_no_tail() {
        let o = Overlay::new(OverlayKind::Popup { pointer: None })
            .with_content("note")
            .with_span(0, 10)
            .at(0.0, 0.0);
        let style = o.style.resolve(OverlayType::Popup);
        let cmds = popup(&o, None, &style, &Placement::default(), &ctx(0));
        assert!(matches!(cmds[0], DrawCmd::FillRect { .. }));
    }
}
