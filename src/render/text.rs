//! Text-family renderers: plain text, captions, ascii art, and the
//! typewriter terminal.

use crate::{
    overlay::Overlay,
    render::{Placement, RenderCtx},
    scene::{DrawCmd, TextStroke},
    style::ResolvedStyle,
};

/// Wall-clock blink phase: on for the first half of every second.
fn blink_on(wall_clock_ms: u64) -> bool {
    wall_clock_ms % 1000 < 500
}

fn text_stroke(style: &ResolvedStyle) -> Option<TextStroke> {
    style.stroke_color.map(|color| TextStroke {
        color,
        width: style.stroke_width,
    })
}

/// Multi-line left-aligned text at the overlay origin. Baselines sit one
/// font size below each line top.
pub(crate) fn text(overlay: &Overlay, style: &ResolvedStyle, place: &Placement) -> Vec<DrawCmd> {
    let Some(content) = overlay.content.as_deref() else {
        tracing::warn!(id = %overlay.id, "text overlay has no content");
        return Vec::new();
    };
    if content.is_empty() {
        return Vec::new();
    }

    let origin = place.origin_or(0.0, 0.0);
    content
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| DrawCmd::Text {
            origin: kurbo::Point::new(
                origin.x,
                origin.y + style.font_size + i as f64 * style.line_height,
            ),
            text: line.to_string(),
            size: style.font_size,
            mono: false,
            color: style.color,
            stroke: text_stroke(style),
            glow: style.glow,
        })
        .collect()
}

/// Subtitle-style caption: a padded background bar behind a single line,
/// horizontally centered on the canvas unless positioned explicitly, near
/// the bottom edge by default.
pub(crate) fn caption(
    overlay: &Overlay,
    style: &ResolvedStyle,
    place: &Placement,
    ctx: &RenderCtx<'_>,
) -> Vec<DrawCmd> {
    let Some(content) = overlay.content.as_deref() else {
        tracing::warn!(id = %overlay.id, "caption overlay has no content");
        return Vec::new();
    };
    if content.is_empty() {
        return Vec::new();
    }

    let text_w = ctx.measure.width(content, style.font_size, false);
    let x = place
        .x
        .unwrap_or_else(|| (f64::from(ctx.canvas.width) - text_w) / 2.0);
    let baseline = place
        .y
        .map(|y| y + style.font_size)
        .unwrap_or_else(|| f64::from(ctx.canvas.height) - 60.0);

    let mut cmds = Vec::with_capacity(2);
    if let Some(bg) = style.background {
        let top = baseline - style.font_size;
        cmds.push(DrawCmd::FillRect {
            rect: kurbo::Rect::new(
                x - style.padding,
                top - style.padding,
                x + text_w + style.padding,
                baseline + style.padding,
            ),
            color: bg,
            radius: style.corner_radius,
        });
    }
    cmds.push(DrawCmd::Text {
        origin: kurbo::Point::new(x, baseline),
        text: content.to_string(),
        size: style.font_size,
        mono: false,
        color: style.color,
        stroke: text_stroke(style),
        glow: style.glow,
    });
    cmds
}

/// Monospace block, one command per line with blank lines preserved as
/// vertical space. Intended for ASCII art, so lines are never trimmed.
pub(crate) fn ascii(overlay: &Overlay, style: &ResolvedStyle, place: &Placement) -> Vec<DrawCmd> {
    let Some(content) = overlay.content.as_deref() else {
        tracing::warn!(id = %overlay.id, "ascii overlay has no content");
        return Vec::new();
    };

    let origin = place.origin_or(0.0, 0.0);
    content
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| DrawCmd::Text {
            origin: kurbo::Point::new(
                origin.x,
                origin.y + style.font_size + i as f64 * style.line_height,
            ),
            text: line.to_string(),
            size: style.font_size,
            mono: true,
            color: style.color,
            stroke: None,
            glow: style.glow,
        })
        .collect()
}

/// Character count revealed at `frame` for the typewriter effect:
/// `floor((frame - start - delay) * chars_per_frame)`, clamped to the
/// content length. Frame-pure.
pub(crate) fn revealed_chars(
    frame: i64,
    start: i64,
    style: &ResolvedStyle,
    total: usize,
) -> usize {
    let elapsed = frame - start - style.start_delay;
    if elapsed <= 0 {
        return 0;
    }
    ((elapsed as f64 * style.chars_per_frame).floor() as usize).min(total)
}

/// Terminal typewriter text. Reveal progress is a pure function of the
/// frame; only the cursor blink reads the wall clock.
pub(crate) fn terminal_text(
    overlay: &Overlay,
    style: &ResolvedStyle,
    place: &Placement,
    ctx: &RenderCtx<'_>,
) -> Vec<DrawCmd> {
    let Some(content) = overlay.content.as_deref() else {
        tracing::warn!(id = %overlay.id, "terminal_text overlay has no content");
        return Vec::new();
    };

    let total = content.chars().count();
    let visible = revealed_chars(ctx.frame.0, overlay.start_frame().0, style, total);
    let shown: String = content.chars().take(visible).collect();

    let origin = place.origin_or(0.0, 0.0);
    let mut cmds = Vec::new();
    let mut last_line_idx = 0usize;
    let mut last_line = "";
    for (i, line) in shown.split('\n').enumerate() {
        last_line_idx = i;
        last_line = line;
        if line.is_empty() {
            continue;
        }
        cmds.push(DrawCmd::Text {
            origin: kurbo::Point::new(
                origin.x,
                origin.y + style.font_size + i as f64 * style.line_height,
            ),
            text: line.to_string(),
            size: style.font_size,
            mono: true,
            color: style.color,
            stroke: None,
            glow: style.glow,
        });
    }

    let complete = visible >= total;
    let cursor_shown = if complete {
        style.static_cursor
    } else {
        style.cursor && blink_on(ctx.wall_clock_ms)
    };
    if cursor_shown {
        let cx = origin.x + ctx.measure.width(last_line, style.font_size, true);
        let top = origin.y + last_line_idx as f64 * style.line_height;
        cmds.push(DrawCmd::FillRect {
            rect: kurbo::Rect::new(
                cx,
                top,
                cx + style.font_size * 0.55,
                top + style.font_size,
            ),
            color: style.color,
            radius: 0.0,
        });
    }

    if style.scanlines && !cmds.is_empty() {
        let widest = shown
            .split('\n')
            .map(|l| ctx.measure.width(l, style.font_size, true))
            .fold(0.0f64, f64::max);
        let height = (last_line_idx + 1) as f64 * style.line_height;
        cmds.push(DrawCmd::Scanlines {
            rect: kurbo::Rect::new(
                origin.x - style.padding,
                origin.y - style.padding,
                origin.x + widest + style.padding,
                origin.y + height + style.padding,
            ),
            spacing: style.scanline_spacing,
            alpha: style.scanline_alpha,
        });
    }

    cmds
}
