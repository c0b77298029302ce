use kurbo::{Point, Vec2};

/// Sample count for a full cubic curve polyline.
pub const CUBIC_SAMPLES: usize = 30;
/// Sample count for a full quadratic curve polyline.
pub const QUAD_SAMPLES: usize = 20;

/// `start + (end - start) * t`.
pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Quadratic bezier, De Casteljau closed form:
/// `(1-t)^2 P0 + 2(1-t)t P1 + t^2 P2`.
pub fn quad_point(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (a, b, c) = (u * u, 2.0 * u * t, t * t);
    Point::new(
        a * p0.x + b * p1.x + c * p2.x,
        a * p0.y + b * p1.y + c * p2.y,
    )
}

/// Cubic bezier: `(1-t)^3 P0 + 3(1-t)^2 t P1 + 3(1-t) t^2 P2 + t^3 P3`.
pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// A straight, quadratic or cubic path between two anchor points.
///
/// Evaluation is defined on `t` in `[0, 1]`; callers clamp progress before
/// passing it in. Values outside the domain are a caller bug, not something
/// corrected here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CurvePath {
    Straight {
        start: Point,
        end: Point,
    },
    Quadratic {
        start: Point,
        control: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
}

impl CurvePath {
    pub fn start(&self) -> Point {
        match *self {
            Self::Straight { start, .. }
            | Self::Quadratic { start, .. }
            | Self::Cubic { start, .. } => start,
        }
    }

    pub fn point_at(&self, t: f64) -> Point {
        match *self {
            Self::Straight { start, end } => lerp_point(start, end, t),
            Self::Quadratic {
                start,
                control,
                end,
            } => quad_point(start, control, end, t),
            Self::Cubic {
                start,
                control1,
                control2,
                end,
            } => cubic_point(start, control1, control2, end, t),
        }
    }

    /// The portion of the curve up to `progress`, as a polyline of evaluated
    /// sample points (20 samples quadratic, 30 cubic, scaled by progress).
    /// Not analytic arc tracing; this matches the animated-arrow appearance
    /// of the reference renderer.
    pub fn partial_polyline(&self, progress: f64) -> Vec<Point> {
        let progress = progress.clamp(0.0, 1.0);
        if progress <= 0.0 {
            return vec![self.start()];
        }

        match *self {
            Self::Straight { start, end } => {
                vec![start, lerp_point(start, end, progress)]
            }
            Self::Quadratic { .. } | Self::Cubic { .. } => {
                let full = if matches!(self, Self::Cubic { .. }) {
                    CUBIC_SAMPLES
                } else {
                    QUAD_SAMPLES
                };
                let steps = ((full as f64) * progress).ceil().max(1.0) as usize;
                let mut pts = Vec::with_capacity(steps + 1);
                for i in 0..=steps {
                    let t = progress * (i as f64) / (steps as f64);
                    pts.push(self.point_at(t));
                }
                pts
            }
        }
    }

    /// Direction of travel at the moving endpoint, using the point at
    /// `t = 0.99 * progress` as a proxy for the limit derivative. The
    /// resulting arrowhead angle is an approximation, kept for visual
    /// parity with the reference renderer. Returns `None` for a degenerate
    /// (zero-length) direction.
    pub fn end_direction(&self, progress: f64) -> Option<Vec2> {
        let progress = progress.clamp(0.0, 1.0);
        let tip = self.point_at(progress);
        let near = self.point_at(progress * 0.99);
        let d = tip - near;
        if d.hypot() < 1e-9 {
            return None;
        }
        Some(d / d.hypot())
    }
}
