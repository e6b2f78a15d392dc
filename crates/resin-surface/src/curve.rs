//! Cubic Bezier curves in the (coordinate, value) plane.

use glam::Vec2;

/// Number of bisection steps used to invert the coordinate function.
///
/// f32 has a 24-bit mantissa, so the bracket stops shrinking well before this.
const BISECTION_STEPS: usize = 40;

/// A cubic Bezier curve whose x component is a coordinate and whose y
/// component is the interpolated value.
///
/// Defined by 4 control points: start (P0), control 1 (P1), control 2 (P2), end (P3).
/// The curve passes through P0 and P3, and is influenced by P1 and P2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    /// Start point.
    pub p0: Vec2,
    /// First control point.
    pub p1: Vec2,
    /// Second control point.
    pub p2: Vec2,
    /// End point.
    pub p3: Vec2,
}

impl CubicBezier {
    /// Creates a new cubic Bezier curve.
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Creates a curve from an array of control points.
    pub fn from_points(points: [Vec2; 4]) -> Self {
        Self::new(points[0], points[1], points[2], points[3])
    }

    /// Evaluates the curve at parameter t (0 to 1).
    pub fn evaluate(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        // B(t) = (1-t)³P0 + 3(1-t)²tP1 + 3(1-t)t²P2 + t³P3
        self.p0 * mt3 + self.p1 * (3.0 * mt2 * t) + self.p2 * (3.0 * mt * t2) + self.p3 * t3
    }

    /// Returns true if the coordinate function x(t) never decreases.
    ///
    /// This holds whenever the control x coordinates are non-decreasing,
    /// and is what makes [`parameter_at`](Self::parameter_at) well defined.
    pub fn is_monotonic(&self) -> bool {
        self.p0.x <= self.p1.x && self.p1.x <= self.p2.x && self.p2.x <= self.p3.x
    }

    /// Finds the parameter t whose coordinate equals `x`, by bisection.
    ///
    /// Coordinates outside the curve's span clamp to t = 0 or t = 1.
    pub fn parameter_at(&self, x: f32) -> f32 {
        if x <= self.p0.x {
            return 0.0;
        }
        if x >= self.p3.x {
            return 1.0;
        }

        let mut lo = 0.0_f32;
        let mut hi = 1.0_f32;
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if self.evaluate(mid).x < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    /// Returns the curve value at coordinate `x`.
    ///
    /// The end coordinates return the end control values exactly.
    pub fn value_at(&self, x: f32) -> f32 {
        if x <= self.p0.x {
            return self.p0.y;
        }
        if x >= self.p3.x {
            return self.p3.y;
        }
        self.evaluate(self.parameter_at(x)).y
    }

    /// Samples the curve value at each coordinate in `xs`.
    pub fn sample_at(&self, xs: &[f32]) -> Vec<f32> {
        xs.iter().map(|&x| self.value_at(x)).collect()
    }
}

/// Returns `n` evenly spaced coordinates from `start` to `end` inclusive.
///
/// The last coordinate is `end` exactly.
pub fn evenly_spaced(start: f32, end: f32, n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f32;
            let mut xs: Vec<f32> = (0..n).map(|i| start + step * i as f32).collect();
            xs[n - 1] = end;
            xs
        }
    }
}
