/// A point in diagram (view box) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub(crate) const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub(crate) fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// Cubic Bézier segment between two diagram nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CubicBezier {
    pub p0: Point,
    pub c1: Point,
    pub c2: Point,
    pub p3: Point,
}

impl CubicBezier {
    /// Gentle S-curve: both control points are pulled halfway toward the horizontal midpoint,
    /// each keeping the height of its own endpoint.
    pub(crate) fn s_curve(start: Point, end: Point) -> Self {
        let mid_x = (start.x + end.x) / 2.0;
        Self {
            p0: start,
            c1: Point::new(start.x + (mid_x - start.x) * 0.5, start.y),
            c2: Point::new(end.x - (end.x - mid_x) * 0.5, end.y),
            p3: end,
        }
    }

    /// `P(t) = (1-t)³·P0 + 3(1-t)²t·C1 + 3(1-t)t²·C2 + t³·P3`
    pub(crate) fn point_at(&self, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        let omt = 1.0 - t;
        let b0 = omt * omt * omt;
        let b1 = 3.0 * omt * omt * t;
        let b2 = 3.0 * omt * t * t;
        let b3 = t * t * t;
        Point::new(
            b0 * self.p0.x + b1 * self.c1.x + b2 * self.c2.x + b3 * self.p3.x,
            b0 * self.p0.y + b1 * self.c1.y + b2 * self.c2.y + b3 * self.p3.y,
        )
    }
}

/// Quadratic Bézier segment, used for converging flow lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct QuadBezier {
    pub p0: Point,
    pub control: Point,
    pub p2: Point,
}

impl QuadBezier {
    pub(crate) fn point_at(&self, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        let omt = 1.0 - t;
        let b0 = omt * omt;
        let b1 = 2.0 * omt * t;
        let b2 = t * t;
        Point::new(
            b0 * self.p0.x + b1 * self.control.x + b2 * self.p2.x,
            b0 * self.p0.y + b1 * self.control.y + b2 * self.p2.y,
        )
    }
}

/// The shape a flow dot travels along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FlowPath {
    Line(Point, Point),
    Quad(QuadBezier),
}

impl FlowPath {
    pub(crate) fn point_at(&self, t: f32) -> Point {
        match self {
            Self::Line(from, to) => from.lerp(*to, t.clamp(0.0, 1.0)),
            Self::Quad(curve) => curve.point_at(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::horizontal(Point::new(110.0, 100.0), Point::new(135.0, 100.0))]
    #[case::offset(Point::new(485.0, 100.0), Point::new(510.0, 50.0))]
    #[case::backwards(Point::new(300.0, 20.0), Point::new(40.0, 180.0))]
    fn endpoints_are_exact(#[case] start: Point, #[case] end: Point) {
        let curve = CubicBezier::s_curve(start, end);
        assert_eq!(curve.point_at(0.0), start);
        assert_eq!(curve.point_at(1.0), end);
    }

    #[test]
    fn s_curve_controls() {
        let curve = CubicBezier::s_curve(Point::new(0.0, 0.0), Point::new(100.0, 40.0));
        assert_eq!(curve.c1, Point::new(25.0, 0.0));
        assert_eq!(curve.c2, Point::new(75.0, 40.0));
        assert_eq!(curve.point_at(0.5), Point::new(50.0, 20.0));
    }

    #[test]
    fn quad_flow_endpoints() {
        let path = FlowPath::Quad(QuadBezier {
            p0: Point::new(85.0, 47.5),
            control: Point::new(150.0, 47.5),
            p2: Point::new(175.0, 117.5),
        });
        assert_eq!(path.point_at(0.0), Point::new(85.0, 47.5));
        assert_eq!(path.point_at(1.0), Point::new(175.0, 117.5));
    }

    #[test]
    fn line_flow_midpoint() {
        let path = FlowPath::Line(Point::new(80.0, 60.0), Point::new(120.0, 60.0));
        assert_eq!(path.point_at(0.5), Point::new(100.0, 60.0));
    }
}
