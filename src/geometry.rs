use crate::{Line, clamp};
use std::{
    fmt,
    ops::{Add, Div, Mul, Sub},
};

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;
pub const PI: f64 = std::f64::consts::PI;

/// Format floats in a compact way suitable for SVG path
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    let value_abs = value.abs();
    if value_abs.fract() < EPSILON {
        write!(f, "{}", value.trunc() as i64)
    } else if value_abs > 9999.0 || value_abs <= 0.0001 {
        write!(f, "{:.3e}", value)
    } else {
        let ten: Scalar = 10.0;
        let round = ten.powi(6 - (value_abs.trunc() + 1.0).log10().ceil() as i32);
        write!(f, "{}", (value * round).round() / round)
    }
}

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq)]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        scalar_fmt(f, *x)?;
        write!(f, ",")?;
        scalar_fmt(f, *y)?;
        Ok(())
    }
}

impl Point {
    #[inline]
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(self) -> Scalar {
        self.0[0]
    }

    /// Get `y` compenent of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Both components are finite numbers
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0[0].is_finite() && self.0[1].is_finite()
    }

    /// Get length of the vector (distance from the origin)
    pub fn length(self) -> Scalar {
        let Self([x, y]) = self;
        x.hypot(y)
    }

    /// Distance between two points
    pub fn dist(self, other: Self) -> Scalar {
        (self - other).length()
    }

    /// Dot product between two vectors
    pub fn dot(self, other: Self) -> Scalar {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        x0 * x1 + y0 * y1
    }

    /// Cross product between two vectors
    pub fn cross(self, other: Self) -> Scalar {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        x0 * y1 - y0 * x1
    }

    /// Rotate vector around the origin by angle `a` (radians)
    pub fn rotate(self, a: Scalar) -> Self {
        let Self([x, y]) = self;
        let (sin, cos) = a.sin_cos();
        Self([x * cos - y * sin, x * sin + y * cos])
    }

    /// Calculate angle (from self to the other) between two vectors
    pub fn angle_between(self, other: Self) -> Option<Scalar> {
        let angle = clamp(self.cos_between(other)?, -1.0, 1.0).acos();
        if self.cross(other) < 0.0 {
            Some(-angle)
        } else {
            Some(angle)
        }
    }

    /// Cosine of the angle (from self to the other) between to vectors
    pub fn cos_between(self, other: Self) -> Option<Scalar> {
        let lengths = self.length() * other.length();
        if lengths < EPSILON {
            None
        } else {
            Some(self.dot(other) / lengths)
        }
    }

    /// Determine if self is close to the other within the marging of error (EPSILON)
    pub fn is_close_to(self, other: Point) -> bool {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        (x0 - x1).abs() < EPSILON && (y0 - y1).abs() < EPSILON
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl Div<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn div(self, rhs: Scalar) -> Self::Output {
        let Point([x, y]) = self;
        Point([x / rhs, y / rhs])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

/// Bounding box with sides directed along the axes
#[derive(Clone, Copy, PartialEq)]
pub struct BBox {
    /// Point with minimal x and y values
    min: Point,
    /// Point with maximum x and y values
    max: Point,
}

impl BBox {
    /// Construct bounding box which includes points `p0` and `p1`
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        let Point([x0, y0]) = p0.into();
        let Point([x1, y1]) = p1.into();
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min: Point([x0, y0]),
            max: Point([x1, y1]),
        }
    }

    /// Point with minmum values of x and y coordianetes
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// Point with maximum values of x and y coordianetes
    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    /// `x` coordinate of the point with the minimal value
    #[inline]
    pub fn x(&self) -> Scalar {
        self.min.x()
    }

    /// `y` coordinate of the point with the minimal value
    #[inline]
    pub fn y(&self) -> Scalar {
        self.min.y()
    }

    /// Width of the bounding box
    #[inline]
    pub fn width(&self) -> Scalar {
        self.max.x() - self.min.x()
    }

    /// Hight of the bounding box
    #[inline]
    pub fn height(&self) -> Scalar {
        self.max.y() - self.min.y()
    }

    /// Determine if the point is inside of the bounding box
    pub fn contains(&self, point: Point) -> bool {
        let Point([x, y]) = point;
        self.min.x() <= x && x <= self.max.x() && self.min.y() <= y && y <= self.max.y()
    }

    /// Extend bounding box so it would contains provided point
    pub fn extend(&self, point: Point) -> Self {
        let Point([x, y]) = point;
        let Point([x0, y0]) = self.min;
        let Point([x1, y1]) = self.max;
        Self {
            min: Point([x0.min(x), y0.min(y)]),
            max: Point([x1.max(x), y1.max(y)]),
        }
    }

    /// Grow bounding box by `margin` in every direction
    pub fn inflate(&self, margin: Scalar) -> Self {
        let margin = Point::new(margin, margin);
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Find bounding box of the intersection of two bounding boxes
    pub fn intersect(&self, other: BBox) -> Option<BBox> {
        let (x_min, x_max) =
            range_intersect(self.min.x(), self.max.x(), other.min.x(), other.max.x())?;
        let (y_min, y_max) =
            range_intersect(self.min.y(), self.max.y(), other.min.y(), other.max.y())?;
        Some(BBox::new(
            Point::new(x_min, y_min),
            Point::new(x_max, y_max),
        ))
    }

    /// Cut the part of the line that lies inside of the bounding box (Liang-Barsky)
    pub fn clip_line(&self, line: Line) -> Option<Line> {
        let [p0, p1] = line.points();
        let d = p1 - p0;
        let mut t0: Scalar = 0.0;
        let mut t1: Scalar = 1.0;
        let edges = [
            (-d.x(), p0.x() - self.min.x()),
            (d.x(), self.max.x() - p0.x()),
            (-d.y(), p0.y() - self.min.y()),
            (d.y(), self.max.y() - p0.y()),
        ];
        for (p, q) in edges {
            if p.abs() < EPSILON {
                // parallel to this edge
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        Some(Line::new(p0 + t0 * d, p0 + t1 * d))
    }
}

/// Find intersection of two ranges
fn range_intersect(
    r0_min: Scalar,
    r0_max: Scalar,
    r1_min: Scalar,
    r1_max: Scalar,
) -> Option<(Scalar, Scalar)> {
    if r0_min > r1_max || r1_min > r0_max {
        None
    } else {
        Some((r0_min.max(r1_min), r0_max.min(r1_max)))
    }
}

impl fmt::Debug for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox x=")?;
        scalar_fmt(f, self.x())?;
        write!(f, ", y=")?;
        scalar_fmt(f, self.y())?;
        write!(f, ", w=")?;
        scalar_fmt(f, self.width())?;
        write!(f, ", h=")?;
        scalar_fmt(f, self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Curve, assert_approx_eq};

    #[test]
    fn test_point_ops() {
        let p = Point::new(3.0, 4.0);
        assert_approx_eq!(p.length(), 5.0);
        assert_approx_eq!(p.dot(Point::new(1.0, 1.0)), 7.0);
        assert_approx_eq!(p.cross(Point::new(1.0, 0.0)), -4.0);

        let r = Point::new(1.0, 0.0).rotate(PI / 2.0);
        assert_approx_eq!(r.x(), 0.0, 1e-12);
        assert_approx_eq!(r.y(), 1.0, 1e-12);

        let a = Point::new(1.0, 0.0).angle_between(Point::new(0.0, -1.0));
        assert_approx_eq!(a.unwrap(), -PI / 2.0, 1e-12);
        assert!(Point::new(0.0, 0.0).angle_between(p).is_none());
        assert!(!Point::new(Scalar::NAN, 1.0).is_finite());
    }

    #[test]
    fn test_bbox() {
        let bbox = BBox::new((4.0, 5.0), (1.0, 2.0));
        assert_approx_eq!(bbox.x(), 1.0);
        assert_approx_eq!(bbox.y(), 2.0);
        assert_approx_eq!(bbox.width(), 3.0);
        assert_approx_eq!(bbox.height(), 3.0);
        assert!(bbox.contains(Point::new(2.0, 3.0)));

        let bbox = bbox.extend(Point::new(10.0, 0.0));
        assert_eq!(bbox.min(), Point::new(1.0, 0.0));
        assert_eq!(bbox.max(), Point::new(10.0, 5.0));

        let other = BBox::new((8.0, 4.0), (20.0, 20.0));
        let inter = bbox.intersect(other).unwrap();
        assert_eq!(inter.min(), Point::new(8.0, 4.0));
        assert_eq!(inter.max(), Point::new(10.0, 5.0));
        assert!(bbox.intersect(BBox::new((30.0, 30.0), (40.0, 40.0))).is_none());
    }

    #[test]
    fn test_clip_line() {
        let bbox = BBox::new((0.0, 0.0), (10.0, 10.0));

        let inside = Line::new((1.0, 1.0), (9.0, 9.0));
        assert_eq!(bbox.clip_line(inside), Some(inside));

        let clipped = bbox.clip_line(Line::new((-10.0, 5.0), (20.0, 5.0))).unwrap();
        assert!(clipped.start().is_close_to(Point::new(0.0, 5.0)));
        assert!(clipped.end().is_close_to(Point::new(10.0, 5.0)));

        let outside = Line::new((-10.0, -1.0), (20.0, -1.0));
        assert!(bbox.clip_line(outside).is_none());

        let far = Line::new((5.0, 5.0), (5.0, 1e12));
        let clipped = bbox.clip_line(far).unwrap();
        assert_approx_eq!(clipped.end().y(), 10.0, 1e-6);
    }
}
