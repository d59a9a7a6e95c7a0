//! Straight segments and bezier curves with fixed-step flattening

use crate::{BBox, Point, Scalar, clamp};
use std::fmt;

/// Set of operations common to all curves.
pub trait Curve: Sized {
    /// Point at which curve starts
    fn start(&self) -> Point;

    /// Point at which curve ends
    fn end(&self) -> Point;

    /// Evaluate curve at parameter value `t` in (0.0..=1.0)
    fn at(&self, t: Scalar) -> Point;

    /// Convert curve to an iterator over `steps` line segments, sampled at
    /// equally spaced parameter values.
    ///
    /// Lines are chained, first one starts at `start()` and last one ends
    /// exactly at `end()`.
    fn flatten(&self, steps: usize) -> CurveFlattenIter<'_, Self> {
        CurveFlattenIter {
            curve: self,
            steps: steps.max(1),
            step: 0,
            prev: self.start(),
        }
    }
}

pub struct CurveFlattenIter<'a, C> {
    curve: &'a C,
    steps: usize,
    step: usize,
    prev: Point,
}

impl<C: Curve> Iterator for CurveFlattenIter<'_, C> {
    type Item = Line;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.steps {
            return None;
        }
        self.step += 1;
        let p = if self.step == self.steps {
            self.curve.end()
        } else {
            self.curve.at(self.step as Scalar / self.steps as Scalar)
        };
        let line = Line::new(self.prev, p);
        self.prev = p;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.steps - self.step;
        (size, Some(size))
    }
}

// -----------------------------------------------------------------------------
// Line
// -----------------------------------------------------------------------------

/// Line segment curve
#[derive(Clone, Copy, PartialEq)]
pub struct Line(pub [Point; 2]);

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Line([p0, p1]) = self;
        write!(f, "Line {:?} {:?}", p0, p1)
    }
}

impl Line {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into()])
    }

    /// Start and end points of the line
    pub fn points(&self) -> [Point; 2] {
        self.0
    }

    /// Direction vector of the line
    pub fn direction(&self) -> Point {
        let Self([p0, p1]) = self;
        *p1 - *p0
    }

    /// Both ends of the line are finite
    pub fn is_finite(&self) -> bool {
        let Self([p0, p1]) = self;
        p0.is_finite() && p1.is_finite()
    }

    /// Shortest distance from the point to the line segment
    pub fn distance(&self, point: Point) -> Scalar {
        let Self([p0, _]) = self;
        let dir = self.direction();
        let len2 = dir.dot(dir);
        if len2 == 0.0 {
            return point.dist(*p0);
        }
        let t = clamp((point - *p0).dot(dir) / len2, 0.0, 1.0);
        point.dist(*p0 + t * dir)
    }

    /// Extend provided `init` bounding box with the bounding box of the line
    pub fn bbox(&self, init: Option<BBox>) -> BBox {
        let Self([p0, p1]) = *self;
        match init {
            None => BBox::new(p0, p1),
            Some(bbox) => bbox.extend(p0).extend(p1),
        }
    }
}

impl Curve for Line {
    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[1]
    }

    fn at(&self, t: Scalar) -> Point {
        let Self([p0, p1]) = self;
        (1.0 - t) * *p0 + t * *p1
    }
}

// -----------------------------------------------------------------------------
// Quadratic bezier curve
// -----------------------------------------------------------------------------

/// Quadratic bezier curve
#[derive(Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 3]);

impl fmt::Debug for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Quad([p0, p1, p2]) = self;
        write!(f, "Quad {:?} {:?} {:?}", p0, p1, p2)
    }
}

impl Quad {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into(), p2.into()])
    }

    pub fn points(&self) -> [Point; 3] {
        self.0
    }

    /// Find smooth point used by SVG parser
    pub fn smooth(&self) -> Point {
        let Quad([_p0, p1, p2]) = self;
        2.0 * *p2 - *p1
    }
}

impl Curve for Quad {
    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[2]
    }

    fn at(&self, t: Scalar) -> Point {
        let Self([p0, p1, p2]) = self;
        let t1 = 1.0 - t;
        (t1 * t1) * *p0 + (2.0 * t1 * t) * *p1 + (t * t) * *p2
    }
}

// -----------------------------------------------------------------------------
// Cubic bezier curve
// -----------------------------------------------------------------------------

/// Cubic bezier curve
#[derive(Clone, Copy, PartialEq)]
pub struct Cubic(pub [Point; 4]);

impl fmt::Debug for Cubic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Cubic([p0, p1, p2, p3]) = self;
        write!(f, "Cubic {:?} {:?} {:?} {:?}", p0, p1, p2, p3)
    }
}

impl Cubic {
    pub fn new(
        p0: impl Into<Point>,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> Self {
        Self([p0.into(), p1.into(), p2.into(), p3.into()])
    }

    pub fn points(&self) -> [Point; 4] {
        self.0
    }

    /// Find smooth point used by SVG parser
    pub fn smooth(&self) -> Point {
        let Cubic([_p0, _p1, p2, p3]) = self;
        2.0 * *p3 - *p2
    }
}

impl Curve for Cubic {
    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[3]
    }

    fn at(&self, t: Scalar) -> Point {
        let Self([p0, p1, p2, p3]) = self;
        let t1 = 1.0 - t;
        (t1 * t1 * t1) * *p0
            + (3.0 * t1 * t1 * t) * *p1
            + (3.0 * t1 * t * t) * *p2
            + (t * t * t) * *p3
    }
}
