use crate::{BBox, Cubic, Curve, EllipArc, Line, PathError, Point, Quad, Scalar, SvgPathParser};
use std::{fmt, str::FromStr};

/// Number of straight segments each curve of a path is flattened into
pub const DEFAULT_CURVE_SEGMENTS: usize = 24;

/// Number of straight segments used to approximate circles and ellipses
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 64;

/// Rule used to decide which parts of the path are inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FillRule {
    NonZero,
    #[default]
    EvenOdd,
}

/// Chain of straight segments where end of each segment coincides with the start of the next one.
///
/// Closed sub-path stores its closing segment explicitly as the last segment.
#[derive(Clone, PartialEq)]
pub struct SubPath {
    /// Point where sub-path starts (set by move-to)
    start: Point,
    /// List of segments representing SubPath
    segments: Vec<Line>,
    /// Whether SubPath was closed, last segment ends at the `start`
    closed: bool,
}

impl fmt::Debug for SubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Move {:?}", self.start)?;
        for segment in self.segments.iter() {
            writeln!(f, "{:?}", segment)?;
        }
        if self.closed {
            writeln!(f, "Close")?;
        } else {
            writeln!(f, "End")?
        }
        Ok(())
    }
}

impl SubPath {
    pub fn new(start: impl Into<Point>, segments: Vec<Line>, closed: bool) -> Self {
        Self {
            start: start.into(),
            segments,
            closed,
        }
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn segments(&self) -> &[Line] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.segments.last().map_or(self.start, |line| line.end())
    }

    /// Lines bounding filled area, open sub-path is implicitly closed
    pub fn fill_lines(&self) -> impl Iterator<Item = Line> + '_ {
        let close = if !self.closed && !self.segments.is_empty() {
            Some(Line::new(self.end(), self.start))
        } else {
            None
        };
        self.segments.iter().copied().chain(close)
    }

    pub fn bbox(&self, init: Option<BBox>) -> Option<BBox> {
        self.segments
            .iter()
            .fold(init, |bbox, line| Some(line.bbox(bbox)))
    }
}

/// Collection of the SubPath treated as a single unit
#[derive(Clone, PartialEq, Default)]
pub struct Path {
    subpaths: Vec<SubPath>,
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subpaths.is_empty() {
            write!(f, "Empty")?;
        } else {
            for subpath in self.subpaths.iter() {
                subpath.fmt(f)?
            }
        }
        Ok(())
    }
}

impl Path {
    /// Create path from the list of subpaths
    pub fn new(subpaths: Vec<SubPath>) -> Self {
        Self { subpaths }
    }

    pub fn empty() -> Self {
        Self {
            subpaths: Default::default(),
        }
    }

    /// Parse SVG path data, flattening every curve into `curve_segments` lines
    pub fn from_svg(text: &str, curve_segments: usize) -> Result<Self, PathError> {
        let builder = PathBuilder::with_curve_segments(curve_segments);
        let mut builder = SvgPathParser::new(text).try_fold(builder, |mut builder, cmd| {
            cmd?.apply(&mut builder);
            Ok::<_, PathError>(builder)
        })?;
        Ok(builder.build())
    }

    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    /// Convenience method to create `PathBuilder`
    pub fn builder() -> PathBuilder {
        PathBuilder::new()
    }

    /// Number of segments in the path
    pub fn segments_count(&self) -> usize {
        self.subpaths
            .iter()
            .map(|subpath| subpath.segments().len())
            .sum()
    }

    /// Path does not contain any segments
    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(SubPath::is_empty)
    }

    /// Iterator over all segments of all sub-paths
    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.subpaths
            .iter()
            .flat_map(|subpath| subpath.segments().iter().copied())
    }

    /// Lines bounding filled area of the path (open sub-paths are closed)
    pub fn fill_lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.subpaths.iter().flat_map(SubPath::fill_lines)
    }

    /// Bounding box of all segments, `None` for an empty path
    pub fn bbox(&self) -> Option<BBox> {
        self.subpaths
            .iter()
            .fold(None, |bbox, subpath| subpath.bbox(bbox))
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Path, Self::Err> {
        Path::from_svg(text, DEFAULT_CURVE_SEGMENTS)
    }
}

impl IntoIterator for Path {
    type Item = SubPath;
    type IntoIter = <Vec<SubPath> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.subpaths.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a SubPath;
    type IntoIter = <&'a Vec<SubPath> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.subpaths.iter()
    }
}

impl Extend<SubPath> for Path {
    fn extend<T: IntoIterator<Item = SubPath>>(&mut self, iter: T) {
        self.subpaths.extend(iter)
    }
}

/// Path builder similar to Canvas/Cairo interface.
///
/// Curves are flattened into straight segments as soon as they are added.
#[derive(Clone)]
pub struct PathBuilder {
    curve_segments: usize,
    position: Point,
    // start of the last sub-path, drawing after close continues from here
    subpath_start: Point,
    // currently open sub-path
    subpath: Option<Vec<Line>>,
    subpaths: Vec<SubPath>,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::with_curve_segments(DEFAULT_CURVE_SEGMENTS)
    }

    /// Builder that flattens each curve into `curve_segments` lines
    pub fn with_curve_segments(curve_segments: usize) -> Self {
        Self {
            curve_segments: curve_segments.max(1),
            position: Point::new(0.0, 0.0),
            subpath_start: Point::new(0.0, 0.0),
            subpath: None,
            subpaths: Vec::new(),
        }
    }

    /// Build path
    pub fn build(&mut self) -> Path {
        self.finish_subpath();
        let subpaths = std::mem::take(&mut self.subpaths);
        self.position = Point::new(0.0, 0.0);
        self.subpath_start = self.position;
        Path::new(subpaths)
    }

    // move currently open sub-path (if any) into the list of finished sub-paths
    fn finish_subpath(&mut self) {
        if let Some(segments) = self.subpath.take() {
            self.subpaths
                .push(SubPath::new(self.subpath_start, segments, false));
        }
    }

    // currently open sub-path, new one is started at the last sub-path start if needed
    //
    // position is always equal to `subpath_start` while no sub-path is open
    fn open_subpath(&mut self) -> &mut Vec<Line> {
        self.subpath.get_or_insert_with(Vec::new)
    }

    // add flattened curve ending exactly at `dst`
    fn push_curve(&mut self, curve: &impl Curve, dst: Point) -> &mut Self {
        let steps = self.curve_segments;
        let src = self.position;
        let segments = self.open_subpath();
        let offset = segments.len();
        segments.extend(curve.flatten(steps));
        if let Some(first) = segments.get_mut(offset) {
            first.0[0] = src;
        }
        if let Some(last) = segments.last_mut() {
            last.0[1] = dst;
        }
        self.position = dst;
        self
    }

    /// Move current position, starting new sub-path
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.finish_subpath();
        let p = p.into();
        self.position = p;
        self.subpath_start = p;
        self.subpath = Some(Vec::new());
        self
    }

    /// Close current subpath
    ///
    /// Closing segment is always added, even if it has zero length. Closing
    /// without open sub-path does nothing.
    pub fn close(&mut self) -> &mut Self {
        if let Some(mut segments) = self.subpath.take() {
            segments.push(Line::new(self.position, self.subpath_start));
            self.subpaths
                .push(SubPath::new(self.subpath_start, segments, true));
            self.position = self.subpath_start;
        }
        self
    }

    /// Add line from the current position to the specified point
    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        let p = p.into();
        let src = self.position;
        self.open_subpath().push(Line::new(src, p));
        self.position = p;
        self
    }

    /// Add quadratic bezier curve
    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) -> &mut Self {
        let quad = Quad::new(self.position, p1, p2);
        self.push_curve(&quad, quad.end())
    }

    /// Add cubic beizer curve
    pub fn cubic_to(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> &mut Self {
        let cubic = Cubic::new(self.position, p1, p2, p3);
        self.push_curve(&cubic, cubic.end())
    }

    /// Add elliptic arc segment
    pub fn arc_to(
        &mut self,
        radii: impl Into<Point>,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        p: impl Into<Point>,
    ) -> &mut Self {
        let radii: Point = radii.into();
        let p = p.into();
        let arc = EllipArc::new_param(
            self.position,
            p,
            radii.x(),
            radii.y(),
            x_axis_rot,
            large,
            sweep,
        );
        match arc {
            None => self.line_to(p),
            Some(arc) => self.push_curve(&arc, p),
        }
    }

    /// Add closed axis aligned ellipse approximated by `steps` segments.
    ///
    /// Current position is moved to the first point of the ellipse.
    pub fn ellipse(
        &mut self,
        center: impl Into<Point>,
        rx: Scalar,
        ry: Scalar,
        steps: usize,
    ) -> &mut Self {
        let arc = EllipArc::full(center, rx, ry);
        let steps = steps.max(3);
        self.move_to(arc.start());
        for step in 1..steps {
            self.line_to(arc.at(step as Scalar / steps as Scalar));
        }
        self.close()
    }

    /// Current position of the builder
    pub fn position(&self) -> Point {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_path_parse_closed() -> Result<(), PathError> {
        let path: Path = "M 0 0 L 10 0 L 10 10 Z".parse()?;
        assert_eq!(path.subpaths().len(), 1);
        let subpath = &path.subpaths()[0];
        assert!(subpath.closed());
        assert_eq!(subpath.segments().len(), 3);
        assert_eq!(subpath.end(), subpath.start());

        let reference = Path::new(vec![SubPath::new(
            (0.0, 0.0),
            vec![
                Line::new((0.0, 0.0), (10.0, 0.0)),
                Line::new((10.0, 0.0), (10.0, 10.0)),
                Line::new((10.0, 10.0), (0.0, 0.0)),
            ],
            true,
        )]);
        assert_eq!(format!("{:?}", path), format!("{:?}", reference));
        Ok(())
    }

    #[test]
    fn test_move_line_close_counts() -> Result<(), PathError> {
        let cases = [
            ("M0,0 L1,1", &[(1, false)][..]),
            ("M0 0 1 1 2 2 Z M5 5 L6 6", &[(3, true), (1, false)][..]),
            ("M0 0 M1 1 L2 2 L3 3 z", &[(0, false), (3, true)][..]),
            ("M4 4 Z", &[(1, true)][..]),
            ("M0 0 L0 0 L0 0", &[(2, false)][..]),
        ];
        for (text, expected) in cases {
            let path: Path = text.parse()?;
            let counts: Vec<_> = path
                .subpaths()
                .iter()
                .map(|subpath| (subpath.segments().len(), subpath.closed()))
                .collect();
            assert_eq!(counts, expected, "{}", text);
        }
        Ok(())
    }

    #[test]
    fn test_draw_after_close() {
        let path = Path::builder()
            .move_to((1.0, 1.0))
            .line_to((5.0, 1.0))
            .close()
            .line_to((1.0, 5.0))
            .close()
            .close()
            .build();
        assert_eq!(path.subpaths().len(), 2);
        let second = &path.subpaths()[1];
        assert_eq!(second.start(), Point::new(1.0, 1.0));
        assert_eq!(second.segments()[0].start(), Point::new(1.0, 1.0));
        assert!(second.closed());
    }

    #[test]
    fn test_chained_segments() -> Result<(), PathError> {
        let path = Path::from_svg(
            "M10 10 C 20 0 30 0 40 10 Q 50 20 40 30 A 5 5 0 0 1 30 30 H 10 V 10",
            16,
        )?;
        assert_eq!(path.subpaths().len(), 1);
        let subpath = &path.subpaths()[0];
        assert_eq!(subpath.segments().len(), 16 + 16 + 16 + 2);
        assert_eq!(subpath.segments()[0].start(), subpath.start());
        for ls in subpath.segments().windows(2) {
            assert_eq!(ls[0].end(), ls[1].start());
        }
        assert_eq!(subpath.end(), Point::new(10.0, 10.0));
        Ok(())
    }

    #[test]
    fn test_ellipse_builder() {
        let path = Path::builder()
            .ellipse((50.0, 50.0), 30.0, 30.0, 32)
            .build();
        assert_eq!(path.subpaths().len(), 1);
        let subpath = &path.subpaths()[0];
        assert!(subpath.closed());
        assert_eq!(subpath.segments().len(), 32);
        for line in subpath.segments() {
            assert_approx_eq!(line.start().dist(Point::new(50.0, 50.0)), 30.0, 1e-9);
        }
        let bbox = path.bbox().unwrap();
        assert_approx_eq!(bbox.width(), 60.0, 1e-9);
    }

    #[test]
    fn test_fill_lines_close_open_subpaths() {
        let path = Path::builder()
            .move_to((0.0, 0.0))
            .line_to((4.0, 0.0))
            .line_to((4.0, 4.0))
            .move_to((10.0, 10.0))
            .build();
        let lines: Vec<_> = path.fill_lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], Line::new((4.0, 4.0), (0.0, 0.0)));
        assert_eq!(path.lines().count(), 2);
        assert_eq!(path.segments_count(), 2);
        assert!(!path.is_empty());
        assert!(Path::empty().is_empty());
        assert!(Path::empty().bbox().is_none());
    }
}
