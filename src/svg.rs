//! SVG path data interpreter
//!
//! See [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)
use crate::{Cubic, PathBuilder, Point, Quad, Scalar};
use std::fmt;

/// Possible SVG path commands, all coordinates are absolute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    ArcTo {
        radii: Point,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        dst: Point,
    },
    Close(Point),
}

impl PathCmd {
    /// Get destination point of the SVG command
    pub fn dst(&self) -> Point {
        use PathCmd::*;
        *match self {
            MoveTo(dst) => dst,
            LineTo(dst) => dst,
            QuadTo(_, dst) => dst,
            CubicTo(_, _, dst) => dst,
            ArcTo { dst, .. } => dst,
            Close(dst) => dst,
        }
    }

    /// Apply SVG command to path builder
    pub fn apply(&self, builder: &mut PathBuilder) {
        use PathCmd::*;
        match *self {
            MoveTo(p) => builder.move_to(p),
            LineTo(p) => builder.line_to(p),
            QuadTo(p1, p2) => builder.quad_to(p1, p2),
            CubicTo(p1, p2, p3) => builder.cubic_to(p1, p2, p3),
            Close(_) => builder.close(),
            ArcTo {
                radii,
                x_axis_rot,
                large,
                sweep,
                dst,
            } => builder.arc_to(radii, x_axis_rot, large, sweep, dst),
        };
    }
}

/// Error while interpreting SVG path data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Malformed path data, `offset` is a byte offset of the offending token
    Syntax { offset: usize, reason: String },
    /// Well formed command which is not supported (SVG 2 `B` and `R` commands)
    UnsupportedCommand { offset: usize, cmd: char },
}

impl PathError {
    /// Byte offset in the path data at which error was detected
    pub fn offset(&self) -> usize {
        match self {
            PathError::Syntax { offset, .. } => *offset,
            PathError::UnsupportedCommand { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Syntax { offset, reason } => {
                write!(f, "path syntax error at offset {}: {}", offset, reason)
            }
            PathError::UnsupportedCommand { offset, cmd } => {
                write!(f, "unsupported path command '{}' at offset {}", cmd, offset)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Byte level scanner shared by path data and number list parsers
struct Parser<'a> {
    text: &'a [u8],
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            offset: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.offset).copied()
    }

    fn is_eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    fn error(&self, offset: usize, reason: impl Into<String>) -> PathError {
        PathError::Syntax {
            offset,
            reason: reason.into(),
        }
    }

    // consume input while `pred` predicate is true, returns number of consumed bytes
    fn parse_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.offset;
        while self.peek().is_some_and(&pred) {
            self.offset += 1;
        }
        self.offset - start
    }

    // consume at most one byte from the input, if predicate returns true
    fn parse_once(&mut self, pred: impl FnOnce(u8) -> bool) -> bool {
        match self.peek() {
            Some(byte) if pred(byte) => {
                self.offset += 1;
                true
            }
            _ => false,
        }
    }

    // consume separators from the input
    fn parse_separators(&mut self) {
        self.parse_while(|byte| matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b'\x0c' | b','));
    }

    // parse single scalar value from the input
    fn parse_scalar(&mut self) -> Result<Scalar, PathError> {
        self.parse_separators();
        let start = self.offset;
        if self.is_eof() {
            return Err(self.error(start, "unexpected end of path data, number expected"));
        }

        let sign = self.parse_once(|byte| matches!(byte, b'-' | b'+'));
        let whole = self.parse_while(|byte| byte.is_ascii_digit());
        let frac = if self.parse_once(|byte| byte == b'.') {
            self.parse_while(|byte| byte.is_ascii_digit())
        } else {
            0
        };
        if whole + frac == 0 {
            return Err(self.error(start, "number expected"));
        }
        if self.parse_once(|byte| matches!(byte, b'e' | b'E')) {
            self.parse_once(|byte| matches!(byte, b'-' | b'+'));
            if self.parse_while(|byte| byte.is_ascii_digit()) == 0 {
                return Err(self.error(start, "malformed number exponent"));
            }
        }

        // leading `+` is dropped, token is otherwise a valid float literal
        let digits = match self.text[start] {
            b'+' if sign => &self.text[start + 1..self.offset],
            _ => &self.text[start..self.offset],
        };
        let value: Scalar =
            lexical_core::parse(digits).map_err(|_| self.error(start, "malformed number"))?;
        if !value.is_finite() {
            return Err(self.error(start, "number is out of range"));
        }
        Ok(value)
    }

    // parse flag `0|1` used by elliptic arc command
    fn parse_flag(&mut self) -> Result<bool, PathError> {
        self.parse_separators();
        let offset = self.offset;
        match self.peek() {
            Some(b'0') => {
                self.offset += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.offset += 1;
                Ok(true)
            }
            None => Err(self.error(offset, "unexpected end of path data, flag expected")),
            Some(_) => Err(self.error(offset, "arc flag must be either 0 or 1")),
        }
    }
}

/// Path parser for SVG encoded path
///
/// Yields commands with absolute coordinates. Iteration stops after the first error.
pub struct SvgPathParser<'a> {
    parser: Parser<'a>,
    // previous operation
    prev_op: Option<u8>,
    // previous command (used to determine smooth points)
    prev_cmd: Option<PathCmd>,
    // position at which previous command started
    prev_start: Point,
    // current position from which next relative curve will start
    position: Point,
    // current sub-path starting position
    subpath_start: Point,
    // set once error is reported
    failed: bool,
}

impl<'a> SvgPathParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            parser: Parser::new(text),
            prev_op: None,
            prev_cmd: None,
            prev_start: Point::new(0.0, 0.0),
            position: Point::new(0.0, 0.0),
            subpath_start: Point::new(0.0, 0.0),
            failed: false,
        }
    }

    // parse pair of scalars and convert it to a point
    fn parse_point(&mut self, relative: bool) -> Result<Point, PathError> {
        let point = Point::new(self.parser.parse_scalar()?, self.parser.parse_scalar()?);
        if relative {
            Ok(point + self.position)
        } else {
            Ok(point)
        }
    }

    // parse svg command, none indicates end of input
    fn parse_op(&mut self) -> Result<Option<u8>, PathError> {
        let offset = self.parser.offset;
        let op = match self.parser.peek() {
            None => return Ok(None),
            Some(op) => op,
        };
        match op {
            b'M' | b'm' | b'L' | b'l' | b'V' | b'v' | b'H' | b'h' | b'C' | b'c' | b'S' | b's'
            | b'Q' | b'q' | b'T' | b't' | b'A' | b'a' | b'Z' | b'z' => {
                if self.prev_cmd.is_none() && !matches!(op, b'M' | b'm') {
                    return Err(self
                        .parser
                        .error(offset, "path data must start with a moveto command"));
                }
                self.parser.offset += 1;
                self.prev_op = match op {
                    b'm' => Some(b'l'),
                    b'M' => Some(b'L'),
                    b'Z' | b'z' => None,
                    _ => Some(op),
                };
                Ok(Some(op))
            }
            b'B' | b'b' | b'R' | b'r' => Err(PathError::UnsupportedCommand {
                offset,
                cmd: op as char,
            }),
            _ if op.is_ascii_alphabetic() => Err(self
                .parser
                .error(offset, format!("unknown path command '{}'", op as char))),
            _ => match self.prev_op {
                Some(op) => Ok(Some(op)),
                None if self.prev_cmd.is_none() => Err(self
                    .parser
                    .error(offset, "path data must start with a moveto command")),
                None => Err(self.parser.error(offset, "path command expected")),
            },
        }
    }

    /// Parse single SVG path command from the input
    pub fn parse_cmd(&mut self) -> Result<Option<PathCmd>, PathError> {
        self.parser.parse_separators();
        let op = match self.parse_op()? {
            None => return Ok(None),
            Some(op) => op,
        };
        let relative = op.is_ascii_lowercase();
        let cmd = match op {
            b'M' | b'm' => {
                let dst = self.parse_point(relative)?;
                self.subpath_start = dst;
                PathCmd::MoveTo(dst)
            }
            b'L' | b'l' => PathCmd::LineTo(self.parse_point(relative)?),
            b'V' | b'v' => {
                let y = self.parser.parse_scalar()?;
                let p0 = self.position;
                let p1 = if relative {
                    Point::new(p0.x(), p0.y() + y)
                } else {
                    Point::new(p0.x(), y)
                };
                PathCmd::LineTo(p1)
            }
            b'H' | b'h' => {
                let x = self.parser.parse_scalar()?;
                let p0 = self.position;
                let p1 = if relative {
                    Point::new(p0.x() + x, p0.y())
                } else {
                    Point::new(x, p0.y())
                };
                PathCmd::LineTo(p1)
            }
            b'Q' | b'q' => {
                let p1 = self.parse_point(relative)?;
                let p2 = self.parse_point(relative)?;
                PathCmd::QuadTo(p1, p2)
            }
            b'T' | b't' => {
                let p1 = match self.prev_cmd {
                    Some(PathCmd::QuadTo(p1, p2)) => Quad::new(self.prev_start, p1, p2).smooth(),
                    _ => self.position,
                };
                let p2 = self.parse_point(relative)?;
                PathCmd::QuadTo(p1, p2)
            }
            b'C' | b'c' => {
                let p1 = self.parse_point(relative)?;
                let p2 = self.parse_point(relative)?;
                let p3 = self.parse_point(relative)?;
                PathCmd::CubicTo(p1, p2, p3)
            }
            b'S' | b's' => {
                let p1 = match self.prev_cmd {
                    Some(PathCmd::CubicTo(p1, p2, p3)) => {
                        Cubic::new(self.prev_start, p1, p2, p3).smooth()
                    }
                    _ => self.position,
                };
                let p2 = self.parse_point(relative)?;
                let p3 = self.parse_point(relative)?;
                PathCmd::CubicTo(p1, p2, p3)
            }
            b'A' | b'a' => {
                let rx = self.parser.parse_scalar()?;
                let ry = self.parser.parse_scalar()?;
                let x_axis_rot = self.parser.parse_scalar()?;
                let large = self.parser.parse_flag()?;
                let sweep = self.parser.parse_flag()?;
                let dst = self.parse_point(relative)?;
                PathCmd::ArcTo {
                    radii: Point::new(rx.abs(), ry.abs()),
                    x_axis_rot,
                    large,
                    sweep,
                    dst,
                }
            }
            _ => PathCmd::Close(self.subpath_start),
        };
        self.prev_start = self.position;
        self.position = cmd.dst();
        self.prev_cmd = Some(cmd);
        Ok(Some(cmd))
    }
}

impl Iterator for SvgPathParser<'_> {
    type Item = Result<PathCmd, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.parse_cmd().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}

/// Parse list of numbers separated by whitespace and/or commas (as used by `points`)
pub fn parse_scalars(text: &str) -> Result<Vec<Scalar>, PathError> {
    let mut parser = Parser::new(text);
    let mut values = Vec::new();
    loop {
        parser.parse_separators();
        if parser.is_eof() {
            break;
        }
        values.push(parser.parse_scalar()?);
    }
    Ok(values)
}

/// Parse single length value with an optional `px` unit suffix
pub fn parse_length(text: &str) -> Result<Scalar, PathError> {
    let mut parser = Parser::new(text.trim());
    let value = parser.parse_scalar()?;
    let rest = &parser.text[parser.offset..];
    if rest.is_empty() || rest == b"px" {
        Ok(value)
    } else {
        Err(parser.error(parser.offset, "unexpected trailing characters"))
    }
}
