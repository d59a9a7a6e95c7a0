//! Shape elements and their normalization into paths
use crate::{
    Color, ColorError, FillRule, Path, PathBuilder, PathError, Point, RGBA, RenderOptions, Scalar,
    parse_length, parse_scalars,
};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    hash::Hash,
};

/// Circles and ellipses are never approximated with fewer segments
const MIN_CIRCLE_SEGMENTS: usize = 32;

/// Read only access to the attributes of an element
pub trait Attributes {
    /// Value of the attribute, `None` if it is not set
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl<A: Attributes + ?Sized> Attributes for &A {
    fn attribute(&self, name: &str) -> Option<&str> {
        (**self).attribute(name)
    }
}

impl<K, V> Attributes for HashMap<K, V>
where
    K: std::borrow::Borrow<str> + Hash + Eq,
    V: AsRef<str>,
{
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> Attributes for BTreeMap<K, V>
where
    K: std::borrow::Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> Attributes for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn attribute(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    }
}

/// Error which causes a single shape to be dropped
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Malformed path data
    PathSyntax { offset: usize, reason: String },
    /// Path data uses a command which is not supported
    UnsupportedCommand { offset: usize, cmd: char },
    /// Required geometry attribute is absent
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// Color name is not known
    UnknownColor {
        attribute: &'static str,
        value: String,
    },
    /// Attribute is present but its value is not acceptable
    InvalidAttribute {
        attribute: &'static str,
        value: String,
        reason: String,
    },
}

impl ShapeError {
    fn invalid(attribute: &'static str, value: &str, reason: impl fmt::Display) -> Self {
        ShapeError::InvalidAttribute {
            attribute,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ShapeError::*;
        match self {
            PathSyntax { offset, reason } => {
                write!(f, "path syntax error at offset {}: {}", offset, reason)
            }
            UnsupportedCommand { offset, cmd } => {
                write!(f, "unsupported path command '{}' at offset {}", cmd, offset)
            }
            MissingAttribute { element, attribute } => {
                write!(f, "<{}> is missing required attribute `{}`", element, attribute)
            }
            UnknownColor { attribute, value } => {
                write!(f, "unknown color `{}` in `{}`", value, attribute)
            }
            InvalidAttribute {
                attribute,
                value,
                reason,
            } => write!(f, "invalid `{}` value `{}`: {}", attribute, value, reason),
        }
    }
}

impl std::error::Error for ShapeError {}

impl From<PathError> for ShapeError {
    fn from(error: PathError) -> Self {
        match error {
            PathError::Syntax { offset, reason } => ShapeError::PathSyntax { offset, reason },
            PathError::UnsupportedCommand { offset, cmd } => {
                ShapeError::UnsupportedCommand { offset, cmd }
            }
        }
    }
}

/// Drawable element with validated geometry attributes
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Rect {
        x: Scalar,
        y: Scalar,
        width: Scalar,
        height: Scalar,
    },
    Circle {
        center: Point,
        r: Scalar,
    },
    Ellipse {
        center: Point,
        rx: Scalar,
        ry: Scalar,
    },
    Line {
        p0: Point,
        p1: Point,
    },
    Polyline {
        points: Vec<Point>,
    },
    Polygon {
        points: Vec<Point>,
    },
    Path {
        data: String,
    },
}

impl Element {
    /// Create element from its tag name and attributes
    ///
    /// Returns `Ok(None)` for tags which are not drawable.
    pub fn from_attributes(
        tag: &str,
        attrs: &(impl Attributes + ?Sized),
    ) -> Result<Option<Self>, ShapeError> {
        let element = match tag {
            "rect" => Element::Rect {
                x: number(attrs, "rect", "x")?,
                y: number(attrs, "rect", "y")?,
                width: size(attrs, "rect", "width")?,
                height: size(attrs, "rect", "height")?,
            },
            "circle" => Element::Circle {
                center: Point::new(number(attrs, "circle", "cx")?, number(attrs, "circle", "cy")?),
                r: size(attrs, "circle", "r")?,
            },
            "ellipse" => Element::Ellipse {
                center: Point::new(
                    number(attrs, "ellipse", "cx")?,
                    number(attrs, "ellipse", "cy")?,
                ),
                rx: size(attrs, "ellipse", "rx")?,
                ry: size(attrs, "ellipse", "ry")?,
            },
            "line" => Element::Line {
                p0: Point::new(number(attrs, "line", "x1")?, number(attrs, "line", "y1")?),
                p1: Point::new(number(attrs, "line", "x2")?, number(attrs, "line", "y2")?),
            },
            "polyline" => Element::Polyline {
                points: points(attrs, "polyline")?,
            },
            "polygon" => Element::Polygon {
                points: points(attrs, "polygon")?,
            },
            "path" => Element::Path {
                data: required(attrs, "path", "d")?.to_owned(),
            },
            _ => return Ok(None),
        };
        Ok(Some(element))
    }

    /// Tag name of the element
    pub fn tag(&self) -> &'static str {
        match self {
            Element::Rect { .. } => "rect",
            Element::Circle { .. } => "circle",
            Element::Ellipse { .. } => "ellipse",
            Element::Line { .. } => "line",
            Element::Polyline { .. } => "polyline",
            Element::Polygon { .. } => "polygon",
            Element::Path { .. } => "path",
        }
    }

    /// Convert element geometry into a flattened path
    pub fn normalize(&self, options: &RenderOptions) -> Result<Path, ShapeError> {
        let mut builder = PathBuilder::with_curve_segments(options.curve_segments);
        let circle_segments = options.circle_segments.max(MIN_CIRCLE_SEGMENTS);
        match self {
            Element::Rect {
                x,
                y,
                width,
                height,
            } => {
                if *width == 0.0 || *height == 0.0 {
                    return Ok(Path::empty());
                }
                builder
                    .move_to((*x, *y))
                    .line_to((x + width, *y))
                    .line_to((x + width, y + height))
                    .line_to((*x, y + height))
                    .close();
            }
            Element::Circle { center, r } => {
                if *r == 0.0 {
                    return Ok(Path::empty());
                }
                builder.ellipse(*center, *r, *r, circle_segments);
            }
            Element::Ellipse { center, rx, ry } => {
                if *rx == 0.0 || *ry == 0.0 {
                    return Ok(Path::empty());
                }
                builder.ellipse(*center, *rx, *ry, circle_segments);
            }
            Element::Line { p0, p1 } => {
                builder.move_to(*p0).line_to(*p1);
            }
            Element::Polyline { points } | Element::Polygon { points } => {
                if let Some((first, rest)) = points.split_first() {
                    builder.move_to(*first);
                    for point in rest {
                        builder.line_to(*point);
                    }
                    if matches!(self, Element::Polygon { .. }) {
                        builder.close();
                    }
                }
            }
            Element::Path { data } => return Ok(Path::from_svg(data, options.curve_segments)?),
        }
        Ok(builder.build())
    }
}

// value of the required attribute
fn required<'a, A: Attributes + ?Sized>(
    attrs: &'a A,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ShapeError> {
    attrs
        .attribute(attribute)
        .ok_or(ShapeError::MissingAttribute { element, attribute })
}

// required coordinate, optionally suffixed with `px`
fn number<A: Attributes + ?Sized>(
    attrs: &A,
    element: &'static str,
    attribute: &'static str,
) -> Result<Scalar, ShapeError> {
    let value = required(attrs, element, attribute)?;
    parse_length(value).map_err(|error| ShapeError::invalid(attribute, value, error))
}

// required non-negative length
fn size<A: Attributes + ?Sized>(
    attrs: &A,
    element: &'static str,
    attribute: &'static str,
) -> Result<Scalar, ShapeError> {
    let size = number(attrs, element, attribute)?;
    if size < 0.0 {
        let value = attrs.attribute(attribute).unwrap_or_default();
        return Err(ShapeError::invalid(attribute, value, "must not be negative"));
    }
    Ok(size)
}

// list of coordinate pairs
fn points<A: Attributes + ?Sized>(
    attrs: &A,
    element: &'static str,
) -> Result<Vec<Point>, ShapeError> {
    let value = required(attrs, element, "points")?;
    let coords = parse_scalars(value).map_err(|error| ShapeError::invalid("points", value, error))?;
    if coords.len() % 2 != 0 {
        return Err(ShapeError::invalid(
            "points",
            value,
            "odd number of coordinates",
        ));
    }
    Ok(coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

/// Paint related attributes of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Fill color, `None` disables fill
    pub fill: Option<RGBA>,
    /// Stroke color, `None` disables stroke
    pub stroke: Option<RGBA>,
    /// Full width of the stroke
    pub stroke_width: Scalar,
    /// Fill rule, `None` means the renderer default is used
    pub fill_rule: Option<FillRule>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Some(RGBA::BLACK),
            stroke: None,
            stroke_width: 1.0,
            fill_rule: None,
        }
    }
}

impl Style {
    /// Style which paints nothing
    pub fn none() -> Self {
        Self {
            fill: None,
            stroke: None,
            ..Self::default()
        }
    }

    /// Resolve style from the element attributes, absent attributes take default values
    pub fn from_attributes(attrs: &(impl Attributes + ?Sized)) -> Result<Self, ShapeError> {
        let default = Self::default();
        let opacity = parse_opacity(attrs, "opacity")?;
        let fill_opacity = opacity * parse_opacity(attrs, "fill-opacity")?;
        let stroke_opacity = opacity * parse_opacity(attrs, "stroke-opacity")?;
        let fill = paint(attrs, "fill", default.fill)?.map(|color| color.with_alpha(fill_opacity));
        let stroke =
            paint(attrs, "stroke", default.stroke)?.map(|color| color.with_alpha(stroke_opacity));
        let stroke_width = match attrs.attribute("stroke-width") {
            None => default.stroke_width,
            Some(value) => {
                let width = parse_length(value)
                    .map_err(|error| ShapeError::invalid("stroke-width", value, error))?;
                if width < 0.0 {
                    return Err(ShapeError::invalid(
                        "stroke-width",
                        value,
                        "must not be negative",
                    ));
                }
                width
            }
        };
        let fill_rule = match attrs.attribute("fill-rule").map(str::trim) {
            None | Some("inherit") => None,
            Some("nonzero") => Some(FillRule::NonZero),
            Some("evenodd") => Some(FillRule::EvenOdd),
            Some(value) => {
                return Err(ShapeError::invalid(
                    "fill-rule",
                    value,
                    "expected `nonzero` or `evenodd`",
                ));
            }
        };
        Ok(Self {
            fill,
            stroke,
            stroke_width,
            fill_rule,
        })
    }
}

// `none` disables paint, absent attribute takes `default`
fn paint<A: Attributes + ?Sized>(
    attrs: &A,
    attribute: &'static str,
    default: Option<RGBA>,
) -> Result<Option<RGBA>, ShapeError> {
    let value = match attrs.attribute(attribute).map(str::trim) {
        None => return Ok(default),
        Some(value) => value,
    };
    if value == "none" {
        return Ok(None);
    }
    match value.parse::<RGBA>() {
        Ok(color) => Ok(Some(color)),
        Err(ColorError::UnknownName(_)) => Err(ShapeError::UnknownColor {
            attribute,
            value: value.to_owned(),
        }),
        Err(error) => Err(ShapeError::invalid(attribute, value, error)),
    }
}

// opacity value clamped to `[0, 1]`, absent attribute means fully opaque
fn parse_opacity<A: Attributes + ?Sized>(
    attrs: &A,
    attribute: &'static str,
) -> Result<Scalar, ShapeError> {
    let value = match attrs.attribute(attribute) {
        None => return Ok(1.0),
        Some(value) => value,
    };
    let invalid = |reason: &dyn fmt::Display| ShapeError::invalid(attribute, value, reason);
    let values = parse_scalars(value).map_err(|error| invalid(&error))?;
    match values.as_slice() {
        [opacity] => Ok(crate::clamp(*opacity, 0.0, 1.0)),
        _ => Err(invalid(&"single number expected")),
    }
}

/// Flattened path together with its resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    path: Path,
    style: Style,
}

impl Shape {
    pub fn new(path: Path, style: Style) -> Self {
        Self { path, style }
    }

    /// Create shape from the element tag and attributes, `Ok(None)` for tags which are not drawn
    pub fn from_attributes(
        tag: &str,
        attrs: &(impl Attributes + ?Sized),
        options: &RenderOptions,
    ) -> Result<Option<Self>, ShapeError> {
        let Some(element) = Element::from_attributes(tag, attrs)? else {
            return Ok(None);
        };
        let path = element.normalize(options)?;
        let style = Style::from_attributes(attrs)?;
        Ok(Some(Self::new(path, style)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn style(&self) -> &Style {
        &self.style
    }
}
