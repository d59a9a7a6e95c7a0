//! Rasterizer for a subset of SVG
//!
//! Main features:
//!  - SVG path data parsing (all commands including arcs)
//!  - Normalization of basic shapes (`rect`, `circle`, `ellipse`, `line`, `polyline`,
//!    `polygon`, `path`) into flattened paths
//!  - Scanline fill with even-odd and non-zero rules, thick line stroke
//!  - Painter's order rendering with per-shape error reporting
//!
#![deny(warnings)]

mod canvas;
mod color;
mod curve;
#[cfg(feature = "document")]
mod document;
mod ellipse;
mod geometry;
mod image;
mod path;
mod rasterize;
mod render;
mod shape;
mod svg;
mod utils;

pub use canvas::Canvas;
pub use color::{Color, ColorError, LinColor, RGBA, linear_to_srgb, srgb_to_linear};
pub use curve::{Cubic, Curve, CurveFlattenIter, Line, Quad};
#[cfg(feature = "document")]
pub use document::{DocumentError, MAX_CANVAS_PIXELS, render_document};
pub use ellipse::EllipArc;
pub use geometry::{BBox, EPSILON, PI, Point, Scalar, scalar_fmt};
pub use image::{Image, ImageMut, ImageOwned, ImageShape};
pub use path::{
    DEFAULT_CIRCLE_SEGMENTS, DEFAULT_CURVE_SEGMENTS, FillRule, Path, PathBuilder, SubPath,
};
pub use rasterize::{fill_path, rasterize, stroke_path};
pub use render::{DroppedShape, RenderOptions, RenderReport, Rendered, Renderer};
pub use shape::{Attributes, Element, Shape, ShapeError, Style};
pub use svg::{PathCmd, PathError, SvgPathParser, parse_length, parse_scalars};
use utils::clamp;
