//! Per-shape rendering driver
use crate::{
    Attributes, Canvas, DEFAULT_CIRCLE_SEGMENTS, DEFAULT_CURVE_SEGMENTS, FillRule, RGBA, Shape,
    ShapeError, rasterize,
};
use std::fmt;

/// Rendering configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct RenderOptions {
    /// Number of segments each curve of a path is flattened into
    pub curve_segments: usize,
    /// Number of segments circles and ellipses are approximated with
    pub circle_segments: usize,
    /// Fill rule used by shapes that do not specify `fill-rule`
    pub fill_rule: FillRule,
    /// Color canvas is initialized with
    pub background: RGBA,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            curve_segments: DEFAULT_CURVE_SEGMENTS,
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
            fill_rule: FillRule::default(),
            background: RGBA::new(255, 255, 255, 0),
        }
    }
}

impl RenderOptions {
    /// Load options from JSON, missing fields take default values
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Shape that was not rendered because of an error
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedShape {
    /// Index of the element in the order elements were drawn
    pub index: usize,
    /// Tag name of the element
    pub element: String,
    pub error: ShapeError,
}

impl fmt::Display for DroppedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} <{}>: {}", self.index, self.element, self.error)
    }
}

/// Summary of the rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Number of rendered shapes
    pub drawn: usize,
    /// Number of elements which are not drawable (unknown tags)
    pub ignored: usize,
    /// Shapes dropped due to errors, in document order
    pub dropped: Vec<DroppedShape>,
}

impl RenderReport {
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        let dropped: Vec<_> = self
            .dropped
            .iter()
            .map(|dropped| {
                serde_json::json!({
                    "index": dropped.index,
                    "element": dropped.element,
                    "error": dropped.error.to_string(),
                })
            })
            .collect();
        serde_json::json!({
            "drawn": self.drawn,
            "ignored": self.ignored,
            "dropped": dropped,
        })
    }
}

/// Result of the rendering
#[derive(Debug, Clone)]
pub struct Rendered {
    pub canvas: Canvas,
    pub report: RenderReport,
}

/// Renders shapes one by one in the painter's order
///
/// A shape that fails to normalize is dropped and recorded in the report, rendering
/// of the following shapes continues.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: RenderOptions,
    canvas: Canvas,
    report: RenderReport,
    index: usize,
}

impl Renderer {
    pub fn new(width: usize, height: usize, options: RenderOptions) -> Self {
        let canvas = Canvas::new(width, height, options.background);
        Self {
            options,
            canvas,
            report: RenderReport::default(),
            index: 0,
        }
    }

    /// Draw element on top of everything drawn so far
    ///
    /// Returns `true` if the element was rendered, unknown tags and dropped shapes
    /// return `false`.
    pub fn draw(&mut self, tag: &str, attrs: &(impl Attributes + ?Sized)) -> bool {
        let index = self.index;
        self.index += 1;
        match Shape::from_attributes(tag, attrs, &self.options) {
            Ok(Some(shape)) => {
                rasterize(&shape, &mut self.canvas, self.options.fill_rule);
                self.report.drawn += 1;
                true
            }
            Ok(None) => {
                tracing::trace!("[render] ignored <{}> #{}", tag, index);
                self.report.ignored += 1;
                false
            }
            Err(error) => {
                tracing::warn!("[render] dropped <{}> #{}: {}", tag, index, error);
                self.report.dropped.push(DroppedShape {
                    index,
                    element: tag.to_owned(),
                    error,
                });
                false
            }
        }
    }

    pub fn finish(self) -> Rendered {
        tracing::debug!(
            "[render] drawn: {} ignored: {} dropped: {}",
            self.report.drawn,
            self.report.ignored,
            self.report.dropped.len()
        );
        Rendered {
            canvas: self.canvas,
            report: self.report,
        }
    }
}
