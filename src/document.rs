//! Rendering of whole SVG documents
use crate::{Attributes, RenderOptions, Rendered, Renderer, parse_length};
use std::fmt;

/// Largest canvas (in pixels) a document is allowed to allocate
pub const MAX_CANVAS_PIXELS: usize = 1 << 26;

impl Attributes for roxmltree::Node<'_, '_> {
    fn attribute(&self, name: &str) -> Option<&str> {
        roxmltree::Node::attribute(self, name)
    }
}

#[derive(Debug)]
pub enum DocumentError {
    /// Document is not a well-formed XML
    Xml(roxmltree::Error),
    /// Root element does not have `width` or `height` attribute
    MissingDimension(&'static str),
    /// Root `width` or `height` is not a positive integer
    InvalidDimension {
        attribute: &'static str,
        value: String,
    },
    /// Canvas would have more than [`MAX_CANVAS_PIXELS`] pixels
    TooLarge { width: usize, height: usize },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Xml(error) => write!(f, "malformed document: {}", error),
            DocumentError::MissingDimension(attribute) => {
                write!(f, "root element is missing `{}` attribute", attribute)
            }
            DocumentError::InvalidDimension { attribute, value } => write!(
                f,
                "root `{}` must be a positive integer, found \"{}\"",
                attribute, value
            ),
            DocumentError::TooLarge { width, height } => write!(
                f,
                "canvas {}x{} exceeds the limit of {} pixels",
                width, height, MAX_CANVAS_PIXELS
            ),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Xml(error) => Some(error),
            _ => None,
        }
    }
}

impl From<roxmltree::Error> for DocumentError {
    fn from(error: roxmltree::Error) -> Self {
        Self::Xml(error)
    }
}

/// Render SVG document
///
/// Canvas size is taken from `width` and `height` of the root element. Every element
/// below the root is drawn in document order, content of `defs` is skipped. Shapes
/// that fail to render are reported in [`Rendered::report`].
pub fn render_document(text: &str, options: &RenderOptions) -> Result<Rendered, DocumentError> {
    let doc = tracing::debug_span!("[parse]").in_scope(|| roxmltree::Document::parse(text))?;
    let root = doc.root_element();
    let width = dimension(root, "width")?;
    let height = dimension(root, "height")?;
    match width.checked_mul(height) {
        Some(pixels) if pixels <= MAX_CANVAS_PIXELS => {}
        _ => return Err(DocumentError::TooLarge { width, height }),
    }
    tracing::debug_span!("[render]", width, height).in_scope(|| {
        let mut renderer = Renderer::new(width, height, options.clone());
        draw_children(root, &mut renderer);
        Ok(renderer.finish())
    })
}

fn draw_children(node: roxmltree::Node<'_, '_>, renderer: &mut Renderer) {
    for child in node.children().filter(|child| child.is_element()) {
        let tag = child.tag_name().name();
        if tag == "defs" {
            continue;
        }
        renderer.draw(tag, &child);
        draw_children(child, renderer);
    }
}

fn dimension(root: roxmltree::Node<'_, '_>, attribute: &'static str) -> Result<usize, DocumentError> {
    let value = root
        .attribute(attribute)
        .ok_or(DocumentError::MissingDimension(attribute))?;
    let invalid = || DocumentError::InvalidDimension {
        attribute,
        value: value.to_owned(),
    };
    let size = parse_length(value).map_err(|_| invalid())?;
    if size < 1.0 || size.fract() != 0.0 || size > u32::MAX as f64 {
        return Err(invalid());
    }
    Ok(size as usize)
}
