//! Scanline fill and thick line stroke of flattened paths
use crate::{
    BBox, Canvas, FillRule, Image, ImageMut, ImageOwned, Line, Path, Point, RGBA, Scalar, Shape,
    clamp,
};

/// Rasterize shape onto the canvas, fill is painted first and stroke on top of it
///
/// `default_rule` is used when the shape does not specify its own fill rule.
pub fn rasterize(shape: &Shape, canvas: &mut Canvas, default_rule: FillRule) {
    let style = shape.style();
    if let Some(fill) = style.fill {
        let fill_rule = style.fill_rule.unwrap_or(default_rule);
        fill_path(shape.path(), fill_rule, fill, canvas);
    }
    if let Some(stroke) = style.stroke {
        stroke_path(shape.path(), style.stroke_width, stroke, canvas);
    }
}

/// Edge of the filled area, always directed from smaller `y` to bigger `y`
#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: Scalar,
    y0: Scalar,
    y1: Scalar,
    dxdy: Scalar,
    // +1 if the original line goes down, -1 if it goes up
    winding: i32,
}

impl Edge {
    // horizontal lines never cross a scanline and are skipped
    fn new(line: Line) -> Option<Self> {
        let Line([p0, p1]) = line;
        if !line.is_finite() || p0.y() == p1.y() {
            return None;
        }
        let (winding, p0, p1) = if p0.y() < p1.y() {
            (1, p0, p1)
        } else {
            (-1, p1, p0)
        };
        Some(Self {
            x0: p0.x(),
            y0: p0.y(),
            y1: p1.y(),
            dxdy: (p1.x() - p0.x()) / (p1.y() - p0.y()),
            winding,
        })
    }

    // intersection with the scanline, `[y0, y1)` rule so shared vertices are counted once
    fn intersect(&self, y: Scalar) -> Option<Scalar> {
        (self.y0 <= y && y < self.y1).then(|| self.x0 + (y - self.y0) * self.dxdy)
    }
}

/// Fill path using scanline algorithm, sampling every row at its center
///
/// Open sub-paths are implicitly closed. Pixel `x` of a row is painted if
/// `x + 0.5` lies inside of a span `[x_start, x_end)` produced by the fill rule.
pub fn fill_path(path: &Path, fill_rule: FillRule, color: RGBA, canvas: &mut Canvas) {
    if color.is_transparent() {
        return;
    }
    let edges: Vec<Edge> = path.fill_lines().filter_map(Edge::new).collect();
    if edges.is_empty() {
        return;
    }
    let y_min = edges.iter().map(|edge| edge.y0).fold(Scalar::INFINITY, Scalar::min);
    let y_max = edges.iter().map(|edge| edge.y1).fold(Scalar::NEG_INFINITY, Scalar::max);
    let height = canvas.height() as Scalar;
    let row_start = clamp((y_min - 0.5).ceil(), 0.0, height) as usize;
    let row_end = clamp((y_max - 0.5).ceil(), 0.0, height) as usize;

    let mut crossings: Vec<(Scalar, i32)> = Vec::with_capacity(edges.len());
    for row in row_start..row_end {
        let y = row as Scalar + 0.5;
        crossings.clear();
        crossings.extend(
            edges
                .iter()
                .filter_map(|edge| Some((edge.intersect(y)?, edge.winding))),
        );
        crossings.sort_by(|c0, c1| c0.0.total_cmp(&c1.0));

        match fill_rule {
            FillRule::EvenOdd => {
                for pair in crossings.chunks_exact(2) {
                    fill_span(canvas, row, pair[0].0, pair[1].0, color);
                }
            }
            FillRule::NonZero => {
                let mut winding = 0;
                let mut span_start = 0.0;
                for (x, dir) in crossings.iter().copied() {
                    let prev = winding;
                    winding += dir;
                    if prev == 0 && winding != 0 {
                        span_start = x;
                    } else if prev != 0 && winding == 0 {
                        fill_span(canvas, row, span_start, x, color);
                    }
                }
            }
        }
    }
}

// paint pixels of the row with centers inside of `[x_start, x_end)`
fn fill_span(canvas: &mut Canvas, row: usize, x_start: Scalar, x_end: Scalar, color: RGBA) {
    let width = canvas.width() as Scalar;
    let col_start = clamp((x_start - 0.5).ceil(), 0.0, width) as usize;
    let col_end = clamp((x_end - 0.5).ceil(), 0.0, width) as usize;
    for col in col_start..col_end {
        canvas.paint(col, row, color);
    }
}

/// Pixels covered by the stroke, restricted to the part of the canvas the stroke can touch
struct StrokeMask {
    col: usize,
    row: usize,
    mask: ImageOwned<bool>,
}

impl StrokeMask {
    fn new(region: BBox) -> Self {
        let col = region.x().floor() as usize;
        let row = region.y().floor() as usize;
        let width = region.max().x().ceil() as usize - col;
        let height = region.max().y().ceil() as usize - row;
        Self {
            col,
            row,
            mask: ImageOwned::new_with(height, width, |_, _| false),
        }
    }

    fn mark(&mut self, x: i64, y: i64) {
        if x < self.col as i64 || y < self.row as i64 {
            return;
        }
        let col = x as usize - self.col;
        let row = y as usize - self.row;
        if let Some(marked) = self.mask.get_mut(row, col) {
            *marked = true;
        }
    }

    // mark pixels with centers strictly closer than `half_width` to the line
    fn mark_distance(&mut self, line: Line, half_width: Scalar) {
        let shape = self.mask.shape();
        let bounds = BBox::new(
            (self.col as Scalar, self.row as Scalar),
            (
                (self.col + shape.width) as Scalar,
                (self.row + shape.height) as Scalar,
            ),
        );
        let Some(area) = line.bbox(None).inflate(half_width).intersect(bounds) else {
            return;
        };
        let col_start = area.x().floor() as usize;
        let col_end = area.max().x().ceil() as usize;
        let row_start = area.y().floor() as usize;
        let row_end = area.max().y().ceil() as usize;
        for y in row_start..row_end {
            for x in col_start..col_end {
                let center = Point::new(x as Scalar + 0.5, y as Scalar + 0.5);
                if line.distance(center) < half_width {
                    self.mark(x as i64, y as i64);
                }
            }
        }
    }

    fn paint(&self, canvas: &mut Canvas, color: RGBA) {
        let shape = self.mask.shape();
        for row in 0..shape.height {
            for col in 0..shape.width {
                if self.mask.get(row, col).copied().unwrap_or(false) {
                    canvas.paint(self.col + col, self.row + row, color);
                }
            }
        }
    }
}

/// Walk pixels of the line with Bresenham algorithm, calling `mark` for each one
fn bresenham(line: Line, mut mark: impl FnMut(i64, i64)) {
    let Line([p0, p1]) = line;
    let (mut x0, mut y0) = (p0.x().floor() as i64, p0.y().floor() as i64);
    let (x1, y1) = (p1.x().floor() as i64, p1.y().floor() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        mark(x0, y0);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Stroke every segment of the path with round joins and caps
///
/// Pixel is covered if it lies on the Bresenham line of a segment or its center
/// is strictly closer than `stroke_width / 2` to the segment. Every covered pixel
/// is painted exactly once.
pub fn stroke_path(path: &Path, stroke_width: Scalar, color: RGBA, canvas: &mut Canvas) {
    if !stroke_width.is_finite() || stroke_width <= 0.0 || color.is_transparent() {
        return;
    }
    let (width, height) = (canvas.width(), canvas.height());
    if width == 0 || height == 0 {
        return;
    }
    let half_width = stroke_width / 2.0;
    let bounds = BBox::new((0.0, 0.0), (width as Scalar, height as Scalar));
    let Some(region) = path
        .bbox()
        .and_then(|bbox| bbox.inflate(half_width + 1.0).intersect(bounds))
    else {
        return;
    };

    let mut mask = StrokeMask::new(region);
    // core line only needs to be walked inside of the canvas
    let core_bounds = bounds.inflate(1.0);
    for line in path.lines() {
        if !line.is_finite() {
            continue;
        }
        if let Some(core) = core_bounds.clip_line(line) {
            bresenham(core, |x, y| mask.mark(x, y));
        }
        mask.mark_distance(line, half_width);
    }
    mask.paint(canvas, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, DEFAULT_CIRCLE_SEGMENTS, PathError, Style};

    const BG: RGBA = RGBA::new(255, 255, 255, 0);
    const BLUE: RGBA = RGBA::new(0, 0, 255, 255);
    const RED: RGBA = RGBA::new(255, 0, 0, 255);

    fn rect(x: Scalar, y: Scalar, w: Scalar, h: Scalar) -> Path {
        Path::builder()
            .move_to((x, y))
            .line_to((x + w, y))
            .line_to((x + w, y + h))
            .line_to((x, y + h))
            .close()
            .build()
    }

    fn painted(canvas: &Canvas, color: RGBA) -> usize {
        canvas.pixels().iter().filter(|pixel| **pixel == color).count()
    }

    #[test]
    fn test_fill_rect() {
        let mut canvas = Canvas::new(100, 100, BG);
        fill_path(&rect(10.0, 10.0, 80.0, 80.0), FillRule::EvenOdd, BLUE, &mut canvas);
        assert_eq!(canvas.get_pixel(50, 50), Some(BLUE));
        assert_eq!(canvas.get_pixel(0, 0), Some(BG));
        assert_eq!(canvas.get_pixel(10, 10), Some(BLUE));
        assert_eq!(canvas.get_pixel(89, 89), Some(BLUE));
        assert_eq!(canvas.get_pixel(90, 50), Some(BG));
        assert_eq!(canvas.get_pixel(50, 90), Some(BG));
        assert_eq!(painted(&canvas, BLUE), 80 * 80);
    }

    #[test]
    fn test_fill_circle() {
        let mut canvas = Canvas::new(100, 100, BG);
        let circle = Path::builder()
            .ellipse((50.0, 50.0), 30.0, 30.0, DEFAULT_CIRCLE_SEGMENTS)
            .build();
        fill_path(&circle, FillRule::EvenOdd, RED, &mut canvas);
        assert_eq!(canvas.get_pixel(50, 50), Some(RED));
        assert_eq!(canvas.get_pixel(50, 5), Some(BG));
        assert_eq!(canvas.get_pixel(50, 21), Some(RED));
        assert_eq!(canvas.get_pixel(22, 22), Some(BG));
    }

    #[test]
    fn test_fill_rule() -> Result<(), PathError> {
        // two squares with the same orientation
        let path: Path = "M0 0 H10 V10 H0 Z M3 3 H7 V7 H3 Z".parse()?;
        let mut canvas = Canvas::new(10, 10, BG);
        fill_path(&path, FillRule::EvenOdd, BLUE, &mut canvas);
        assert_eq!(canvas.get_pixel(5, 5), Some(BG));
        assert_eq!(canvas.get_pixel(1, 1), Some(BLUE));

        let mut canvas = Canvas::new(10, 10, BG);
        fill_path(&path, FillRule::NonZero, BLUE, &mut canvas);
        assert_eq!(canvas.get_pixel(5, 5), Some(BLUE));
        assert_eq!(painted(&canvas, BLUE), 100);

        // inner square in the opposite direction is a hole for both rules
        let path: Path = "M0 0 H10 V10 H0 Z M3 3 V7 H7 V3 Z".parse()?;
        let mut canvas = Canvas::new(10, 10, BG);
        fill_path(&path, FillRule::NonZero, BLUE, &mut canvas);
        assert_eq!(canvas.get_pixel(5, 5), Some(BG));
        assert_eq!(painted(&canvas, BLUE), 100 - 16);
        Ok(())
    }

    #[test]
    fn test_fill_open_subpath() -> Result<(), PathError> {
        let path: Path = "M0 0 L10 0 L0 10".parse()?;
        let mut canvas = Canvas::new(10, 10, BG);
        fill_path(&path, FillRule::EvenOdd, BLUE, &mut canvas);
        assert_eq!(canvas.get_pixel(2, 2), Some(BLUE));
        assert_eq!(canvas.get_pixel(8, 8), Some(BG));
        Ok(())
    }

    #[test]
    fn test_fill_out_of_bounds() {
        let mut canvas = Canvas::new(8, 6, BG);
        fill_path(&rect(-1e9, -1e9, 2e9, 2e9), FillRule::NonZero, BLUE, &mut canvas);
        assert_eq!(painted(&canvas, BLUE), 48);

        let mut canvas = Canvas::new(8, 6, BG);
        fill_path(&rect(20.0, 20.0, 5.0, 5.0), FillRule::EvenOdd, BLUE, &mut canvas);
        fill_path(&rect(-20.0, 2.0, 5.0, 5.0), FillRule::EvenOdd, BLUE, &mut canvas);
        assert_eq!(painted(&canvas, BG), 48);
    }

    #[test]
    fn test_stroke_line() {
        let line = Path::builder().move_to((1.0, 5.5)).line_to((8.0, 5.5)).build();

        let mut canvas = Canvas::new(10, 10, BG);
        stroke_path(&line, 1.0, RED, &mut canvas);
        assert_eq!(canvas.get_pixel(1, 5), Some(RED));
        assert_eq!(canvas.get_pixel(8, 5), Some(RED));
        assert_eq!(canvas.get_pixel(5, 4), Some(BG));
        assert_eq!(canvas.get_pixel(5, 6), Some(BG));
        assert_eq!(painted(&canvas, RED), 8);

        let mut canvas = Canvas::new(10, 10, BG);
        stroke_path(&line, 3.0, RED, &mut canvas);
        for y in 4..=6 {
            assert_eq!(canvas.get_pixel(5, y), Some(RED));
        }
        assert_eq!(canvas.get_pixel(5, 3), Some(BG));
        assert_eq!(canvas.get_pixel(5, 7), Some(BG));
        // round cap
        assert_eq!(canvas.get_pixel(0, 5), Some(RED));

        let mut canvas = Canvas::new(10, 10, BG);
        stroke_path(&line, 0.0, RED, &mut canvas);
        assert_eq!(painted(&canvas, BG), 100);
    }

    #[test]
    fn test_stroke_paints_once() {
        let white = RGBA::new(255, 255, 255, 255);
        let color = RGBA::new(0, 0, 255, 128);
        let path = Path::builder()
            .move_to((1.5, 5.5))
            .line_to((8.5, 5.5))
            .line_to((1.5, 5.5))
            .close()
            .build();
        let mut canvas = Canvas::new(10, 10, white);
        stroke_path(&path, 2.0, color, &mut canvas);
        assert_eq!(canvas.get_pixel(5, 5), Some(white.blend_over(color)));
    }

    #[test]
    fn test_stroke_huge_coordinates() {
        let line = Path::builder()
            .move_to((-1e12, 2.5))
            .line_to((1e12, 2.5))
            .build();
        let mut canvas = Canvas::new(6, 5, BG);
        stroke_path(&line, 1.0, RED, &mut canvas);
        assert_eq!(painted(&canvas, RED), 6);
        for x in 0..6 {
            assert_eq!(canvas.get_pixel(x, 2), Some(RED));
        }
    }

    #[test]
    fn test_rasterize_fill_then_stroke() {
        let style = Style {
            fill: Some(BLUE),
            stroke: Some(RED),
            stroke_width: 2.0,
            fill_rule: None,
        };
        let shape = Shape::new(rect(2.0, 2.0, 6.0, 6.0), style);
        let mut canvas = Canvas::new(10, 10, BG);
        rasterize(&shape, &mut canvas, FillRule::EvenOdd);
        assert_eq!(canvas.get_pixel(2, 5), Some(RED));
        assert_eq!(canvas.get_pixel(1, 5), Some(RED));
        assert_eq!(canvas.get_pixel(5, 5), Some(BLUE));
        assert_eq!(canvas.get_pixel(0, 5), Some(BG));

        let shape = Shape::new(rect(2.0, 2.0, 6.0, 6.0), Style::none());
        let mut canvas = Canvas::new(10, 10, BG);
        rasterize(&shape, &mut canvas, FillRule::EvenOdd);
        assert_eq!(painted(&canvas, BG), 100);
    }
}
