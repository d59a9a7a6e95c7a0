use crate::{Color, Image, ImageMut, ImageOwned, ImageShape, RGBA};

/// RGBA pixel buffer rendered shapes are painted onto
///
/// Pixel `(x, y)` covers the unit square `[x, x + 1) x [y, y + 1)`, `y` grows downwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: ImageOwned<RGBA>,
}

impl Canvas {
    /// Create canvas with every pixel set to `background`
    pub fn new(width: usize, height: usize, background: RGBA) -> Self {
        Self {
            image: ImageOwned::new_with(height, width, |_, _| background),
        }
    }

    /// Color of the pixel, `None` if it is outside of the canvas
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<RGBA> {
        self.image.get(y, x).copied()
    }

    /// Paint single pixel, pixels outside of the canvas are ignored
    ///
    /// Opaque color replaces pixel, fully transparent color is a no-op, anything
    /// else is blended over the current pixel value.
    pub fn paint(&mut self, x: usize, y: usize, color: RGBA) {
        if color.is_transparent() {
            return;
        }
        if let Some(pixel) = self.image.get_mut(y, x) {
            *pixel = if color.is_opaque() {
                color
            } else {
                pixel.blend_over(color)
            };
        }
    }

    /// Pixels in row major order
    pub fn pixels(&self) -> &[RGBA] {
        self.image.data()
    }

    /// Pixels as `[r, g, b, a]` bytes in row major order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.image.data())
    }

    /// Encode canvas as 8-bit RGBA PNG image
    #[cfg(feature = "png")]
    pub fn write_png(&self, out: impl std::io::Write) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(out, self.width() as u32, self.height() as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(self.as_bytes())?;
        writer.finish()
    }
}

impl Image for Canvas {
    type Pixel = RGBA;

    fn data(&self) -> &[Self::Pixel] {
        self.image.data()
    }

    fn shape(&self) -> ImageShape {
        self.image.shape()
    }
}

impl ImageMut for Canvas {
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        self.image.data_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_paint() {
        let bg = RGBA::new(255, 255, 255, 0);
        let mut canvas = Canvas::new(4, 3, bg);
        assert_eq!(canvas.width(), 4);
        assert_eq!(canvas.height(), 3);
        assert_eq!(canvas.pixels().len(), 12);
        assert!(canvas.pixels().iter().all(|pixel| *pixel == bg));

        let red = RGBA::new(255, 0, 0, 255);
        canvas.paint(3, 2, red);
        assert_eq!(canvas.get_pixel(3, 2), Some(red));
        assert_eq!(canvas.pixels()[11], red);

        // out of bounds is ignored
        canvas.paint(4, 0, red);
        canvas.paint(0, 3, red);
        assert_eq!(canvas.get_pixel(4, 0), None);
        assert_eq!(canvas.pixels().iter().filter(|p| **p == red).count(), 1);

        // transparent paint is a no-op
        canvas.paint(3, 2, RGBA::new(0, 0, 255, 0));
        assert_eq!(canvas.get_pixel(3, 2), Some(red));

        // translucent paint is blended
        canvas.paint(3, 2, RGBA::new(0, 0, 255, 128));
        let pixel = canvas.get_pixel(3, 2).unwrap();
        assert_eq!(pixel.alpha(), 255);
        assert!(pixel.red() > 0 && pixel.blue() > 0);
    }

    #[test]
    fn test_canvas_bytes() {
        let mut canvas = Canvas::new(2, 1, RGBA::new(1, 2, 3, 4));
        canvas.paint(1, 0, RGBA::new(5, 6, 7, 255));
        assert_eq!(canvas.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 255]);
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_write_png() -> Result<(), png::EncodingError> {
        let canvas = Canvas::new(3, 2, RGBA::new(10, 20, 30, 255));
        let mut out = Vec::new();
        canvas.write_png(&mut out)?;
        assert_eq!(&out[..8], b"\x89PNG\r\n\x1a\n");
        Ok(())
    }
}
