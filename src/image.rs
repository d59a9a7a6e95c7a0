/// Memory layout of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageShape {
    /// Width of the image
    pub width: usize,
    /// Height of the image
    pub height: usize,
    /// How many elements we need to skip to get to the next row.
    pub row_stride: usize,
    /// How many elements we need to skip to get to the next column.
    pub col_stride: usize,
}

impl ImageShape {
    /// Row major shape without any padding
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            width,
            height,
            row_stride: width,
            col_stride: 1,
        }
    }

    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.col_stride
    }

    /// Whether `(row, col)` lies inside of the image
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }
}

pub trait Image {
    type Pixel;

    fn data(&self) -> &[Self::Pixel];

    fn shape(&self) -> ImageShape;

    fn width(&self) -> usize {
        self.shape().width
    }

    fn height(&self) -> usize {
        self.shape().height
    }

    fn get(&self, row: usize, col: usize) -> Option<&Self::Pixel> {
        let shape = self.shape();
        if !shape.contains(row, col) {
            return None;
        }
        self.data().get(shape.offset(row, col))
    }
}

pub trait ImageMut: Image {
    fn data_mut(&mut self) -> &mut [Self::Pixel];

    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Self::Pixel> {
        let shape = self.shape();
        if !shape.contains(row, col) {
            return None;
        }
        self.data_mut().get_mut(shape.offset(row, col))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOwned<P> {
    shape: ImageShape,
    data: Vec<P>,
}

impl<P> ImageOwned<P> {
    pub fn new_with<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> P,
    {
        let mut data = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col))
            }
        }
        Self {
            shape: ImageShape::new(height, width),
            data,
        }
    }
}

impl<P> Image for ImageOwned<P> {
    type Pixel = P;

    fn shape(&self) -> ImageShape {
        self.shape
    }

    fn data(&self) -> &[Self::Pixel] {
        &self.data
    }
}

impl<P> ImageMut for ImageOwned<P> {
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_owned() {
        let mut image = ImageOwned::new_with(2, 3, |row, col| row * 10 + col);
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.data(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(image.shape().offset(1, 2), 5);
        assert_eq!(image.get(1, 2), Some(&12));
        assert_eq!(image.get(2, 0), None);
        assert_eq!(image.get(0, 3), None);

        if let Some(pixel) = image.get_mut(0, 1) {
            *pixel = 100;
        }
        assert!(image.get_mut(5, 5).is_none());
        assert_eq!(image.get(0, 1), Some(&100));
    }
}
