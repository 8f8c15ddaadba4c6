use crate::error::ImageError;

/// Width and height of a raster in pixels.
///
/// ```
/// use roofsight_image::ImageSize;
///
/// let size = ImageSize::from([800, 600]);
/// assert_eq!(size.area(), 480_000);
/// assert_eq!(size.to_string(), "800x600");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Pixels per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether the raster holds no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from([width, height]: [usize; 2]) -> Self {
        Self { width, height }
    }
}

/// Row-major raster with `C` interleaved samples per pixel.
///
/// The sample vector always holds exactly `width * height * C` values; every
/// constructor checks it, and no method can change the length afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const C: usize> {
    size: ImageSize,
    data: Vec<T>,
}

/// An 8-bit RGBA raster, the unit of work of the enhancement pipeline.
///
/// Filters borrow it mutably and rewrite it in place, or fill a second
/// buffer of the same size; they never do both.
pub type PixelBuffer = Image<u8, 4>;

impl<T: Copy, const C: usize> Image<T, C> {
    /// Wrap `data` as a raster of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidChannelShape`] if `data` does not hold
    /// exactly `width * height * C` samples.
    ///
    /// ```
    /// use roofsight_image::PixelBuffer;
    ///
    /// let frame = PixelBuffer::new([2, 1].into(), vec![255, 0, 0, 255, 0, 0, 255, 255])?;
    /// assert_eq!(frame.pixel(1, 0), Some(&[0, 0, 255, 255][..]));
    /// assert!(PixelBuffer::new([2, 1].into(), vec![0; 7]).is_err());
    /// # Ok::<(), roofsight_image::ImageError>(())
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.area() * C;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }
        Ok(Self { size, data })
    }

    /// A raster of the given size with every sample set to `val`.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError> {
        Self::new(size, vec![val; size.area() * C])
    }

    /// Size of the raster.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Pixels per row.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Alias of [`Image::width`] for matrix-style indexing.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Alias of [`Image::height`] for matrix-style indexing.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// All samples, row by row.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All samples, row by row, for in-place filters.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Give up the raster and keep its samples.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize, ImageError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.size.width,
                self.size.height,
            ));
        }
        Ok((y * self.size.width + x) * C)
    }

    /// The `C` samples of pixel `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[T]> {
        let start = self.offset(x, y).ok()?;
        self.data.get(start..start + C)
    }

    /// Sample `ch` of pixel `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an error when the pixel or the channel is out of bounds.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError> {
        if ch >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, C));
        }
        let start = self.offset(x, y)?;
        Ok(self.data[start + ch])
    }

    /// Overwrite pixel `(x, y)` with `value`.
    ///
    /// # Errors
    ///
    /// Returns an error when the pixel is out of bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: [T; C]) -> Result<(), ImageError> {
        let start = self.offset(x, y)?;
        self.data[start..start + C].copy_from_slice(&value);
        Ok(())
    }
}
