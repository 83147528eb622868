//! The typed image container.
//!
//! `Image<K, CC>` is a width × height grid of pixels with `CC` channels of
//! element type `K`, stored row-major and channel-interleaved in a single
//! [`Buffer`]: pixel (x, y) starts at element `CC * (x + y * width)`.
//!
//! `CC` is normally fixed at compile time. `Image<K, DYNAMIC>` carries the
//! channel count at runtime instead; such images are built with
//! [`Image::with_channels`] and addressed through channel slices.

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::iter::{Cursor, PixelAccess, Pixels, PixelsMut};
use crate::pixel::{Element, Pixel};

/// Channel count sentinel for images whose channel count is chosen at runtime.
pub const DYNAMIC: usize = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct Image<K, const CC: usize> {
    width: u32,
    height: u32,
    channels: usize,
    buffer: Buffer<K>,
}

impl<K: Element, const CC: usize> Default for Image<K, CC> {
    /// The 0 × 0 null image.
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            channels: CC,
            buffer: Buffer::default(),
        }
    }
}

fn element_len(width: u32, height: u32, channels: usize) -> usize {
    width as usize * height as usize * channels
}

impl<K: Element, const CC: usize> Image<K, CC> {
    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Zero-filled image with the compile-time channel count.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            CC != DYNAMIC,
            "images with a runtime channel count are built with Image::with_channels"
        );
        Self::with_channels(width, height, CC)
    }

    /// Zero-filled image with `channels` channels.
    ///
    /// For a fixed `CC` the argument must equal `CC`.
    pub fn with_channels(width: u32, height: u32, channels: usize) -> Self {
        if CC != DYNAMIC {
            assert_eq!(channels, CC, "channel count does not match the image type");
        }
        Self {
            width,
            height,
            channels,
            buffer: Buffer::new(element_len(width, height, channels)),
        }
    }

    /// Image with every pixel set to `value`.
    pub fn from_pixel(width: u32, height: u32, value: &Pixel<K, CC>) -> Self {
        let mut image = Self::new(width, height);
        image.fill(value);
        image
    }

    /// Wrap an existing buffer.
    ///
    /// Panics if the buffer does not hold exactly `width * height * CC`
    /// elements.
    pub fn from_buffer(width: u32, height: u32, buffer: Buffer<K>) -> Self {
        assert!(CC != DYNAMIC, "use Image::from_raw_with_channels");
        assert_eq!(
            buffer.size(),
            element_len(width, height, CC),
            "buffer size does not match {width}x{height}x{CC}"
        );
        Self {
            width,
            height,
            channels: CC,
            buffer,
        }
    }

    /// Take ownership of raw interleaved elements. Returns `None` when the
    /// length does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<K>) -> Option<Self> {
        if CC == DYNAMIC {
            return None;
        }
        Self::from_raw_with_channels(width, height, CC, data)
    }

    pub fn from_raw_with_channels(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<K>,
    ) -> Option<Self> {
        if CC != DYNAMIC && channels != CC {
            return None;
        }
        if data.len() != element_len(width, height, channels) {
            return None;
        }
        Some(Self {
            width,
            height,
            channels,
            buffer: Buffer::from_vec(data),
        })
    }

    // ------------------------------------------------------------------------
    // Shape
    // ------------------------------------------------------------------------

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of elements per pixel.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Number of pixels.
    #[inline]
    pub fn size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of elements, `size() * channel_count()`.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.buffer.size()
    }

    /// True if width, height or channel count is zero.
    pub fn is_null(&self) -> bool {
        self.element_count() == 0
    }

    pub fn has_same_size<L: Element, const N: usize>(&self, other: &Image<L, N>) -> bool {
        self.dimensions() == other.dimensions()
    }

    pub fn has_same_shape<L: Element, const N: usize>(&self, other: &Image<L, N>) -> bool {
        self.has_same_size(other) && self.channels == other.channel_count()
    }

    /// True if (x, y) addresses a pixel of this image.
    #[inline]
    pub fn is_valid_index(&self, x: i32, y: i32) -> bool {
        0 <= x && (x as u32) < self.width && 0 <= y && (y as u32) < self.height
    }

    /// Element offset of pixel (x, y).
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        self.channels * (x as usize + y as usize * self.width as usize)
    }

    // ------------------------------------------------------------------------
    // Pixel access
    // ------------------------------------------------------------------------

    /// Channels of pixel (x, y).
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[K] {
        let i = self.index(x, y);
        &self.buffer.as_slice()[i..i + self.channels]
    }

    /// Mutable view of pixel (x, y).
    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> PixelAccess<'_, K, CC> {
        let i = self.index(x, y);
        let channels = self.channels;
        PixelAccess::new(&mut self.buffer.as_mut_slice()[i..i + channels])
    }

    /// Copy of pixel (x, y).
    pub fn get(&self, x: u32, y: u32) -> Pixel<K, CC> {
        Pixel::from_slice(self.pixel(x, y))
    }

    pub fn set(&mut self, x: u32, y: u32, value: &Pixel<K, CC>) {
        let i = self.index(x, y);
        let channels = self.channels;
        self.buffer.as_mut_slice()[i..i + channels].copy_from_slice(value.as_slice());
    }

    /// Channels of the `i`-th pixel in row-major order.
    #[inline]
    pub fn pixel_at(&self, i: usize) -> &[K] {
        let start = i * self.channels;
        &self.buffer.as_slice()[start..start + self.channels]
    }

    pub fn pixel_at_mut(&mut self, i: usize) -> PixelAccess<'_, K, CC> {
        let start = i * self.channels;
        let channels = self.channels;
        PixelAccess::new(&mut self.buffer.as_mut_slice()[start..start + channels])
    }

    pub fn get_at(&self, i: usize) -> Pixel<K, CC> {
        Pixel::from_slice(self.pixel_at(i))
    }

    pub fn set_at(&mut self, i: usize, value: &Pixel<K, CC>) {
        self.pixel_at_mut(i).set(value);
    }

    /// Elements of row `y`.
    pub fn scanline(&self, y: u32) -> &[K] {
        let row = self.width as usize * self.channels;
        let start = y as usize * row;
        &self.buffer.as_slice()[start..start + row]
    }

    pub fn scanline_mut(&mut self, y: u32) -> &mut [K] {
        let row = self.width as usize * self.channels;
        let start = y as usize * row;
        &mut self.buffer.as_mut_slice()[start..start + row]
    }

    #[inline]
    pub fn as_slice(&self) -> &[K] {
        self.buffer.as_slice()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [K] {
        self.buffer.as_mut_slice()
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &Buffer<K> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer<K> {
        &mut self.buffer
    }

    pub fn into_raw(self) -> Vec<K> {
        self.buffer.into_vec()
    }

    pub fn pixels(&self) -> Pixels<'_, K> {
        Pixels::new(self.buffer.as_slice(), self.channels)
    }

    pub fn pixels_mut(&mut self) -> PixelsMut<'_, K, CC> {
        let channels = self.channels;
        PixelsMut::new(self.buffer.as_mut_slice(), channels)
    }

    /// Pixels paired with their coordinates.
    pub fn enumerate_pixels(&self) -> impl Iterator<Item = (u32, u32, &[K])> + '_ {
        let width = self.width.max(1);
        self.pixels()
            .enumerate()
            .map(move |(i, px)| ((i as u32) % width, (i as u32) / width, px))
    }

    /// Cursor positioned at the first pixel.
    pub fn cursor(&self) -> Cursor<'_, K, CC> {
        Cursor::new(self.buffer.as_slice(), self.channels, 0)
    }

    /// Cursor positioned one past the last pixel.
    pub fn cursor_end(&self) -> Cursor<'_, K, CC> {
        Cursor::new(self.buffer.as_slice(), self.channels, self.size() as isize)
    }

    // ------------------------------------------------------------------------
    // Whole-image operations
    // ------------------------------------------------------------------------

    /// Change dimensions and reallocate. Contents are reset, not preserved.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.buffer.resize(element_len(width, height, self.channels));
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: &Pixel<K, CC>) {
        self.fill_channels(value.as_slice());
    }

    /// Set every pixel to the channel values in `value`.
    pub fn fill_channels(&mut self, value: &[K]) {
        assert_eq!(
            value.len(),
            self.channels,
            "fill value has the wrong number of channels"
        );
        if self.channels == 0 {
            return;
        }
        for px in self.buffer.as_mut_slice().chunks_exact_mut(self.channels) {
            px.copy_from_slice(value);
        }
    }

    /// Deep copy of the `w` × `h` rectangle at (x, y).
    pub fn sub(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Self> {
        let fits_x = x as u64 + w as u64 <= self.width as u64;
        let fits_y = y as u64 + h as u64 <= self.height as u64;
        if !fits_x || !fits_y {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: w,
                height: h,
                image_width: self.width,
                image_height: self.height,
            });
        }
        let cc = self.channels;
        let mut result = Self::with_channels(w, h, cc);
        let row = w as usize * cc;
        for i in 0..h {
            let start = cc * (x as usize + (y + i) as usize * self.width as usize);
            result
                .scanline_mut(i)
                .copy_from_slice(&self.as_slice()[start..start + row]);
        }
        Ok(result)
    }

    /// Deep copy mirrored top to bottom.
    pub fn flip_y(&self) -> Self {
        let mut result = Self::with_channels(self.width, self.height, self.channels);
        for y in 0..self.height {
            result
                .scanline_mut(self.height - y - 1)
                .copy_from_slice(self.scanline(y));
        }
        result
    }

    /// Reinterpret as an image type with channel count `N` (fixed or
    /// dynamic). Returns `None` when the channel counts disagree.
    pub fn into_channels<const N: usize>(self) -> Option<Image<K, N>> {
        let (width, height, channels) = (self.width, self.height, self.channels);
        Image::from_raw_with_channels(width, height, channels, self.into_raw())
    }
}

pub type Image1ub = Image<u8, 1>;
pub type Image3ub = Image<u8, 3>;
pub type Image4ub = Image<u8, 4>;
pub type Image1ui16 = Image<u16, 1>;
pub type Image1i = Image<i32, 1>;
pub type Image1f = Image<f32, 1>;
pub type Image2f = Image<f32, 2>;
pub type Image3f = Image<f32, 3>;
pub type Image4f = Image<f32, 4>;
pub type Image1d = Image<f64, 1>;
pub type Image3d = Image<f64, 3>;
pub type Image4d = Image<f64, 4>;
pub type ImageXub = Image<u8, DYNAMIC>;
pub type ImageXui16 = Image<u16, DYNAMIC>;
pub type ImageXf = Image<f32, DYNAMIC>;
pub type ImageXd = Image<f64, DYNAMIC>;
