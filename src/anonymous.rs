//! Type-erased image handle.
//!
//! [`AnonymousImage`] carries one of a closed set of concrete image types
//! behind a shared, cheaply clonable handle. Shape queries work without
//! knowing the concrete type; pixel access requires a checked down-cast
//! back to `Image<K, CC>`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::image::Image;
use crate::pixel::{Element, ElementKind};

// ============================================================================
// PIXEL FORMAT
// ============================================================================

/// Element type and channel count of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelFormat {
    pub element: ElementKind,
    pub channels: usize,
}

impl PixelFormat {
    pub const GRAY8: Self = Self::new(ElementKind::U8, 1);
    pub const RGB8: Self = Self::new(ElementKind::U8, 3);
    pub const RGBA8: Self = Self::new(ElementKind::U8, 4);
    pub const GRAY16: Self = Self::new(ElementKind::U16, 1);

    pub const fn new(element: ElementKind, channels: usize) -> Self {
        Self { element, channels }
    }

    pub fn of<K: Element>(channels: usize) -> Self {
        Self::new(K::KIND, channels)
    }

    /// True if an [`AnonymousImage`] can hold this format.
    pub fn is_supported(&self) -> bool {
        matches!(*self, Self::GRAY8 | Self::RGB8 | Self::RGBA8 | Self::GRAY16)
    }

    /// Bytes per pixel.
    pub fn pixel_bytes(&self) -> usize {
        self.element.byte_size() * self.channels
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.element, self.channels)
    }
}

// ============================================================================
// ANY IMAGE
// ============================================================================

/// The concrete image types an [`AnonymousImage`] can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyImage {
    Gray8(Image<u8, 1>),
    Rgb8(Image<u8, 3>),
    Rgba8(Image<u8, 4>),
    Gray16(Image<u16, 1>),
}

macro_rules! with_image {
    ($any:expr, $image:ident => $body:expr) => {
        match $any {
            AnyImage::Gray8($image) => $body,
            AnyImage::Rgb8($image) => $body,
            AnyImage::Rgba8($image) => $body,
            AnyImage::Gray16($image) => $body,
        }
    };
}

impl AnyImage {
    pub fn width(&self) -> u32 {
        with_image!(self, image => image.width())
    }

    pub fn height(&self) -> u32 {
        with_image!(self, image => image.height())
    }

    pub fn channel_count(&self) -> usize {
        with_image!(self, image => image.channel_count())
    }

    pub fn format(&self) -> PixelFormat {
        match self {
            AnyImage::Gray8(_) => PixelFormat::GRAY8,
            AnyImage::Rgb8(_) => PixelFormat::RGB8,
            AnyImage::Rgba8(_) => PixelFormat::RGBA8,
            AnyImage::Gray16(_) => PixelFormat::GRAY16,
        }
    }

    fn as_dyn(&self) -> &dyn Any {
        with_image!(self, image => image as &dyn Any)
    }

    fn as_dyn_mut(&mut self) -> &mut dyn Any {
        with_image!(self, image => image as &mut dyn Any)
    }

    fn into_dyn(self) -> Box<dyn Any> {
        with_image!(self, image => Box::new(image) as Box<dyn Any>)
    }
}

// ============================================================================
// ANONYMOUS IMAGE
// ============================================================================

/// Shape summary of an image, as reported to callers and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub format: PixelFormat,
    pub bytes: usize,
}

/// Shared handle over an image whose concrete type is known only at runtime.
///
/// Clones share the same image. Mutable access through
/// [`downcast_mut`](Self::downcast_mut) copies it first if it is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousImage {
    inner: Arc<AnyImage>,
}

impl AnonymousImage {
    /// Wrap any image, failing if its pixel type is outside the supported set.
    pub fn wrap<K: Element, const CC: usize>(image: Image<K, CC>) -> Result<Self> {
        let format = PixelFormat::of::<K>(image.channel_count());
        let (width, height) = image.dimensions();
        let data: Box<dyn Any> = Box::new(image.into_raw());

        let any = match format {
            PixelFormat::GRAY8 => rebuild(width, height, data).map(AnyImage::Gray8),
            PixelFormat::RGB8 => rebuild(width, height, data).map(AnyImage::Rgb8),
            PixelFormat::RGBA8 => rebuild(width, height, data).map(AnyImage::Rgba8),
            PixelFormat::GRAY16 => rebuild(width, height, data).map(AnyImage::Gray16),
            _ => None,
        };

        match any {
            Some(any) => Ok(Self::from(any)),
            None => {
                warn!(%format, "Rejected image with unsupported pixel format");
                Err(Error::UnsupportedFormat { format })
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn channel_count(&self) -> usize {
        self.inner.channel_count()
    }

    pub fn format(&self) -> PixelFormat {
        self.inner.format()
    }

    pub fn info(&self) -> ImageInfo {
        let format = self.format();
        ImageInfo {
            width: self.width(),
            height: self.height(),
            channels: self.channel_count(),
            format,
            bytes: self.width() as usize * self.height() as usize * format.pixel_bytes(),
        }
    }

    /// True if the held image is exactly `Image<K, CC>`.
    pub fn is<K: Element, const CC: usize>(&self) -> bool {
        self.downcast_ref::<K, CC>().is_some()
    }

    pub fn downcast_ref<K: Element, const CC: usize>(&self) -> Option<&Image<K, CC>> {
        self.inner.as_dyn().downcast_ref()
    }

    /// Mutable access to the held image, copying it first if the handle is
    /// shared.
    pub fn downcast_mut<K: Element, const CC: usize>(&mut self) -> Option<&mut Image<K, CC>> {
        if !self.is::<K, CC>() {
            return None;
        }
        Arc::make_mut(&mut self.inner).as_dyn_mut().downcast_mut()
    }

    /// Copy of the held image.
    pub fn downcast<K: Element, const CC: usize>(&self) -> Result<Image<K, CC>> {
        self.downcast_ref::<K, CC>()
            .cloned()
            .ok_or_else(|| self.mismatch::<K, CC>())
    }

    /// The held image, moved out when this is the only handle.
    pub fn into_image<K: Element, const CC: usize>(self) -> Result<Image<K, CC>> {
        if !self.is::<K, CC>() {
            return Err(self.mismatch::<K, CC>());
        }
        match Arc::try_unwrap(self.inner) {
            Ok(any) => {
                let format = any.format();
                any.into_dyn()
                    .downcast::<Image<K, CC>>()
                    .map(|image| *image)
                    .map_err(|_| Error::Conversion(format!("image holds {format} pixels")))
            }
            Err(shared) => Self { inner: shared }.downcast(),
        }
    }

    /// The tagged variant, for exhaustive matching.
    pub fn as_any(&self) -> &AnyImage {
        &self.inner
    }

    fn mismatch<K: Element, const CC: usize>(&self) -> Error {
        Error::Conversion(format!(
            "image holds {} pixels, requested {}",
            self.format(),
            PixelFormat::of::<K>(CC)
        ))
    }
}

fn rebuild<L: Element, const N: usize>(width: u32, height: u32, data: Box<dyn Any>) -> Option<Image<L, N>> {
    let data = data.downcast::<Vec<L>>().ok()?;
    Image::from_raw(width, height, *data)
}

impl From<AnyImage> for AnonymousImage {
    fn from(any: AnyImage) -> Self {
        Self {
            inner: Arc::new(any),
        }
    }
}

macro_rules! impl_from_image {
    ($variant:ident, $t:ty, $cc:literal) => {
        impl From<Image<$t, $cc>> for AnonymousImage {
            fn from(image: Image<$t, $cc>) -> Self {
                Self::from(AnyImage::$variant(image))
            }
        }
    };
}

impl_from_image!(Gray8, u8, 1);
impl_from_image!(Rgb8, u8, 3);
impl_from_image!(Rgba8, u8, 4);
impl_from_image!(Gray16, u16, 1);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Image1f, Image1ub, Image1ui16, Image3ub, Image4ub, ImageXub};
    use crate::pixel::Pixel3ub;

    #[test]
    fn test_shape_without_concrete_type() {
        let anon = AnonymousImage::from(Image4ub::new(7, 3));
        assert_eq!(anon.dimensions(), (7, 3));
        assert_eq!(anon.channel_count(), 4);
        assert_eq!(anon.format(), PixelFormat::RGBA8);
        assert_eq!(anon.info().bytes, 7 * 3 * 4);
    }

    #[test]
    fn test_is_is_exact() {
        let anon = AnonymousImage::from(Image3ub::new(2, 2));
        assert!(anon.is::<u8, 3>());
        assert!(!anon.is::<u8, 4>());
        assert!(!anon.is::<u16, 3>());
        assert!(!anon.is::<u8, 0>());
    }

    #[test]
    fn test_downcast_mismatch_is_an_error() {
        let anon = AnonymousImage::from(Image1ub::new(2, 2));
        assert!(anon.downcast_ref::<u16, 1>().is_none());
        let err = anon.downcast::<u8, 3>().unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
        assert!(err.to_string().contains("u8x1"));
        assert!(anon.into_image::<u16, 1>().is_err());
    }

    #[test]
    fn test_wrap_dynamic_channel_image() {
        let mut image = ImageXub::with_channels(2, 1, 3);
        image.fill_channels(&[1, 2, 3]);
        let anon = AnonymousImage::wrap(image).unwrap();
        assert!(anon.is::<u8, 3>());
        assert_eq!(anon.downcast::<u8, 3>().unwrap().get(1, 0), Pixel3ub::rgb(1, 2, 3));
    }

    #[test]
    fn test_wrap_rejects_unsupported_formats() {
        let err = AnonymousImage::wrap(Image1f::new(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedFormat { format } if format == PixelFormat::new(ElementKind::F32, 1)
        ));
        assert!(AnonymousImage::wrap(ImageXub::with_channels(1, 1, 2)).is_err());
    }

    #[test]
    fn test_clones_share_until_mutated() {
        let mut a = AnonymousImage::from(Image1ui16::new(2, 2));
        let b = a.clone();
        a.downcast_mut::<u16, 1>().unwrap().as_mut_slice()[0] = 500;
        assert_eq!(a.downcast_ref::<u16, 1>().unwrap().as_slice()[0], 500);
        assert_eq!(b.downcast_ref::<u16, 1>().unwrap().as_slice()[0], 0);
        assert!(a.downcast_mut::<u8, 1>().is_none());
    }

    #[test]
    fn test_into_image_unique_and_shared() {
        let image = Image3ub::from_pixel(2, 2, &Pixel3ub::rgb(4, 5, 6));
        let anon = AnonymousImage::from(image.clone());
        let shared = anon.clone();
        assert_eq!(anon.into_image::<u8, 3>().unwrap(), image);
        assert_eq!(shared.into_image::<u8, 3>().unwrap(), image);
    }

    #[test]
    fn test_as_any_matches_variant() {
        let anon = AnonymousImage::from(Image1ui16::new(1, 1));
        assert!(matches!(anon.as_any(), AnyImage::Gray16(_)));
    }

    #[test]
    fn test_format_display_and_support() {
        assert_eq!(PixelFormat::RGB8.to_string(), "u8x3");
        assert!(PixelFormat::GRAY16.is_supported());
        assert!(!PixelFormat::new(ElementKind::U16, 3).is_supported());
    }
}
