//! Conversion to and from the `image` crate's [`DynamicImage`].
//!
//! Supported pairs: `L8` ↔ `Image<u8, 1>`, `Rgb8` ↔ `Image<u8, 3>`,
//! `Rgba8` ↔ `Image<u8, 4>`, `L16` ↔ `Image<u16, 1>`. Both sides store RGB
//! order, so pixels are copied as-is.

use image::{DynamicImage, ImageBuffer, Luma, Pixel as HostPixel, Rgb, Rgba};
use tracing::warn;

use crate::anonymous::{AnonymousImage, AnyImage};
use crate::error::{Error, Result};
use crate::image::Image;
use crate::pixel::Element;

/// Copy into a host image.
pub fn to_dynamic(image: &AnonymousImage) -> Result<DynamicImage> {
    let dynamic = match image.as_any() {
        AnyImage::Gray8(img) => DynamicImage::ImageLuma8(to_host::<Luma<u8>, 1>(img)?),
        AnyImage::Rgb8(img) => DynamicImage::ImageRgb8(to_host::<Rgb<u8>, 3>(img)?),
        AnyImage::Rgba8(img) => DynamicImage::ImageRgba8(to_host::<Rgba<u8>, 4>(img)?),
        AnyImage::Gray16(img) => DynamicImage::ImageLuma16(to_host::<Luma<u16>, 1>(img)?),
    };
    Ok(dynamic)
}

/// Take over a host image. Color types without a matching image type are
/// rejected rather than converted.
pub fn from_dynamic(dynamic: DynamicImage) -> Result<AnonymousImage> {
    let image = match dynamic {
        DynamicImage::ImageLuma8(buf) => AnonymousImage::from(from_host::<_, 1>(buf)?),
        DynamicImage::ImageRgb8(buf) => AnonymousImage::from(from_host::<_, 3>(buf)?),
        DynamicImage::ImageRgba8(buf) => AnonymousImage::from(from_host::<_, 4>(buf)?),
        DynamicImage::ImageLuma16(buf) => AnonymousImage::from(from_host::<_, 1>(buf)?),
        other => {
            let color = other.color();
            warn!(?color, "Host image color type has no matching image type");
            return Err(Error::Conversion(format!(
                "unsupported host color type {color:?}"
            )));
        }
    };
    Ok(image)
}

fn to_host<P, const CC: usize>(image: &Image<P::Subpixel, CC>) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: HostPixel,
    P::Subpixel: Element,
{
    let (width, height) = image.dimensions();
    ImageBuffer::from_raw(width, height, image.as_slice().to_vec()).ok_or_else(|| {
        Error::Conversion(format!(
            "{width}x{height}x{CC} image does not fit a host buffer"
        ))
    })
}

fn from_host<P, const CC: usize>(buf: ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Image<P::Subpixel, CC>>
where
    P: HostPixel,
    P::Subpixel: Element,
{
    let (width, height) = buf.dimensions();
    Image::from_raw(width, height, buf.into_raw()).ok_or_else(|| {
        Error::Conversion(format!(
            "host buffer does not hold {width}x{height}x{CC} samples"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Image1ub, Image1ui16, Image3ub, Image4ub};
    use crate::pixel::{Pixel1ui16, Pixel3ub, Pixel4ub};
    use image::{GrayImage, Rgb32FImage, RgbImage};

    #[test]
    fn test_rgb_keeps_channel_order() {
        let image = Image3ub::from_pixel(2, 1, &Pixel3ub::rgb(200, 100, 0));
        let dynamic = to_dynamic(&image.into()).unwrap();
        let rgb = dynamic.as_rgb8().unwrap();
        assert_eq!(rgb.get_pixel(1, 0).0, [200, 100, 0]);
    }

    #[test]
    fn test_round_trip_every_supported_type() {
        let gray = Image1ub::from_raw(2, 2, vec![1, 2, 3, 4]).unwrap();
        let rgba = Image4ub::from_pixel(3, 1, &Pixel4ub::new([1, 2, 3, 4]));
        let deep = Image1ui16::from_pixel(1, 2, &Pixel1ui16::from_value(40_000));

        let back = from_dynamic(to_dynamic(&gray.clone().into()).unwrap()).unwrap();
        assert_eq!(back.downcast::<u8, 1>().unwrap(), gray);
        let back = from_dynamic(to_dynamic(&rgba.clone().into()).unwrap()).unwrap();
        assert_eq!(back.downcast::<u8, 4>().unwrap(), rgba);
        let back = from_dynamic(to_dynamic(&deep.clone().into()).unwrap()).unwrap();
        assert_eq!(back.downcast::<u16, 1>().unwrap(), deep);
    }

    #[test]
    fn test_from_dynamic_matches_variant() {
        let host = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, image::Rgb([9, 8, 7])));
        let anon = from_dynamic(host).unwrap();
        assert!(anon.is::<u8, 3>());
        assert_eq!(anon.dimensions(), (4, 2));

        let anon = from_dynamic(DynamicImage::ImageLuma8(GrayImage::new(1, 1))).unwrap();
        assert!(anon.is::<u8, 1>());
    }

    #[test]
    fn test_unsupported_host_type_is_rejected() {
        let host = DynamicImage::ImageRgb32F(Rgb32FImage::new(2, 2));
        assert!(matches!(from_dynamic(host), Err(Error::Conversion(_))));
    }
}
