//! Whole-image transforms that produce a new image.

use crate::image::Image;
use crate::pixel::{Element, IntoPixel};

/// Map every pixel of `src` through `f`.
///
/// The output element type and channel count come from what `f` returns:
/// a `Pixel<L, N>`, or a bare scalar for single-channel output.
///
/// ```
/// use slimage::{algorithm, Image1f, Image3ub, Pixel3ub};
///
/// let rgb = Image3ub::from_pixel(2, 2, &Pixel3ub::rgb(30, 60, 90));
/// let gray: Image1f = algorithm::convert(&rgb, |p| {
///     (p[0] as f32 + p[1] as f32 + p[2] as f32) / 3.0
/// });
/// assert_eq!(gray.get(1, 1).value(), 60.0);
/// ```
pub fn convert<K, const CC: usize, L, const N: usize, P, F>(src: &Image<K, CC>, mut f: F) -> Image<L, N>
where
    K: Element,
    L: Element,
    P: IntoPixel<L, N>,
    F: FnMut(&[K]) -> P,
{
    let mut dst = Image::<L, N>::new(src.width(), src.height());
    for (mut out, px) in dst.pixels_mut().zip(src.pixels()) {
        out.set(&f(px).into_pixel());
    }
    dst
}

/// Like [`convert`], but `f` also receives the pixel coordinates.
pub fn convert_uv<K, const CC: usize, L, const N: usize, P, F>(
    src: &Image<K, CC>,
    mut f: F,
) -> Image<L, N>
where
    K: Element,
    L: Element,
    P: IntoPixel<L, N>,
    F: FnMut(u32, u32, &[K]) -> P,
{
    let mut dst = Image::<L, N>::new(src.width(), src.height());
    for y in 0..src.height() {
        for x in 0..src.width() {
            let value = f(x, y, src.pixel(x, y)).into_pixel();
            dst.set(x, y, &value);
        }
    }
    dst
}

/// Single-channel copy of channel `c`.
pub fn pick_channel<K: Element, const CC: usize>(src: &Image<K, CC>, c: usize) -> Image<K, 1> {
    let channels = src.channel_count();
    assert!(c < channels, "channel {c} out of range for {channels}-channel image");
    let mut dst = Image::<K, 1>::new(src.width(), src.height());
    dst.buffer_mut()
        .copy_from_interleaved(src.as_slice(), c, channels);
    dst
}

/// Scale 8-bit values into `[0, 1]`.
pub fn to_f32<const CC: usize>(src: &Image<u8, CC>) -> Image<f32, CC> {
    map_elements(src, |v| v as f32 / 255.0)
}

/// Scale `[0, 1]` floats (times `scale`) back to 8 bits, clamping at both
/// ends.
pub fn to_u8<const CC: usize>(src: &Image<f32, CC>, scale: f32) -> Image<u8, CC> {
    map_elements(src, |v| ((scale * 255.0 * v) as i32).clamp(0, 255) as u8)
}

/// Elementwise `a - b`.
///
/// Panics if the shapes differ. Unsigned element types overflow when
/// `b > a`; convert to a signed or float type first.
pub fn difference<K: Element, const CC: usize>(a: &Image<K, CC>, b: &Image<K, CC>) -> Image<K, CC> {
    assert!(
        a.has_same_shape(b),
        "difference of {}x{}x{} and {}x{}x{} images",
        a.width(),
        a.height(),
        a.channel_count(),
        b.width(),
        b.height(),
        b.channel_count()
    );
    let mut dst = a.clone();
    for (d, &v) in dst.as_mut_slice().iter_mut().zip(b.as_slice()) {
        *d -= v;
    }
    dst
}

/// Elementwise absolute value.
pub fn abs<K: Element, const CC: usize>(src: &Image<K, CC>) -> Image<K, CC> {
    map_elements(src, K::abs_value)
}

/// Copy `src` into the top-left corner of the smallest square power-of-two
/// canvas that holds it. The rest of the canvas is zero.
pub fn pad_to_power_of_two<K: Element, const CC: usize>(src: &Image<K, CC>) -> Image<K, CC> {
    let mut side = 1u32;
    while side < src.width() || side < src.height() {
        side *= 2;
    }
    let mut dst = Image::<K, CC>::with_channels(side, side, src.channel_count());
    let row = src.width() as usize * src.channel_count();
    for y in 0..src.height() {
        dst.scanline_mut(y)[..row].copy_from_slice(src.scanline(y));
    }
    dst
}

fn map_elements<K, L, const CC: usize>(src: &Image<K, CC>, f: impl Fn(K) -> L) -> Image<L, CC>
where
    K: Element,
    L: Element,
{
    let data = src.as_slice().iter().map(|&v| f(v)).collect();
    match Image::from_raw_with_channels(src.width(), src.height(), src.channel_count(), data) {
        Some(image) => image,
        None => unreachable!("element map preserves the image shape"),
    }
}
