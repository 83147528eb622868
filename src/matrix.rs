//! Interop with `ndarray` matrices in the OpenCV memory convention.
//!
//! A [`NativeMatrix`] is a (rows, cols, channels) array whose color channels
//! are stored blue first. Converting swaps red and blue for 3- and 4-channel
//! images; single-channel data passes through untouched.

use ndarray::Array3;
use tracing::{debug, warn};

use crate::anonymous::{AnonymousImage, AnyImage};
use crate::error::{Error, Result};
use crate::image::Image;
use crate::pixel::{Element, ElementKind};

#[derive(Debug, Clone, PartialEq)]
pub enum NativeMatrix {
    U8(Array3<u8>),
    U16(Array3<u16>),
}

impl NativeMatrix {
    /// (rows, cols, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        match self {
            NativeMatrix::U8(m) => m.dim(),
            NativeMatrix::U16(m) => m.dim(),
        }
    }

    pub fn element(&self) -> ElementKind {
        match self {
            NativeMatrix::U8(_) => ElementKind::U8,
            NativeMatrix::U16(_) => ElementKind::U16,
        }
    }
}

/// Copy an image into a BGR(A) matrix.
pub fn to_matrix(image: &AnonymousImage) -> Result<NativeMatrix> {
    let matrix = match image.as_any() {
        AnyImage::Gray8(img) => NativeMatrix::U8(image_to_array(img, false)?),
        AnyImage::Rgb8(img) => NativeMatrix::U8(image_to_array(img, true)?),
        AnyImage::Rgba8(img) => NativeMatrix::U8(image_to_array(img, true)?),
        AnyImage::Gray16(img) => NativeMatrix::U16(image_to_array(img, false)?),
    };
    debug!(shape = ?matrix.shape(), "Converted image to native matrix");
    Ok(matrix)
}

/// Copy a BGR(A) matrix into an image.
///
/// Accepts 1, 3 or 4 channels of `u8` and 1 channel of `u16`.
pub fn from_matrix(matrix: &NativeMatrix) -> Result<AnonymousImage> {
    let image = match (matrix, matrix.shape().2) {
        (NativeMatrix::U8(m), 1) => AnonymousImage::from(array_to_image::<u8, 1>(m, false)?),
        (NativeMatrix::U8(m), 3) => AnonymousImage::from(array_to_image::<u8, 3>(m, true)?),
        (NativeMatrix::U8(m), 4) => AnonymousImage::from(array_to_image::<u8, 4>(m, true)?),
        (NativeMatrix::U16(m), 1) => AnonymousImage::from(array_to_image::<u16, 1>(m, false)?),
        (other, channels) => {
            warn!(element = %other.element(), channels, "Native matrix type not recognized");
            return Err(Error::Conversion(format!(
                "native matrix of {channels} {} channels is not supported",
                other.element()
            )));
        }
    };
    Ok(image)
}

fn swap_red_blue<K: Element>(data: &mut [K], channels: usize) {
    for px in data.chunks_exact_mut(channels) {
        px.swap(0, 2);
    }
}

fn image_to_array<K: Element, const CC: usize>(image: &Image<K, CC>, swap: bool) -> Result<Array3<K>> {
    let (width, height) = image.dimensions();
    let channels = image.channel_count();
    let mut data = image.as_slice().to_vec();
    if swap {
        swap_red_blue(&mut data, channels);
    }
    Array3::from_shape_vec((height as usize, width as usize, channels), data)
        .map_err(|e| Error::Conversion(format!("cannot shape native matrix: {e}")))
}

fn array_to_image<K: Element, const CC: usize>(array: &Array3<K>, swap: bool) -> Result<Image<K, CC>> {
    let (rows, cols, channels) = array.dim();
    let width = u32::try_from(cols)
        .map_err(|_| Error::Conversion(format!("{cols} columns exceed the image width range")))?;
    let height = u32::try_from(rows)
        .map_err(|_| Error::Conversion(format!("{rows} rows exceed the image height range")))?;

    // Logical order, whatever the array's strides.
    let mut data: Vec<K> = array.iter().copied().collect();
    if swap {
        swap_red_blue(&mut data, channels);
    }
    Image::from_raw(width, height, data).ok_or_else(|| {
        Error::Conversion(format!(
            "{rows}x{cols}x{channels} matrix does not match a {CC}-channel image"
        ))
    })
}
