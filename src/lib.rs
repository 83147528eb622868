//! Strongly-typed image containers.
//!
//! [`Image<K, CC>`](Image) stores a grid of pixels with `CC` channels of
//! element type `K` in one flat, channel-interleaved [`Buffer`].
//! [`AnonymousImage`] erases the concrete type behind a shared handle so
//! images can travel through code that only learns the pixel format at
//! runtime, and the [`host`], [`matrix`] and [`io`] adapters convert between
//! that handle and the `image` crate, `ndarray` matrices and files.
//!
//! ```
//! use slimage::{paint, AnonymousImage, Image3ub, Pixel3ub};
//!
//! let mut canvas = Image3ub::new(4, 1);
//! paint::paint_line(&mut canvas, 0, 0, 3, 0, &Pixel3ub::rgb(255, 0, 0));
//!
//! let anon = AnonymousImage::from(canvas);
//! assert!(anon.is::<u8, 3>());
//! assert_eq!(anon.downcast_ref::<u8, 3>().unwrap().get(3, 0).red(), 255);
//! ```

pub mod algorithm;
pub mod anonymous;
pub mod buffer;
pub mod error;
pub mod host;
pub mod image;
pub mod io;
pub mod iter;
pub mod matrix;
pub mod paint;
pub mod parallel;
pub mod pixel;

pub use crate::anonymous::{AnonymousImage, AnyImage, ImageInfo, PixelFormat};
pub use crate::buffer::{Buffer, BufferView, BufferViewMut};
pub use crate::error::{Error, Result};
pub use crate::image::{
    Image, Image1d, Image1f, Image1i, Image1ub, Image1ui16, Image2f, Image3d, Image3f, Image3ub,
    Image4d, Image4f, Image4ub, ImageXd, ImageXf, ImageXub, ImageXui16, DYNAMIC,
};
pub use crate::iter::{Cursor, PixelAccess, Pixels, PixelsMut};
pub use crate::matrix::NativeMatrix;
pub use crate::parallel::{ThreadingOptions, WorkerPool};
pub use crate::pixel::{
    Element, ElementKind, IntoPixel, Pixel, Pixel1f, Pixel1i, Pixel1ub, Pixel1ui16, Pixel2f,
    Pixel3f, Pixel3ub, Pixel4f, Pixel4ub,
};
