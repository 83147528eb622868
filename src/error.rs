use std::path::PathBuf;

use thiserror::Error;

use crate::anonymous::PixelFormat;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error with file '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("Image codec error with file '{}': {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Unsupported pixel format: {format}")]
    UnsupportedFormat { format: PixelFormat },

    #[error(
        "Sub image {width}x{height} at ({x}, {y}) exceeds {image_width}x{image_height} image"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Pixel count mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
