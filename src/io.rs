//! Loading and saving images by path.
//!
//! File codecs come from the `image` crate, with the format picked from the
//! file extension. The ASCII 16-bit PGM reader and writer are handled here
//! directly.

use std::fmt::Write as _;
use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::anonymous::AnonymousImage;
use crate::error::{Error, Result};
use crate::host;
use crate::image::{Image, Image1ub, Image1ui16, Image3ub, Image4ub};
use crate::pixel::Element;

/// Largest sample an ASCII 16-bit PGM may hold.
pub const PGM16_MAX_VALUE: u32 = 65_535;

// ============================================================================
// HOST CODECS
// ============================================================================

fn open_dynamic(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(Error::Io {
            path: path.to_path_buf(),
            message: "file does not exist".to_string(),
        });
    }

    let img = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(Error::Io {
            path: path.to_path_buf(),
            message: "decoded to an empty image".to_string(),
        });
    }

    debug!(path = %path.display(), width = img.width(), height = img.height(), color = ?img.color(), "Loaded image");
    Ok(img)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Io {
                path: path.to_path_buf(),
                message: format!("cannot create {}: {e}", parent.display()),
            })?;
        }
    }
    Ok(())
}

/// Load an image, keeping the pixel type the file decodes to.
///
/// Fails with a conversion error when that type has no matching image type
/// (for example 16-bit RGB).
pub fn load<P: AsRef<Path>>(path: P) -> Result<AnonymousImage> {
    host::from_dynamic(open_dynamic(path.as_ref())?)
}

/// Save an image, creating missing parent directories.
pub fn save<P: AsRef<Path>>(path: P, image: &AnonymousImage) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let dynamic = host::to_dynamic(image)?;
    dynamic.save(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), format = %image.format(), "Saved image");
    Ok(())
}

/// Load as 8-bit gray, converting color files.
pub fn load_1ub<P: AsRef<Path>>(path: P) -> Result<Image1ub> {
    let buf = open_dynamic(path.as_ref())?.into_luma8();
    let (width, height) = buf.dimensions();
    typed(width, height, buf.into_raw())
}

/// Load as 8-bit RGB, converting other color types.
pub fn load_3ub<P: AsRef<Path>>(path: P) -> Result<Image3ub> {
    let buf = open_dynamic(path.as_ref())?.into_rgb8();
    let (width, height) = buf.dimensions();
    typed(width, height, buf.into_raw())
}

/// Load as 8-bit RGBA, converting other color types.
pub fn load_4ub<P: AsRef<Path>>(path: P) -> Result<Image4ub> {
    let buf = open_dynamic(path.as_ref())?.into_rgba8();
    let (width, height) = buf.dimensions();
    typed(width, height, buf.into_raw())
}

/// Load as 16-bit gray, converting other color types.
pub fn load_1ui16<P: AsRef<Path>>(path: P) -> Result<Image1ui16> {
    let buf = open_dynamic(path.as_ref())?.into_luma16();
    let (width, height) = buf.dimensions();
    typed(width, height, buf.into_raw())
}

fn typed<K: Element, const CC: usize>(width: u32, height: u32, data: Vec<K>) -> Result<Image<K, CC>> {
    Image::from_raw(width, height, data).ok_or_else(|| {
        Error::Conversion(format!("decoded buffer does not match {width}x{height}x{CC}"))
    })
}

pub fn save_1ub<P: AsRef<Path>>(path: P, image: &Image1ub) -> Result<()> {
    save(path, &AnonymousImage::from(image.clone()))
}

pub fn save_3ub<P: AsRef<Path>>(path: P, image: &Image3ub) -> Result<()> {
    save(path, &AnonymousImage::from(image.clone()))
}

pub fn save_4ub<P: AsRef<Path>>(path: P, image: &Image4ub) -> Result<()> {
    save(path, &AnonymousImage::from(image.clone()))
}

pub fn save_1ui16<P: AsRef<Path>>(path: P, image: &Image1ui16) -> Result<()> {
    save(path, &AnonymousImage::from(image.clone()))
}

// ============================================================================
// ASCII PGM (P2, 16 BIT)
// ============================================================================

/// Read an ASCII 16-bit PGM file.
pub fn load_pgm16<P: AsRef<Path>>(path: P) -> Result<Image1ui16> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let image = parse_pgm16(&text)?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Loaded PGM");
    Ok(image)
}

/// Parse ASCII 16-bit PGM text.
///
/// Layout: `P2`, then `width height`, then the maximum value, then one line
/// per row holding exactly `width` samples. Blank lines and lines starting
/// with `#` are skipped.
pub fn parse_pgm16(text: &str) -> Result<Image1ui16> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (line_no, magic) = lines.next().ok_or_else(|| parse_error(1, "missing P2 magic"))?;
    if magic != "P2" {
        return Err(parse_error(line_no, format!("expected P2 magic, found '{magic}'")));
    }

    let (dims_line, dims) = lines
        .next()
        .ok_or_else(|| parse_error(line_no + 1, "missing image dimensions"))?;
    let dims: Vec<&str> = dims.split_whitespace().collect();
    let [w, h] = dims.as_slice() else {
        return Err(parse_error(dims_line, "expected 'width height'"));
    };
    let width: u32 = parse_number(dims_line, w)?;
    let height: u32 = parse_number(dims_line, h)?;

    let (line_no, max) = lines
        .next()
        .ok_or_else(|| parse_error(dims_line + 1, "missing maximum value"))?;
    let max_value: u32 = parse_number(line_no, max)?;
    if max_value > PGM16_MAX_VALUE {
        return Err(parse_error(
            line_no,
            format!("maximum value {max_value} exceeds {PGM16_MAX_VALUE}"),
        ));
    }

    let total = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| parse_error(dims_line, format!("{width}x{height} image is too large")))?;

    // Capacity is bounded by the text, not by the header.
    let mut data: Vec<u16> = Vec::with_capacity(total.min(text.len() / 2));
    // Zero-width rows are empty lines, which are skipped.
    let mut rows = if width == 0 { height } else { 0 };
    let mut last_line = line_no;

    for (line_no, line) in lines {
        last_line = line_no;
        if rows == height {
            return Err(parse_error(line_no, format!("more than {height} rows")));
        }

        let mut count = 0usize;
        for token in line.split_whitespace() {
            if count == width as usize {
                count += 1;
                break;
            }
            let sample: u32 = parse_number(line_no, token)?;
            if sample > PGM16_MAX_VALUE {
                return Err(parse_error(
                    line_no,
                    format!("sample {sample} exceeds {PGM16_MAX_VALUE}"),
                ));
            }
            data.push(sample as u16);
            count += 1;
        }
        if count != width as usize {
            return Err(parse_error(
                line_no,
                format!("expected {width} samples per row"),
            ));
        }
        rows += 1;
    }

    if rows != height {
        return Err(parse_error(
            last_line + 1,
            format!("expected {height} rows, found {rows}"),
        ));
    }

    Image1ui16::from_raw(width, height, data)
        .ok_or_else(|| parse_error(last_line, "sample count does not match the header"))
}

/// Write an ASCII 16-bit PGM file, creating missing parent directories.
pub fn save_pgm16<P: AsRef<Path>>(path: P, image: &Image1ui16) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    std::fs::write(path, format_pgm16(image)).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Saved PGM");
    Ok(())
}

/// ASCII 16-bit PGM text for `image`.
pub fn format_pgm16(image: &Image1ui16) -> String {
    let mut text = format!(
        "P2\n{} {}\n{}\n",
        image.width(),
        image.height(),
        PGM16_MAX_VALUE
    );
    for y in 0..image.height() {
        let row: Vec<String> = image.scanline(y).iter().map(|v| v.to_string()).collect();
        let _ = writeln!(text, "{}", row.join(" "));
    }
    text
}

fn parse_error(line: usize, reason: impl Into<String>) -> Error {
    Error::Parse {
        line,
        reason: reason.into(),
    }
}

fn parse_number(line: usize, token: &str) -> Result<u32> {
    token
        .parse()
        .map_err(|_| parse_error(line, format!("'{token}' is not a non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("slimage-io-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_parse_pgm16() {
        let text = "P2\n# made by hand\n3 2\n65535\n1 2 3\n40000 0 65535\n\n";
        let image = parse_pgm16(text).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.scanline(0), &[1, 2, 3]);
        assert_eq!(image.get(0, 1).value(), 40_000);
        assert_eq!(image.get(2, 1).value(), 65_535);
    }

    #[test]
    fn test_pgm16_text_round_trip() {
        let image = Image1ui16::from_raw(2, 3, vec![0, 1, 300, 4000, 50_000, 65_535]).unwrap();
        let text = format_pgm16(&image);
        assert!(text.starts_with("P2\n2 3\n65535\n"));
        assert_eq!(parse_pgm16(&text).unwrap(), image);
    }

    fn parse_error_line(text: &str) -> usize {
        match parse_pgm16(text) {
            Err(Error::Parse { line, .. }) => line,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_pgm16_errors_report_line() {
        assert_eq!(parse_error_line("P5\n1 1\n255\n0\n"), 1);
        assert_eq!(parse_error_line("P2\n1\n255\n0\n"), 2);
        assert_eq!(parse_error_line("P2\n2 1\n65535\n1 x\n"), 4);
        assert_eq!(parse_error_line("P2\n2 1\n65535\n1 70000\n"), 4);
        assert_eq!(parse_error_line("P2\n2 1\n65535\n1 2 3\n"), 4);
        assert_eq!(parse_error_line("P2\n2 1\n65535\n1\n"), 4);
        assert_eq!(parse_error_line("P2\n1 2\n65535\n1\n"), 5);
        assert_eq!(parse_error_line("P2\n1 1\n65535\n1\n2\n"), 5);
        assert_eq!(parse_error_line("P2\n1 1\n-1\n1\n"), 3);
        assert_eq!(parse_error_line(""), 1);
    }

    #[test]
    fn test_pgm16_huge_header_is_a_parse_error() {
        assert_eq!(parse_error_line("P2\n4294967295 4294967295\n65535\n1\n"), 4);
        assert_eq!(parse_error_line("P2\n4294967295 3\n65535\n"), 4);
        assert!(parse_pgm16("P2\n0 4294967295\n65535\n").unwrap().is_null());
    }

    #[test]
    fn test_save_under_regular_file_reports_path() {
        let blocker = temp_path("blocker.txt");
        std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        std::fs::write(&blocker, b"not a directory").unwrap();

        let target = blocker.join("sub/out.png");
        let image = AnonymousImage::from(Image1ub::new(1, 1));
        let err = save(&target, &image).unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path == &target));
        assert!(err.to_string().contains("out.png"));

        let pgm = blocker.join("sub/out.pgm");
        let err = save_pgm16(&pgm, &Image1ui16::new(1, 1)).unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path == &pgm));

        let _ = std::fs::remove_file(&blocker);
    }

    #[test]
    fn test_pgm16_file_round_trip() {
        let path = temp_path("nested/deep.pgm");
        let image = Image1ui16::from_raw(2, 1, vec![7, 65_000]).unwrap();
        save_pgm16(&path, &image).unwrap();
        assert_eq!(load_pgm16(&path).unwrap(), image);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(temp_path("missing.png")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("missing.png"));
        assert!(matches!(load_pgm16(temp_path("missing.pgm")), Err(Error::Io { .. })));
    }

    #[test]
    fn test_typed_load_converts() {
        let path = temp_path("gray-to-rgb.png");
        let gray = Image1ub::from_raw(2, 1, vec![10, 250]).unwrap();
        save_1ub(&path, &gray).unwrap();

        let rgb = load_3ub(&path).unwrap();
        assert_eq!(rgb.pixel(1, 0), &[250, 250, 250]);
        assert_eq!(load_1ub(&path).unwrap(), gray);
        assert!(load(&path).unwrap().is::<u8, 1>());
        let _ = std::fs::remove_file(&path);
    }
}
