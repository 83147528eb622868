mod common;

use common::synthetic_image::{checkerboard_gray, gradient_rgb, gradient_rgba, ramp_gray16};
use common::temp_path;
use slimage::{host, io, matrix, AnonymousImage, Error, Image3ub, NativeMatrix, Pixel3ub};

fn supported_images() -> Vec<AnonymousImage> {
    vec![
        checkerboard_gray(9, 5, 2).into(),
        gradient_rgb(6, 4).into(),
        gradient_rgba(3, 7).into(),
        ramp_gray16(5, 5).into(),
    ]
}

#[test]
fn png_round_trip_reproduces_pixels() {
    let mut img = Image3ub::new(2, 2);
    img.set(0, 0, &Pixel3ub::rgb(255, 0, 0));
    img.set(1, 0, &Pixel3ub::rgb(0, 255, 0));
    img.set(0, 1, &Pixel3ub::rgb(0, 0, 255));
    img.set(1, 1, &Pixel3ub::rgb(255, 255, 255));

    let path = temp_path("png", "out/rgb.png");
    io::save(&path, &AnonymousImage::from(img.clone())).unwrap();

    let loaded = io::load(&path).unwrap();
    assert_eq!(loaded.dimensions(), (2, 2));
    assert_eq!(loaded.channel_count(), 3);
    assert_eq!(loaded.downcast::<u8, 3>().unwrap(), img);
    assert_eq!(io::load_3ub(&path).unwrap(), img);
    assert_eq!(loaded.downcast_ref::<u8, 3>().unwrap().pixel(1, 1), &[255, 255, 255]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn every_supported_type_survives_a_file() {
    for (i, image) in supported_images().into_iter().enumerate() {
        let path = temp_path("files", &format!("image-{i}.png"));
        io::save(&path, &image).unwrap();
        assert_eq!(io::load(&path).unwrap(), image, "format {}", image.format());
        let _ = std::fs::remove_file(&path);
    }
}

#[test]
fn dynamic_image_round_trip_is_exact() {
    for image in supported_images() {
        let back = host::from_dynamic(host::to_dynamic(&image).unwrap()).unwrap();
        assert_eq!(back, image, "format {}", image.format());
    }
}

#[test]
fn matrix_round_trip_is_exact() {
    for image in supported_images() {
        let matrix = matrix::to_matrix(&image).unwrap();
        let (rows, cols, channels) = matrix.shape();
        assert_eq!((cols as u32, rows as u32), image.dimensions());
        assert_eq!(channels, image.channel_count());
        assert_eq!(matrix::from_matrix(&matrix).unwrap(), image);
    }
}

#[test]
fn matrix_channel_order_is_bgr() {
    let rgb = Image3ub::from_pixel(1, 1, &Pixel3ub::rgb(1, 2, 3));
    match matrix::to_matrix(&rgb.into()).unwrap() {
        NativeMatrix::U8(m) => assert_eq!(m.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]),
        NativeMatrix::U16(_) => panic!("expected an 8-bit matrix"),
    }
}

#[test]
fn anonymous_type_checks() {
    let gray = AnonymousImage::from(checkerboard_gray(4, 4, 1));
    assert!(gray.is::<u8, 1>());
    assert!(!gray.is::<u8, 3>());
    assert!(!gray.is::<u16, 1>());
    assert!(gray.downcast_ref::<u16, 1>().is_none());
    assert!(matches!(gray.downcast::<u8, 4>(), Err(Error::Conversion(_))));
}

#[test]
fn load_missing_file_names_the_path() {
    let path = temp_path("missing", "nope.png");
    let err = io::load(&path).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("nope.png"));
}

#[test]
fn load_garbage_is_a_codec_error() {
    let path = temp_path("garbage", "broken.png");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"definitely not a png").unwrap();
    assert!(matches!(io::load(&path), Err(Error::Image { .. })));
    let _ = std::fs::remove_file(&path);
}
