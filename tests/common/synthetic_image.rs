use slimage::{Image1ub, Image1ui16, Image3ub, Image4ub, Pixel3ub, Pixel4ub};

/// RGB image whose channels encode x, y and x + y.
pub fn gradient_rgb(width: u32, height: u32) -> Image3ub {
    let mut img = Image3ub::new(width, height);
    for y in 0..height {
        for x in 0..width {
            img.set(x, y, &Pixel3ub::rgb((x * 7) as u8, (y * 13) as u8, (x + y) as u8));
        }
    }
    img
}

/// RGBA image with a varying alpha channel.
pub fn gradient_rgba(width: u32, height: u32) -> Image4ub {
    let mut img = Image4ub::new(width, height);
    for y in 0..height {
        for x in 0..width {
            img.set(x, y, &Pixel4ub::new([x as u8, y as u8, 200, (x * y) as u8]));
        }
    }
    img
}

/// Gray checkerboard with `cell`-pixel squares.
pub fn checkerboard_gray(width: u32, height: u32, cell: u32) -> Image1ub {
    assert!(cell > 0, "cell size must be positive");
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| if (x / cell + y / cell) % 2 == 0 { 32 } else { 220 }))
        .collect();
    Image1ub::from_raw(width, height, data).expect("checkerboard size")
}

/// 16-bit ramp spanning most of the sample range.
pub fn ramp_gray16(width: u32, height: u32) -> Image1ui16 {
    let data = (0..width * height).map(|i| (i * 977 % 65_536) as u16).collect();
    Image1ui16::from_raw(width, height, data).expect("ramp size")
}
