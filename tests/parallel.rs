mod common;

use common::synthetic_image::{checkerboard_gray, gradient_rgb};
use slimage::parallel::{partition, process, process_pair};
use slimage::{algorithm, Error, Image1f, ThreadingOptions, WorkerPool};

#[test]
fn parallel_gray_matches_sequential_convert() {
    let rgb = gradient_rgb(101, 37);
    let expected: Image1f = algorithm::convert(&rgb, |p| {
        (p[0] as f32 + p[1] as f32 + p[2] as f32) / 3.0
    });

    for threads in [1, 2, 3, 8] {
        let pool = WorkerPool::new(&ThreadingOptions { threads }).unwrap();
        let mut gray = Image1f::new(101, 37);
        process_pair(&pool, &mut gray, &rgb, |d, s| {
            d[0] = (s[0] as f32 + s[1] as f32 + s[2] as f32) / 3.0;
        })
        .unwrap();
        assert_eq!(gray, expected, "threads = {threads}");
    }
}

#[test]
fn partitions_cover_every_pixel_once() {
    for (count, parts) in [(0, 4), (1, 4), (3737, 8), (64, 64)] {
        let ranges = partition(count, parts);
        assert_eq!(ranges.len(), parts);
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(count));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }
}

#[test]
fn threshold_in_place() {
    let pool = WorkerPool::new(&ThreadingOptions { threads: 4 }).unwrap();
    let mut img = checkerboard_gray(16, 16, 4);
    process(&pool, &mut img, |px| px[0] = if px[0] > 128 { 255 } else { 0 });
    assert!(img.pixels().all(|p| p[0] == 0 || p[0] == 255));
    assert_eq!(img.pixels().filter(|p| p[0] == 255).count(), 128);
}

#[test]
fn pair_size_mismatch_is_an_error() {
    let pool = WorkerPool::new(&ThreadingOptions { threads: 2 }).unwrap();
    let mut gray = Image1f::new(4, 4);
    let rgb = gradient_rgb(4, 5);
    let result = process_pair(&pool, &mut gray, &rgb, |_, _| {});
    assert!(matches!(result, Err(Error::ShapeMismatch { expected: 16, actual: 20 })));
}
