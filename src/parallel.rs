//! Partitioned per-pixel processing on a worker pool.
//!
//! An image's pixels are split into contiguous partitions, one per worker,
//! and each partition is handed to exactly one worker. Calls block until
//! every partition is done.

use std::ops::Range;

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::image::Image;
use crate::pixel::Element;

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadingOptions {
    /// Number of workers. 1 runs everything on the calling thread.
    pub threads: usize,
}

impl ThreadingOptions {
    pub fn single() -> Self {
        Self { threads: 1 }
    }
}

impl Default for ThreadingOptions {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

// ============================================================================
// WORKER POOL
// ============================================================================

/// Workers that run partitioned image jobs.
pub struct WorkerPool {
    threads: usize,
    pool: Option<ThreadPool>,
}

impl WorkerPool {
    pub fn new(options: &ThreadingOptions) -> Result<Self> {
        if options.threads == 0 {
            return Err(Error::InvalidParameter(
                "worker pool needs at least one thread".to_string(),
            ));
        }

        let pool = if options.threads == 1 {
            None
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .thread_name(|i| format!("slimage-worker-{i}"))
                .build()
                .map_err(|e| Error::InvalidParameter(format!("cannot start worker pool: {e}")))?;
            Some(pool)
        };

        debug!(threads = options.threads, "Created worker pool");
        Ok(Self {
            threads: options.threads,
            pool,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    fn run<T: Send>(&self, jobs: Vec<T>, work: impl Fn(T) + Sync) {
        match &self.pool {
            Some(pool) => pool.scope(|s| {
                let work = &work;
                for job in jobs {
                    s.spawn(move |_| work(job));
                }
            }),
            None => jobs.into_iter().for_each(work),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

// ============================================================================
// PARTITIONING
// ============================================================================

/// Split `pixel_count` pixels into `parts` contiguous ranges of equal size,
/// the last range also taking the remainder.
pub fn partition(pixel_count: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let chunk = pixel_count / parts;
    (0..parts)
        .map(|i| {
            let end = if i + 1 == parts { pixel_count } else { (i + 1) * chunk };
            i * chunk..end
        })
        .collect()
}

fn split_mut<'a, T>(mut data: &'a mut [T], ranges: &[Range<usize>], channels: usize) -> Vec<&'a mut [T]> {
    let mut out = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(range.len() * channels);
        out.push(head);
        data = tail;
    }
    out
}

fn split<'a, T>(mut data: &'a [T], ranges: &[Range<usize>], channels: usize) -> Vec<&'a [T]> {
    let mut out = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = data.split_at(range.len() * channels);
        out.push(head);
        data = tail;
    }
    out
}

// ============================================================================
// PROCESSING
// ============================================================================

/// Run `f` on every pixel of `image`.
pub fn process<K, const CC: usize, F>(pool: &WorkerPool, image: &mut Image<K, CC>, f: F)
where
    K: Element,
    F: Fn(&mut [K]) + Sync,
{
    let channels = image.channel_count();
    if image.is_null() {
        return;
    }

    let ranges = partition(image.size(), pool.threads());
    debug!(pixels = image.size(), partitions = ranges.len(), "Processing image");

    let jobs = split_mut(image.as_mut_slice(), &ranges, channels);
    pool.run(jobs, |chunk| {
        for px in chunk.chunks_exact_mut(channels) {
            f(px);
        }
    });
}

/// Run `f` on every pixel of `target` together with the pixel at the same
/// index in `source`.
///
/// Fails if the two images have different pixel counts.
pub fn process_pair<K, const CC: usize, L, const N: usize, F>(
    pool: &WorkerPool,
    target: &mut Image<K, CC>,
    source: &Image<L, N>,
    f: F,
) -> Result<()>
where
    K: Element,
    L: Element,
    F: Fn(&mut [K], &[L]) + Sync,
{
    if target.size() != source.size() {
        return Err(Error::ShapeMismatch {
            expected: target.size(),
            actual: source.size(),
        });
    }
    if target.is_null() || source.is_null() {
        return Ok(());
    }

    let (tc, sc) = (target.channel_count(), source.channel_count());
    let ranges = partition(target.size(), pool.threads());
    debug!(pixels = target.size(), partitions = ranges.len(), "Processing image pair");

    let jobs: Vec<_> = split_mut(target.as_mut_slice(), &ranges, tc)
        .into_iter()
        .zip(split(source.as_slice(), &ranges, sc))
        .collect();
    pool.run(jobs, |(dst, src)| {
        for (d, s) in dst.chunks_exact_mut(tc).zip(src.chunks_exact(sc)) {
            f(d, s);
        }
    });
    Ok(())
}

/// Run `f` on every pixel of `target` together with the pixels at the same
/// index in `first` and `second`.
///
/// Fails if the three images do not all have the same pixel count.
pub fn process_triple<K, const CC: usize, L, const N: usize, M, const O: usize, F>(
    pool: &WorkerPool,
    target: &mut Image<K, CC>,
    first: &Image<L, N>,
    second: &Image<M, O>,
    f: F,
) -> Result<()>
where
    K: Element,
    L: Element,
    M: Element,
    F: Fn(&mut [K], &[L], &[M]) + Sync,
{
    for actual in [first.size(), second.size()] {
        if actual != target.size() {
            return Err(Error::ShapeMismatch {
                expected: target.size(),
                actual,
            });
        }
    }
    if target.is_null() || first.is_null() || second.is_null() {
        return Ok(());
    }

    let (tc, ac, bc) = (
        target.channel_count(),
        first.channel_count(),
        second.channel_count(),
    );
    let ranges = partition(target.size(), pool.threads());
    debug!(pixels = target.size(), partitions = ranges.len(), "Processing image triple");

    let jobs: Vec<_> = split_mut(target.as_mut_slice(), &ranges, tc)
        .into_iter()
        .zip(split(first.as_slice(), &ranges, ac))
        .zip(split(second.as_slice(), &ranges, bc))
        .collect();
    pool.run(jobs, |((dst, a), b)| {
        for ((d, x), y) in dst
            .chunks_exact_mut(tc)
            .zip(a.chunks_exact(ac))
            .zip(b.chunks_exact(bc))
        {
            f(d, x, y);
        }
    });
    Ok(())
}
