//! Pixel-granularity iteration over channel-strided memory.
//!
//! Every iterator here steps by the image's channel count, so one step is one
//! pixel regardless of how many elements that pixel holds.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};
use std::slice::{ChunksExact, ChunksExactMut};

use crate::pixel::{Element, Pixel};

// ============================================================================
// PIXEL ACCESS
// ============================================================================

/// Mutable view of one pixel's channels inside an image.
#[derive(Debug)]
pub struct PixelAccess<'a, K, const CC: usize> {
    data: &'a mut [K],
}

impl<'a, K: Element, const CC: usize> PixelAccess<'a, K, CC> {
    pub(crate) fn new(data: &'a mut [K]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[K] {
        &*self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [K] {
        &mut *self.data
    }

    /// Copy of the viewed pixel.
    pub fn get(&self) -> Pixel<K, CC> {
        Pixel::from_slice(&*self.data)
    }

    pub fn set(&mut self, p: &Pixel<K, CC>) {
        self.data.copy_from_slice(p.as_slice());
    }

    pub fn set_channels(&mut self, src: &[K]) {
        self.data.copy_from_slice(src);
    }

    /// `self += src`, channel by channel.
    pub fn add_assign_from(&mut self, src: &[K]) {
        debug_assert_eq!(src.len(), self.data.len());
        for (a, &b) in self.data.iter_mut().zip(src) {
            *a += b;
        }
    }

    /// `self -= src`, channel by channel.
    pub fn sub_assign_from(&mut self, src: &[K]) {
        debug_assert_eq!(src.len(), self.data.len());
        for (a, &b) in self.data.iter_mut().zip(src) {
            *a -= b;
        }
    }

    /// `self = s * src`
    pub fn set_scaled(&mut self, s: K, src: &[K]) {
        debug_assert_eq!(src.len(), self.data.len());
        for (a, &b) in self.data.iter_mut().zip(src) {
            *a = s * b;
        }
    }

    /// `self += s * src`
    pub fn add_scaled(&mut self, s: K, src: &[K]) {
        debug_assert_eq!(src.len(), self.data.len());
        for (a, &b) in self.data.iter_mut().zip(src) {
            *a += s * b;
        }
    }

    /// `self = srcs[0] + srcs[1] + ...`; zero when `srcs` is empty.
    pub fn set_sum(&mut self, srcs: &[&[K]]) {
        self.data.fill(K::default());
        self.add_sum(srcs);
    }

    /// `self += srcs[0] + srcs[1] + ...`
    pub fn add_sum(&mut self, srcs: &[&[K]]) {
        for src in srcs {
            self.add_assign_from(src);
        }
    }
}

impl<K, const CC: usize> Index<usize> for PixelAccess<'_, K, CC> {
    type Output = K;

    #[inline]
    fn index(&self, i: usize) -> &K {
        &self.data[i]
    }
}

impl<K, const CC: usize> IndexMut<usize> for PixelAccess<'_, K, CC> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut K {
        &mut self.data[i]
    }
}

impl<K: Element, const CC: usize> AddAssign<Pixel<K, CC>> for PixelAccess<'_, K, CC> {
    fn add_assign(&mut self, rhs: Pixel<K, CC>) {
        self.add_assign_from(rhs.as_slice());
    }
}

impl<K: Element, const CC: usize> SubAssign<Pixel<K, CC>> for PixelAccess<'_, K, CC> {
    fn sub_assign(&mut self, rhs: Pixel<K, CC>) {
        self.sub_assign_from(rhs.as_slice());
    }
}

// ============================================================================
// ITERATORS
// ============================================================================

/// Iterator over the channel slices of an image, in row-major order.
#[derive(Debug, Clone)]
pub struct Pixels<'a, K> {
    chunks: ChunksExact<'a, K>,
}

impl<'a, K> Pixels<'a, K> {
    pub(crate) fn new(data: &'a [K], channels: usize) -> Self {
        // A zero-channel image has no elements, so any step yields nothing.
        Self {
            chunks: data.chunks_exact(channels.max(1)),
        }
    }
}

impl<'a, K> Iterator for Pixels<'a, K> {
    type Item = &'a [K];

    #[inline]
    fn next(&mut self) -> Option<&'a [K]> {
        self.chunks.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<&'a [K]> {
        self.chunks.nth(n)
    }
}

impl<K> DoubleEndedIterator for Pixels<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chunks.next_back()
    }
}

impl<K> ExactSizeIterator for Pixels<'_, K> {}

/// Iterator over mutable pixel views of an image, in row-major order.
#[derive(Debug)]
pub struct PixelsMut<'a, K, const CC: usize> {
    chunks: ChunksExactMut<'a, K>,
}

impl<'a, K, const CC: usize> PixelsMut<'a, K, CC> {
    pub(crate) fn new(data: &'a mut [K], channels: usize) -> Self {
        Self {
            chunks: data.chunks_exact_mut(channels.max(1)),
        }
    }
}

impl<'a, K: Element, const CC: usize> Iterator for PixelsMut<'a, K, CC> {
    type Item = PixelAccess<'a, K, CC>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(PixelAccess::new)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<K: Element, const CC: usize> DoubleEndedIterator for PixelsMut<'_, K, CC> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chunks.next_back().map(PixelAccess::new)
    }
}

impl<K: Element, const CC: usize> ExactSizeIterator for PixelsMut<'_, K, CC> {}

// ============================================================================
// CURSOR
// ============================================================================

/// Random-access read position over an image's pixels.
///
/// Arithmetic moves by whole pixels. Equality and ordering compare positions
/// only, so comparing cursors of different images gives no useful answer.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a, K, const CC: usize> {
    data: &'a [K],
    channels: usize,
    pos: isize,
}

impl<'a, K: Element, const CC: usize> Cursor<'a, K, CC> {
    pub(crate) fn new(data: &'a [K], channels: usize, pos: isize) -> Self {
        Self {
            data,
            channels,
            pos,
        }
    }

    /// Pixel index the cursor points at.
    #[inline]
    pub fn position(&self) -> isize {
        self.pos
    }

    /// Cursor moved by `n` pixels.
    #[inline]
    pub fn offset(self, n: isize) -> Self {
        Self {
            pos: self.pos + n,
            ..self
        }
    }

    /// Channels of the current pixel. Panics past either end.
    pub fn pixel(&self) -> &'a [K] {
        assert!(self.pos >= 0, "cursor at {} before the first pixel", self.pos);
        let start = self.pos as usize * self.channels;
        &self.data[start..start + self.channels]
    }

    pub fn get(&self) -> Pixel<K, CC> {
        Pixel::from_slice(self.pixel())
    }

    /// Channels of the pixel `n` steps away, without moving.
    pub fn at(&self, n: isize) -> &'a [K] {
        self.offset(n).pixel()
    }
}

impl<K: Element, const CC: usize> Add<isize> for Cursor<'_, K, CC> {
    type Output = Self;

    fn add(self, n: isize) -> Self {
        self.offset(n)
    }
}

impl<K: Element, const CC: usize> Sub<isize> for Cursor<'_, K, CC> {
    type Output = Self;

    fn sub(self, n: isize) -> Self {
        self.offset(-n)
    }
}

impl<K, const CC: usize> AddAssign<isize> for Cursor<'_, K, CC> {
    fn add_assign(&mut self, n: isize) {
        self.pos += n;
    }
}

impl<K, const CC: usize> SubAssign<isize> for Cursor<'_, K, CC> {
    fn sub_assign(&mut self, n: isize) {
        self.pos -= n;
    }
}

/// Distance in pixels.
impl<'a, K, const CC: usize> Sub for Cursor<'a, K, CC> {
    type Output = isize;

    fn sub(self, other: Self) -> isize {
        self.pos - other.pos
    }
}

impl<K, const CC: usize> PartialEq for Cursor<'_, K, CC> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl<K, const CC: usize> Eq for Cursor<'_, K, CC> {}

impl<K, const CC: usize> PartialOrd for Cursor<'_, K, CC> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K, const CC: usize> Ord for Cursor<'_, K, CC> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pos.cmp(&other.pos)
    }
}
