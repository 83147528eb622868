//! Flat element storage underlying every image.
//!
//! A [`Buffer`] owns its elements. Sub-buffers are borrowed windows
//! ([`BufferView`], [`BufferViewMut`]) into the same storage, so writes made
//! through a mutable window show up in the parent at the same offset. The
//! borrow checker keeps a window from outliving its buffer or surviving a
//! [`Buffer::resize`].

use std::ops::{Deref, DerefMut};

use crate::pixel::Element;

/// Owned, resizable run of elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buffer<K> {
    data: Vec<K>,
}

impl<K: Element> Buffer<K> {
    /// Allocate `n` elements. Contents start zeroed; do not rely on any
    /// particular value before filling.
    pub fn new(n: usize) -> Self {
        Self {
            data: vec![K::default(); n],
        }
    }

    pub fn from_vec(data: Vec<K>) -> Self {
        Self { data }
    }

    /// Number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[K] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [K] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<K> {
        self.data
    }

    /// Reallocate to `n` elements. Previous contents are discarded.
    pub fn resize(&mut self, n: usize) {
        self.data = vec![K::default(); n];
    }

    /// Window `[pos, pos + n)` sharing this buffer's storage.
    pub fn sub(&self, pos: usize, n: usize) -> BufferView<'_, K> {
        BufferView {
            data: &self.data[window(pos, n, self.size())],
        }
    }

    /// Window `[begin, end)` sharing this buffer's storage.
    pub fn sub_from_to(&self, begin: usize, end: usize) -> BufferView<'_, K> {
        assert!(begin <= end, "window begins at {begin} after its end {end}");
        self.sub(begin, end - begin)
    }

    /// Mutable window `[pos, pos + n)`.
    pub fn sub_mut(&mut self, pos: usize, n: usize) -> BufferViewMut<'_, K> {
        let range = window(pos, n, self.size());
        BufferViewMut {
            data: &mut self.data[range],
        }
    }

    /// Mutable window `[begin, end)`.
    pub fn sub_from_to_mut(&mut self, begin: usize, end: usize) -> BufferViewMut<'_, K> {
        assert!(begin <= end, "window begins at {begin} after its end {end}");
        self.sub_mut(begin, end - begin)
    }

    pub fn fill(&mut self, v: K) {
        self.data.fill(v);
    }

    /// Copy `size()` elements from the front of `src`.
    ///
    /// Panics if `src` holds fewer than `size()` elements.
    pub fn copy_from(&mut self, src: &[K]) {
        let n = self.size();
        assert!(
            src.len() >= n,
            "source holds {} elements, buffer needs {}",
            src.len(),
            n
        );
        self.data.copy_from_slice(&src[..n]);
    }

    /// Gather every `stride`-th element of `src`, starting at `offset`.
    pub fn copy_from_interleaved(&mut self, src: &[K], offset: usize, stride: usize) {
        assert!(stride > 0, "stride must be positive");
        for (i, dst) in self.data.iter_mut().enumerate() {
            *dst = src[offset + i * stride];
        }
    }
}

fn window(pos: usize, n: usize, size: usize) -> std::ops::Range<usize> {
    let end = pos.checked_add(n).filter(|&end| end <= size);
    match end {
        Some(end) => pos..end,
        None => panic!("window [{pos}, {pos} + {n}) exceeds buffer of {size} elements"),
    }
}

/// Read-only window into a [`Buffer`].
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a, K> {
    data: &'a [K],
}

impl<'a, K: Element> BufferView<'a, K> {
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &'a [K] {
        self.data
    }

    /// Nested window relative to this one.
    pub fn sub(&self, pos: usize, n: usize) -> BufferView<'a, K> {
        BufferView {
            data: &self.data[window(pos, n, self.size())],
        }
    }

    /// Deep copy into a new owned buffer.
    pub fn to_buffer(&self) -> Buffer<K> {
        Buffer::from_vec(self.data.to_vec())
    }
}

impl<K> Deref for BufferView<'_, K> {
    type Target = [K];

    fn deref(&self) -> &[K] {
        self.data
    }
}

/// Mutable window into a [`Buffer`].
#[derive(Debug)]
pub struct BufferViewMut<'a, K> {
    data: &'a mut [K],
}

impl<'a, K: Element> BufferViewMut<'a, K> {
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[K] {
        &*self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [K] {
        &mut *self.data
    }

    pub fn into_slice(self) -> &'a mut [K] {
        self.data
    }

    pub fn sub_mut(&mut self, pos: usize, n: usize) -> BufferViewMut<'_, K> {
        let range = window(pos, n, self.size());
        BufferViewMut {
            data: &mut self.data[range],
        }
    }

    pub fn fill(&mut self, v: K) {
        self.data.fill(v);
    }

    /// Copy `size()` elements from the front of `src`.
    pub fn copy_from(&mut self, src: &[K]) {
        let n = self.size();
        assert!(
            src.len() >= n,
            "source holds {} elements, window needs {}",
            src.len(),
            n
        );
        self.data.copy_from_slice(&src[..n]);
    }
}

impl<K> Deref for BufferViewMut<'_, K> {
    type Target = [K];

    fn deref(&self) -> &[K] {
        &*self.data
    }
}

impl<K> DerefMut for BufferViewMut<'_, K> {
    fn deref_mut(&mut self) -> &mut [K] {
        &mut *self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_aliases_parent() {
        let mut buffer = Buffer::<u8>::from_vec((0..10).collect());
        {
            let mut view = buffer.sub_mut(4, 3);
            assert_eq!(view.size(), 3);
            view[1] = 200;
        }
        assert_eq!(buffer.as_slice()[5], 200);
        assert_eq!(buffer.sub(4, 3).as_slice(), &[4, 200, 6]);
    }

    #[test]
    fn test_sub_from_to() {
        let buffer = Buffer::<u16>::from_vec(vec![1, 2, 3, 4, 5]);
        let view = buffer.sub_from_to(1, 4);
        assert_eq!(view.size(), 3);
        assert_eq!(view.sub(1, 2).as_slice(), &[3, 4]);
    }

    #[test]
    #[should_panic(expected = "exceeds buffer")]
    fn test_sub_out_of_window() {
        let buffer = Buffer::<u8>::new(4);
        let _ = buffer.sub(2, 3);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Buffer::<f32>::new(3);
        let b = a.clone();
        a.fill(1.0);
        assert_eq!(b.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_buffer_is_legal() {
        let mut buffer = Buffer::<u8>::new(0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.sub(0, 0).size(), 0);
        buffer.resize(0);
        buffer.fill(3);
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut buffer = Buffer::<u8>::from_vec(vec![9; 4]);
        buffer.resize(6);
        assert_eq!(buffer.as_slice(), &[0; 6]);
    }

    #[test]
    fn test_copy_from_interleaved_picks_channel() {
        let rgb = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut green = Buffer::<u8>::new(3);
        green.copy_from_interleaved(&rgb, 1, 3);
        assert_eq!(green.as_slice(), &[2, 5, 8]);
    }
}
