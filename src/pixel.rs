//! Pixel values and the numeric element types they are made of.
//!
//! A [`Pixel`] is a fixed-size tuple of channel values. Everything stored in
//! an image is an [`Element`]: a plain numeric scalar tagged with an
//! [`ElementKind`] so that type-erased code can name it at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign};

// ============================================================================
// ELEMENT TYPES
// ============================================================================

/// Runtime tag of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    U8,
    U16,
    I32,
    F32,
    F64,
}

impl ElementKind {
    /// Byte size of a single element.
    pub const fn byte_size(self) -> usize {
        match self {
            ElementKind::U8 => 1,
            ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::F32 => 4,
            ElementKind::F64 => 8,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::U8 => "u8",
            ElementKind::U16 => "u16",
            ElementKind::I32 => "i32",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Numeric scalar that can be stored in a [`Buffer`](crate::Buffer).
///
/// Arithmetic follows the scalar's own rules, so unsigned overflow panics in
/// debug builds exactly as it would for plain integers.
pub trait Element:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// Runtime tag for this type.
    const KIND: ElementKind;

    /// Absolute value (identity for unsigned types).
    fn abs_value(self) -> Self;

    fn to_f64(self) -> f64;

    /// Convert from `f64`, saturating at the type's range for integers.
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_unsigned_element {
    ($t:ty, $kind:ident) => {
        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;

            #[inline]
            fn abs_value(self) -> Self {
                self
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

macro_rules! impl_signed_element {
    ($t:ty, $kind:ident) => {
        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;

            #[inline]
            fn abs_value(self) -> Self {
                self.abs()
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

impl_unsigned_element!(u8, U8);
impl_unsigned_element!(u16, U16);
impl_signed_element!(i32, I32);
impl_signed_element!(f32, F32);
impl_signed_element!(f64, F64);

// ============================================================================
// PIXEL
// ============================================================================

/// `N` channel values of element type `K`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel<K, const N: usize> {
    pub values: [K; N],
}

impl<K: Element, const N: usize> Default for Pixel<K, N> {
    fn default() -> Self {
        Self {
            values: [K::default(); N],
        }
    }
}

impl<K: Element, const N: usize> Pixel<K, N> {
    pub const fn new(values: [K; N]) -> Self {
        Self { values }
    }

    /// A pixel with every channel set to `v`.
    pub fn splat(v: K) -> Self {
        Self { values: [v; N] }
    }

    /// Copy a pixel out of a channel slice.
    ///
    /// Panics if `channels.len() != N`.
    pub fn from_slice(channels: &[K]) -> Self {
        assert_eq!(
            channels.len(),
            N,
            "pixel slice has {} channels, expected {}",
            channels.len(),
            N
        );
        let mut values = [K::default(); N];
        values.copy_from_slice(channels);
        Self { values }
    }

    /// Number of channels.
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn as_slice(&self) -> &[K] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [K] {
        &mut self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.values.iter()
    }

    /// Every channel multiplied by `s`.
    pub fn scaled(mut self, s: K) -> Self {
        for v in &mut self.values {
            *v *= s;
        }
        self
    }
}

impl<K: Element> Pixel<K, 1> {
    pub const fn from_value(value: K) -> Self {
        Self { values: [value] }
    }

    /// The single channel value.
    pub fn value(&self) -> K {
        self.values[0]
    }
}

impl<K: Element> Pixel<K, 3> {
    pub const fn rgb(red: K, green: K, blue: K) -> Self {
        Self {
            values: [red, green, blue],
        }
    }

    pub fn black() -> Self {
        Self::default()
    }

    pub fn red(&self) -> K {
        self.values[0]
    }

    pub fn green(&self) -> K {
        self.values[1]
    }

    pub fn blue(&self) -> K {
        self.values[2]
    }

    pub fn set_red(&mut self, v: K) {
        self.values[0] = v;
    }

    pub fn set_green(&mut self, v: K) {
        self.values[1] = v;
    }

    pub fn set_blue(&mut self, v: K) {
        self.values[2] = v;
    }
}

impl<K, const N: usize> Index<usize> for Pixel<K, N> {
    type Output = K;

    #[inline]
    fn index(&self, i: usize) -> &K {
        &self.values[i]
    }
}

impl<K, const N: usize> IndexMut<usize> for Pixel<K, N> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut K {
        &mut self.values[i]
    }
}

impl<K: Element, const N: usize> From<[K; N]> for Pixel<K, N> {
    fn from(values: [K; N]) -> Self {
        Self { values }
    }
}

impl<K: Element, const N: usize> AddAssign for Pixel<K, N> {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.values.iter_mut().zip(rhs.values) {
            *a += b;
        }
    }
}

impl<K: Element, const N: usize> Add for Pixel<K, N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<K: Element, const N: usize> SubAssign for Pixel<K, N> {
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.values.iter_mut().zip(rhs.values) {
            *a -= b;
        }
    }
}

impl<K: Element, const N: usize> Sub for Pixel<K, N> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

// ============================================================================
// PIXEL-LIKE RETURN VALUES
// ============================================================================

/// Values that can be written as an `N`-channel pixel of element `L`.
///
/// Lets mapping closures return either a [`Pixel`] or a bare scalar; the
/// target image type is inferred from the closure's return type.
pub trait IntoPixel<L, const N: usize> {
    fn into_pixel(self) -> Pixel<L, N>;
}

impl<L: Element, const N: usize> IntoPixel<L, N> for Pixel<L, N> {
    #[inline]
    fn into_pixel(self) -> Pixel<L, N> {
        self
    }
}

macro_rules! impl_scalar_pixel {
    ($($t:ty),*) => {
        $(
            impl IntoPixel<$t, 1> for $t {
                #[inline]
                fn into_pixel(self) -> Pixel<$t, 1> {
                    Pixel::from_value(self)
                }
            }

            impl From<$t> for Pixel<$t, 1> {
                fn from(value: $t) -> Self {
                    Pixel::from_value(value)
                }
            }

            impl From<Pixel<$t, 1>> for $t {
                fn from(pixel: Pixel<$t, 1>) -> Self {
                    pixel.values[0]
                }
            }
        )*
    };
}

impl_scalar_pixel!(u8, u16, i32, f32, f64);

pub type Pixel1ub = Pixel<u8, 1>;
pub type Pixel3ub = Pixel<u8, 3>;
pub type Pixel4ub = Pixel<u8, 4>;
pub type Pixel1ui16 = Pixel<u16, 1>;
pub type Pixel1f = Pixel<f32, 1>;
pub type Pixel2f = Pixel<f32, 2>;
pub type Pixel3f = Pixel<f32, 3>;
pub type Pixel4f = Pixel<f32, 4>;
pub type Pixel1i = Pixel<i32, 1>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_channels() {
        let mut p = Pixel3ub::rgb(10, 20, 30);
        assert_eq!((p.red(), p.green(), p.blue()), (10, 20, 30));
        p.set_green(99);
        assert_eq!(p[1], 99);
        assert_eq!(Pixel3ub::black(), Pixel3ub::new([0, 0, 0]));
    }

    #[test]
    fn test_elementwise_add() {
        let a = Pixel4f::new([1.0, 2.0, 3.0, 4.0]);
        let b = Pixel4f::splat(0.5);
        assert_eq!((a + b).values, [1.5, 2.5, 3.5, 4.5]);
        assert_eq!((a - b).values, [0.5, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_single_channel_scalar_conversion() {
        let p: Pixel1ui16 = 1234u16.into();
        assert_eq!(p.value(), 1234);
        let v: u16 = p.into();
        assert_eq!(v, 1234);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let p = Pixel3ub::black();
        let i = p.len();
        let _ = p[i];
    }

    #[test]
    #[should_panic(expected = "expected 3")]
    fn test_from_slice_wrong_length() {
        let _ = Pixel3ub::from_slice(&[1, 2]);
    }

    #[test]
    fn test_element_kind_names() {
        assert_eq!(<u8 as Element>::KIND.to_string(), "u8");
        assert_eq!(<f64 as Element>::KIND.byte_size(), 8);
        assert_eq!((-3i32).abs_value(), 3);
        assert_eq!(u8::from_f64(300.0), 255);
    }
}
