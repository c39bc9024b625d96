// MIT/Apache2 License

use num_traits::{AsPrimitive, Bounded};
use ordered_float::NotNan;
use std::ops;

/// A color channel, ranging from zero to one. This type is a wrapper around an `f32` with two invariants:
///
/// * The inner value will always be between `0.0` and `1.0`.
/// * The inner value will never be `NaN`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Intensity {
    inner: NotNan<f32>,
}

impl Intensity {
    pub const ZERO: Intensity = unsafe { Intensity::new_unchecked(0.0) };
    pub const ONE: Intensity = unsafe { Intensity::new_unchecked(1.0) };

    /// Create a new `Intensity`, without checking the inner value.
    ///
    /// # Safety
    ///
    /// Behavior is undefined if `inner` is not a number, or outside of the range [0, 1].
    #[allow(unused_unsafe)]
    #[must_use]
    #[inline]
    pub const unsafe fn new_unchecked(inner: f32) -> Intensity {
        Intensity {
            inner: unsafe { NotNan::new_unchecked(inner) },
        }
    }

    /// Create a new `Intensity`. If the inner value does not meet the invariants mentioned above, this function
    /// returns `None`.
    #[must_use]
    #[inline]
    pub fn new(inner: f32) -> Option<Intensity> {
        if inner.is_nan() || !(0.0..=1.0).contains(&inner) {
            None
        } else {
            NotNan::new(inner).ok().map(|inner| Intensity { inner })
        }
    }

    /// Create a new `Intensity` from an 8-bit channel value.
    #[must_use]
    #[inline]
    pub fn from_u8(channel: u8) -> Intensity {
        Intensity::new(f32::from(channel) / 255.0).unwrap_or(Intensity::ZERO)
    }

    /// Get the inner value of the `Intensity`.
    #[must_use]
    #[inline]
    pub fn into_inner(self) -> f32 {
        self.inner.into_inner()
    }

    /// Scale this value onto the full range of an integer type, rounding to the nearest step.
    #[must_use]
    #[inline]
    pub fn clamp<N: Bounded + Copy + ops::Sub + 'static>(self) -> N
    where
        f32: AsPrimitive<N> + From<N::Output>,
    {
        let bounds: f32 = (N::max_value() - N::min_value()).into();
        (bounds * self.into_inner()).round().as_()
    }

    /// Clamp this value to a `u8`.
    #[must_use]
    #[inline]
    pub fn clamp_u8(self) -> u8 {
        self.clamp()
    }

    /// Clamp this value to a `u16`.
    #[must_use]
    #[inline]
    pub fn clamp_u16(self) -> u16 {
        self.clamp()
    }
}

impl From<Intensity> for f32 {
    #[inline]
    fn from(i: Intensity) -> f32 {
        i.into_inner()
    }
}
