use std::{
    fmt::{Debug, Display},
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub},
};

/// Trait for providing generic functionality over floating point numbers.
pub trait Float:
    Sub<Output = Self>
    + Add<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + MulAssign
    + DivAssign
    + Default
    + PartialEq
    + PartialOrd
    + Copy
    + Debug
    + Display
    + Sized
    + std::iter::Sum<Self>
    + for<'a> std::iter::Sum<&'a Self> {
    const MIN_POSITIVE: Self;
    const MAX: Self;
    const ZERO: Self;
    const ONE: Self;

    /// Generic absolute value for [`Float`]
    #[must_use]
    fn abs(self) -> Self;

    /// Generic minimum of 2 values for [`Float`]
    #[must_use]
    fn min(self, other: Self) -> Self;

    /// Generic `is_finite` for [`Float`]
    #[must_use]
    fn is_finite(self) -> bool;

    /// Use a primitive cast to convert a usize to the [`Float`]
    fn usize_as_self(a: usize) -> Self;
}

/// Implement [`Float`] for multiple floating point primitive types
macro_rules! impl_float {
    {$($ty:ty),* } => {
        $(
        impl Float for $ty {
            const MIN_POSITIVE: Self = <$ty>::MIN_POSITIVE;
            const MAX: Self = <$ty>::MAX;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn abs(self) -> Self {
                self.abs()
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                self.min(other)
            }

            #[inline]
            fn is_finite(self) -> bool {
                self.is_finite()
            }

            #[inline]
            #[allow(clippy::cast_precision_loss)]
            fn usize_as_self(a: usize) -> $ty {
                a as $ty
            }
        } )*

     }
}

impl_float!(f32, f64);

/// Utility trait for mapping floats to [`Option`].
pub(crate) trait MapFloat: Float {
    /// Returns `None` for infinities and `NaN`.
    #[inline]
    fn into_option(self) -> Option<Self> {
        if self.is_finite() { Some(self) } else { None }
    }

    /// Returns the reciprocal if it is finite and the value is strictly
    /// positive, which is the only case where a probability mass can be used
    /// as a divisor.
    #[inline]
    fn positive_recip(self) -> Option<Self> {
        if self > Self::ZERO {
            (Self::ONE / self).into_option()
        } else {
            None
        }
    }
}

impl MapFloat for f32 {}
impl MapFloat for f64 {}
