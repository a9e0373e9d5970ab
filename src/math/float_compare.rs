use super::Float;
use std::fmt::Debug;

/// The tolerance [`assert_fp_eq`] compares floats with.
///
/// <div class="warning">
///
/// **Warning**
///
/// This is an implementation detail of [`assert_fp_eq`] and *should not* be
/// used directly.
///
/// </div>
#[doc(hidden)]
#[derive(Copy, Clone, Debug)]
pub enum Tolerance<T> {
    /// Relative error below the given value
    Relative(T),
    /// Absolute difference below the given value, for probabilities and their
    /// sums
    Absolute(T),
}

impl<T: Float> Tolerance<T> {
    /// Whether `a` and `b` agree within this tolerance.
    ///
    /// Relative error follows <https://floating-point-gui.de/errors/comparison/>.
    #[must_use]
    pub fn accepts(self, a: T, b: T) -> bool {
        if a == b {
            // also covers equal infinities
            return true;
        }
        let diff = (a - b).abs();
        match self {
            Tolerance::Relative(eps) => {
                let magnitude = a.abs() + b.abs();
                if a == T::ZERO || b == T::ZERO || magnitude < T::MIN_POSITIVE {
                    diff < eps * T::MIN_POSITIVE
                } else {
                    diff / magnitude.min(T::MAX) < eps
                }
            }
            Tolerance::Absolute(eps) => diff < eps,
        }
    }
}

/// Why two values failed to compare as nearly equal.
#[doc(hidden)]
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Mismatch<T> {
    /// The values have different lengths or dimensions
    Shape,
    /// The first pair of entries outside the tolerance
    Values(T, T),
}

/// Values made of floats of type `T` that can be compared entry by entry.
#[doc(hidden)]
pub trait NearlyEqual<T> {
    /// Compares `self` against `other`, reporting the first disagreement.
    ///
    /// # Errors
    ///
    /// The first [`Mismatch`] found.
    fn first_mismatch(&self, other: &Self, tolerance: Tolerance<T>) -> Result<(), Mismatch<T>>;
}

macro_rules! impl_float_nearly_equal {
    {$($ty:ty),* } => {
        $(
            impl NearlyEqual<$ty> for $ty {
                #[inline]
                fn first_mismatch(&self, other: &Self, tolerance: Tolerance<$ty>) -> Result<(), Mismatch<$ty>> {
                    if tolerance.accepts(*self, *other) {
                        Ok(())
                    } else {
                        Err(Mismatch::Values(*self, *other))
                    }
                }
            }
        )*
    }
}

impl_float_nearly_equal!(f32, f64);

impl<T: Copy, S: NearlyEqual<T>> NearlyEqual<T> for [S] {
    fn first_mismatch(&self, other: &Self, tolerance: Tolerance<T>) -> Result<(), Mismatch<T>> {
        if self.len() != other.len() {
            return Err(Mismatch::Shape);
        }
        self.iter()
            .zip(other)
            .try_for_each(|(x, y)| x.first_mismatch(y, tolerance))
    }
}

impl<T: Copy, S: NearlyEqual<T>> NearlyEqual<T> for Vec<S> {
    #[inline]
    fn first_mismatch(&self, other: &Self, tolerance: Tolerance<T>) -> Result<(), Mismatch<T>> {
        self.as_slice().first_mismatch(other.as_slice(), tolerance)
    }
}

/// Panics with both values and the offending entries unless `found` and
/// `expected` agree within `tolerance`. Called by [`assert_fp_eq`].
#[doc(hidden)]
#[track_caller]
pub fn assert_nearly_equal<T, V>(found: &V, expected: &V, tolerance: Tolerance<T>)
where
    T: Float,
    V: NearlyEqual<T> + Debug + ?Sized, {
    match found.first_mismatch(expected, tolerance) {
        Ok(()) => {}
        Err(Mismatch::Shape) => {
            panic!("assertion failed: `(found ≈ expected)`, shapes differ\n found:\t`{found:?}`,\n expected:\t`{expected:?}`")
        }
        Err(Mismatch::Values(a, b)) => panic!(
            "assertion failed: `(found ≈ expected)`\n found:\t`{found:?}`,\n expected:\t`{expected:?}`,\n tolerance:\t`{tolerance:?}`,\n\n Caused by the comparison of:\n found:\t`{a:?}`,\n expected:\t`{b:?}`"
        ),
    }
}

/// Assert that two floating point values are approximately equal.
///
/// By default the values are compared with a relative error of $10^{-8}$
/// (see <https://floating-point-gui.de/errors/comparison/>):
/// ```
/// # use baum::assert_fp_eq;
/// assert_fp_eq!(3.0, 1.0 + 2.0);
/// assert_fp_eq!(3.0, 2.99999, 1e-4);
/// assert_fp_eq!(@relative, 3.0, 2.99999, 1e-4);
/// ```
///
/// Probabilities and their sums are better compared with an absolute error:
/// ```
/// # use baum::assert_fp_eq;
/// assert_fp_eq!(@absolute, vec![0.25, 0.75], vec![0.25 + 1e-12, 0.75], 1e-9);
/// ```
///
/// `f32`, `f64`, slices and [`Vec`]s of them, a
/// [`Matrix`](crate::math::Matrix) of floats, and a
/// [`Model`](crate::hmm::Model) can be compared.
#[macro_export]
macro_rules! assert_fp_eq {
    (@relative, $found:expr, $expected:expr, $eps:expr) => {
        $crate::math::assert_nearly_equal(&$found, &$expected, $crate::math::Tolerance::Relative($eps))
    };
    (@absolute, $found:expr, $expected:expr, $eps:expr) => {
        $crate::math::assert_nearly_equal(&$found, &$expected, $crate::math::Tolerance::Absolute($eps))
    };
    ($found:expr, $expected:expr, $eps:expr) => {
        $crate::assert_fp_eq!(@relative, $found, $expected, $eps)
    };
    ($found:expr, $expected:expr) => {
        $crate::assert_fp_eq!(@relative, $found, $expected, 1e-8)
    };
}
