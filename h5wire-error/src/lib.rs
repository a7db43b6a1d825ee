#![deny(missing_docs)]

//! Error handling for h5wire.
//!
//! Every fallible operation in the workspace returns an [`H5WireResult`]. Errors carry a
//! captured [`Backtrace`] so a failing layout or shape check can be traced back to the caller
//! that built it.

use std::backtrace::Backtrace;
// Aliased so thiserror does not emit a `provide()` impl, which needs the nightly-only
// `error_generic_member_access` feature. The field type is still `std::backtrace::Backtrace`.
use std::backtrace::Backtrace as CapturedBacktrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

/// A string type used in error messages.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for h5wire.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum H5WireError {
    /// A malformed layout definition, e.g. a compound without members or with clashing names.
    #[error("invalid layout: {0}\nBacktrace:\n{1}")]
    Layout(ErrString, CapturedBacktrace),
    /// A shape, dimension or argument that does not fit the data it is applied to.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, CapturedBacktrace),
    /// An index is out of bounds.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, CapturedBacktrace),
    /// Two layouts that were expected to match do not.
    #[error("expected layout: {0} but instead got {1}\nBacktrace:\n{2}")]
    MismatchedTypes(ErrString, ErrString, CapturedBacktrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<H5WireError>),
    /// A wrapper for errors from the serde_json crate.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    JSONError(#[from] serde_json::Error),
}

impl H5WireError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        H5WireError::Context(msg.into(), Box::new(self))
    }

    /// Whether this error, or the error it wraps, is a layout error.
    pub fn is_layout(&self) -> bool {
        match self {
            H5WireError::Layout(..) => true,
            H5WireError::Context(_, inner) => inner.is_layout(),
            _ => false,
        }
    }

    /// Whether this error, or the error it wraps, is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            H5WireError::InvalidArgument(..) => true,
            H5WireError::Context(_, inner) => inner.is_invalid_argument(),
            _ => false,
        }
    }
}

impl Debug for H5WireError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`H5WireError`]s as their error type.
pub type H5WireResult<T> = Result<T, H5WireError>;

/// A trait for unwrapping an [`H5WireResult`].
pub trait H5WireUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug
    /// (programmer error).
    fn h5wire_unwrap(self) -> Self::Output;
}

impl<T, E> H5WireUnwrap for Result<T, E>
where
    E: Into<H5WireError>,
{
    type Output = T;

    #[inline(always)]
    fn h5wire_unwrap(self) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|err| h5wire_panic!(err))
    }
}

/// A trait for expect-ing an [`H5WireResult`] or an [`Option`].
pub trait H5WireExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug
    /// (programmer error).
    fn h5wire_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> H5WireExpect for Result<T, E>
where
    E: Into<H5WireError>,
{
    type Output = T;

    #[inline(always)]
    fn h5wire_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| h5wire_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> H5WireExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn h5wire_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = H5WireError::InvalidArgument(msg.to_string().into(), Backtrace::capture());
            h5wire_panic!(err)
        })
    }
}

/// A convenient macro for creating an [`H5WireError`].
#[macro_export]
macro_rules! h5wire_err {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::H5WireError::OutOfBounds($idx, $start, $stop, Backtrace::capture())
        )
    }};
    (Layout: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::H5WireError::Layout(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    (InvalidArgument: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::H5WireError::InvalidArgument(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    (MismatchedTypes: $expected:literal, $actual:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::H5WireError::MismatchedTypes($expected.into(), $actual.to_string().into(), Backtrace::capture())
        )
    }};
    (MismatchedTypes: $expected:expr, $actual:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::H5WireError::MismatchedTypes($expected.to_string().into(), $actual.to_string().into(), Backtrace::capture())
        )
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::H5WireError::Context($msg.into(), Box::new($err))
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::h5wire_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning an [`H5WireError`] from the enclosing function.
#[macro_export]
macro_rules! h5wire_bail {
    ($($tt:tt)+) => {
        return Err($crate::h5wire_err!($($tt)+))
    };
}

/// A convenient macro for panicking with an [`H5WireError`] in the presence of a programmer
/// error (e.g., an invariant has been violated).
#[macro_export]
macro_rules! h5wire_panic {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        $crate::h5wire_panic!($crate::h5wire_err!(OutOfBounds: $idx, $start, $stop))
    }};
    (Layout: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::h5wire_panic!($crate::h5wire_err!(Layout: $fmt, $($arg),*))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::h5wire_panic!($crate::h5wire_err!($fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::H5WireError = $err;
        $crate::__private::panic_with(err.with_context(format!($fmt, $($arg),*)))
    }};
    ($err:expr) => {{
        let err: $crate::H5WireError = $err;
        $crate::__private::panic_with(err)
    }};
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn must_use(err: crate::H5WireError) -> crate::H5WireError {
        err
    }

    #[doc(hidden)]
    #[cold]
    #[track_caller]
    #[allow(clippy::panic)]
    pub fn panic_with(err: crate::H5WireError) -> ! {
        panic!("{}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_failure() -> H5WireResult<()> {
        h5wire_bail!(Layout: "member {} has no name", 3)
    }

    fn shape_failure(n: usize) -> H5WireResult<usize> {
        if n == 0 {
            h5wire_bail!("cannot split into chunks of {}", n);
        }
        Ok(n)
    }

    #[test]
    fn bail_produces_layout_error() {
        let err = layout_failure().unwrap_err();
        assert!(err.is_layout());
        assert!(err.to_string().starts_with("invalid layout: member 3 has no name"));
    }

    #[test]
    fn bare_literal_is_invalid_argument() {
        let err = shape_failure(0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!err.is_layout());
        assert_eq!(shape_failure(4).unwrap(), 4);
    }

    #[test]
    fn context_wraps_inner_error() {
        let err = layout_failure().unwrap_err().with_context("building dtype");
        assert!(err.is_layout());
        assert!(err.to_string().starts_with("building dtype: invalid layout"));
    }

    #[test]
    fn out_of_bounds_message() {
        let err = h5wire_err!(OutOfBounds: 7, 0, 5);
        assert!(err.to_string().starts_with("index 7 out of bounds from 0 to 5"));
    }

    #[test]
    #[should_panic(expected = "row must exist")]
    fn expect_on_none_panics_with_message() {
        let missing: Option<u8> = None;
        missing.h5wire_expect("row must exist");
    }
}
