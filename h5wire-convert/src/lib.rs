#![deny(missing_docs)]

//! Conversion between Rust values and their binary wire layout.
//!
//! Every supported type implements [`H5Type`], which names the type's wire representation,
//! the staging its wire values point into, and the [`DType`](h5wire_dtype::DType) describing the
//! wire layout. [`H5Type::convert`] turns a value into its wire form and
//! [`H5Type::convert_to`] decodes it again.
//!
//! | Type | Wire | Layout |
//! |---|---|---|
//! | `u8`..`u64`, `i8`..`i64`, `f32`, `f64` | the value itself | scalar |
//! | `bool` | `u8` | scalar |
//! | `usize`, `isize` | `u64`, `i64` | scalar |
//! | `String` | [`VarLenWire`] | variable-length string |
//! | [`FixedStr<N>`] | `[u8; N]` | fixed-size string |
//! | `[T; N]` | `[T::Wire; N]` | array |
//! | `Vec<T>` | [`VarLenWire`] | variable-length sequence |
//! | `(T1, .., Tn)`, `n <= 12` | [`CompoundWire2`] etc. | compound |
//!
//! Additional types are registered by implementing [`H5Type`] directly, or with
//! [`impl_h5type_via!`] for types that convert to and from an already supported type.

pub use compound::*;
pub use h5type::*;
pub use string::*;
pub use wire::*;

mod array;
mod compound;
mod h5type;
mod macros;
mod scalar;
mod string;
mod varlen;
mod wire;

#[doc(hidden)]
pub mod __private {
    pub use h5wire_dtype::DType;
    pub use h5wire_error::H5WireResult;
}
