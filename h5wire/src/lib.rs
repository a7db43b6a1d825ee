#![deny(missing_docs)]

//! Conversion between Rust values and HDF5-style binary wire layouts.
//!
//! A value of any [`H5Type`] is converted into a wire value whose bytes a binary storage layer
//! can copy as they are, described by a [`DType`](dtype::DType). Containers such as [`Data`]
//! own the wire values together with the staging that keeps their embedded pointers valid, and
//! hand both to storage through [`WireData`].
//!
//! ```
//! use h5wire::{Data, WireData};
//!
//! let mut data = Data::<(String, f64)>::with_names(["label", "value"]).unwrap();
//! data.push_back(&("a".to_string(), 1.0));
//! data.push_back(&("b".to_string(), 2.0));
//!
//! assert_eq!(data.size(), 2);
//! assert_eq!(data.dtype().unwrap().to_string(), "{label@0=string, value@16=f64}");
//! assert_eq!(data.get_value::<0>(1).unwrap(), "b");
//! ```

pub use h5wire_convert::*;
pub use h5wire_data::*;
pub use {
    h5wire_buffer as buffer, h5wire_convert as convert, h5wire_data as data,
    h5wire_dtype as dtype, h5wire_error as error,
};
