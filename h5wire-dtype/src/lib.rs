#![deny(missing_docs)]

//! Layout and shape descriptors for h5wire
//!
//! A [`DType`] describes the exact memory layout of one wire value: its byte size and, for
//! arrays, variable-length sequences and compounds, the layout of what it contains. A
//! [`DataSpace`] describes how many such values a storage call transfers and in which shape.

pub use compound::*;
pub use dataspace::*;
pub use dimensions::*;
pub use dtype::*;
pub use scalar::*;

mod compound;
mod dataspace;
mod dimensions;
mod dtype;
mod scalar;
