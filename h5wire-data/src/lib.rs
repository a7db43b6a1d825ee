#![deny(missing_docs)]

//! Containers of wire values.
//!
//! [`Data`] owns a sequence of wire values, an optional row-major shape and the staging the
//! wire values point into. It is the only surface a storage layer touches: through
//! [`WireData`] it hands out the layout, the shape and a raw pointer to the wire values, and
//! before a read it is resized to fit what is stored.
//!
//! [`Data0D`] holds exactly one value in a scalar dataspace, [`FixedString0D`] one fixed-size
//! string whose size is only known once it has been read.

pub use columns::*;
pub use data::*;
pub use data0d::*;
pub use fixed_string::*;
pub use wire_data::*;

mod columns;
mod data;
mod data0d;
mod fixed_string;
#[cfg(feature = "test-harness")]
pub mod test_harness;
mod wire_data;
