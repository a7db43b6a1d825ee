#![deny(missing_docs)]

//! Staging buffers for h5wire.
//!
//! Some wire values embed pointers: a variable-length string is a length and a pointer to
//! its bytes, a variable-length sequence a length and a pointer to its converted elements. The
//! memory behind those pointers lives in a staging buffer that outlives the wire values.
//!
//! # Address stability
//! Staged memory is never stored inline in a growable vector. Each slot owns a separate heap
//! allocation (see [`StableSlot`]), so growing an [`Arena`] moves the slot handles but never the
//! memory a wire value points at.

pub use arena::*;
pub use pool::*;
pub use staging::*;

mod arena;
mod pool;
mod staging;
