use std::ffi::c_void;

use h5wire_dtype::{DType, DataSpace};
use h5wire_error::H5WireResult;

/// The interface a storage layer uses to write a container out and read it back.
///
/// A write asks for the layout and the shape, then copies `data_space().size()` values of
/// `dtype().byte_size()` bytes from [`WireData::data_write_ptr`]. A read first calls
/// [`WireData::resize`] with the stored layout and shape and, if that succeeds, copies the
/// stored values to [`WireData::data_read_ptr`].
///
/// # Safety
/// Implementors guarantee that [`WireData::data_write_ptr`] is valid for reads of
/// `size() * dtype().byte_size()` bytes laid out as described by `dtype()`, including every
/// pointer embedded in them. [`WireData::data_read_ptr`] must be valid for writes of the same
/// number of bytes, and any bit pattern written there must be a valid wire value. Storage never
/// writes more than that, whatever [`WireData::resize`] returned.
pub unsafe trait WireData {
    /// The layout of one stored value.
    fn dtype(&self) -> H5WireResult<DType>;

    /// The shape the values are stored in.
    fn data_space(&self) -> DataSpace;

    /// The number of values held.
    fn size(&self) -> usize;

    /// A pointer to the first wire value, for writing to storage.
    fn data_write_ptr(&self) -> *const c_void;

    /// A pointer to the first wire value, for reading from storage.
    ///
    /// Storage writes raw bytes through this pointer. The values it writes may embed pointers
    /// to memory the storage layer owns, which must outlive every later decode.
    fn data_read_ptr(&mut self) -> *mut c_void;

    /// Makes room for reading values stored with layout `dtype` in the shape `space`.
    ///
    /// Returns whether the container is now large enough to receive them.
    fn resize(&mut self, space: &DataSpace, dtype: &DType) -> bool;
}
