//! An in-memory storage layer, for exercising containers without a file.
//!
//! [`MemoryStore`] behaves like a binary storage layer seen through [`WireData`]: a write copies
//! the raw wire bytes out of a container and takes its own copy of everything they point to, a
//! read resizes the container to the stored shape and copies the bytes back.

use std::collections::HashMap;
use std::ptr;

use h5wire_convert::VarLenWire;
use h5wire_dtype::{DType, DataSpace};
use h5wire_error::{H5WireResult, h5wire_bail, h5wire_err};

use crate::WireData;

#[derive(Debug)]
struct StoredDataset {
    dtype: DType,
    space: DataSpace,
    byte_len: usize,
    words: Vec<u64>,
}

/// Named datasets held in memory.
///
/// Variable-length data is copied into blocks owned by the store, so stored datasets do not
/// depend on the container they were written from.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: HashMap<String, StoredDataset>,
    heap: Vec<Box<[u64]>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dataset of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    /// The stored layout of a dataset.
    pub fn dtype(&self, name: &str) -> Option<&DType> {
        self.datasets.get(name).map(|d| &d.dtype)
    }

    /// The stored shape of a dataset.
    pub fn data_space(&self, name: &str) -> Option<&DataSpace> {
        self.datasets.get(name).map(|d| &d.space)
    }

    /// The number of variable-length blocks the store owns.
    pub fn heap_blocks(&self) -> usize {
        self.heap.len()
    }

    /// Writes a container as a dataset, replacing any dataset of the same name.
    pub fn write(&mut self, name: &str, data: &impl WireData) -> H5WireResult<()> {
        let dtype = data.dtype()?;
        let space = data.data_space();
        let len = usize::try_from(space.size())
            .map_err(|_| h5wire_err!("dataspace of {} values is too large", space.size()))?;
        if len > data.size() {
            h5wire_bail!(
                "dataspace {} holds {} values but the container has {}",
                space,
                len,
                data.size()
            );
        }
        let value_size = dtype.byte_size();
        let byte_len = len
            .checked_mul(value_size)
            .ok_or_else(|| h5wire_err!("dataset '{}' is too large", name))?;

        let mut words = vec![0u64; byte_len.div_ceil(size_of::<u64>())];
        let base = words.as_mut_ptr().cast::<u8>();
        // SAFETY: the container guarantees `size() * byte_size` readable bytes behind its write
        // pointer, and `words` holds at least `byte_len` bytes.
        unsafe { ptr::copy_nonoverlapping(data.data_write_ptr().cast::<u8>(), base, byte_len) };
        for i in 0..len {
            // SAFETY: value `i` lies within the copied bytes, and its pointers are valid as
            // guaranteed by the container.
            unsafe { self.take_ownership(base.add(i * value_size), &dtype) };
        }

        log::debug!("stored '{}' as {} values of {}", name, len, dtype);
        self.datasets.insert(
            name.to_string(),
            StoredDataset {
                dtype,
                space,
                byte_len,
                words,
            },
        );
        Ok(())
    }

    /// Reads a dataset into a container, resizing it to the stored shape first.
    ///
    /// Fails if the container cannot be resized to hold the dataset, or if its layout cannot
    /// receive the stored bytes.
    ///
    /// # Safety
    /// Variable-length values read into `data` point into memory owned by the store. They must
    /// not be decoded after the store is dropped.
    pub unsafe fn read(&self, name: &str, data: &mut impl WireData) -> H5WireResult<()> {
        let stored = self
            .datasets
            .get(name)
            .ok_or_else(|| h5wire_err!("no dataset named '{}'", name))?;
        if !data.resize(&stored.space, &stored.dtype) {
            h5wire_bail!(
                "dataset '{}' of {} values of {} does not fit the container",
                name,
                stored.space.selection_size(),
                stored.dtype
            );
        }

        let own = data.dtype()?;
        if !stored.dtype.same_layout(&own) && widened_element(&stored.dtype, &own).is_none() {
            h5wire_bail!(MismatchedTypes: own, stored.dtype);
        }
        let available = data.size().checked_mul(own.byte_size()).unwrap_or(usize::MAX);
        if stored.byte_len > available {
            h5wire_bail!(
                "dataset '{}' has {} bytes but the container holds {}",
                name,
                stored.byte_len,
                available
            );
        }

        // SAFETY: the container has room for `available >= byte_len` bytes behind its read
        // pointer, and the stored bytes are values of a layout it accepts.
        unsafe {
            ptr::copy_nonoverlapping(
                stored.words.as_ptr().cast::<u8>(),
                data.data_read_ptr().cast::<u8>(),
                stored.byte_len,
            )
        };
        log::debug!("read '{}' into {} values of {}", name, data.size(), own);
        Ok(())
    }

    fn allocate(&mut self, bytes: usize) -> *mut u8 {
        let mut block = vec![0u64; bytes.div_ceil(size_of::<u64>()).max(1)].into_boxed_slice();
        let ptr = block.as_mut_ptr().cast::<u8>();
        self.heap.push(block);
        ptr
    }

    /// Replaces every pointer in the value at `at` with a pointer to a store-owned copy.
    ///
    /// # Safety
    /// `at` must point to a writable value of layout `dtype` whose pointers are valid.
    unsafe fn take_ownership(&mut self, at: *mut u8, dtype: &DType) {
        match dtype {
            DType::Scalar(_) | DType::FixedString(_) => {}
            DType::Array { element, .. } => {
                let size = element.byte_size();
                for i in 0..dtype.byte_size() / size {
                    // SAFETY: element `i` lies within the array.
                    unsafe { self.take_ownership(at.add(i * size), element) };
                }
            }
            DType::Compound(compound) => {
                for member in compound.members() {
                    // SAFETY: every member lies within the compound.
                    unsafe { self.take_ownership(at.add(member.offset()), member.dtype()) };
                }
            }
            DType::VarString => {
                // SAFETY: `at` holds a variable-length wire, which may be unaligned.
                let wire = unsafe { ptr::read_unaligned(at.cast::<VarLenWire>()) };
                if wire.is_null() {
                    return;
                }
                let block = self.allocate(wire.len() + 1);
                // SAFETY: the string has `len` readable bytes, the block has `len + 1` bytes
                // zeroed, so the copy stays NUL-terminated.
                unsafe { ptr::copy_nonoverlapping(wire.ptr().cast::<u8>(), block, wire.len()) };
                let owned = VarLenWire::from_raw_parts(block.cast_const().cast(), wire.len());
                // SAFETY: as above.
                unsafe { ptr::write_unaligned(at.cast::<VarLenWire>(), owned) };
            }
            DType::VarLen(element) => {
                // SAFETY: `at` holds a variable-length wire, which may be unaligned.
                let wire = unsafe { ptr::read_unaligned(at.cast::<VarLenWire>()) };
                if wire.is_empty() {
                    return;
                }
                let size = element.byte_size();
                let bytes = wire.len() * size;
                let block = self.allocate(bytes);
                // SAFETY: the sequence has `len` elements of `size` bytes, the block as many.
                unsafe { ptr::copy_nonoverlapping(wire.ptr().cast::<u8>(), block, bytes) };
                for i in 0..wire.len() {
                    // SAFETY: element `i` lies within the block.
                    unsafe { self.take_ownership(block.add(i * size), element) };
                }
                let owned = VarLenWire::from_raw_parts(block.cast_const().cast(), wire.len());
                // SAFETY: as above.
                unsafe { ptr::write_unaligned(at.cast::<VarLenWire>(), owned) };
            }
        }
    }
}

/// The element layout of a stored array of `own` values, or of a compound wrapping one.
fn widened_element<'a>(stored: &'a DType, own: &DType) -> Option<&'a DType> {
    let array = match stored {
        DType::Compound(compound) if compound.len() == 1 => compound.member_at(0)?.dtype(),
        _ => stored,
    };
    match array {
        DType::Array { element, .. } if element.same_layout(own) => Some(element),
        _ => None,
    }
}
