use std::ffi::c_void;
use std::fmt::Debug;

use h5wire_buffer::SlotRef;
use h5wire_dtype::VAR_LEN_WIRE_SIZE;
use static_assertions::{assert_eq_size, const_assert_eq};

/// A wire value: plain memory that storage copies byte for byte.
pub trait WireValue: Copy + Debug + Send + Sync + 'static {
    /// The all-zero value. For pointer-carrying wires this is the null pointer with length
    /// zero, which decodes to an empty value.
    const EMPTY: Self;
}

macro_rules! wire_value_zero {
    ($($T:ty),+) => {
        $(impl WireValue for $T {
            const EMPTY: Self = 0 as $T;
        })+
    };
}

wire_value_zero!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl<W: WireValue, const N: usize> WireValue for [W; N] {
    const EMPTY: Self = [W::EMPTY; N];
}

/// The wire form of variable-length strings and sequences: an element count and a pointer to
/// the first element.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarLenWire {
    len: usize,
    ptr: *const c_void,
}

assert_eq_size!(VarLenWire, [usize; 2]);
const_assert_eq!(size_of::<VarLenWire>(), VAR_LEN_WIRE_SIZE);

// SAFETY: the wire is an address and a length. It never dereferences the address by itself,
// every read goes through an `unsafe` decode whose caller guarantees validity.
unsafe impl Send for VarLenWire {}
// SAFETY: see `Send`, the wire has no interior mutability.
unsafe impl Sync for VarLenWire {}

impl WireValue for VarLenWire {
    const EMPTY: Self = Self {
        len: 0,
        ptr: std::ptr::null(),
    };
}

impl VarLenWire {
    /// A wire referencing the contents of a staged slot.
    pub fn from_slot<T>(slot: SlotRef<T>) -> Self {
        Self {
            len: slot.len(),
            ptr: slot.ptr().cast(),
        }
    }

    /// A wire referencing `len` elements at `ptr`.
    pub fn from_raw_parts(ptr: *const c_void, len: usize) -> Self {
        Self { len, ptr }
    }

    /// The number of elements referenced
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no elements are referenced
    pub fn is_empty(&self) -> bool {
        self.len == 0 || self.ptr.is_null()
    }

    /// The address of the first element
    pub fn ptr(&self) -> *const c_void {
        self.ptr
    }

    /// Returns true if the wire holds a null pointer
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// The referenced elements. A null pointer yields an empty slice.
    ///
    /// # Safety
    /// The pointer must be null or point at `len` initialized values of `T` that stay alive
    /// and unmodified for `'a`.
    pub unsafe fn as_slice<'a, T>(&self) -> &'a [T] {
        if self.is_empty() {
            return &[];
        }
        // SAFETY: non-null, and valid for `len` elements per the caller's contract.
        unsafe { std::slice::from_raw_parts(self.ptr.cast::<T>(), self.len) }
    }
}
