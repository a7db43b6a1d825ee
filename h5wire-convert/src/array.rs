use h5wire_dtype::DType;
use h5wire_error::H5WireResult;

use crate::H5Type;

impl<T: H5Type, const N: usize> H5Type for [T; N] {
    type Wire = [T::Wire; N];
    // Elements stage into the element type's buffer.
    type Buffer = T::Buffer;
    const MEMBERS: usize = T::MEMBERS;

    fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
        const { assert!(N > 0, "arrays must hold at least one element") };
        DType::array(T::dtype_with_names(names)?, [N as u64])
    }

    fn convert(&self, buffer: &mut T::Buffer) -> [T::Wire; N] {
        const { assert!(N > 0, "arrays must hold at least one element") };
        std::array::from_fn(|i| self[i].convert(buffer))
    }

    unsafe fn convert_to(wire: &[T::Wire; N]) -> Self {
        // SAFETY: every element is covered by the caller's guarantee for the whole array.
        std::array::from_fn(|i| unsafe { T::convert_to(&wire[i]) })
    }
}
