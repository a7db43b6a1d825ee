use h5wire_buffer::Staging;
use h5wire_dtype::DType;
use h5wire_error::{H5WireExpect, H5WireResult, h5wire_bail};

use crate::WireValue;

/// A type with a binary wire layout.
pub trait H5Type: Sized {
    /// The representation copied verbatim into and out of storage
    type Wire: WireValue;

    /// The staging that keeps memory referenced by [`Self::Wire`] alive
    type Buffer: Staging;

    /// The number of named members of the layout: the tuple arity for compounds, zero otherwise
    const MEMBERS: usize = 0;

    /// The layout of [`Self::Wire`], naming compound members after `names`.
    ///
    /// Missing or empty names default to `type_<index>`. Supplying more names than the layout
    /// has members is a layout error.
    fn dtype_with_names(names: &[String]) -> H5WireResult<DType>;

    /// The layout of [`Self::Wire`] with default member names.
    fn dtype() -> DType {
        Self::dtype_with_names(&[]).h5wire_expect("default layouts are always valid")
    }

    /// Converts the value into its wire form, staging owned memory in `buffer`.
    ///
    /// The returned wire value may point into `buffer` and must not outlive it.
    fn convert(&self, buffer: &mut Self::Buffer) -> Self::Wire;

    /// Decodes a wire value.
    ///
    /// # Safety
    /// Every pointer embedded in `wire` must either be null or valid for reads of the length
    /// stored next to it, recursively.
    unsafe fn convert_to(wire: &Self::Wire) -> Self;
}

/// Resolves the member names of a compound with `members` members.
pub(crate) fn member_names(names: &[String], members: usize) -> H5WireResult<Vec<String>> {
    if names.len() > members {
        h5wire_bail!(
            Layout: "{} names given for a compound of {} members",
            names.len(),
            members
        );
    }
    Ok((0..members)
        .map(|i| match names.get(i) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("type_{i}"),
        })
        .collect())
}

/// Rejects member names for layouts that have no members.
pub(crate) fn no_member_names(names: &[String], dtype: DType) -> H5WireResult<DType> {
    if !names.is_empty() {
        h5wire_bail!(Layout: "member names given for {}, which is not a compound", dtype);
    }
    Ok(dtype)
}
