use std::fmt::{Display, Formatter};
use std::ops::Deref;

use h5wire_error::{H5WireResult, h5wire_bail, h5wire_err};
use itertools::Itertools;

/// A row-major shape: the extent of every axis, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions(Vec<u64>);

impl Dimensions {
    /// Create a new [`Dimensions`] from a list of extents.
    pub fn new(dims: impl Into<Vec<u64>>) -> Self {
        Self(dims.into())
    }

    /// A one dimensional shape with `len` elements.
    pub fn linear(len: u64) -> Self {
        Self(vec![len])
    }

    /// The number of axes.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// The number of elements spanned by this shape, saturating at `u64::MAX`.
    pub fn prod(&self) -> u64 {
        prod(&self.0)
    }

    /// The number of elements spanned by this shape, or `None` if it does not fit a `u64`.
    pub fn checked_prod(&self) -> Option<u64> {
        checked_prod(&self.0)
    }

    /// The extents as a slice.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Drops every axis.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Consumes the shape, returning its extents.
    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }
}

impl Deref for Dimensions {
    type Target = [u64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u64>> for Dimensions {
    fn from(value: Vec<u64>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[u64; N]> for Dimensions {
    fn from(value: [u64; N]) -> Self {
        Self(value.to_vec())
    }
}

impl From<&[u64]> for Dimensions {
    fn from(value: &[u64]) -> Self {
        Self(value.to_vec())
    }
}

impl FromIterator<u64> for Dimensions {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

/// The product of all extents, saturating at `u64::MAX`. An empty list has a product of one.
pub fn prod(dims: &[u64]) -> u64 {
    checked_prod(dims).unwrap_or(u64::MAX)
}

/// The product of all extents, or `None` if it overflows.
///
/// Any empty axis makes the product zero, whatever the other extents are.
pub fn checked_prod(dims: &[u64]) -> Option<u64> {
    if dims.contains(&0) {
        return Some(0);
    }
    dims.iter().try_fold(1u64, |acc, &extent| acc.checked_mul(extent))
}

/// Computes the flat row-major offset of `indices` within `dims`.
///
/// Fails if the number of indices does not match the rank of `dims`, or if any index lies
/// outside of its axis.
pub fn idx(dims: &[u64], indices: &[u64]) -> H5WireResult<usize> {
    if dims.len() != indices.len() {
        h5wire_bail!(
            "number of indices does not match the number of dimensions ({} != {})",
            indices.len(),
            dims.len()
        );
    }

    let mut flat = 0u64;
    for (axis, (&index, &extent)) in indices.iter().zip(dims).enumerate() {
        if index >= extent {
            h5wire_bail!(
                "index {} is out of range for axis {} with extent {}",
                index,
                axis,
                extent
            );
        }
        flat = checked_prod(&dims[axis + 1..])
            .and_then(|stride| index.checked_mul(stride))
            .and_then(|offset| flat.checked_add(offset))
            .ok_or_else(|| h5wire_err!("flat index into {} dimensions overflows", dims.len()))?;
    }

    usize::try_from(flat).map_err(|_| h5wire_err!("flat index {} exceeds usize", flat))
}
