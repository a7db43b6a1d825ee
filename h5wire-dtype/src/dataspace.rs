use std::fmt::{Display, Formatter};

use h5wire_error::{H5WireResult, h5wire_bail};

use crate::{Dimensions, prod};

/// A regular hyperslab: `count` blocks of `block` elements per axis, starting at `offset` and
/// spaced `stride` elements apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    offset: Dimensions,
    count: Dimensions,
    stride: Dimensions,
    block: Dimensions,
}

impl Selection {
    /// A contiguous selection of `count` elements per axis starting at `offset`.
    ///
    /// Stride and block default to one on every axis.
    pub fn new(offset: impl Into<Dimensions>, count: impl Into<Dimensions>) -> H5WireResult<Self> {
        let offset = offset.into();
        let count = count.into();
        let ones = Dimensions::new(vec![1; count.rank()]);
        Self::try_new(offset, count, ones.clone(), ones)
    }

    /// A selection with explicit stride and block sizes.
    pub fn try_new(
        offset: Dimensions,
        count: Dimensions,
        stride: Dimensions,
        block: Dimensions,
    ) -> H5WireResult<Self> {
        let rank = count.rank();
        if offset.rank() != rank || stride.rank() != rank || block.rank() != rank {
            h5wire_bail!(
                "selection ranks differ (offset {}, count {}, stride {}, block {})",
                offset.rank(),
                rank,
                stride.rank(),
                block.rank()
            );
        }
        if stride.contains(&0) || block.contains(&0) {
            h5wire_bail!("selection stride and block must be non-zero");
        }
        Ok(Self {
            offset,
            count,
            stride,
            block,
        })
    }

    /// The start of the selection on every axis.
    pub fn offset(&self) -> &Dimensions {
        &self.offset
    }

    /// The number of blocks on every axis.
    pub fn count(&self) -> &Dimensions {
        &self.count
    }

    /// The distance between two blocks on every axis.
    pub fn stride(&self) -> &Dimensions {
        &self.stride
    }

    /// The size of one block on every axis.
    pub fn block(&self) -> &Dimensions {
        &self.block
    }

    /// The number of elements selected, saturating at `u64::MAX`.
    pub fn size(&self) -> u64 {
        self.count.prod().saturating_mul(self.block.prod())
    }

    /// The shape of the selected elements when packed densely.
    pub fn extent(&self) -> Dimensions {
        self.count
            .iter()
            .zip(self.block.iter())
            .map(|(c, b)| c.saturating_mul(*b))
            .collect()
    }

    fn fits(&self, dims: &Dimensions) -> bool {
        if dims.rank() != self.count.rank() {
            return false;
        }
        (0..dims.rank()).all(|axis| {
            let count = self.count[axis];
            if count == 0 {
                return self.offset[axis] <= dims[axis];
            }
            (count - 1)
                .checked_mul(self.stride[axis])
                .and_then(|span| span.checked_add(self.offset[axis]))
                .and_then(|start| start.checked_add(self.block[axis]))
                .is_some_and(|end| end <= dims[axis])
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Extent {
    Null,
    Scalar,
    Simple(Dimensions),
}

/// Describes how many values a storage call transfers and in which shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataSpace {
    extent: Extent,
    selection: Option<Selection>,
}

impl DataSpace {
    /// A dataspace holding no elements.
    pub const fn null() -> Self {
        Self {
            extent: Extent::Null,
            selection: None,
        }
    }

    /// A dataspace holding exactly one element and no shape.
    pub const fn scalar() -> Self {
        Self {
            extent: Extent::Scalar,
            selection: None,
        }
    }

    /// A one dimensional dataspace of `len` elements.
    pub fn linear(len: u64) -> Self {
        Self::simple(Dimensions::linear(len))
    }

    /// A dataspace with the given shape.
    pub fn simple(dims: impl Into<Dimensions>) -> Self {
        Self {
            extent: Extent::Simple(dims.into()),
            selection: None,
        }
    }

    /// Restricts this dataspace to a hyperslab.
    ///
    /// Fails if the selection does not match the rank of the shape or reaches past its
    /// extent. Null and scalar dataspaces cannot be restricted.
    pub fn select(mut self, selection: Selection) -> H5WireResult<Self> {
        let Extent::Simple(dims) = &self.extent else {
            h5wire_bail!("cannot select a hyperslab of a {} dataspace", self);
        };
        if !selection.fits(dims) {
            h5wire_bail!(
                "selection with count {} at offset {} does not fit into {}",
                selection.count(),
                selection.offset(),
                dims
            );
        }
        self.selection = Some(selection);
        Ok(self)
    }

    /// Removes a previously applied selection.
    pub fn select_all(mut self) -> Self {
        self.selection = None;
        self
    }

    /// Returns true if this dataspace holds no elements by definition.
    pub fn is_null(&self) -> bool {
        matches!(self.extent, Extent::Null)
    }

    /// Returns true if this is a scalar dataspace.
    pub fn is_scalar(&self) -> bool {
        matches!(self.extent, Extent::Scalar)
    }

    /// Returns true if this dataspace has an explicit shape.
    pub fn is_simple(&self) -> bool {
        matches!(self.extent, Extent::Simple(_))
    }

    /// The shape of a simple dataspace.
    pub fn dimensions(&self) -> Option<&Dimensions> {
        match &self.extent {
            Extent::Simple(dims) => Some(dims),
            _ => None,
        }
    }

    /// The number of axes. Null and scalar dataspaces have none.
    pub fn rank(&self) -> usize {
        self.dimensions().map_or(0, Dimensions::rank)
    }

    /// The applied selection, if any.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The total number of elements, ignoring any selection, saturating at `u64::MAX`.
    pub fn size(&self) -> u64 {
        match &self.extent {
            Extent::Null => 0,
            Extent::Scalar => 1,
            Extent::Simple(dims) => prod(dims),
        }
    }

    /// The number of selected elements. Equal to [`Self::size`] if nothing was selected.
    pub fn selection_size(&self) -> u64 {
        self.selection.as_ref().map_or_else(|| self.size(), Selection::size)
    }
}

impl From<Dimensions> for DataSpace {
    fn from(value: Dimensions) -> Self {
        Self::simple(value)
    }
}

impl Display for DataSpace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.extent {
            Extent::Null => write!(f, "null"),
            Extent::Scalar => write!(f, "scalar"),
            Extent::Simple(dims) => write!(f, "simple{}", dims),
        }?;
        if let Some(selection) = &self.selection {
            write!(f, " selecting {}", selection.extent())?;
        }
        Ok(())
    }
}
