use std::fmt::{Display, Formatter};
use std::sync::Arc;

use h5wire_error::{H5WireResult, h5wire_bail};
use itertools::Itertools;
use DType::*;

use crate::{CompoundDType, Dimensions, ScalarKind};

/// The byte size of a variable-length wire value: a length and a pointer.
pub const VAR_LEN_WIRE_SIZE: usize = size_of::<usize>() + size_of::<*const u8>();

/// The memory layout of one wire value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DType {
    /// A single fixed-width scalar
    Scalar(ScalarKind),
    /// A fixed-size, possibly multi-dimensional array of elements stored inline
    Array {
        /// The layout of one element
        element: Arc<DType>,
        /// The shape of the array, outermost axis first
        dims: Dimensions,
    },
    /// A variable-length sequence, stored as a length and a pointer to the elements
    VarLen(Arc<DType>),
    /// A variable-length string, stored as a length and a pointer to NUL-terminated bytes
    VarString,
    /// A fixed-size, NUL-padded string of the given number of bytes
    FixedString(usize),
    /// A struct of named members at fixed offsets
    Compound(CompoundDType),
}

/// The coarse class of a layout, as compared by [`DType::is_equivalent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DTypeClass {
    /// Booleans and integers
    Integer,
    /// Floating point numbers
    Float,
    /// Fixed-size and variable-length strings
    String,
    /// Inline arrays
    Array,
    /// Variable-length sequences
    VarLen,
    /// Compounds
    Compound,
}

impl DType {
    /// The layout of a boolean
    pub const BOOL: Self = Scalar(ScalarKind::Bool);

    /// Creates an array layout, validating that the shape has at least one axis and no empty
    /// axis.
    pub fn array(element: DType, dims: impl Into<Dimensions>) -> H5WireResult<Self> {
        let dims = dims.into();
        if dims.rank() == 0 {
            h5wire_bail!(Layout: "array of {} has no dimensions", element);
        }
        if dims.contains(&0) {
            h5wire_bail!(Layout: "array of {} has an empty dimension in {}", element, dims);
        }
        Ok(Array {
            element: Arc::new(element),
            dims,
        })
    }

    /// Creates a variable-length sequence layout.
    pub fn var_len(element: DType) -> Self {
        VarLen(Arc::new(element))
    }

    /// Creates a fixed-size string layout of `len` bytes.
    pub fn fixed_string(len: usize) -> H5WireResult<Self> {
        if len == 0 {
            h5wire_bail!(Layout: "fixed-size strings must hold at least one byte");
        }
        Ok(FixedString(len))
    }

    /// The number of bytes one value of this layout occupies in memory.
    pub fn byte_size(&self) -> usize {
        match self {
            Scalar(kind) => kind.byte_size(),
            Array { element, dims } => {
                let len = usize::try_from(dims.prod()).unwrap_or(usize::MAX);
                element.byte_size().saturating_mul(len)
            }
            VarLen(_) | VarString => VAR_LEN_WIRE_SIZE,
            FixedString(len) => *len,
            Compound(compound) => compound.size(),
        }
    }

    /// The coarse class of this layout.
    pub fn class(&self) -> DTypeClass {
        match self {
            Scalar(kind) if kind.is_float() => DTypeClass::Float,
            Scalar(_) => DTypeClass::Integer,
            Array { .. } => DTypeClass::Array,
            VarLen(_) => DTypeClass::VarLen,
            VarString | FixedString(_) => DTypeClass::String,
            Compound(_) => DTypeClass::Compound,
        }
    }

    /// Loose equality: both layouts have the same class and the same byte size.
    ///
    /// Unlike `==`, this ignores signedness, member names and element layouts.
    pub fn is_equivalent(&self, other: &DType) -> bool {
        self.class() == other.class() && self.byte_size() == other.byte_size()
    }

    /// Structural equality: both layouts place the same kinds of values at the same offsets.
    ///
    /// Unlike `==`, this ignores member names.
    pub fn same_layout(&self, other: &DType) -> bool {
        match (self, other) {
            (Compound(a), Compound(b)) => {
                a.size() == b.size()
                    && a.len() == b.len()
                    && a.members().iter().zip(b.members()).all(|(a, b)| {
                        a.offset() == b.offset() && a.dtype().same_layout(b.dtype())
                    })
            }
            (
                Array {
                    element: a,
                    dims: a_dims,
                },
                Array {
                    element: b,
                    dims: b_dims,
                },
            ) => a_dims == b_dims && a.same_layout(b),
            (VarLen(a), VarLen(b)) => a.same_layout(b),
            _ => self == other,
        }
    }

    /// Check if `self` is a scalar
    pub fn is_scalar(&self) -> bool {
        matches!(self, Scalar(_))
    }

    /// Check if `self` is an inline array
    pub fn is_array(&self) -> bool {
        matches!(self, Array { .. })
    }

    /// Check if `self` is a compound
    pub fn is_compound(&self) -> bool {
        matches!(self, Compound(_))
    }

    /// Check if `self` is a variable-length sequence
    pub fn is_var_len(&self) -> bool {
        matches!(self, VarLen(_))
    }

    /// Check if `self` is a variable-length string
    pub fn is_var_string(&self) -> bool {
        matches!(self, VarString)
    }

    /// Check if `self` is a fixed-size string
    pub fn is_fixed_string(&self) -> bool {
        matches!(self, FixedString(_))
    }

    /// The shape of an array layout.
    pub fn array_dims(&self) -> Option<&Dimensions> {
        match self {
            Array { dims, .. } => Some(dims),
            _ => None,
        }
    }

    /// The element layout of an array or a variable-length sequence.
    pub fn element(&self) -> Option<&DType> {
        match self {
            Array { element, .. } | VarLen(element) => Some(element.as_ref()),
            _ => None,
        }
    }

    /// Get the [`CompoundDType`] if `self` is a compound.
    pub fn as_compound(&self) -> Option<&CompoundDType> {
        match self {
            Compound(compound) => Some(compound),
            _ => None,
        }
    }
}

impl From<ScalarKind> for DType {
    fn from(value: ScalarKind) -> Self {
        Scalar(value)
    }
}

impl From<CompoundDType> for DType {
    fn from(value: CompoundDType) -> Self {
        Compound(value)
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar(kind) => write!(f, "{}", kind),
            Array { element, dims } => write!(f, "array({}){}", element, dims),
            VarLen(element) => write!(f, "vlen({})", element),
            VarString => write!(f, "string"),
            FixedString(len) => write!(f, "string[{}]", len),
            Compound(compound) => write!(
                f,
                "{{{}}}",
                compound
                    .members()
                    .iter()
                    .map(|m| format!("{}@{}={}", m.name(), m.offset(), m.dtype()))
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::CompoundMember;

    fn point() -> DType {
        CompoundDType::try_new(
            16,
            vec![
                CompoundMember::new("x", 0, ScalarKind::F64.into()),
                CompoundMember::new("y", 8, ScalarKind::F64.into()),
            ],
        )
        .unwrap()
        .into()
    }

    #[rstest]
    #[case(DType::BOOL, 1)]
    #[case(ScalarKind::I32.into(), 4)]
    #[case(DType::array(ScalarKind::F64.into(), [4]).unwrap(), 32)]
    #[case(DType::array(ScalarKind::I16.into(), [2, 3]).unwrap(), 12)]
    #[case(DType::var_len(ScalarKind::U8.into()), VAR_LEN_WIRE_SIZE)]
    #[case(DType::VarString, VAR_LEN_WIRE_SIZE)]
    #[case(DType::fixed_string(7).unwrap(), 7)]
    #[case(point(), 16)]
    fn byte_sizes(#[case] dtype: DType, #[case] expected: usize) {
        assert_eq!(dtype.byte_size(), expected);
    }

    #[test]
    fn invalid_layouts() {
        assert!(DType::array(ScalarKind::I32.into(), [0]).unwrap_err().is_layout());
        assert!(DType::array(ScalarKind::I32.into(), Vec::<u64>::new()).unwrap_err().is_layout());
        assert!(DType::fixed_string(0).unwrap_err().is_layout());
    }

    #[test]
    fn loose_equivalence() {
        let int: DType = ScalarKind::I32.into();
        let uint: DType = ScalarKind::U32.into();
        let float: DType = ScalarKind::F32.into();
        assert!(int.is_equivalent(&uint));
        assert_ne!(int, uint);
        assert!(!int.is_equivalent(&float));
    }

    #[test]
    fn same_layout_ignores_names() {
        let renamed: DType = CompoundDType::try_new(
            16,
            vec![
                CompoundMember::new("type_0", 0, ScalarKind::F64.into()),
                CompoundMember::new("type_1", 8, ScalarKind::F64.into()),
            ],
        )
        .unwrap()
        .into();
        assert_ne!(point(), renamed);
        assert!(point().same_layout(&renamed));
        assert!(
            DType::array(point(), [5])
                .unwrap()
                .same_layout(&DType::array(renamed.clone(), [5]).unwrap())
        );
        assert!(!DType::array(point(), [5])
            .unwrap()
            .same_layout(&DType::array(renamed, [4]).unwrap()));

        let int: DType = ScalarKind::I32.into();
        assert!(!int.same_layout(&ScalarKind::U32.into()));
    }

    #[test]
    fn byte_size_saturates() {
        let huge = DType::array(ScalarKind::F64.into(), [u64::MAX]).unwrap();
        assert_eq!(huge.byte_size(), usize::MAX);
        let nested = DType::array(huge, [u64::MAX, u64::MAX]).unwrap();
        assert_eq!(nested.byte_size(), usize::MAX);
    }

    #[test]
    fn accessors() {
        let array = DType::array(ScalarKind::F64.into(), [2, 2]).unwrap();
        assert!(array.is_array());
        assert_eq!(array.array_dims().unwrap().as_slice(), &[2, 2]);
        assert_eq!(array.element(), Some(&DType::Scalar(ScalarKind::F64)));
        assert!(array.as_compound().is_none());
        assert!(point().as_compound().is_some());
        assert!(DType::var_len(DType::VarString).element().unwrap().is_var_string());
    }

    #[test]
    fn display() {
        assert_eq!(
            DType::array(ScalarKind::F64.into(), [4]).unwrap().to_string(),
            "array(f64)[4]"
        );
        assert_eq!(point().to_string(), "{x@0=f64, y@8=f64}");
        assert_eq!(DType::var_len(DType::VarString).to_string(), "vlen(string)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_json_roundtrip() {
        let dtype = DType::var_len(point());
        let json = serde_json::to_string(&dtype).unwrap();
        let back: DType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dtype);
    }
}
