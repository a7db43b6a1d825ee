use std::fmt::{Debug, Display, Formatter};

/// The fixed-width scalar kinds a wire value can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarKind {
    /// A boolean, stored as one byte holding `0` or `1`
    Bool,
    /// An 8-bit unsigned integer
    U8,
    /// A 16-bit unsigned integer
    U16,
    /// A 32-bit unsigned integer
    U32,
    /// A 64-bit unsigned integer
    U64,
    /// An 8-bit signed integer
    I8,
    /// A 16-bit signed integer
    I16,
    /// A 32-bit signed integer
    I32,
    /// A 64-bit signed integer
    I64,
    /// A 32-bit IEEE-754 floating point number
    F32,
    /// A 64-bit IEEE-754 floating point number
    F64,
}

/// A native Rust type whose memory representation is exactly one [`ScalarKind`].
pub trait NativeScalar: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// The scalar kind of this type
    const KIND: ScalarKind;
}

macro_rules! native_scalar {
    ($T:ty, $kind:ident) => {
        impl NativeScalar for $T {
            const KIND: ScalarKind = ScalarKind::$kind;
        }
    };
}

native_scalar!(u8, U8);
native_scalar!(u16, U16);
native_scalar!(u32, U32);
native_scalar!(u64, U64);
native_scalar!(i8, I8);
native_scalar!(i16, I16);
native_scalar!(i32, I32);
native_scalar!(i64, I64);
native_scalar!(f32, F32);
native_scalar!(f64, F64);

impl ScalarKind {
    /// The number of bytes one value of this kind occupies.
    pub const fn byte_size(&self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Returns true if this is a signed or unsigned integer.
    pub const fn is_int(&self) -> bool {
        self.is_unsigned_int() || self.is_signed_int()
    }

    /// Returns true if this is an unsigned integer.
    pub const fn is_unsigned_int(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Returns true if this is a signed integer.
    pub const fn is_signed_int(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Returns true if this is a floating point number.
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl Display for ScalarKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}
