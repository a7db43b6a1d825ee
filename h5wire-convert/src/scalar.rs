use h5wire_dtype::{DType, NativeScalar, ScalarKind};
use num_traits::PrimInt;
use h5wire_error::{H5WireExpect, H5WireResult};

use crate::H5Type;
use crate::h5type::no_member_names;

macro_rules! impl_h5type_native {
    ($($T:ty),+) => {
        $(impl H5Type for $T {
            type Wire = $T;
            type Buffer = ();

            fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
                no_member_names(names, DType::Scalar(<$T as NativeScalar>::KIND))
            }

            #[inline]
            fn convert(&self, _buffer: &mut ()) -> $T {
                *self
            }

            #[inline]
            unsafe fn convert_to(wire: &$T) -> Self {
                *wire
            }
        })+
    };
}

impl_h5type_native!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl H5Type for bool {
    type Wire = u8;
    type Buffer = ();

    fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
        no_member_names(names, DType::Scalar(ScalarKind::Bool))
    }

    #[inline]
    fn convert(&self, _buffer: &mut ()) -> u8 {
        u8::from(*self)
    }

    #[inline]
    unsafe fn convert_to(wire: &u8) -> Self {
        *wire != 0
    }
}

/// Casts `value` to `T`, clamping to the bounds of `T` where it does not fit.
fn saturating_cast<R: PrimInt, T: PrimInt>(value: R) -> T {
    num_traits::cast(value).unwrap_or_else(|| {
        if value > R::zero() {
            T::max_value()
        } else {
            T::min_value()
        }
    })
}

// Pointer-sized integers are stored as 64-bit integers.
macro_rules! impl_h5type_numcast {
    ($T:ty => $Repr:ty) => {
        impl H5Type for $T {
            type Wire = $Repr;
            type Buffer = ();

            fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
                <$Repr as H5Type>::dtype_with_names(names)
            }

            #[inline]
            fn convert(&self, _buffer: &mut ()) -> $Repr {
                num_traits::cast::<$T, $Repr>(*self)
                    .h5wire_expect(concat!(stringify!($T), " fits into ", stringify!($Repr)))
            }

            /// Stored values outside the range of the target saturate.
            #[inline]
            unsafe fn convert_to(wire: &$Repr) -> Self {
                saturating_cast(*wire)
            }
        }
    };
}

impl_h5type_numcast!(usize => u64);
impl_h5type_numcast!(isize => i64);
