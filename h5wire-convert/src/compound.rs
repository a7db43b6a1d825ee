use std::mem::offset_of;

use h5wire_dtype::{CompoundDType, CompoundMember, DType};
use h5wire_error::H5WireResult;

use crate::h5type::member_names;
use crate::{H5Type, WireValue};

/// Access to one field of a compound, by position.
///
/// Implemented for every tuple `(T1, .., Tn)` and every `I < n`. It lets a single field be
/// decoded from, or encoded into, a compound wire value without touching the other fields.
pub trait FieldAt<const I: usize>: H5Type {
    /// The type of the field
    type Field: H5Type;

    /// The field of a value
    fn field(value: &Self) -> &Self::Field;

    /// The field of a wire value
    fn field_wire(wire: &Self::Wire) -> &<Self::Field as H5Type>::Wire;

    /// The field of a wire value, mutably
    fn field_wire_mut(wire: &mut Self::Wire) -> &mut <Self::Field as H5Type>::Wire;

    /// The staging of the field within the compound staging
    fn field_buffer(buffer: &mut Self::Buffer) -> &mut <Self::Field as H5Type>::Buffer;
}

macro_rules! impl_compound {
    ($Wire:ident, $n:literal; $($T:ident => $idx:tt),+) => {
        /// The wire form of a compound: the field wires laid out in declaration order.
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $Wire<$($T),+>($(pub $T),+);

        impl<$($T),+> $Wire<$($T),+> {
            /// The byte offset of every field, in declaration order
            pub const OFFSETS: [usize; $n] = [$(offset_of!(Self, $idx)),+];
        }

        impl<$($T: WireValue),+> WireValue for $Wire<$($T),+> {
            const EMPTY: Self = $Wire($($T::EMPTY),+);
        }

        impl<$($T: H5Type),+> H5Type for ($($T,)+) {
            type Wire = $Wire<$($T::Wire),+>;
            type Buffer = ($($T::Buffer,)+);
            const MEMBERS: usize = $n;

            fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
                let names = member_names(names, $n)?;
                let offsets = $Wire::<$($T::Wire),+>::OFFSETS;
                let members = vec![
                    $(CompoundMember::new(
                        names[$idx].as_str(),
                        offsets[$idx],
                        $T::dtype_with_names(&[])?,
                    )),+
                ];
                Ok(CompoundDType::try_new(size_of::<Self::Wire>(), members)?.into())
            }

            fn convert(&self, buffer: &mut Self::Buffer) -> Self::Wire {
                $Wire($(self.$idx.convert(&mut buffer.$idx)),+)
            }

            unsafe fn convert_to(wire: &Self::Wire) -> Self {
                // SAFETY: every field is covered by the caller's guarantee for the compound.
                unsafe { ($($T::convert_to(&wire.$idx),)+) }
            }
        }

        impl_compound!(@fields [$($T),+] $($T => $idx),+);
    };
    (@fields $generics:tt $($F:ident => $idx:tt),+) => {
        $(impl_compound!(@field $generics $F => $idx);)+
    };
    (@field [$($T:ident),+] $F:ident => $idx:tt) => {
        impl<$($T: H5Type),+> FieldAt<$idx> for ($($T,)+) {
            type Field = $F;

            #[inline]
            fn field(value: &Self) -> &$F {
                &value.$idx
            }

            #[inline]
            fn field_wire(wire: &Self::Wire) -> &$F::Wire {
                &wire.$idx
            }

            #[inline]
            fn field_wire_mut(wire: &mut Self::Wire) -> &mut $F::Wire {
                &mut wire.$idx
            }

            #[inline]
            fn field_buffer(buffer: &mut Self::Buffer) -> &mut $F::Buffer {
                &mut buffer.$idx
            }
        }
    };
}

impl_compound!(CompoundWire1, 1; A => 0);
impl_compound!(CompoundWire2, 2; A => 0, B => 1);
impl_compound!(CompoundWire3, 3; A => 0, B => 1, C => 2);
impl_compound!(CompoundWire4, 4; A => 0, B => 1, C => 2, D => 3);
impl_compound!(CompoundWire5, 5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_compound!(CompoundWire6, 6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_compound!(CompoundWire7, 7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_compound!(CompoundWire8, 8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
impl_compound!(
    CompoundWire9, 9;
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8
);
impl_compound!(
    CompoundWire10, 10;
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9
);
impl_compound!(
    CompoundWire11, 11;
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10
);
impl_compound!(
    CompoundWire12, 12;
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10,
    L => 11
);
