use std::fmt::{Debug, Display, Formatter};

use bytes::{BufMut, Bytes, BytesMut};
use h5wire_buffer::Arena;
use h5wire_dtype::DType;
use h5wire_error::{H5WireError, H5WireResult, h5wire_bail};

use crate::h5type::no_member_names;
use crate::{H5Type, VarLenWire};

impl H5Type for String {
    type Wire = VarLenWire;
    type Buffer = Arena<Bytes>;

    fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
        no_member_names(names, DType::VarString)
    }

    fn convert(&self, buffer: &mut Arena<Bytes>) -> VarLenWire {
        let mut bytes = BytesMut::with_capacity(self.len() + 1);
        bytes.put_slice(self.as_bytes());
        bytes.put_u8(0);
        let slot = buffer.push(bytes.freeze());
        VarLenWire::from_raw_parts(slot.ptr().cast(), self.len())
    }

    unsafe fn convert_to(wire: &VarLenWire) -> Self {
        // SAFETY: forwarded from the caller.
        let bytes: &[u8] = unsafe { wire.as_slice() };
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// A string of at most `N` bytes stored inline, padded with NUL bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedStr<const N: usize>([u8; N]);

impl<const N: usize> FixedStr<N> {
    /// Creates a fixed-size string, failing if `value` is longer than `N` bytes.
    pub fn new(value: &str) -> H5WireResult<Self> {
        Self::from_bytes(value.as_bytes())
    }

    /// Creates a fixed-size string from raw bytes, failing if there are more than `N`.
    pub fn from_bytes(value: &[u8]) -> H5WireResult<Self> {
        if value.len() > N {
            h5wire_bail!(
                "string of {} bytes does not fit into a fixed-size string of {} bytes",
                value.len(),
                N
            );
        }
        let mut bytes = [0u8; N];
        bytes[..value.len()].copy_from_slice(value);
        Ok(Self(bytes))
    }

    /// The bytes up to the first NUL
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        &self.0[..len]
    }

    /// The full NUL-padded storage
    pub fn as_padded(&self) -> &[u8; N] {
        &self.0
    }

    /// The string content, replacing invalid UTF-8 sequences
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> TryFrom<&str> for FixedStr<N> {
    type Error = H5WireError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const N: usize> Display for FixedStr<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl<const N: usize> Debug for FixedStr<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FixedStr<{}>({:?})", N, String::from_utf8_lossy(self.as_bytes()))
    }
}

impl<const N: usize> H5Type for FixedStr<N> {
    type Wire = [u8; N];
    type Buffer = ();

    fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
        const { assert!(N > 0, "fixed-size strings must hold at least one byte") };
        no_member_names(names, DType::FixedString(N))
    }

    #[inline]
    fn convert(&self, _buffer: &mut ()) -> [u8; N] {
        const { assert!(N > 0, "fixed-size strings must hold at least one byte") };
        self.0
    }

    #[inline]
    unsafe fn convert_to(wire: &[u8; N]) -> Self {
        Self(*wire)
    }
}

#[cfg(test)]
mod tests {
    use h5wire_buffer::Staging;
    use rstest::rstest;

    use super::*;
    use crate::WireValue;

    #[rstest]
    #[case("")]
    #[case("a")]
    #[case("hello world")]
    #[case("grüße")]
    fn string_round_trip(#[case] value: &str) {
        let mut buffer = Arena::default();
        let wire = value.to_string().convert(&mut buffer);
        assert_eq!(wire.len(), value.len());
        // SAFETY: the wire points into `buffer`, which is still alive.
        let decoded = unsafe { String::convert_to(&wire) };
        assert_eq!(decoded, value);
    }

    #[test]
    fn strings_are_nul_terminated() {
        let mut buffer = Arena::default();
        let wire = "abc".to_string().convert(&mut buffer);
        // SAFETY: the staged slot holds the three bytes plus a terminator.
        let staged: &[u8] = unsafe { VarLenWire::from_raw_parts(wire.ptr(), 4).as_slice() };
        assert_eq!(staged, b"abc\0");
        assert_eq!(buffer.staged(), 1);
    }

    #[test]
    fn null_wire_decodes_to_empty_string() {
        // SAFETY: a null wire is always valid to decode.
        assert_eq!(unsafe { String::convert_to(&VarLenWire::EMPTY) }, "");
    }

    #[test]
    fn fixed_str() {
        let value = FixedStr::<8>::new("abc").unwrap();
        assert_eq!(value.as_bytes(), b"abc");
        assert_eq!(value.as_padded(), b"abc\0\0\0\0\0");
        assert_eq!(value.to_string(), "abc");
        assert_eq!(FixedStr::<8>::dtype(), DType::FixedString(8));

        let wire = value.convert(&mut ());
        // SAFETY: fixed-size string wires embed no pointers.
        assert_eq!(unsafe { FixedStr::<8>::convert_to(&wire) }, value);

        assert!(FixedStr::<2>::new("abc").unwrap_err().is_invalid_argument());
        assert_eq!(FixedStr::<3>::new("abc").unwrap().as_bytes(), b"abc");
    }
}
