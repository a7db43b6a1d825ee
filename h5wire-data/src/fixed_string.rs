use std::ffi::c_void;

use h5wire_dtype::{DType, DataSpace};
use h5wire_error::H5WireResult;

use crate::WireData;

/// A single fixed-size string whose size is taken from storage on read.
///
/// The bytes are NUL-padded. Unlike [`h5wire_convert::FixedStr`] the size is not part of the
/// type, so a stored string of any size can be read into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedString0D {
    bytes: Vec<u8>,
}

impl FixedString0D {
    /// A fixed-size string sized to fit `value`, and at least one byte long.
    pub fn new(value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        if bytes.is_empty() {
            bytes.push(0);
        }
        Self { bytes }
    }

    /// The string content up to the first NUL, replacing invalid UTF-8 sequences.
    pub fn value(&self) -> String {
        let len = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.bytes.len());
        String::from_utf8_lossy(&self.bytes[..len]).into_owned()
    }

    /// The size of the string in bytes, including padding.
    pub fn string_size(&self) -> usize {
        self.bytes.len()
    }

    /// The NUL-padded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for FixedString0D {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for FixedString0D {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// SAFETY: the container holds one string of `bytes.len()` bytes, the size of its layout, and
// any byte is a valid wire value.
unsafe impl WireData for FixedString0D {
    fn dtype(&self) -> H5WireResult<DType> {
        DType::fixed_string(self.bytes.len())
    }

    fn data_space(&self) -> DataSpace {
        DataSpace::scalar()
    }

    fn size(&self) -> usize {
        1
    }

    fn data_write_ptr(&self) -> *const c_void {
        self.bytes.as_ptr().cast()
    }

    fn data_read_ptr(&mut self) -> *mut c_void {
        self.bytes.as_mut_ptr().cast()
    }

    fn resize(&mut self, space: &DataSpace, dtype: &DType) -> bool {
        match dtype {
            DType::FixedString(len) if *len > 0 && space.selection_size() <= 1 => {
                log::trace!("resizing fixed-size string to {} bytes", len);
                self.bytes.resize(*len, 0);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use h5wire_dtype::ScalarKind;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 1)]
    #[case("abc", 3)]
    #[case("grüße", 7)]
    fn sized_to_content(#[case] value: &str, #[case] size: usize) {
        let string = FixedString0D::new(value);
        assert_eq!(string.string_size(), size);
        assert_eq!(string.value(), value);
        assert_eq!(string.dtype().unwrap(), DType::FixedString(size));
    }

    #[test]
    fn resize_to_stored_size() {
        let mut string = FixedString0D::from("ab");
        assert!(string.resize(&DataSpace::scalar(), &DType::FixedString(6)));
        assert_eq!(string.as_bytes(), b"ab\0\0\0\0");
        assert_eq!(string.value(), "ab");

        assert!(string.resize(&DataSpace::scalar(), &DType::FixedString(1)));
        assert_eq!(string.value(), "a");
    }

    #[test]
    fn resize_rejects_other_layouts() {
        let mut string = FixedString0D::default();
        assert!(!string.resize(&DataSpace::linear(2), &DType::FixedString(4)));
        assert!(!string.resize(&DataSpace::scalar(), &DType::VarString));
        assert!(!string.resize(&DataSpace::scalar(), &ScalarKind::U8.into()));
        assert_eq!(string.string_size(), 1);
    }
}
