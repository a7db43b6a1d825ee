use h5wire_buffer::{Arena, Staging, VarLenSlot};
use h5wire_dtype::DType;
use h5wire_error::H5WireResult;

use crate::{H5Type, VarLenWire};

impl<T: H5Type> H5Type for Vec<T> {
    type Wire = VarLenWire;
    type Buffer = Arena<VarLenSlot<T::Wire, T::Buffer>>;
    const MEMBERS: usize = T::MEMBERS;

    fn dtype_with_names(names: &[String]) -> H5WireResult<DType> {
        Ok(DType::var_len(T::dtype_with_names(names)?))
    }

    fn convert(&self, buffer: &mut Self::Buffer) -> VarLenWire {
        let mut nested = T::Buffer::default();
        nested.reserve(self.len());
        let elements: Box<[T::Wire]> = self.iter().map(|v| v.convert(&mut nested)).collect();
        VarLenWire::from_slot(buffer.push(VarLenSlot::new(elements, nested)))
    }

    unsafe fn convert_to(wire: &VarLenWire) -> Self {
        // SAFETY: the caller guarantees the wire references `len` element wires, and in turn
        // every pointer inside those elements.
        unsafe {
            wire.as_slice::<T::Wire>()
                .iter()
                .map(|element| T::convert_to(element))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WireValue;

    #[test]
    fn nested_sequences_round_trip() {
        let value = vec![
            vec!["a".to_string(), "bb".to_string()],
            vec![],
            vec!["ccc".to_string()],
        ];
        let mut buffer = Default::default();
        let wire = value.convert(&mut buffer);
        assert_eq!(wire.len(), 3);
        // SAFETY: the wire points into `buffer`, which is still alive.
        assert_eq!(unsafe { Vec::<Vec<String>>::convert_to(&wire) }, value);
    }

    #[test]
    fn addresses_survive_later_conversions() {
        let mut buffer = Default::default();
        let first = vec![1u32, 2, 3].convert(&mut buffer);
        for i in 0..500u32 {
            vec![i; 4].convert(&mut buffer);
        }
        // SAFETY: the wire points into `buffer`, which is still alive.
        assert_eq!(unsafe { Vec::<u32>::convert_to(&first) }, vec![1, 2, 3]);
    }

    #[test]
    fn null_wire_is_empty() {
        // SAFETY: null wires are always valid to decode.
        assert!(unsafe { Vec::<f64>::convert_to(&VarLenWire::EMPTY) }.is_empty());
    }

    #[test]
    fn layout() {
        let dtype = Vec::<i32>::dtype();
        assert!(dtype.is_var_len());
        assert_eq!(dtype.byte_size(), size_of::<VarLenWire>());
    }
}
