use h5wire::data::test_harness::MemoryStore;
use h5wire::dtype::{DType, DataSpace, Dimensions, ScalarKind};
use h5wire::error::H5WireResult;
use h5wire::{Data, Data0D, FixedStr, FixedString0D, H5Type, WireData, impl_h5type_via};

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl_h5type_via!(Point => (f64, f64), names = ["x", "y"]);

/// Writes `data` to a fresh store and reads it back into `into`, decoding with `decode` while
/// the store is alive.
fn store_and_load<W, R, O>(
    data: &W,
    into: &mut R,
    decode: impl FnOnce(&R) -> O,
) -> H5WireResult<O>
where
    W: WireData,
    R: WireData,
{
    let mut store = MemoryStore::new();
    store.write("dataset", data)?;
    // SAFETY: `into` is only decoded while the store is alive.
    unsafe { store.read("dataset", into)? };
    Ok(decode(into))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn compound_columns_end_to_end() {
        let data = Data::<(String, f64)>::from_columns((
            vec!["a".to_string(), "b".to_string()],
            vec![1.0, 2.0],
        ))
        .unwrap();

        let dtype = data.dtype().unwrap();
        let compound = dtype.as_compound().unwrap();
        assert_eq!(compound.names().collect::<Vec<_>>(), vec!["type_0", "type_1"]);
        assert_eq!(data.data_space(), DataSpace::linear(2));

        let mut read = Data::<(String, f64)>::new();
        let values = store_and_load(&data, &mut read, Data::values).unwrap();
        assert_eq!(
            values,
            vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)]
        );
    }

    #[test]
    fn named_members_are_read_back() {
        let data = Data::<(String, f64)>::with_names(["label", "value"]).unwrap();
        let mut store = MemoryStore::new();
        store.write("empty", &data).unwrap();

        let mut read = Data::<(String, f64)>::new();
        read.set_type_names_from(store.dtype("empty").unwrap())
            .unwrap();
        assert_eq!(read.type_names(), ["label", "value"]);
        // SAFETY: nothing is decoded.
        unsafe { store.read("empty", &mut read) }.unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn widening_reads_arrays_as_values() {
        let arrays = Data::from_values((0..10i32).map(|i| [i; 5]));
        assert_eq!(
            arrays.dtype().unwrap(),
            DType::array(ScalarKind::I32.into(), [5]).unwrap()
        );

        let mut read = Data::<i32>::new();
        let values = store_and_load(&arrays, &mut read, Data::values).unwrap();
        assert_eq!(read.size(), 50);
        assert_eq!(read.dimensions(), Some(&Dimensions::from([10, 5])));
        assert_eq!(values[..5], [0; 5]);
        assert_eq!(values[45..], [9; 5]);
        assert_eq!(read.value_at(&[3, 4]).unwrap(), 3);
    }

    #[test]
    fn widening_reads_wrapped_arrays() {
        let wrapped = Data::from_values((0..4u16).map(|i| ([i, i + 1],)));
        let mut read = Data::<u16>::new();
        let values = store_and_load(&wrapped, &mut read, Data::values).unwrap();
        assert_eq!(values, vec![0, 1, 1, 2, 2, 3, 3, 4]);
    }

    #[test]
    fn sequences_of_registered_types() {
        let points = vec![Point { x: 1.0, y: 2.0 }, Point { x: -3.0, y: 0.5 }];
        let data = Data::from_values([points.clone(), Vec::new(), points[..1].to_vec()]);
        assert_eq!(
            data.dtype().unwrap().to_string(),
            "vlen({x@0=f64, y@8=f64})"
        );

        let mut read = Data::<Vec<Point>>::new();
        let values = store_and_load(&data, &mut read, Data::values).unwrap();
        assert_eq!(values, vec![points.clone(), Vec::new(), points[..1].to_vec()]);
    }

    #[test]
    fn dimensions_describe_the_stored_shape() {
        let mut data = Data::from_values(0..20i32);
        assert!(data.set_dimensions([5, 5]).unwrap_err().is_invalid_argument());
        data.set_dimensions([5, 4]).unwrap();

        let mut read = Data::<i32>::new();
        let value = store_and_load(&data, &mut read, |read| read.value_at(&[4, 3])).unwrap();
        assert_eq!(value.unwrap(), 19);
        assert_eq!(read.data_space(), DataSpace::simple([5, 4]));
        assert!(read.value_at(&[19]).unwrap_err().is_invalid_argument());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(17)]
    fn strings_of_any_length(#[case] len: usize) {
        let value = "x".repeat(len);
        let data = Data::from_value(&value);
        let mut read = Data::<String>::new();
        let values = store_and_load(&data, &mut read, Data::values).unwrap();
        assert_eq!(values, vec![value]);
    }

    #[test]
    fn single_values() {
        let value = (FixedStr::<6>::new("id").unwrap(), [1.5f32, 2.5], true);
        let data = Data0D::new(&value);
        let mut read = Data0D::new(&<(FixedStr<6>, [f32; 2], bool)>::default());
        let decoded = store_and_load(&data, &mut read, Data0D::value).unwrap();
        assert_eq!(decoded, value);

        let mut too_small = Data0D::<u8>::default();
        let many = Data::from_values([1u8, 2]);
        assert!(store_and_load(&many, &mut too_small, Data0D::value).is_err());
    }

    #[test]
    fn fixed_strings_of_unknown_size() {
        let data = Data0D::new(&FixedStr::<12>::new("hello").unwrap());
        let mut read = FixedString0D::default();
        let value = store_and_load(&data, &mut read, FixedString0D::value).unwrap();
        assert_eq!(value, "hello");
        assert_eq!(read.string_size(), 12);
    }

    #[test]
    fn clones_keep_values_alive() {
        let data = Data::from_values(["kept".to_string()]);
        let clone = data.clone();
        assert_eq!(data.pool().handles(), 2);
        drop(data);
        assert_eq!(clone.pool().handles(), 1);
        assert_eq!(clone.values(), vec!["kept"]);
        assert_eq!(<String as H5Type>::dtype(), DType::VarString);
    }
}
