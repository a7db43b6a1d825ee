use h5wire_convert::H5Type;
use h5wire_error::{H5WireResult, h5wire_bail};
use itertools::{Itertools, multizip};

use crate::Data;

/// A compound that can be assembled from, and split into, one column per member.
pub trait CompoundColumns: H5Type {
    /// One `Vec` per member, in declaration order
    type Columns;

    /// Zips the columns into rows.
    ///
    /// Fails with an invalid argument error if the columns differ in length.
    fn zip_columns(columns: Self::Columns) -> H5WireResult<Vec<Self>>;

    /// Splits rows into columns.
    fn unzip_columns(rows: Vec<Self>) -> Self::Columns;
}

macro_rules! impl_columns {
    ($($T:ident => $idx:tt),+) => {
        impl<$($T: H5Type),+> CompoundColumns for ($($T,)+) {
            type Columns = ($(Vec<$T>,)+);

            fn zip_columns(columns: Self::Columns) -> H5WireResult<Vec<Self>> {
                let lens = [$(columns.$idx.len()),+];
                if !lens.iter().all_equal() {
                    h5wire_bail!("columns differ in length: {}", lens.iter().join(", "));
                }
                Ok(multizip(($(columns.$idx.into_iter(),)+)).collect())
            }

            fn unzip_columns(rows: Vec<Self>) -> Self::Columns {
                rows.into_iter().multiunzip()
            }
        }
    };
}

impl_columns!(A => 0);
impl_columns!(A => 0, B => 1);
impl_columns!(A => 0, B => 1, C => 2);
impl_columns!(A => 0, B => 1, C => 2, D => 3);
impl_columns!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_columns!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_columns!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_columns!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
impl_columns!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8);
impl_columns!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9);
impl_columns!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10
);
impl_columns!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10,
    L => 11
);

impl<T: CompoundColumns> Data<T> {
    /// A container of compounds built from one column per member.
    ///
    /// Fails with an invalid argument error if the columns differ in length.
    pub fn from_columns(columns: T::Columns) -> H5WireResult<Self> {
        T::zip_columns(columns).map(Self::from_values)
    }

    /// Decodes every value and splits them into one column per member.
    pub fn unpack_columns(&self) -> T::Columns {
        T::unzip_columns(self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_round_trip() {
        let data = Data::<(String, f64)>::from_columns((
            vec!["a".to_string(), "b".to_string()],
            vec![1.0, 2.0],
        ))
        .unwrap();
        assert_eq!(
            data.values(),
            vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)]
        );

        let (labels, values) = data.unpack_columns();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn single_column() {
        let data = Data::<(u8,)>::from_columns((vec![1, 2, 3],)).unwrap();
        assert_eq!(data.get_value::<0>(2).unwrap(), 3);
        assert_eq!(data.unpack_columns(), (vec![1, 2, 3],));
    }

    #[test]
    fn columns_must_have_equal_lengths() {
        let err = Data::<(i32, i32, i32)>::from_columns((vec![1, 2], vec![3, 4], vec![5]))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("2, 2, 1"));
    }
}
