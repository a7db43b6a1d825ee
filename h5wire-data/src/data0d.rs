use std::ffi::c_void;
use std::fmt::{Debug, Formatter};
use std::sync::OnceLock;

use h5wire_buffer::BufferPool;
use h5wire_convert::{FieldAt, H5Type};
use h5wire_dtype::{DType, DataSpace, type_names};
use h5wire_error::H5WireResult;

use crate::WireData;

/// A single value of `T` stored in a scalar dataspace.
pub struct Data0D<T: H5Type> {
    wire: T::Wire,
    type_names: Vec<String>,
    dtype: OnceLock<DType>,
    pool: BufferPool<T::Buffer>,
}

impl<T: H5Type> Data0D<T> {
    /// A container holding `value`.
    pub fn new(value: &T) -> Self {
        let pool = BufferPool::<T::Buffer>::new();
        let wire = pool.with(|buffer| value.convert(buffer));
        Self {
            wire,
            type_names: Vec::new(),
            dtype: OnceLock::new(),
            pool,
        }
    }

    /// A container holding `value`, with named compound members.
    pub fn with_names<S: Into<String>>(
        value: &T,
        names: impl IntoIterator<Item = S>,
    ) -> H5WireResult<Self> {
        let mut data = Self::new(value);
        data.set_type_names(names)?;
        Ok(data)
    }

    /// Decodes the value.
    pub fn value(&self) -> T {
        // SAFETY: the wire was converted into this container's pool, or written by storage
        // under the guarantee that its pointers outlive the container.
        unsafe { T::convert_to(&self.wire) }
    }

    /// Replaces the value.
    ///
    /// The staging of the previous value is kept until the container is dropped.
    pub fn set_value(&mut self, value: &T) {
        self.wire = self.pool.with(|buffer| value.convert(buffer));
    }

    /// Decodes field `I` of the compound value.
    pub fn get_value<const I: usize>(&self) -> <T as FieldAt<I>>::Field
    where
        T: FieldAt<I>,
    {
        let field = <T as FieldAt<I>>::field_wire(&self.wire);
        // SAFETY: a field of a valid compound wire is itself valid.
        unsafe { <<T as FieldAt<I>>::Field as H5Type>::convert_to(field) }
    }

    /// Converts `field` and stores it as field `I` of the compound value.
    pub fn set_field<const I: usize>(&mut self, field: &<T as FieldAt<I>>::Field)
    where
        T: FieldAt<I>,
    {
        let field_wire = self
            .pool
            .with(|buffer| field.convert(<T as FieldAt<I>>::field_buffer(buffer)));
        *<T as FieldAt<I>>::field_wire_mut(&mut self.wire) = field_wire;
    }

    /// The wire value.
    pub fn raw(&self) -> &T::Wire {
        &self.wire
    }

    /// The member names given to the layout.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    /// Renames the compound members.
    pub fn set_type_names<S: Into<String>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> H5WireResult<()> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let dtype = T::dtype_with_names(&names)?;
        self.type_names = names;
        self.dtype = OnceLock::from(dtype);
        Ok(())
    }

    /// Takes the member names from a stored layout.
    pub fn set_type_names_from(&mut self, dtype: &DType) -> H5WireResult<()> {
        self.set_type_names(type_names(dtype, T::MEMBERS))
    }
}

impl<T: H5Type + Default> Default for Data0D<T> {
    fn default() -> Self {
        Self::new(&T::default())
    }
}

impl<T: H5Type> Clone for Data0D<T> {
    fn clone(&self) -> Self {
        Self {
            wire: self.wire,
            type_names: self.type_names.clone(),
            dtype: self.dtype.clone(),
            pool: self.pool.clone(),
        }
    }
}

impl<T: H5Type> Debug for Data0D<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data0D")
            .field("wire", &self.wire)
            .field("type_names", &self.type_names)
            .finish()
    }
}

// SAFETY: the container holds exactly one `T::Wire`, the size of `T`'s layout.
unsafe impl<T: H5Type> WireData for Data0D<T> {
    fn dtype(&self) -> H5WireResult<DType> {
        if let Some(dtype) = self.dtype.get() {
            return Ok(dtype.clone());
        }
        let dtype = T::dtype_with_names(&self.type_names)?;
        Ok(self.dtype.get_or_init(|| dtype).clone())
    }

    fn data_space(&self) -> DataSpace {
        DataSpace::scalar()
    }

    fn size(&self) -> usize {
        1
    }

    fn data_write_ptr(&self) -> *const c_void {
        std::ptr::from_ref(&self.wire).cast()
    }

    fn data_read_ptr(&mut self) -> *mut c_void {
        std::ptr::from_mut(&mut self.wire).cast()
    }

    fn resize(&mut self, space: &DataSpace, _dtype: &DType) -> bool {
        space.selection_size() <= 1
    }
}

#[cfg(test)]
mod tests {
    use h5wire_dtype::ScalarKind;

    use super::*;

    #[test]
    fn scalar_value() {
        let mut data = Data0D::new(&3.5f64);
        assert_eq!(data.value(), 3.5);
        assert_eq!(data.data_space(), DataSpace::scalar());
        assert_eq!(data.size(), 1);
        assert_eq!(data.dtype().unwrap(), DType::Scalar(ScalarKind::F64));

        data.set_value(&-1.0);
        assert_eq!(data.value(), -1.0);
        assert_eq!(*data.raw(), -1.0);
    }

    #[test]
    fn compound_fields() {
        let mut data = Data0D::with_names(&("a".to_string(), 7u32), ["label", "count"]).unwrap();
        assert_eq!(data.get_value::<0>(), "a");
        assert_eq!(data.get_value::<1>(), 7);

        data.set_field::<0>(&"longer label".to_string());
        data.set_value(&("b".to_string(), 8));
        data.set_field::<1>(&9);
        assert_eq!(data.value(), ("b".to_string(), 9));

        let dtype = data.dtype().unwrap();
        let names = dtype.as_compound().unwrap().names().collect::<Vec<_>>();
        assert_eq!(names, vec!["label", "count"]);
    }

    #[test]
    fn clone_outlives_original() {
        let data = Data0D::new(&vec!["x".to_string(), "y".to_string()]);
        let clone = data.clone();
        drop(data);
        assert_eq!(clone.value(), vec!["x", "y"]);
    }

    #[test]
    fn resize_accepts_single_values() {
        let mut data = Data0D::<i16>::default();
        assert!(data.resize(&DataSpace::scalar(), &ScalarKind::I16.into()));
        assert!(data.resize(&DataSpace::linear(1), &ScalarKind::I16.into()));
        assert!(!data.resize(&DataSpace::linear(2), &ScalarKind::I16.into()));
    }
}
