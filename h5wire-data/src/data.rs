use std::ffi::c_void;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ops::Index;
use std::sync::OnceLock;

use h5wire_buffer::BufferPool;
use h5wire_convert::{FieldAt, H5Type, WireValue};
use h5wire_dtype::{DType, DataSpace, Dimensions, idx, type_names};
use h5wire_error::{H5WireResult, h5wire_bail, h5wire_err};

use crate::WireData;

/// An owned sequence of wire values of `T`, with an optional row-major shape.
///
/// Values are converted on insertion and decoded on access. The staging that the wire values
/// point into lives in a [`BufferPool`] shared by every clone of the container, so a clone keeps
/// the embedded pointers of the original valid.
pub struct Data<T: H5Type> {
    raw: Vec<T::Wire>,
    dims: Option<Dimensions>,
    type_names: Vec<String>,
    dtype: OnceLock<DType>,
    pool: BufferPool<T::Buffer>,
    _type: PhantomData<fn() -> T>,
}

impl<T: H5Type> Data<T> {
    /// An empty container with default member names.
    pub fn new() -> Self {
        Self {
            raw: Vec::new(),
            dims: None,
            type_names: Vec::new(),
            dtype: OnceLock::new(),
            pool: BufferPool::new(),
            _type: PhantomData,
        }
    }

    /// An empty container whose compound members carry the given names.
    ///
    /// Empty names fall back to `type_<i>`. Fails with a layout error if more names are given
    /// than `T` has members, or if the names clash.
    pub fn with_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> H5WireResult<Self> {
        let mut data = Self::new();
        data.set_type_names(names)?;
        Ok(data)
    }

    /// A container holding a single value.
    pub fn from_value(value: &T) -> Self {
        let mut data = Self::new();
        data.push_back(value);
        data
    }

    /// A container holding every value of `values`, in order.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        let mut data = Self::new();
        data.extend(values);
        data
    }

    /// A container adopting already converted wire values.
    ///
    /// # Safety
    /// Every pointer embedded in `raw` must stay valid for as long as the container, or any
    /// value decoded from it, is used.
    pub unsafe fn from_raw(raw: Vec<T::Wire>) -> Self {
        let mut data = Self::new();
        data.raw = raw;
        data
    }

    /// Decodes one wire value of this container.
    fn decode(wire: &T::Wire) -> T {
        // SAFETY: wire values held by a container were converted into its pool, which lives at
        // least as long as the container, or were written by storage or `from_raw` under the
        // guarantee that their pointers outlive the container.
        unsafe { T::convert_to(wire) }
    }

    fn wire(&self, index: usize) -> H5WireResult<&T::Wire> {
        self.raw
            .get(index)
            .ok_or_else(|| h5wire_err!(OutOfBounds: index, 0, self.raw.len()))
    }

    /// Converts `value` and appends it.
    pub fn push_back(&mut self, value: &T) {
        let wire = self.pool.with(|buffer| value.convert(buffer));
        self.raw.push(wire);
    }

    /// Converts and appends every value of `values`.
    ///
    /// The staging is locked once per value, so `values` may itself push into a clone of this
    /// container.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        let values = values.into_iter();
        #[cfg(feature = "reserve-hints")]
        self.reserve(values.size_hint().0);
        let pool = &self.pool;
        self.raw
            .extend(values.map(|value| pool.with(|buffer| value.convert(buffer))));
    }

    /// Converts and appends every value of `values` without taking ownership.
    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.reserve(values.len());
        let raw = &mut self.raw;
        self.pool
            .with(|buffer| raw.extend(values.iter().map(|value| value.convert(buffer))));
    }

    /// Reserves room for `additional` more values, in the wire sequence and the staging.
    pub fn reserve(&mut self, additional: usize) {
        self.raw.reserve(additional);
        self.pool.reserve(additional);
    }

    /// Decodes the value at `index`.
    pub fn value(&self, index: usize) -> H5WireResult<T> {
        self.wire(index).map(Self::decode)
    }

    /// Decodes every value, in order.
    pub fn values(&self) -> Vec<T> {
        self.raw.iter().map(Self::decode).collect()
    }

    /// Decodes field `I` of the compound value at `index`.
    pub fn get_value<const I: usize>(
        &self,
        index: usize,
    ) -> H5WireResult<<T as FieldAt<I>>::Field>
    where
        T: FieldAt<I>,
    {
        let wire = self.wire(index)?;
        let field = <T as FieldAt<I>>::field_wire(wire);
        // SAFETY: a field of a valid compound wire is itself valid, see `decode`.
        Ok(unsafe { <<T as FieldAt<I>>::Field as H5Type>::convert_to(field) })
    }

    /// Converts `field` and stores it as field `I` of the compound value at `index`.
    ///
    /// The other fields keep their wire values.
    pub fn set_value<const I: usize>(
        &mut self,
        index: usize,
        field: &<T as FieldAt<I>>::Field,
    ) -> H5WireResult<()>
    where
        T: FieldAt<I>,
    {
        let len = self.raw.len();
        let wire = self
            .raw
            .get_mut(index)
            .ok_or_else(|| h5wire_err!(OutOfBounds: index, 0, len))?;
        let field_wire = self
            .pool
            .with(|buffer| field.convert(<T as FieldAt<I>>::field_buffer(buffer)));
        *<T as FieldAt<I>>::field_wire_mut(wire) = field_wire;
        Ok(())
    }

    /// The wire values.
    pub fn raw(&self) -> &[T::Wire] {
        &self.raw
    }

    /// The wire values, mutably.
    ///
    /// # Safety
    /// Every pointer stored into the sequence must stay valid for as long as the container, or
    /// any value decoded from it, is used.
    pub unsafe fn raw_mut(&mut self) -> &mut Vec<T::Wire> {
        &mut self.raw
    }

    /// Iterates over the wire values.
    pub fn iter(&self) -> std::slice::Iter<'_, T::Wire> {
        self.raw.iter()
    }

    /// The shape, if one has been set.
    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dims.as_ref()
    }

    /// Sets a row-major shape over the values.
    ///
    /// Fails with an invalid argument error if the shape holds more elements than the container.
    pub fn set_dimensions(&mut self, dims: impl Into<Dimensions>) -> H5WireResult<()> {
        let dims = dims.into();
        if dims.prod() > self.raw.len() as u64 {
            h5wire_bail!(
                "dimensions {} hold {} elements but the container has {}",
                dims,
                dims.prod(),
                self.raw.len()
            );
        }
        self.dims = Some(dims);
        Ok(())
    }

    /// Drops the shape, the values are then addressed linearly.
    pub fn clear_dimensions(&mut self) {
        self.dims = None;
    }

    fn flat_index(&self, indices: &[u64]) -> H5WireResult<usize> {
        match &self.dims {
            Some(dims) => idx(dims, indices),
            None => idx(&[self.raw.len() as u64], indices),
        }
    }

    /// The wire value at a multi-dimensional position.
    pub fn wire_at(&self, indices: &[u64]) -> H5WireResult<&T::Wire> {
        let index = self.flat_index(indices)?;
        self.wire(index)
    }

    /// Decodes the value at a multi-dimensional position.
    ///
    /// Without a shape the container is one-dimensional. Fails with an invalid argument error
    /// if the number of coordinates differs from the rank or a coordinate is out of range.
    pub fn value_at(&self, indices: &[u64]) -> H5WireResult<T> {
        self.wire_at(indices).map(Self::decode)
    }

    /// Decodes field `I` of the compound value at a multi-dimensional position.
    pub fn get_value_at<const I: usize>(
        &self,
        indices: &[u64],
    ) -> H5WireResult<<T as FieldAt<I>>::Field>
    where
        T: FieldAt<I>,
    {
        let index = self.flat_index(indices)?;
        self.get_value::<I>(index)
    }

    /// Decodes the values in consecutive groups of `n`.
    ///
    /// Fails with an invalid argument error if `n` is zero or does not divide the size.
    pub fn split(&self, n: usize) -> H5WireResult<Vec<Vec<T>>> {
        if n == 0 {
            h5wire_bail!("cannot split into groups of zero values");
        }
        if self.raw.len() % n != 0 {
            h5wire_bail!(
                "cannot split {} values into groups of {}",
                self.raw.len(),
                n
            );
        }
        Ok(self
            .raw
            .chunks(n)
            .map(|chunk| chunk.iter().map(Self::decode).collect())
            .collect())
    }

    /// Grows or shrinks to `len` values, padding with empty wire values.
    ///
    /// A shape that no longer fits is dropped.
    pub fn resize_len(&mut self, len: usize) {
        self.raw.resize(len, T::Wire::EMPTY);
        if self
            .dims
            .as_ref()
            .is_some_and(|dims| dims.prod() > len as u64)
        {
            self.dims = None;
        }
    }

    /// Drops every value and the shape.
    ///
    /// The staging is released too, unless a clone still shares it.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.dims = None;
        self.pool.clear();
    }

    /// Whether the container holds no values.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The number of values the wire sequence can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// The staging shared with every clone of this container.
    pub fn pool(&self) -> &BufferPool<T::Buffer> {
        &self.pool
    }

    /// The member names given to the layout.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    /// Renames the compound members.
    ///
    /// Fails with a layout error, leaving the names untouched, if the names do not fit `T`.
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
    ///
    /// Names are only taken if `dtype` is a compound with at least as many members as `T`,
    /// otherwise the defaults apply.
    pub fn set_type_names_from(&mut self, dtype: &DType) -> H5WireResult<()> {
        self.set_type_names(type_names(dtype, T::MEMBERS))
    }
}

/// The number of `T` values one value of the stored layout widens into, if it does.
///
/// A stored array of `T`, or a compound whose only member is an array of `T`, is read as
/// consecutive `T` values. Member names of the element are not compared.
fn widening<'a>(stored: &'a DType, own: &DType) -> Option<&'a Dimensions> {
    let array = match stored {
        DType::Array { .. } => stored,
        DType::Compound(compound) if compound.len() == 1 => compound.member_at(0)?.dtype(),
        _ => return None,
    };
    match array {
        DType::Array { element, dims } if element.same_layout(own) => Some(dims),
        _ => None,
    }
}

impl<T: H5Type> Default for Data<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: H5Type> Clone for Data<T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            dims: self.dims.clone(),
            type_names: self.type_names.clone(),
            dtype: self.dtype.clone(),
            pool: self.pool.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: H5Type> Debug for Data<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("len", &self.raw.len())
            .field("dims", &self.dims)
            .field("type_names", &self.type_names)
            .field("pool", &self.pool)
            .finish()
    }
}

impl<T: H5Type> From<Vec<T>> for Data<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_values(values)
    }
}

impl<T: H5Type> FromIterator<T> for Data<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl<T: H5Type> Index<usize> for Data<T> {
    type Output = T::Wire;

    fn index(&self, index: usize) -> &Self::Output {
        &self.raw[index]
    }
}

impl<'a, T: H5Type> IntoIterator for &'a Data<T> {
    type Item = &'a T::Wire;
    type IntoIter = std::slice::Iter<'a, T::Wire>;

    fn into_iter(self) -> Self::IntoIter {
        self.raw.iter()
    }
}

// SAFETY: the wire sequence holds `size()` values of `T::Wire`, whose size is the byte size of
// `T`'s layout, and its pointers stay valid for as long as the pool or the storage that wrote
// them.
unsafe impl<T: H5Type> WireData for Data<T> {
    fn dtype(&self) -> H5WireResult<DType> {
        if let Some(dtype) = self.dtype.get() {
            return Ok(dtype.clone());
        }
        let dtype = T::dtype_with_names(&self.type_names)?;
        Ok(self.dtype.get_or_init(|| dtype).clone())
    }

    fn data_space(&self) -> DataSpace {
        match &self.dims {
            Some(dims) => DataSpace::simple(dims.clone()),
            None => DataSpace::linear(self.raw.len() as u64),
        }
    }

    fn size(&self) -> usize {
        self.raw.len()
    }

    fn data_write_ptr(&self) -> *const c_void {
        self.raw.as_ptr().cast()
    }

    fn data_read_ptr(&mut self) -> *mut c_void {
        self.raw.as_mut_ptr().cast()
    }

    fn resize(&mut self, space: &DataSpace, dtype: &DType) -> bool {
        let Ok(own) = WireData::dtype(self) else {
            return false;
        };
        let Ok(selection) = usize::try_from(space.selection_size()) else {
            return false;
        };
        let widened = widening(dtype, &own);
        let factor = widened.map_or(Some(1), |dims| {
            dims.checked_prod()
                .and_then(|prod| usize::try_from(prod).ok())
        });
        let Some(count) = factor.and_then(|factor| selection.checked_mul(factor)) else {
            return false;
        };
        if let Err(err) = self.raw.try_reserve(count.saturating_sub(self.raw.len())) {
            log::debug!("cannot resize to {} values of {}: {}", count, own, err);
            return false;
        }

        self.resize_len(count);
        if let Some(dims) = space.dimensions() {
            if space.size() == space.selection_size() {
                let mut dims = dims.as_slice().to_vec();
                if let Some(inner) = widened {
                    dims.extend_from_slice(inner);
                }
                self.dims = Some(dims.into());
            }
        }

        match widened {
            Some(inner) => {
                log::debug!(
                    "widening {} stored values of {} into {} values of {}",
                    selection,
                    dtype,
                    count,
                    own
                );
                log::trace!("widened by {}", inner);
                selection
                    .checked_mul(dtype.byte_size())
                    .zip(count.checked_mul(own.byte_size()))
                    .is_some_and(|(needed, available)| needed <= available)
            }
            None => selection <= self.raw.len(),
        }
    }
}
