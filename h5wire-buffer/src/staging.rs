/// Storage that keeps the memory referenced by wire values alive.
///
/// Every convertible type names a staging type. Types whose wire form is self-contained use
/// `()`, types that embed pointers use an [`crate::Arena`], and compounds use the tuple of their
/// fields' stagings.
pub trait Staging: Default + Send + 'static {
    /// Pre-allocate room for `additional` more values. Never shrinks existing capacity.
    fn reserve(&mut self, additional: usize);

    /// Release all staged memory.
    fn clear(&mut self);

    /// The number of values currently staged.
    fn staged(&self) -> usize;
}

impl Staging for () {
    #[inline]
    fn reserve(&mut self, _additional: usize) {}

    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn staged(&self) -> usize {
        0
    }
}

macro_rules! impl_staging_tuple {
    ($($S:ident => $idx:tt),+) => {
        impl<$($S: Staging),+> Staging for ($($S,)+) {
            fn reserve(&mut self, additional: usize) {
                $(self.$idx.reserve(additional);)+
            }

            fn clear(&mut self) {
                $(self.$idx.clear();)+
            }

            fn staged(&self) -> usize {
                0 $(+ self.$idx.staged())+
            }
        }
    };
}

impl_staging_tuple!(A => 0);
impl_staging_tuple!(A => 0, B => 1);
impl_staging_tuple!(A => 0, B => 1, C => 2);
impl_staging_tuple!(A => 0, B => 1, C => 2, D => 3);
impl_staging_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_staging_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_staging_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_staging_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
impl_staging_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8);
impl_staging_tuple!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9);
impl_staging_tuple!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10
);
impl_staging_tuple!(
    A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7, I => 8, J => 9, K => 10,
    L => 11
);
