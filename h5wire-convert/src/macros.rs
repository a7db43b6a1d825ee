/// Registers a type that converts to and from an already supported representation.
///
/// The type must be `Clone`, `Repr: From<Type>` and `Type: From<Repr>`. For compound
/// representations, default member names can be given after `names =`, they are used whenever
/// the caller does not name the members itself.
///
/// ```
/// use h5wire_convert::{H5Type, impl_h5type_via};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// impl From<Point> for (f64, f64) {
///     fn from(p: Point) -> Self {
///         (p.x, p.y)
///     }
/// }
///
/// impl From<(f64, f64)> for Point {
///     fn from((x, y): (f64, f64)) -> Self {
///         Point { x, y }
///     }
/// }
///
/// impl_h5type_via!(Point => (f64, f64), names = ["x", "y"]);
///
/// let dtype = Point::dtype();
/// let names = dtype.as_compound().unwrap().names().collect::<Vec<_>>();
/// assert_eq!(names, vec!["x", "y"]);
/// ```
#[macro_export]
macro_rules! impl_h5type_via {
    ($T:ty => $Repr:ty) => {
        $crate::impl_h5type_via!($T => $Repr, names = []);
    };
    ($T:ty => $Repr:ty, names = [$($name:literal),* $(,)?]) => {
        impl $crate::H5Type for $T {
            type Wire = <$Repr as $crate::H5Type>::Wire;
            type Buffer = <$Repr as $crate::H5Type>::Buffer;
            const MEMBERS: usize = <$Repr as $crate::H5Type>::MEMBERS;

            fn dtype_with_names(
                names: &[String],
            ) -> $crate::__private::H5WireResult<$crate::__private::DType> {
                let defaults: Vec<String> = vec![$(String::from($name)),*];
                if names.is_empty() {
                    <$Repr as $crate::H5Type>::dtype_with_names(&defaults)
                } else {
                    <$Repr as $crate::H5Type>::dtype_with_names(names)
                }
            }

            fn convert(&self, buffer: &mut Self::Buffer) -> Self::Wire {
                let repr = <$Repr as ::core::convert::From<$T>>::from(self.clone());
                <$Repr as $crate::H5Type>::convert(&repr, buffer)
            }

            unsafe fn convert_to(wire: &Self::Wire) -> Self {
                // SAFETY: the wire of `$T` is the wire of its representation.
                let repr = unsafe { <$Repr as $crate::H5Type>::convert_to(wire) };
                <$T as ::core::convert::From<$Repr>>::from(repr)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::H5Type;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Meters(f64);

    impl From<Meters> for f64 {
        fn from(value: Meters) -> Self {
            value.0
        }
    }

    impl From<f64> for Meters {
        fn from(value: f64) -> Self {
            Meters(value)
        }
    }

    impl_h5type_via!(Meters => f64);

    #[derive(Debug, Clone, PartialEq)]
    struct Sample {
        label: String,
        value: i32,
    }

    impl From<Sample> for (String, i32) {
        fn from(s: Sample) -> Self {
            (s.label, s.value)
        }
    }

    impl From<(String, i32)> for Sample {
        fn from((label, value): (String, i32)) -> Self {
            Sample { label, value }
        }
    }

    impl_h5type_via!(Sample => (String, i32), names = ["label", "value"]);

    #[test]
    fn newtype_uses_representation() {
        assert_eq!(Meters::dtype(), f64::dtype());
        let wire = Meters(2.5).convert(&mut ());
        assert_eq!(wire, 2.5);
        // SAFETY: scalar wires embed no pointers.
        assert_eq!(unsafe { Meters::convert_to(&wire) }, Meters(2.5));
    }

    #[test]
    fn struct_with_default_names() {
        let dtype = Sample::dtype();
        let names = dtype.as_compound().unwrap().names().collect::<Vec<_>>();
        assert_eq!(names, vec!["label", "value"]);

        let renamed = Sample::dtype_with_names(&["tag".to_string()]).unwrap();
        let names = renamed.as_compound().unwrap().names().collect::<Vec<_>>();
        assert_eq!(names, vec!["tag", "type_1"]);

        let value = Sample {
            label: "a".to_string(),
            value: 3,
        };
        let mut buffer = Default::default();
        let wire = value.convert(&mut buffer);
        // SAFETY: the wire points into `buffer`, which is still alive.
        assert_eq!(unsafe { Sample::convert_to(&wire) }, value);
    }
}
