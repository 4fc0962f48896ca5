use super::DataType;

/// A trait representing an atomic array element type.
///
/// An element is the innermost, non-container type of a container.
/// [`Element::data_type`] maps it to the native type descriptor passed to a storage engine.
pub trait Element: Sized {
    /// The data type of this element.
    fn data_type() -> DataType;
}

/// A marker trait for a fixed length element.
///
/// Fixed length elements are plain old data, so a slice of them is a valid raw buffer for their [`DataType`].
pub trait ElementFixedLength: Element + bytemuck::Pod {}

macro_rules! impl_element_pod {
    ($raw_type:ty, $data_type:expr) => {
        impl Element for $raw_type {
            fn data_type() -> DataType {
                $data_type
            }
        }

        impl ElementFixedLength for $raw_type {}
    };
}

impl_element_pod!(i8, DataType::Int8);
impl_element_pod!(i16, DataType::Int16);
impl_element_pod!(i32, DataType::Int32);
impl_element_pod!(i64, DataType::Int64);
impl_element_pod!(u8, DataType::UInt8);
impl_element_pod!(u16, DataType::UInt16);
impl_element_pod!(u32, DataType::UInt32);
impl_element_pod!(u64, DataType::UInt64);
impl_element_pod!(half::f16, DataType::Float16);
impl_element_pod!(f32, DataType::Float32);
impl_element_pod!(f64, DataType::Float64);
impl_element_pod!(num_complex::Complex32, DataType::Complex64);
impl_element_pod!(num_complex::Complex64, DataType::Complex128);

impl Element for String {
    fn data_type() -> DataType {
        DataType::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_data_types() {
        assert_eq!(i8::data_type(), DataType::Int8);
        assert_eq!(u64::data_type(), DataType::UInt64);
        assert_eq!(half::f16::data_type(), DataType::Float16);
        assert_eq!(f64::data_type(), DataType::Float64);
        assert_eq!(num_complex::Complex32::data_type(), DataType::Complex64);
        assert_eq!(String::data_type(), DataType::String);
    }

    #[test]
    fn element_size_matches_data_type() {
        fn check<T: ElementFixedLength>() {
            assert_eq!(T::data_type().fixed_size(), Some(core::mem::size_of::<T>()));
        }
        check::<i16>();
        check::<u32>();
        check::<half::f16>();
        check::<f32>();
        check::<num_complex::Complex64>();
    }
}
