use super::{ArrayShape, Element};

/// Compile-time rank and atomic element type of a container type.
///
/// Each level of `Vec<T>`, `[T; N]`, `[T]`, `*const T` or `*mut T` adds one to the rank of `T`.
/// An atomic [`Element`] has rank 0 and is its own [`Atomic`](ArrayDims::Atomic) type.
///
/// The rank is a property of the type, not of a value: an empty `Vec<Vec<f32>>` has rank 2.
///
/// ```rust
/// # use dataset_io::array::{array_rank, ArrayDims};
/// assert_eq!(array_rank::<f64>(), 0);
/// assert_eq!(array_rank::<Vec<Vec<f64>>>(), 2);
/// assert_eq!(array_rank::<[[u8; 4]; 2]>(), 2);
/// assert_eq!(array_rank::<*mut Vec<i32>>(), 2);
/// let _: <Vec<[f32; 3]> as ArrayDims>::Atomic = 1.0f32;
/// ```
pub trait ArrayDims {
    /// The number of nesting levels.
    const RANK: usize;

    /// The innermost, non-container element type.
    type Atomic: Element;
}

/// Return the rank of the container type `T`.
#[must_use]
pub const fn array_rank<T: ArrayDims + ?Sized>() -> usize {
    T::RANK
}

/// Extents of a type that are fixed at compile time.
///
/// Implemented by fixed length elements (no extents) and by fixed-size arrays of them.
/// Types implementing this trait are laid out contiguously in memory.
pub trait FixedExtents: ArrayDims {
    /// Append the fixed extents of `Self`, outermost first.
    fn push_fixed_extents(shape: &mut ArrayShape);

    /// Return the fixed extents of `Self`, outermost first.
    #[must_use]
    fn fixed_extents() -> ArrayShape {
        let mut shape = Vec::with_capacity(Self::RANK);
        Self::push_fixed_extents(&mut shape);
        shape
    }
}

macro_rules! impl_array_dims_atomic {
    ($($raw_type:ty),+ $(,)?) => {
        $(
            impl ArrayDims for $raw_type {
                const RANK: usize = 0;
                type Atomic = $raw_type;
            }
        )+
    };
}

macro_rules! impl_fixed_extents_atomic {
    ($($raw_type:ty),+ $(,)?) => {
        $(
            impl FixedExtents for $raw_type {
                fn push_fixed_extents(_shape: &mut ArrayShape) {}
            }
        )+
    };
}

impl_array_dims_atomic!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    half::f16,
    f32,
    f64,
    num_complex::Complex32,
    num_complex::Complex64,
    String,
);

impl_fixed_extents_atomic!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    half::f16,
    f32,
    f64,
    num_complex::Complex32,
    num_complex::Complex64,
);

impl<T: ArrayDims> ArrayDims for Vec<T> {
    const RANK: usize = 1 + T::RANK;
    type Atomic = T::Atomic;
}

impl<T: ArrayDims, const N: usize> ArrayDims for [T; N] {
    const RANK: usize = 1 + T::RANK;
    type Atomic = T::Atomic;
}

impl<T: ArrayDims> ArrayDims for [T] {
    const RANK: usize = 1 + T::RANK;
    type Atomic = T::Atomic;
}

impl<T: ArrayDims> ArrayDims for *const T {
    const RANK: usize = 1 + T::RANK;
    type Atomic = T::Atomic;
}

impl<T: ArrayDims> ArrayDims for *mut T {
    const RANK: usize = 1 + T::RANK;
    type Atomic = T::Atomic;
}

impl<T: FixedExtents, const N: usize> FixedExtents for [T; N] {
    fn push_fixed_extents(shape: &mut ArrayShape) {
        shape.push(N as u64);
        T::push_fixed_extents(shape);
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use super::*;

    fn atomic_type_id<T: ArrayDims + ?Sized>() -> TypeId
    where
        T::Atomic: 'static,
    {
        TypeId::of::<T::Atomic>()
    }

    #[test]
    fn array_dims_rank() {
        assert_eq!(array_rank::<u8>(), 0);
        assert_eq!(array_rank::<String>(), 0);
        assert_eq!(array_rank::<Vec<u8>>(), 1);
        assert_eq!(array_rank::<Vec<String>>(), 1);
        assert_eq!(array_rank::<Vec<Vec<Vec<f32>>>>(), 3);
        assert_eq!(array_rank::<[f64; 0]>(), 1);
        assert_eq!(array_rank::<[[f64; 3]; 2]>(), 2);
        assert_eq!(array_rank::<[i16]>(), 1);
        assert_eq!(array_rank::<[[i16; 2]]>(), 2);
        assert_eq!(array_rank::<*const f32>(), 1);
        assert_eq!(array_rank::<*mut *mut f32>(), 2);
        assert_eq!(array_rank::<Vec<[*const u8; 4]>>(), 3);
    }

    #[test]
    fn array_dims_atomic() {
        assert_eq!(atomic_type_id::<u8>(), TypeId::of::<u8>());
        assert_eq!(atomic_type_id::<Vec<Vec<f32>>>(), TypeId::of::<f32>());
        assert_eq!(atomic_type_id::<[[i64; 3]; 2]>(), TypeId::of::<i64>());
        assert_eq!(atomic_type_id::<[String]>(), TypeId::of::<String>());
        assert_eq!(atomic_type_id::<*mut Vec<u16>>(), TypeId::of::<u16>());
        assert_eq!(
            atomic_type_id::<Vec<num_complex::Complex64>>(),
            TypeId::of::<num_complex::Complex64>()
        );
    }

    #[test]
    fn fixed_extents() {
        assert!(f32::fixed_extents().is_empty());
        assert_eq!(<[u8; 4]>::fixed_extents(), vec![4]);
        assert_eq!(<[[u8; 4]; 2]>::fixed_extents(), vec![2, 4]);
        assert_eq!(<[[[u8; 0]; 4]; 2]>::fixed_extents(), vec![2, 4, 0]);
    }
}
