//! Conversion between in-memory containers and the raw buffers of a storage engine.
//!
//! A [`DataConverter`] binds one container to one on-disk [`Dataspace`] for the duration of a single read or write.
//! It exposes a raw buffer for the engine's transfer primitives and, after a read, rebuilds the container from that buffer.
//!
//! The converter used for a container type is selected at compile time by [`Container::Converter`]:
//!
//! | Container | Converter |
//! |---|---|
//! | fixed length elements, `[T; N]`, `[T]` | [`IdentityConverter`]: the container itself is the buffer |
//! | `Vec<T>`, `Vec<[T; N]>` | [`VecConverter`]: resized to the on-disk extent on read |
//! | `Vec<String>` | [`StringVecConverter`]: marshals through engine-owned, nul-terminated strings |
//! | `Vec<Vec<T>>`, ... | [`NestedVecConverter`]: flattened into an intermediate contiguous buffer |
//!
//! A scalar `String` is not a [`Container`], so a rank zero string dataset cannot be read or written.
//! Strings are only transferred as the elements of a `Vec<String>`.

mod identity_converter;
mod nested_vec_converter;
mod string_vec_converter;
mod vec_converter;

use std::ffi::c_void;

use thiserror::Error;

pub use self::{
    identity_converter::IdentityConverter, nested_vec_converter::NestedVecConverter,
    string_vec_converter::StringVecConverter, vec_converter::VecConverter,
};

use crate::storage::{StorageEngine, StorageError};

use super::{ArrayDims, ArrayShape, Dataspace, ElementFixedLength, FixedExtents};

/// A conversion error.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The container and dataspace ranks differ.
    #[error("container of rank {container_rank} cannot be bound to a dataspace of rank {dataspace_rank}")]
    RankMismatch {
        /// The rank of the container.
        container_rank: usize,
        /// The rank of the dataspace.
        dataspace_rank: usize,
    },
    /// A container extent that cannot be resized does not match the on-disk extent.
    #[error("container extent {actual} does not match dataset extent {expected} in dimension {dimension}")]
    InvalidContainerExtent {
        /// The dimension index.
        dimension: usize,
        /// The on-disk extent.
        expected: u64,
        /// The container extent.
        actual: u64,
    },
    /// The dataspace cannot be addressed in memory.
    #[error("dataspace {0} is too large to be held in memory")]
    ExtentOverflow(Dataspace),
    /// A string to be written contains a nul byte.
    #[error("string element {0} contains an interior nul byte")]
    InteriorNul(usize),
    /// A string returned by the storage engine is not valid UTF-8.
    #[error("string element {0} is not valid UTF-8")]
    InvalidUtf8(usize),
    /// The storage engine did not populate a string element.
    #[error("string element {0} was not populated by the storage engine")]
    NullString(usize),
    /// Engine-owned variable-length memory could not be reclaimed.
    #[error("failed to reclaim variable-length memory: {0}")]
    ReclaimError(#[source] StorageError),
}

/// Converts a container of type `TContainer` to and from the raw buffer of a storage engine `TEngine`.
///
/// A converter is created at the start of a single read or write and dropped at its end.
/// It may own intermediate buffers, but never holds a reference to the container.
///
/// # Safety
/// A pointer returned by [`transform_read`](DataConverter::transform_read) must be valid for writes,
/// and a pointer returned by [`transform_write`](DataConverter::transform_write) must be valid for reads,
/// of as many elements of the container's atomic data type as the bound dataspace holds.
/// Pointers must remain valid until the next call on the converter or the container.
pub unsafe trait DataConverter<'a, TContainer: ?Sized, TEngine: ?Sized>: Sized {
    /// Bind a new converter to the on-disk `space` of a dataset stored in `engine`.
    fn new(engine: &'a TEngine, space: &'a Dataspace) -> Self;

    /// Prepare `container` for a read and return the buffer the engine should fill.
    ///
    /// # Errors
    /// Returns a [`ConversionError`] if `container` cannot hold the bound dataspace.
    fn transform_read(&mut self, container: &mut TContainer)
        -> Result<*mut c_void, ConversionError>;

    /// Return the buffer the engine should read from to write `container`.
    ///
    /// # Errors
    /// Returns a [`ConversionError`] if `container` does not match the bound dataspace or its elements cannot be represented by the engine.
    fn transform_write(&mut self, container: &TContainer)
        -> Result<*const c_void, ConversionError>;

    /// Rebuild `container` from the buffer filled by a successful read.
    ///
    /// # Errors
    /// Returns a [`ConversionError`] if the engine output cannot be converted or its memory cannot be reclaimed.
    fn process_result(&mut self, container: &mut TContainer) -> Result<(), ConversionError>;
}

/// A container that can be read from or written to a dataset.
pub trait Container: ArrayDims {
    /// The converter for this container type.
    type Converter<'a, TEngine: ?Sized + StorageEngine + 'a>: DataConverter<'a, Self, TEngine>;
}

/// A container whose elements occupy a single contiguous buffer that cannot be resized.
///
/// # Safety
/// The pointers returned must address the container's elements, laid out as
/// `product(extents())` consecutive values of the atomic element type.
pub unsafe trait ContiguousContainer: ArrayDims {
    /// Return the extents of the container, outermost first.
    fn extents(&self) -> ArrayShape;

    /// Return a pointer to the first element.
    fn as_void_ptr(&self) -> *const c_void;

    /// Return a mutable pointer to the first element.
    fn as_mut_void_ptr(&mut self) -> *mut c_void;
}

/// An element type of a `Vec` container, selecting the converter for `Vec<Self>`.
pub trait VecElement: ArrayDims + Sized {
    /// The converter for `Vec<Self>`.
    type VecConverter<'a, TEngine: ?Sized + StorageEngine + 'a>: DataConverter<
        'a,
        Vec<Self>,
        TEngine,
    >;
}

/// Nested dynamic sequences of fixed length elements that can be flattened into a contiguous buffer.
pub trait Flatten: ArrayDims + Sized {
    /// The fixed length element at the innermost level.
    type Leaf: ElementFixedLength;

    /// Append the leaves of `self` to `leaves`, checking each level against `shape`.
    ///
    /// `dimension` is the index of the outermost dimension of `self` in the dataset.
    ///
    /// # Errors
    /// Returns [`ConversionError::InvalidContainerExtent`] if a sequence length does not match `shape`.
    fn flatten_into(
        &self,
        dimension: usize,
        shape: &[usize],
        leaves: &mut Vec<Self::Leaf>,
    ) -> Result<(), ConversionError>;

    /// Build a value of `shape` from `leaves` in row-major order.
    fn unflatten(leaves: &[Self::Leaf], shape: &[usize]) -> Self;
}

impl<T: VecElement> Container for Vec<T> {
    type Converter<'a, TEngine: ?Sized + StorageEngine + 'a> = T::VecConverter<'a, TEngine>;
}

impl<T: FixedExtents + bytemuck::Pod, const N: usize> Container for [T; N] {
    type Converter<'a, TEngine: ?Sized + StorageEngine + 'a> =
        IdentityConverter<'a, Self, TEngine>;
}

impl<T: FixedExtents + bytemuck::Pod> Container for [T] {
    type Converter<'a, TEngine: ?Sized + StorageEngine + 'a> =
        IdentityConverter<'a, Self, TEngine>;
}

unsafe impl<T: FixedExtents + bytemuck::Pod, const N: usize> ContiguousContainer for [T; N] {
    fn extents(&self) -> ArrayShape {
        Self::fixed_extents()
    }

    fn as_void_ptr(&self) -> *const c_void {
        self.as_ptr().cast()
    }

    fn as_mut_void_ptr(&mut self) -> *mut c_void {
        self.as_mut_ptr().cast()
    }
}

unsafe impl<T: FixedExtents + bytemuck::Pod> ContiguousContainer for [T] {
    fn extents(&self) -> ArrayShape {
        let mut shape = Vec::with_capacity(Self::RANK);
        shape.push(self.len() as u64);
        T::push_fixed_extents(&mut shape);
        shape
    }

    fn as_void_ptr(&self) -> *const c_void {
        self.as_ptr().cast()
    }

    fn as_mut_void_ptr(&mut self) -> *mut c_void {
        self.as_mut_ptr().cast()
    }
}

impl<T: FixedExtents + bytemuck::Pod, const N: usize> VecElement for [T; N] {
    type VecConverter<'a, TEngine: ?Sized + StorageEngine + 'a> = VecConverter<'a, Self, TEngine>;
}

impl VecElement for String {
    type VecConverter<'a, TEngine: ?Sized + StorageEngine + 'a> = StringVecConverter<'a, TEngine>;
}

impl<T: Flatten> VecElement for Vec<T> {
    type VecConverter<'a, TEngine: ?Sized + StorageEngine + 'a> =
        NestedVecConverter<'a, Vec<Self>, TEngine>;
}

impl<T: Flatten> Flatten for Vec<T> {
    type Leaf = T::Leaf;

    fn flatten_into(
        &self,
        dimension: usize,
        shape: &[usize],
        leaves: &mut Vec<Self::Leaf>,
    ) -> Result<(), ConversionError> {
        let (extent, inner_shape) = split_shape(shape);
        if self.len() != extent {
            return Err(ConversionError::InvalidContainerExtent {
                dimension,
                expected: extent as u64,
                actual: self.len() as u64,
            });
        }
        for element in self {
            element.flatten_into(dimension + 1, inner_shape, leaves)?;
        }
        Ok(())
    }

    fn unflatten(leaves: &[Self::Leaf], shape: &[usize]) -> Self {
        let (extent, inner_shape) = split_shape(shape);
        let stride: usize = inner_shape.iter().product();
        if stride == 0 {
            (0..extent).map(|_| T::unflatten(&[], inner_shape)).collect()
        } else {
            leaves
                .chunks_exact(stride)
                .take(extent)
                .map(|chunk| T::unflatten(chunk, inner_shape))
                .collect()
        }
    }
}

macro_rules! impl_converters_fixed_atomic {
    ($($raw_type:ty),+ $(,)?) => {
        $(
            impl Container for $raw_type {
                type Converter<'a, TEngine: ?Sized + StorageEngine + 'a> =
                    IdentityConverter<'a, Self, TEngine>;
            }

            unsafe impl ContiguousContainer for $raw_type {
                fn extents(&self) -> ArrayShape {
                    Vec::new()
                }

                fn as_void_ptr(&self) -> *const c_void {
                    std::ptr::from_ref(self).cast()
                }

                fn as_mut_void_ptr(&mut self) -> *mut c_void {
                    std::ptr::from_mut(self).cast()
                }
            }

            impl VecElement for $raw_type {
                type VecConverter<'a, TEngine: ?Sized + StorageEngine + 'a> =
                    VecConverter<'a, Self, TEngine>;
            }

            impl Flatten for $raw_type {
                type Leaf = Self;

                fn flatten_into(
                    &self,
                    _dimension: usize,
                    _shape: &[usize],
                    leaves: &mut Vec<Self::Leaf>,
                ) -> Result<(), ConversionError> {
                    leaves.push(*self);
                    Ok(())
                }

                fn unflatten(leaves: &[Self::Leaf], _shape: &[usize]) -> Self {
                    leaves
                        .first()
                        .copied()
                        .unwrap_or_else(bytemuck::Zeroable::zeroed)
                }
            }
        )+
    };
}

impl_converters_fixed_atomic!(
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

fn split_shape(shape: &[usize]) -> (usize, &[usize]) {
    shape
        .split_first()
        .map_or((0, &[][..]), |(&extent, inner_shape)| (extent, inner_shape))
}

/// Check that the extents of a container match the extents of a dataspace.
///
/// # Errors
/// Returns [`ConversionError::RankMismatch`] if the number of extents differ, or
/// [`ConversionError::InvalidContainerExtent`] for the first extent that differs.
pub fn check_extents(container: &[u64], space: &Dataspace) -> Result<(), ConversionError> {
    if container.len() != space.number_dimensions() {
        return Err(ConversionError::RankMismatch {
            container_rank: container.len(),
            dataspace_rank: space.number_dimensions(),
        });
    }
    for (dimension, (&actual, &expected)) in container.iter().zip(space.dimensions()).enumerate() {
        if actual != expected {
            return Err(ConversionError::InvalidContainerExtent {
                dimension,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// The largest number of bytes a single allocation may span.
const MAX_ALLOCATION_SIZE: usize = isize::MAX.unsigned_abs();

/// Check that `num_elements` elements of `element_size` bytes fit in a single allocation.
fn check_allocation_size(
    space: &Dataspace,
    num_elements: usize,
    element_size: usize,
) -> Result<(), ConversionError> {
    match num_elements.checked_mul(element_size) {
        Some(size) if size <= MAX_ALLOCATION_SIZE => Ok(()),
        _ => Err(ConversionError::ExtentOverflow(space.clone())),
    }
}

/// Return the extents of a dataspace as [`usize`]s, checking that a buffer of its elements can be allocated.
///
/// `element_size` is the size in bytes of each element of the buffer.
fn dataspace_shape_usize(
    space: &Dataspace,
    element_size: usize,
) -> Result<Vec<usize>, ConversionError> {
    let num_elements = space
        .num_elements_usize()
        .ok_or_else(|| ConversionError::ExtentOverflow(space.clone()))?;
    check_allocation_size(space, num_elements, element_size)?;
    space
        .dimensions()
        .iter()
        .map(|&extent| {
            usize::try_from(extent).map_err(|_| ConversionError::ExtentOverflow(space.clone()))
        })
        .collect()
}

/// Return the outermost extent of a dataspace of at least one dimension.
///
/// `element_size` is the size in bytes of each element along the outermost dimension.
fn outer_extent(
    space: &Dataspace,
    container_rank: usize,
    element_size: usize,
) -> Result<usize, ConversionError> {
    let Some(&extent) = space.dimensions().first() else {
        return Err(ConversionError::RankMismatch {
            container_rank,
            dataspace_rank: 0,
        });
    };
    if space.num_elements_usize().is_none() {
        return Err(ConversionError::ExtentOverflow(space.clone()));
    }
    let extent =
        usize::try_from(extent).map_err(|_| ConversionError::ExtentOverflow(space.clone()))?;
    check_allocation_size(space, extent, element_size)?;
    Ok(extent)
}
