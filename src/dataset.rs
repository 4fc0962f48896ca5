//! Datasets.
//!
//! A [`Dataset`] is a handle to a single dataset held by a [`StorageEngine`].
//! It moves the entire contents of the dataset to and from any [`Container`]:
//!  - [`Dataset::read`] reads into a container, resizing dynamic sequences to the on-disk extents,
//!  - [`Dataset::write`] writes a container, which must already match the on-disk extents.
//!
//! The on-disk [`Dataspace`] is queried for every transfer and never cached, so a dataset may change between calls.
//! The rank of the container is validated against the dataspace before any transfer is issued to the engine.

mod dataset_errors;
mod dataset_path;

use std::sync::Arc;

pub use self::{
    dataset_errors::{DatasetError, Operation},
    dataset_path::{DatasetPath, DatasetPathError},
};

use crate::{
    array::{
        data_converter::check_extents, ArrayDims, Container, ConversionError, DataConverter,
        DataType, Dataspace, Element, ElementFixedLength, FixedExtents,
    },
    storage::StorageEngine,
};

/// A dataset.
#[derive(Debug)]
pub struct Dataset<TEngine: ?Sized> {
    engine: Arc<TEngine>,
    path: DatasetPath,
}

impl<TEngine: ?Sized> Clone for Dataset<TEngine> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            path: self.path.clone(),
        }
    }
}

impl<TEngine: ?Sized + StorageEngine> Dataset<TEngine> {
    /// Create a handle to the dataset at `path` in `engine`.
    ///
    /// The storage engine is not accessed, so a missing dataset is only reported by subsequent operations.
    ///
    /// # Errors
    /// Returns [`DatasetPathError`] if `path` is not a valid dataset path.
    pub fn new(engine: Arc<TEngine>, path: &str) -> Result<Self, DatasetPathError> {
        Ok(Self {
            engine,
            path: DatasetPath::new(path)?,
        })
    }

    /// Create a dataset at `path` in `engine` with `data_type` and `dataspace`.
    ///
    /// # Errors
    /// Returns a [`DatasetError`] if `path` is invalid or the storage engine fails to create the dataset.
    pub fn create(
        engine: Arc<TEngine>,
        path: &str,
        data_type: DataType,
        dataspace: Dataspace,
    ) -> Result<Self, DatasetError> {
        let dataset = Self::new(engine, path)?;
        dataset
            .engine
            .create_dataset(&dataset.path, &data_type, &dataspace)?;
        Ok(dataset)
    }

    /// Return the underlying storage engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<TEngine> {
        &self.engine
    }

    /// Return the dataset path.
    #[must_use]
    pub fn path(&self) -> &DatasetPath {
        &self.path
    }

    /// Return the on-disk dataspace.
    ///
    /// # Errors
    /// Returns [`DatasetError::DataspaceError`] if the storage engine cannot retrieve the dataspace.
    pub fn dataspace(&self) -> Result<Dataspace, DatasetError> {
        self.engine
            .dataspace(&self.path)
            .map_err(|err| DatasetError::DataspaceError(self.path.clone(), err))
    }

    /// Return the on-disk data type.
    ///
    /// # Errors
    /// Returns [`DatasetError::StorageError`] if the storage engine cannot retrieve the data type.
    pub fn data_type(&self) -> Result<DataType, DatasetError> {
        Ok(self.engine.data_type(&self.path)?)
    }

    /// Return the number of bytes used to store the dataset.
    ///
    /// # Errors
    /// Returns [`DatasetError::StorageError`] if the storage engine cannot retrieve the storage size.
    pub fn storage_size(&self) -> Result<u64, DatasetError> {
        Ok(self.engine.storage_size(&self.path)?)
    }

    fn bound_dataspace(
        &self,
        operation: Operation,
        container_rank: usize,
    ) -> Result<Dataspace, DatasetError> {
        let space = self.dataspace()?;
        if space.number_dimensions() == container_rank {
            Ok(space)
        } else {
            Err(DatasetError::ShapeMismatch {
                operation,
                container_rank,
                dataset_rank: space.number_dimensions(),
            })
        }
    }

    /// Read the entire dataset into `container`.
    ///
    /// Dynamic sequences in `container` are resized to the on-disk extents.
    /// Containers that cannot be resized, such as fixed-size arrays and slices, must already match the on-disk extents.
    ///
    /// # Errors
    /// Returns a [`DatasetError`] if
    ///  - the dataspace cannot be retrieved,
    ///  - the rank of `container` does not match the rank of the dataset,
    ///  - `container` cannot hold the on-disk extents,
    ///  - the storage engine fails to read the dataset, or
    ///  - the data read cannot be converted to `container`.
    ///
    /// The contents of `container` are unspecified if an error is returned after the rank check.
    pub fn read<T: Container + ?Sized>(&self, container: &mut T) -> Result<(), DatasetError> {
        let space = self.bound_dataspace(Operation::Read, T::RANK)?;
        let mem_type = <T::Atomic as Element>::data_type();
        let mut converter: T::Converter<'_, TEngine> = DataConverter::new(&*self.engine, &space);
        let buf = converter.transform_read(container)?;
        unsafe {
            // SAFETY: the converter guarantees buf is valid for writes of every element of space
            self.engine.read_raw(&self.path, &mem_type, &space, buf)
        }
        .map_err(|err| DatasetError::ReadError(self.path.clone(), err))?;
        converter.process_result(container)?;
        Ok(())
    }

    /// Read the entire dataset into a new container.
    ///
    /// # Errors
    /// See [`Dataset::read`].
    pub fn read_elements<T: Container + Default>(&self) -> Result<T, DatasetError> {
        let mut container = T::default();
        self.read(&mut container)?;
        Ok(container)
    }

    /// Write the entire dataset from `container`.
    ///
    /// `container` must match the on-disk extents exactly; it is never resized.
    /// An empty dynamic sequence can only be written to a dataset with an extent of zero.
    ///
    /// # Errors
    /// Returns a [`DatasetError`] if
    ///  - the dataspace cannot be retrieved,
    ///  - the rank of `container` does not match the rank of the dataset,
    ///  - the extents of `container` do not match the on-disk extents,
    ///  - an element of `container` cannot be represented by the storage engine, or
    ///  - the storage engine fails to write the dataset.
    pub fn write<T: Container + ?Sized>(&self, container: &T) -> Result<(), DatasetError> {
        let space = self.bound_dataspace(Operation::Write, T::RANK)?;
        let mem_type = <T::Atomic as Element>::data_type();
        let mut converter: T::Converter<'_, TEngine> = DataConverter::new(&*self.engine, &space);
        let buf = converter.transform_write(container)?;
        unsafe {
            // SAFETY: the converter guarantees buf is valid for reads of every element of space
            self.engine.write_raw(&self.path, &mem_type, &space, buf)
        }
        .map_err(|err| DatasetError::WriteError(self.path.clone(), err))
    }

    /// Read the entire dataset into the buffer at `ptr`.
    ///
    /// The buffer is treated as a sequence of `T`, so its rank is one more than the rank of `T`.
    /// The inner extents of `T` must match the on-disk extents.
    ///
    /// # Errors
    /// Returns a [`DatasetError`] if the dataspace cannot be retrieved, the rank or inner extents of the buffer do not match the dataset, or the storage engine fails to read the dataset.
    ///
    /// # Safety
    /// `ptr` must be valid for writes of as many `T` as the outermost on-disk extent.
    pub unsafe fn read_ptr<T>(&self, ptr: *mut T) -> Result<(), DatasetError>
    where
        T: FixedExtents,
        T::Atomic: ElementFixedLength,
    {
        let space = self.bound_dataspace(Operation::Read, <*mut T as ArrayDims>::RANK)?;
        check_pointee_extents::<T>(&space)?;
        self.engine
            .read_raw(&self.path, &<T::Atomic as Element>::data_type(), &space, ptr.cast())
            .map_err(|err| DatasetError::ReadError(self.path.clone(), err))
    }

    /// Write the entire dataset from the buffer at `ptr`.
    ///
    /// The buffer is treated as a sequence of `T`, so its rank is one more than the rank of `T`.
    /// The inner extents of `T` must match the on-disk extents.
    ///
    /// # Errors
    /// Returns a [`DatasetError`] if the dataspace cannot be retrieved, the rank or inner extents of the buffer do not match the dataset, or the storage engine fails to write the dataset.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of as many `T` as the outermost on-disk extent.
    pub unsafe fn write_ptr<T>(&self, ptr: *const T) -> Result<(), DatasetError>
    where
        T: FixedExtents,
        T::Atomic: ElementFixedLength,
    {
        let space = self.bound_dataspace(Operation::Write, <*const T as ArrayDims>::RANK)?;
        check_pointee_extents::<T>(&space)?;
        self.engine
            .write_raw(&self.path, &<T::Atomic as Element>::data_type(), &space, ptr.cast())
            .map_err(|err| DatasetError::WriteError(self.path.clone(), err))
    }
}

/// Check the inner extents of a buffer of `T` against the dataspace it is bound to.
fn check_pointee_extents<T: FixedExtents>(space: &Dataspace) -> Result<(), ConversionError> {
    let mut extents: Vec<u64> = space.dimensions().iter().take(1).copied().collect();
    T::push_fixed_extents(&mut extents);
    check_extents(&extents, space)
}
