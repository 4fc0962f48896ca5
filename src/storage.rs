//! Storage engines.
//!
//! A [`StorageEngine`] holds datasets, each addressed by a [`DatasetPath`] and described by a [`DataType`] and a [`Dataspace`].
//! It only understands flat, contiguous buffers holding every element of a dataset, transferred through raw pointers.
//!
//! This module provides:
//!  - [`MemoryEngine`](memory_engine::MemoryEngine): an in-memory storage engine, and
//!  - [`UsageLogStorageEngine`](usage_log::UsageLogStorageEngine): a wrapper which logs every storage engine call.

pub mod memory_engine;
pub mod usage_log;

use std::ffi::c_void;

use thiserror::Error;

use crate::{
    array::{DataType, Dataspace},
    dataset::DatasetPath,
};

/// A storage engine error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A dataset does not exist.
    #[error("dataset {0} does not exist")]
    DatasetNotFound(DatasetPath),
    /// A dataset already exists.
    #[error("dataset {0} already exists")]
    DatasetExists(DatasetPath),
    /// The in-memory data type is not compatible with the data type of a dataset.
    #[error("in-memory data type {memory} is incompatible with dataset data type {stored}")]
    IncompatibleDataType {
        /// The data type of the dataset.
        stored: DataType,
        /// The in-memory data type.
        memory: DataType,
    },
    /// The in-memory dataspace does not match the dataspace of a dataset.
    #[error("in-memory dataspace {memory} does not match dataset dataspace {stored}")]
    DataspaceMismatch {
        /// The dataspace of the dataset.
        stored: Dataspace,
        /// The in-memory dataspace.
        memory: Dataspace,
    },
    /// Memory for a variable-length element could not be allocated.
    #[error("failed to allocate {0} bytes")]
    AllocationFailed(usize),
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

/// The raw interface of a dataset storage engine.
///
/// Every transfer covers the entire dataspace of a dataset.
/// Buffers of fixed length data types hold the elements contiguously in row-major order.
/// Buffers of [`DataType::String`] are arrays of `*mut c_char`, one per element, each pointing to a nul-terminated string.
///
/// # Safety
/// An implementation must not read from or write to a buffer beyond the extent of the in-memory dataspace passed to a transfer.
/// Variable-length memory handed out by [`read_raw`](StorageEngine::read_raw) must remain valid until it is passed to [`vlen_reclaim`](StorageEngine::vlen_reclaim).
pub unsafe trait StorageEngine: Send + Sync {
    /// Create a dataset at `path`.
    ///
    /// Fixed length elements are initialised to zero and strings to empty.
    ///
    /// # Errors
    /// Returns [`StorageError::DatasetExists`] if a dataset already exists at `path`.
    fn create_dataset(
        &self,
        path: &DatasetPath,
        data_type: &DataType,
        space: &Dataspace,
    ) -> Result<(), StorageError>;

    /// Return the dataspace of the dataset at `path`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the dataset does not exist or the query fails.
    fn dataspace(&self, path: &DatasetPath) -> Result<Dataspace, StorageError>;

    /// Return the data type of the dataset at `path`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the dataset does not exist or the query fails.
    fn data_type(&self, path: &DatasetPath) -> Result<DataType, StorageError>;

    /// Return the number of bytes used to store the dataset at `path`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the dataset does not exist or the query fails.
    fn storage_size(&self, path: &DatasetPath) -> Result<u64, StorageError>;

    /// Read the entire dataset at `path` into `buf`.
    ///
    /// `mem_space` is the dataspace the caller sized `buf` for.
    ///
    /// # Errors
    /// Returns [`StorageError::DataspaceMismatch`] if `mem_space` is not the dataspace of the dataset,
    /// [`StorageError::IncompatibleDataType`] if `mem_type` cannot be converted from the data type of the dataset,
    /// or another [`StorageError`] if the transfer fails.
    ///
    /// # Safety
    /// `buf` must be valid for writes of every element of `mem_space` with data type `mem_type`.
    unsafe fn read_raw(
        &self,
        path: &DatasetPath,
        mem_type: &DataType,
        mem_space: &Dataspace,
        buf: *mut c_void,
    ) -> Result<(), StorageError>;

    /// Write the entire dataset at `path` from `buf`.
    ///
    /// `mem_space` is the dataspace the caller sized `buf` for.
    ///
    /// # Errors
    /// Returns [`StorageError::DataspaceMismatch`] if `mem_space` is not the dataspace of the dataset,
    /// [`StorageError::IncompatibleDataType`] if `mem_type` cannot be converted to the data type of the dataset,
    /// or another [`StorageError`] if the transfer fails.
    ///
    /// # Safety
    /// `buf` must be valid for reads of every element of `mem_space` with data type `mem_type`.
    /// For [`DataType::String`], every pointer in `buf` must be null or point to a nul-terminated string.
    unsafe fn write_raw(
        &self,
        path: &DatasetPath,
        mem_type: &DataType,
        mem_space: &Dataspace,
        buf: *const c_void,
    ) -> Result<(), StorageError>;

    /// Release the variable-length memory referenced by `buf` and reset each reference to null.
    ///
    /// This is a no-op for fixed length data types.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the memory cannot be released.
    ///
    /// # Safety
    /// `buf` must have been populated by [`read_raw`](StorageEngine::read_raw) on this engine with `mem_type` and `space`,
    /// and must not have been reclaimed since.
    unsafe fn vlen_reclaim(
        &self,
        mem_type: &DataType,
        space: &Dataspace,
        buf: *mut c_void,
    ) -> Result<(), StorageError>;
}
