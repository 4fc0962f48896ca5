//! An in-memory storage engine.

use std::{
    collections::BTreeMap,
    ffi::{c_char, c_void, CStr, CString},
    sync::atomic::{AtomicUsize, Ordering},
};

use parking_lot::RwLock;

use crate::{
    array::{DataType, DataTypeSize, Dataspace},
    dataset::DatasetPath,
    storage::{StorageEngine, StorageError},
};

#[derive(Debug)]
enum MemoryData {
    Fixed(Vec<u8>),
    Strings(Vec<CString>),
}

#[derive(Debug)]
struct MemoryDataset {
    data_type: DataType,
    dataspace: Dataspace,
    data: MemoryData,
}

impl MemoryDataset {
    fn new(data_type: DataType, dataspace: Dataspace) -> Result<Self, StorageError> {
        let num_elements = num_elements(&dataspace)?;
        let data = match data_type.size() {
            DataTypeSize::Fixed(size) => MemoryData::Fixed(vec![0; num_bytes(num_elements, size)?]),
            DataTypeSize::Variable => MemoryData::Strings(vec![CString::default(); num_elements]),
        };
        Ok(Self {
            data_type,
            dataspace,
            data,
        })
    }

    fn check_transfer(&self, mem_type: &DataType, mem_space: &Dataspace) -> Result<(), StorageError> {
        if self.data_type != *mem_type {
            return Err(StorageError::IncompatibleDataType {
                stored: self.data_type,
                memory: *mem_type,
            });
        }
        if self.dataspace != *mem_space {
            return Err(StorageError::DataspaceMismatch {
                stored: self.dataspace.clone(),
                memory: mem_space.clone(),
            });
        }
        Ok(())
    }
}

fn num_elements(space: &Dataspace) -> Result<usize, StorageError> {
    space
        .num_elements_usize()
        .ok_or_else(|| StorageError::Other(format!("dataspace {space} is too large")))
}

fn num_bytes(num_elements: usize, size: usize) -> Result<usize, StorageError> {
    num_elements
        .checked_mul(size)
        .ok_or(StorageError::AllocationFailed(usize::MAX))
}

/// An in-memory storage engine.
///
/// Strings returned by a read are allocated with the C allocator and must be returned with [`StorageEngine::vlen_reclaim`].
/// The number of outstanding string allocations is reported by [`MemoryEngine::vlen_allocations`].
#[derive(Debug)]
pub struct MemoryEngine {
    datasets: RwLock<BTreeMap<DatasetPath, MemoryDataset>>,
    vlen_allocations: AtomicUsize,
}

impl MemoryEngine {
    /// Create a new, empty memory engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            datasets: RwLock::default(),
            vlen_allocations: AtomicUsize::new(0),
        }
    }

    /// Return the number of strings allocated by reads which have not been reclaimed.
    #[must_use]
    pub fn vlen_allocations(&self) -> usize {
        self.vlen_allocations.load(Ordering::SeqCst)
    }

    /// Change the dataspace of the dataset at `path`.
    ///
    /// The elements are kept in row-major order, truncated or extended with zeros (or empty strings) to fit the new dataspace.
    ///
    /// # Errors
    /// Returns [`StorageError::DatasetNotFound`] if the dataset does not exist.
    pub fn set_extent(&self, path: &DatasetPath, dataspace: Dataspace) -> Result<(), StorageError> {
        let num_elements = num_elements(&dataspace)?;
        let mut datasets = self.datasets.write();
        let dataset = datasets
            .get_mut(path)
            .ok_or_else(|| StorageError::DatasetNotFound(path.clone()))?;
        match (&mut dataset.data, dataset.data_type.size()) {
            (MemoryData::Fixed(bytes), DataTypeSize::Fixed(size)) => {
                bytes.resize(num_bytes(num_elements, size)?, 0);
            }
            (MemoryData::Strings(strings), _) => strings.resize(num_elements, CString::default()),
            (MemoryData::Fixed(_), DataTypeSize::Variable) => {
                return Err(StorageError::Other(format!(
                    "dataset {path} holds fixed length data with a variable-length data type"
                )));
            }
        }
        dataset.dataspace = dataspace;
        Ok(())
    }

    fn with_dataset<T>(
        &self,
        path: &DatasetPath,
        f: impl FnOnce(&MemoryDataset) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let datasets = self.datasets.read();
        let dataset = datasets
            .get(path)
            .ok_or_else(|| StorageError::DatasetNotFound(path.clone()))?;
        f(dataset)
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl StorageEngine for MemoryEngine {
    fn create_dataset(
        &self,
        path: &DatasetPath,
        data_type: &DataType,
        space: &Dataspace,
    ) -> Result<(), StorageError> {
        let mut datasets = self.datasets.write();
        if datasets.contains_key(path) {
            return Err(StorageError::DatasetExists(path.clone()));
        }
        datasets.insert(path.clone(), MemoryDataset::new(*data_type, space.clone())?);
        Ok(())
    }

    fn dataspace(&self, path: &DatasetPath) -> Result<Dataspace, StorageError> {
        self.with_dataset(path, |dataset| Ok(dataset.dataspace.clone()))
    }

    fn data_type(&self, path: &DatasetPath) -> Result<DataType, StorageError> {
        self.with_dataset(path, |dataset| Ok(dataset.data_type))
    }

    fn storage_size(&self, path: &DatasetPath) -> Result<u64, StorageError> {
        self.with_dataset(path, |dataset| {
            Ok(match &dataset.data {
                MemoryData::Fixed(bytes) => bytes.len() as u64,
                MemoryData::Strings(strings) => strings
                    .iter()
                    .map(|string| string.as_bytes_with_nul().len() as u64)
                    .sum(),
            })
        })
    }

    unsafe fn read_raw(
        &self,
        path: &DatasetPath,
        mem_type: &DataType,
        mem_space: &Dataspace,
        buf: *mut c_void,
    ) -> Result<(), StorageError> {
        self.with_dataset(path, |dataset| {
            dataset.check_transfer(mem_type, mem_space)?;
            match &dataset.data {
                MemoryData::Fixed(bytes) => {
                    std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), bytes.len());
                }
                MemoryData::Strings(strings) => {
                    let slots = buf.cast::<*mut c_char>();
                    for (index, string) in strings.iter().enumerate() {
                        let bytes = string.as_bytes_with_nul();
                        let ptr = libc::malloc(bytes.len()).cast::<c_char>();
                        if ptr.is_null() {
                            return Err(StorageError::AllocationFailed(bytes.len()));
                        }
                        std::ptr::copy_nonoverlapping(bytes.as_ptr().cast(), ptr, bytes.len());
                        *slots.add(index) = ptr;
                        self.vlen_allocations.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
            Ok(())
        })
    }

    unsafe fn write_raw(
        &self,
        path: &DatasetPath,
        mem_type: &DataType,
        mem_space: &Dataspace,
        buf: *const c_void,
    ) -> Result<(), StorageError> {
        let mut datasets = self.datasets.write();
        let dataset = datasets
            .get_mut(path)
            .ok_or_else(|| StorageError::DatasetNotFound(path.clone()))?;
        dataset.check_transfer(mem_type, mem_space)?;
        match &mut dataset.data {
            MemoryData::Fixed(bytes) => {
                let len = bytes.len();
                bytes.copy_from_slice(std::slice::from_raw_parts(buf.cast::<u8>(), len));
            }
            MemoryData::Strings(strings) => {
                let slots = buf.cast::<*const c_char>();
                for (index, string) in strings.iter_mut().enumerate() {
                    let ptr = *slots.add(index);
                    *string = if ptr.is_null() {
                        CString::default()
                    } else {
                        CStr::from_ptr(ptr).to_owned()
                    };
                }
            }
        }
        Ok(())
    }

    unsafe fn vlen_reclaim(
        &self,
        mem_type: &DataType,
        space: &Dataspace,
        buf: *mut c_void,
    ) -> Result<(), StorageError> {
        if !mem_type.is_variable_length() {
            return Ok(());
        }
        let slots = buf.cast::<*mut c_char>();
        for index in 0..num_elements(space)? {
            let slot = slots.add(index);
            if !(*slot).is_null() {
                libc::free((*slot).cast());
                *slot = std::ptr::null_mut();
                self.vlen_allocations.fetch_sub(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}
