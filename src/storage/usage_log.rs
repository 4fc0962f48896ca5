//! A storage engine wrapper which logs storage engine calls.

use std::{ffi::c_void, io::Write, sync::Arc};

use parking_lot::Mutex;

use crate::{
    array::{DataType, Dataspace},
    dataset::DatasetPath,
    storage::{StorageEngine, StorageError},
};

/// The usage log storage engine. Logs storage engine calls.
///
/// It is intended to aid in debugging by revealing the sequence of shape queries, transfers and reclamations issued by dataset operations.
///
/// ### Example (log to stdout)
/// ```rust
/// # use std::sync::Arc;
/// # use parking_lot::Mutex;
/// # use dataset_io::storage::{memory_engine::MemoryEngine, usage_log::UsageLogStorageEngine};
/// let engine = Arc::new(MemoryEngine::new());
/// let log_writer = Arc::new(Mutex::new(
///     // std::io::BufWriter::new(
///     std::io::stdout(),
///     //    )
/// ));
/// let engine = Arc::new(UsageLogStorageEngine::new(engine, log_writer, || {
///     chrono::Utc::now().format("[%T%.3f] ").to_string()
/// }));
/// ```
///
/// Writing and then reading a `Vec<i32>` with the above [`UsageLogStorageEngine`] prints outputs like:
/// ```text
/// [09:12:44.102] create_dataset(/data, int32, [3]) -> Ok(())
/// [09:12:44.102] dataspace(/data) -> Ok([3])
/// [09:12:44.102] write_raw(/data, int32, [3]) -> Ok(())
/// [09:12:44.103] dataspace(/data) -> Ok([3])
/// [09:12:44.103] read_raw(/data, int32, [3]) -> Ok(())
/// ```
///
/// A failure to write to the log is returned as [`StorageError::IOError`], except for [`vlen_reclaim`](StorageEngine::vlen_reclaim).
/// The memory has already been released once the reclamation is logged, so its log line is written on a best-effort basis and the result of the wrapped engine is returned.
pub struct UsageLogStorageEngine<TEngine: ?Sized> {
    engine: Arc<TEngine>,
    handle: Arc<Mutex<dyn Write + Send + Sync>>,
    prefix_func: fn() -> String,
}

impl<TEngine: ?Sized> core::fmt::Debug for UsageLogStorageEngine<TEngine> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        writeln!(f, "usage log")
    }
}

impl<TEngine: ?Sized> UsageLogStorageEngine<TEngine> {
    /// Create a new usage log storage engine wrapping `engine`.
    ///
    /// Each call is written to `handle` on its own line, starting with the output of `prefix_func`.
    pub fn new(
        engine: Arc<TEngine>,
        handle: Arc<Mutex<dyn Write + Send + Sync>>,
        prefix_func: fn() -> String,
    ) -> Self {
        Self {
            engine,
            handle,
            prefix_func,
        }
    }

    /// Return the wrapped storage engine.
    #[must_use]
    pub fn inner(&self) -> &Arc<TEngine> {
        &self.engine
    }
}

fn display_result<T: core::fmt::Display>(result: &Result<T, StorageError>) -> String {
    match result {
        Ok(value) => format!("Ok({value})"),
        Err(err) => format!("Err({err:?})"),
    }
}

unsafe impl<TEngine: ?Sized + StorageEngine> StorageEngine for UsageLogStorageEngine<TEngine> {
    fn create_dataset(
        &self,
        path: &DatasetPath,
        data_type: &DataType,
        space: &Dataspace,
    ) -> Result<(), StorageError> {
        let result = self.engine.create_dataset(path, data_type, space);
        writeln!(
            self.handle.lock(),
            "{}create_dataset({path}, {data_type}, {space}) -> {result:?}",
            (self.prefix_func)(),
        )?;
        result
    }

    fn dataspace(&self, path: &DatasetPath) -> Result<Dataspace, StorageError> {
        let result = self.engine.dataspace(path);
        writeln!(
            self.handle.lock(),
            "{}dataspace({path}) -> {}",
            (self.prefix_func)(),
            display_result(&result)
        )?;
        result
    }

    fn data_type(&self, path: &DatasetPath) -> Result<DataType, StorageError> {
        let result = self.engine.data_type(path);
        writeln!(
            self.handle.lock(),
            "{}data_type({path}) -> {}",
            (self.prefix_func)(),
            display_result(&result)
        )?;
        result
    }

    fn storage_size(&self, path: &DatasetPath) -> Result<u64, StorageError> {
        let result = self.engine.storage_size(path);
        writeln!(
            self.handle.lock(),
            "{}storage_size({path}) -> {result:?}",
            (self.prefix_func)(),
        )?;
        result
    }

    unsafe fn read_raw(
        &self,
        path: &DatasetPath,
        mem_type: &DataType,
        mem_space: &Dataspace,
        buf: *mut c_void,
    ) -> Result<(), StorageError> {
        let result = self.engine.read_raw(path, mem_type, mem_space, buf);
        writeln!(
            self.handle.lock(),
            "{}read_raw({path}, {mem_type}, {mem_space}) -> {result:?}",
            (self.prefix_func)(),
        )?;
        result
    }

    unsafe fn write_raw(
        &self,
        path: &DatasetPath,
        mem_type: &DataType,
        mem_space: &Dataspace,
        buf: *const c_void,
    ) -> Result<(), StorageError> {
        let result = self.engine.write_raw(path, mem_type, mem_space, buf);
        writeln!(
            self.handle.lock(),
            "{}write_raw({path}, {mem_type}, {mem_space}) -> {result:?}",
            (self.prefix_func)(),
        )?;
        result
    }

    unsafe fn vlen_reclaim(
        &self,
        mem_type: &DataType,
        space: &Dataspace,
        buf: *mut c_void,
    ) -> Result<(), StorageError> {
        let result = self.engine.vlen_reclaim(mem_type, space, buf);
        let _ = writeln!(
            self.handle.lock(),
            "{}vlen_reclaim({mem_type}, {space}) -> {result:?}",
            (self.prefix_func)(),
        );
        result
    }
}
