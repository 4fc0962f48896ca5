use std::{
    ffi::{c_char, c_void, CStr, CString},
    ptr::null_mut,
};

use crate::{
    array::{DataType, Dataspace},
    config::global_config,
    storage::StorageEngine,
};

use super::{check_extents, outer_extent, ConversionError, DataConverter};

/// Which transfer populated the intermediate pointer buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BufferOrigin {
    /// Empty, or already reclaimed.
    None,
    /// Filled by the engine with pointers to memory it allocated.
    Read,
    /// Filled with pointers into strings owned by the converter.
    Write,
}

/// The converter for a one-dimensional dynamic sequence of strings, `Vec<String>`.
///
/// Strings are transferred as an intermediate array of `*mut c_char`, one per element:
///  - on read, the engine fills the array with pointers to nul-terminated strings it allocated,
///    which are copied into the sequence and then returned to the engine with [`StorageEngine::vlen_reclaim`],
///  - on write, the array points into nul-terminated copies of the sequence elements and ends with a null sentinel.
///
/// Engine-owned memory is only ever reclaimed if the array was populated by a read.
/// If a read fails or its result is never processed, the memory is reclaimed when the converter is dropped.
pub struct StringVecConverter<'a, TEngine: ?Sized + StorageEngine> {
    engine: &'a TEngine,
    space: &'a Dataspace,
    c_vec: Vec<*mut c_char>,
    c_strings: Vec<CString>,
    origin: BufferOrigin,
}

impl<TEngine: ?Sized + StorageEngine> StringVecConverter<'_, TEngine> {
    /// Return engine-owned strings to the engine if a read populated the buffer.
    fn reclaim(&mut self) -> Result<(), ConversionError> {
        let origin = std::mem::replace(&mut self.origin, BufferOrigin::None);
        let populated = self.c_vec.iter().any(|ptr| !ptr.is_null());
        let result = if origin == BufferOrigin::Read && populated {
            unsafe {
                // SAFETY: the buffer was filled by a read of `space` from `engine` and has not been reclaimed.
                self.engine.vlen_reclaim(
                    &DataType::String,
                    self.space,
                    self.c_vec.as_mut_ptr().cast(),
                )
            }
            .map_err(ConversionError::ReclaimError)
        } else {
            Ok(())
        };
        self.c_vec.clear();
        self.c_strings.clear();
        result
    }
}

/// Copy a string returned by the engine.
///
/// # Safety
/// `ptr` must be null or point to a nul-terminated string.
unsafe fn engine_string(
    index: usize,
    ptr: *const c_char,
    null_strings_as_empty: bool,
    lossy_utf8_strings: bool,
) -> Result<String, ConversionError> {
    if ptr.is_null() {
        return if null_strings_as_empty {
            Ok(String::new())
        } else {
            Err(ConversionError::NullString(index))
        };
    }
    let bytes = CStr::from_ptr(ptr).to_bytes();
    match std::str::from_utf8(bytes) {
        Ok(string) => Ok(string.to_owned()),
        Err(_) if lossy_utf8_strings => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Err(_) => Err(ConversionError::InvalidUtf8(index)),
    }
}

unsafe impl<'a, TEngine> DataConverter<'a, Vec<String>, TEngine>
    for StringVecConverter<'a, TEngine>
where
    TEngine: ?Sized + StorageEngine,
{
    fn new(engine: &'a TEngine, space: &'a Dataspace) -> Self {
        Self {
            engine,
            space,
            c_vec: Vec::new(),
            c_strings: Vec::new(),
            origin: BufferOrigin::None,
        }
    }

    fn transform_read(
        &mut self,
        _container: &mut Vec<String>,
    ) -> Result<*mut c_void, ConversionError> {
        self.reclaim()?;
        let len = outer_extent(self.space, 1, std::mem::size_of::<*mut c_char>())?;
        check_extents(&[len as u64], self.space)?;
        self.c_vec = vec![null_mut(); len];
        self.origin = BufferOrigin::Read;
        Ok(self.c_vec.as_mut_ptr().cast())
    }

    fn transform_write(
        &mut self,
        container: &Vec<String>,
    ) -> Result<*const c_void, ConversionError> {
        self.reclaim()?;
        check_extents(&[container.len() as u64], self.space)?;
        self.c_strings = container
            .iter()
            .enumerate()
            .map(|(index, string)| {
                CString::new(string.as_bytes()).map_err(|_| ConversionError::InteriorNul(index))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.c_vec = self
            .c_strings
            .iter()
            .map(|string| string.as_ptr().cast_mut())
            .chain(std::iter::once(null_mut()))
            .collect();
        self.origin = BufferOrigin::Write;
        Ok(self.c_vec.as_ptr().cast())
    }

    fn process_result(&mut self, container: &mut Vec<String>) -> Result<(), ConversionError> {
        if self.origin != BufferOrigin::Read {
            return Ok(());
        }
        let (null_strings_as_empty, lossy_utf8_strings) = {
            let config = global_config();
            (config.null_strings_as_empty(), config.lossy_utf8_strings())
        };
        let strings = self
            .c_vec
            .iter()
            .enumerate()
            .map(|(index, &ptr)| unsafe {
                // SAFETY: after a successful read each slot is null or an engine-owned nul-terminated string.
                engine_string(index, ptr, null_strings_as_empty, lossy_utf8_strings)
            })
            .collect::<Result<Vec<_>, _>>();
        self.reclaim()?;
        *container = strings?;
        Ok(())
    }
}

impl<TEngine: ?Sized + StorageEngine> Drop for StringVecConverter<'_, TEngine> {
    fn drop(&mut self) {
        let _ = self.reclaim();
    }
}
