use std::{ffi::c_void, marker::PhantomData};

use crate::array::Dataspace;

use super::{check_extents, ContiguousContainer, ConversionError, DataConverter};

/// The identity converter.
///
/// The container is already a contiguous buffer, so it is handed to the engine unchanged.
/// Its extents cannot change, so they must match the bound dataspace exactly.
pub struct IdentityConverter<'a, TContainer: ?Sized, TEngine: ?Sized> {
    space: &'a Dataspace,
    _phantom: PhantomData<(fn(&TContainer), &'a TEngine)>,
}

unsafe impl<'a, TContainer, TEngine> DataConverter<'a, TContainer, TEngine>
    for IdentityConverter<'a, TContainer, TEngine>
where
    TContainer: ?Sized + ContiguousContainer,
    TEngine: ?Sized,
{
    fn new(_engine: &'a TEngine, space: &'a Dataspace) -> Self {
        Self {
            space,
            _phantom: PhantomData,
        }
    }

    fn transform_read(
        &mut self,
        container: &mut TContainer,
    ) -> Result<*mut c_void, ConversionError> {
        check_extents(&container.extents(), self.space)?;
        Ok(container.as_mut_void_ptr())
    }

    fn transform_write(&mut self, container: &TContainer) -> Result<*const c_void, ConversionError> {
        check_extents(&container.extents(), self.space)?;
        Ok(container.as_void_ptr())
    }

    fn process_result(&mut self, _container: &mut TContainer) -> Result<(), ConversionError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::memory_engine::MemoryEngine;

    use super::*;

    #[test]
    fn identity_converter_fixed_array() {
        let engine = MemoryEngine::new();
        let space = Dataspace::new(vec![2, 2]);
        let mut array = [[1u16, 2], [3, 4]];
        let mut converter: IdentityConverter<[[u16; 2]; 2], MemoryEngine> =
            DataConverter::new(&engine, &space);
        let ptr = converter.transform_read(&mut array).unwrap();
        assert_eq!(ptr, array.as_mut_ptr().cast::<c_void>());
        assert_eq!(
            converter.transform_write(&array).unwrap(),
            array.as_ptr().cast::<c_void>()
        );
        converter.process_result(&mut array).unwrap();
        assert_eq!(array, [[1, 2], [3, 4]]);
    }

    #[test]
    fn identity_converter_extent_mismatch() {
        let engine = MemoryEngine::new();
        let space = Dataspace::new(vec![3]);
        let mut values = [0f64; 2];
        let mut converter: IdentityConverter<[f64], MemoryEngine> =
            DataConverter::new(&engine, &space);
        assert!(matches!(
            converter.transform_read(&mut values[..]),
            Err(ConversionError::InvalidContainerExtent {
                dimension: 0,
                expected: 3,
                actual: 2
            })
        ));
        assert!(converter.transform_write(&values[..]).is_err());
    }

    #[test]
    fn identity_converter_scalar() {
        let engine = MemoryEngine::new();
        let space = Dataspace::scalar();
        let mut value = 7i64;
        let mut converter: IdentityConverter<i64, MemoryEngine> =
            DataConverter::new(&engine, &space);
        let ptr = converter.transform_read(&mut value).unwrap();
        assert_eq!(ptr, std::ptr::from_mut(&mut value).cast::<c_void>());
    }
}
