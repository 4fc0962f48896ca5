use std::{ffi::c_void, marker::PhantomData};

use crate::array::{Dataspace, FixedExtents};

use super::{check_extents, outer_extent, ConversionError, DataConverter};

/// The converter for a one-dimensional dynamic sequence `Vec<T>` of contiguous elements.
///
/// `T` is a fixed length element or a fixed-size array of them.
/// On read, the sequence is resized to the outermost on-disk extent and its storage becomes the engine buffer.
/// On write, the sequence must already match the on-disk extents; it is never resized.
pub struct VecConverter<'a, T, TEngine: ?Sized> {
    space: &'a Dataspace,
    _phantom: PhantomData<(fn(&T), &'a TEngine)>,
}

impl<T: FixedExtents, TEngine: ?Sized> VecConverter<'_, T, TEngine> {
    fn container_extents(&self, len: u64) -> Vec<u64> {
        let mut extents = Vec::with_capacity(self.space.number_dimensions());
        extents.push(len);
        T::push_fixed_extents(&mut extents);
        extents
    }
}

unsafe impl<'a, T, TEngine> DataConverter<'a, Vec<T>, TEngine> for VecConverter<'a, T, TEngine>
where
    T: FixedExtents + bytemuck::Pod,
    TEngine: ?Sized,
{
    fn new(_engine: &'a TEngine, space: &'a Dataspace) -> Self {
        Self {
            space,
            _phantom: PhantomData,
        }
    }

    fn transform_read(&mut self, container: &mut Vec<T>) -> Result<*mut c_void, ConversionError> {
        let len = outer_extent(self.space, 1 + T::RANK, std::mem::size_of::<T>())?;
        check_extents(&self.container_extents(len as u64), self.space)?;
        container.resize(len, bytemuck::Zeroable::zeroed());
        Ok(container.as_mut_ptr().cast())
    }

    fn transform_write(&mut self, container: &Vec<T>) -> Result<*const c_void, ConversionError> {
        check_extents(&self.container_extents(container.len() as u64), self.space)?;
        Ok(container.as_ptr().cast())
    }

    fn process_result(&mut self, _container: &mut Vec<T>) -> Result<(), ConversionError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::memory_engine::MemoryEngine;

    use super::*;

    #[test]
    fn vec_converter_read_resizes() {
        let engine = MemoryEngine::new();
        let space = Dataspace::new(vec![4]);
        let mut converter: VecConverter<u32, MemoryEngine> = DataConverter::new(&engine, &space);

        let mut values = vec![9u32; 7];
        let ptr = converter.transform_read(&mut values).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(ptr, values.as_mut_ptr().cast::<c_void>());

        let mut values: Vec<u32> = Vec::new();
        converter.transform_read(&mut values).unwrap();
        assert_eq!(values, [0, 0, 0, 0]);
    }

    #[test]
    fn vec_converter_write_does_not_resize() {
        let engine = MemoryEngine::new();
        let space = Dataspace::new(vec![3]);
        let mut converter: VecConverter<i8, MemoryEngine> = DataConverter::new(&engine, &space);

        let values = vec![1i8, 2, 3];
        assert_eq!(
            converter.transform_write(&values).unwrap(),
            values.as_ptr().cast::<c_void>()
        );
        assert!(matches!(
            converter.transform_write(&vec![1i8, 2]),
            Err(ConversionError::InvalidContainerExtent {
                dimension: 0,
                expected: 3,
                actual: 2
            })
        ));
        assert!(converter.transform_write(&Vec::new()).is_err());
    }

    #[test]
    fn vec_converter_empty() {
        let engine = MemoryEngine::new();
        let space = Dataspace::new(vec![0]);
        let mut converter: VecConverter<f32, MemoryEngine> = DataConverter::new(&engine, &space);
        assert!(converter.transform_write(&Vec::new()).is_ok());
        let mut values = vec![1.0f32];
        converter.transform_read(&mut values).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn vec_converter_fixed_array_elements() {
        let engine = MemoryEngine::new();
        let space = Dataspace::new(vec![2, 3]);
        let mut converter: VecConverter<[f64; 3], MemoryEngine> =
            DataConverter::new(&engine, &space);
        let mut values = Vec::new();
        converter.transform_read(&mut values).unwrap();
        assert_eq!(values, [[0.0; 3]; 2]);

        let space = Dataspace::new(vec![2, 4]);
        let mut converter: VecConverter<[f64; 3], MemoryEngine> =
            DataConverter::new(&engine, &space);
        assert!(matches!(
            converter.transform_read(&mut values),
            Err(ConversionError::InvalidContainerExtent {
                dimension: 1,
                expected: 4,
                actual: 3
            })
        ));
    }
}
