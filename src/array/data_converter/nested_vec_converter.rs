use std::{ffi::c_void, marker::PhantomData};

use crate::array::Dataspace;

use super::{dataspace_shape_usize, ConversionError, DataConverter, Flatten};

/// The converter for nested dynamic sequences, such as `Vec<Vec<T>>`.
///
/// Nested sequences are not contiguous in memory, so elements are transferred through an intermediate contiguous buffer.
/// On read, every level of the container is rebuilt to match the on-disk extents.
/// On write, every level must match the on-disk extents, so ragged sequences are rejected.
pub struct NestedVecConverter<'a, TContainer: Flatten, TEngine: ?Sized> {
    space: &'a Dataspace,
    shape: Vec<usize>,
    buffer: Vec<TContainer::Leaf>,
    _phantom: PhantomData<&'a TEngine>,
}

unsafe impl<'a, TContainer, TEngine> DataConverter<'a, TContainer, TEngine>
    for NestedVecConverter<'a, TContainer, TEngine>
where
    TContainer: Flatten,
    TEngine: ?Sized,
{
    fn new(_engine: &'a TEngine, space: &'a Dataspace) -> Self {
        Self {
            space,
            shape: Vec::new(),
            buffer: Vec::new(),
            _phantom: PhantomData,
        }
    }

    fn transform_read(
        &mut self,
        _container: &mut TContainer,
    ) -> Result<*mut c_void, ConversionError> {
        self.shape = self.bound_shape()?;
        let num_elements: usize = self.shape.iter().product();
        self.buffer = vec![bytemuck::Zeroable::zeroed(); num_elements];
        Ok(self.buffer.as_mut_ptr().cast())
    }

    fn transform_write(&mut self, container: &TContainer) -> Result<*const c_void, ConversionError> {
        self.shape = self.bound_shape()?;
        self.buffer.clear();
        self.buffer.reserve(self.shape.iter().product());
        container.flatten_into(0, &self.shape, &mut self.buffer)?;
        Ok(self.buffer.as_ptr().cast())
    }

    fn process_result(&mut self, container: &mut TContainer) -> Result<(), ConversionError> {
        *container = TContainer::unflatten(&self.buffer, &self.shape);
        self.buffer = Vec::new();
        Ok(())
    }
}

impl<TContainer: Flatten, TEngine: ?Sized> NestedVecConverter<'_, TContainer, TEngine> {
    fn bound_shape(&self) -> Result<Vec<usize>, ConversionError> {
        if self.space.number_dimensions() != TContainer::RANK {
            return Err(ConversionError::RankMismatch {
                container_rank: TContainer::RANK,
                dataspace_rank: self.space.number_dimensions(),
            });
        }
        dataspace_shape_usize(self.space, std::mem::size_of::<TContainer::Leaf>())
    }
}
