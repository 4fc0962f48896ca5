//! Container introspection and conversion.
//!
//! - [`ArrayDims`] computes the rank and atomic element type of a container type at compile time.
//! - [`Element`] maps an atomic element type to its [`DataType`].
//! - [`Dataspace`] is the on-disk shape of a dataset.
//! - [`DataConverter`] moves a container to and from the raw buffer of a storage engine, see [`data_converter`].

mod array_dims;
pub mod data_converter;
pub mod data_type;
mod dataspace;
mod element;

pub use self::{
    array_dims::{array_rank, ArrayDims, FixedExtents},
    data_converter::{
        Container, ContiguousContainer, ConversionError, DataConverter, Flatten, VecElement,
    },
    data_type::{DataType, DataTypeSize},
    dataspace::Dataspace,
    element::{Element, ElementFixedLength},
};

/// The shape of an array.
pub type ArrayShape = Vec<u64>;
