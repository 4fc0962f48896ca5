//! A rust library for moving multidimensional container data to and from a binary dataset storage engine.
//!
//! A storage engine (see [`storage`]) only understands flat, contiguous buffers of a single element type and a fixed rank.
//! This crate bridges that contract to ordinary Rust containers:
//!  - the rank and innermost element type of a container are computed at compile time by [`ArrayDims`](array::ArrayDims),
//!  - the rank is validated against the on-disk [`Dataspace`](array::Dataspace) before any transfer,
//!  - a [`DataConverter`](array::DataConverter) selected by the container type exposes the raw buffer handed to the engine,
//!    resizing dynamic sequences on read and marshalling variable-length strings through engine-owned memory.
//!
//! [`Dataset`](dataset::Dataset) ties these together with its [`read`](dataset::Dataset::read) and [`write`](dataset::Dataset::write) methods.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use dataset_io::array::{DataType, Dataspace};
//! use dataset_io::dataset::Dataset;
//! use dataset_io::storage::memory_engine::MemoryEngine;
//!
//! let engine = Arc::new(MemoryEngine::new());
//! let dataset = Dataset::create(engine, "/data", DataType::Int32, Dataspace::new(vec![3]))?;
//! dataset.write(&vec![10i32, 20, 30])?;
//!
//! let mut values: Vec<i32> = Vec::new();
//! dataset.read(&mut values)?;
//! assert_eq!(values, [10, 20, 30]);
//!
//! // A rank 1 container cannot hold a rank 2 dataset.
//! let matrix = Dataset::create(dataset.engine().clone(), "/matrix", DataType::Int32, Dataspace::new(vec![2, 2]))?;
//! assert!(matrix.read(&mut values).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! There are no optional features.
//! Storage access can be traced by wrapping an engine in a [`UsageLogStorageEngine`](storage::usage_log::UsageLogStorageEngine).
//!
//! ## Licence
//! `dataset_io` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]

pub mod array;
pub mod config;
pub mod dataset;
pub mod storage;
