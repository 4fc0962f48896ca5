use std::sync::Arc;

use half::f16;
use num_complex::{Complex32, Complex64};

use dataset_io::array::{
    array_rank, ArrayDims, ConversionError, DataType, Dataspace, Element,
};
use dataset_io::dataset::{Dataset, DatasetError};
use dataset_io::storage::memory_engine::MemoryEngine;

fn round_trip_vec<T>(data_type: DataType, values: Vec<T>) -> Result<(), Box<dyn std::error::Error>>
where
    T: dataset_io::array::VecElement + PartialEq + std::fmt::Debug,
    Vec<T>: dataset_io::array::Container,
{
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(
        engine,
        "/values",
        data_type,
        Dataspace::new(vec![values.len() as u64]),
    )?;
    dataset.write(&values)?;
    let read_back: Vec<T> = dataset.read_elements()?;
    assert_eq!(read_back, values);
    Ok(())
}

#[test]
fn round_trips_element_types() -> Result<(), Box<dyn std::error::Error>> {
    round_trip_vec(DataType::Int8, vec![i8::MIN, -1, 0, i8::MAX])?;
    round_trip_vec(DataType::Int16, vec![i16::MIN, 0, i16::MAX])?;
    round_trip_vec(DataType::Int64, vec![i64::MIN, 0, i64::MAX])?;
    round_trip_vec(DataType::UInt8, vec![0u8, 255])?;
    round_trip_vec(DataType::UInt16, vec![0u16, u16::MAX])?;
    round_trip_vec(DataType::UInt32, vec![0u32, u32::MAX])?;
    round_trip_vec(
        DataType::Float16,
        vec![f16::from_f32(-1.5), f16::ZERO, f16::INFINITY],
    )?;
    round_trip_vec(DataType::Float64, vec![-0.5f64, 1e300, f64::MIN_POSITIVE])?;
    round_trip_vec(
        DataType::Complex64,
        vec![Complex32::new(1.0, -2.0), Complex32::new(0.0, 3.5)],
    )?;
    round_trip_vec(DataType::Complex128, vec![Complex64::new(-1.0, 2.0)])?;
    round_trip_vec(
        DataType::String,
        vec!["".to_string(), "ünïcødé".to_string(), "tab\tseparated".to_string()],
    )?;
    Ok(())
}

#[test]
fn round_trips_ranks() {
    assert_eq!(array_rank::<u8>(), 0);
    assert_eq!(array_rank::<String>(), 0);
    assert_eq!(array_rank::<Vec<String>>(), 1);
    assert_eq!(array_rank::<[[f32; 2]; 3]>(), 2);
    assert_eq!(array_rank::<Vec<[Vec<i8>; 2]>>(), 3);
    assert_eq!(array_rank::<*const [u16; 4]>(), 2);
    assert_eq!(array_rank::<[Complex64]>(), 1);
    assert_eq!(
        <<Vec<Vec<[f16; 2]>> as ArrayDims>::Atomic as Element>::data_type(),
        DataType::Float16
    );
}

#[test]
fn round_trips_scalar() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine, "/scalar", DataType::Float64, Dataspace::scalar())?;
    dataset.write(&std::f64::consts::PI)?;
    assert_eq!(dataset.read_elements::<f64>()?, std::f64::consts::PI);
    assert!(matches!(
        dataset.read_elements::<Vec<f64>>(),
        Err(DatasetError::ShapeMismatch {
            container_rank: 1,
            dataset_rank: 0,
            ..
        })
    ));
    Ok(())
}

#[test]
fn round_trips_fixed_arrays_and_slices() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine, "/fixed", DataType::UInt32, Dataspace::new(vec![4]))?;

    let values = [1u32, 2, 3, 4];
    dataset.write(&values[..])?;
    let mut read_back = [0u32; 4];
    dataset.read(&mut read_back[..])?;
    assert_eq!(read_back, values);

    let mut too_short = [0u32; 3];
    assert!(matches!(
        dataset.read(&mut too_short),
        Err(DatasetError::ConversionError(
            ConversionError::InvalidContainerExtent {
                dimension: 0,
                expected: 4,
                actual: 3
            }
        ))
    ));
    assert_eq!(too_short, [0, 0, 0]);
    assert!(dataset.write(&values[1..]).is_err());
    Ok(())
}

#[test]
fn round_trips_vec_of_fixed_arrays() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine, "/rows", DataType::Int32, Dataspace::new(vec![3, 2]))?;

    let rows = vec![[1i32, 2], [3, 4], [5, 6]];
    dataset.write(&rows)?;
    let mut read_back = vec![[0i32; 2]; 7];
    dataset.read(&mut read_back)?;
    assert_eq!(read_back, rows);

    assert!(matches!(
        dataset.read_elements::<Vec<[i32; 3]>>(),
        Err(DatasetError::ConversionError(
            ConversionError::InvalidContainerExtent {
                dimension: 1,
                expected: 2,
                actual: 3
            }
        ))
    ));
    Ok(())
}

#[test]
fn round_trips_nested_vec() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine, "/cube", DataType::UInt8, Dataspace::new(vec![2, 2, 3]))?;

    let cube = vec![
        vec![vec![1u8, 2, 3], vec![4, 5, 6]],
        vec![vec![7, 8, 9], vec![10, 11, 12]],
    ];
    dataset.write(&cube)?;
    let mut read_back = vec![vec![vec![0u8; 1]; 5]];
    dataset.read(&mut read_back)?;
    assert_eq!(read_back, cube);

    let ragged = vec![
        vec![vec![1u8, 2, 3], vec![4, 5]],
        vec![vec![7, 8, 9], vec![10, 11, 12]],
    ];
    assert!(matches!(
        dataset.write(&ragged),
        Err(DatasetError::ConversionError(
            ConversionError::InvalidContainerExtent {
                dimension: 2,
                expected: 3,
                actual: 2
            }
        ))
    ));
    assert_eq!(dataset.read_elements::<Vec<Vec<Vec<u8>>>>()?, cube);
    Ok(())
}

#[test]
fn round_trips_nested_vec_zero_extent() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine, "/empty", DataType::Int16, Dataspace::new(vec![3, 0]))?;
    dataset.write(&vec![Vec::<i16>::new(); 3])?;
    assert_eq!(
        dataset.read_elements::<Vec<Vec<i16>>>()?,
        vec![Vec::<i16>::new(); 3]
    );
    Ok(())
}

#[test]
fn round_trips_empty_vec() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let empty = Dataset::create(engine.clone(), "/empty", DataType::Float32, Dataspace::new(vec![0]))?;
    empty.write(&Vec::<f32>::new())?;
    assert!(empty.read_elements::<Vec<f32>>()?.is_empty());

    let non_empty = Dataset::create(engine, "/non_empty", DataType::Float32, Dataspace::new(vec![2]))?;
    assert!(matches!(
        non_empty.write(&Vec::<f32>::new()),
        Err(DatasetError::ConversionError(
            ConversionError::InvalidContainerExtent {
                dimension: 0,
                expected: 2,
                actual: 0
            }
        ))
    ));
    Ok(())
}

#[test]
fn round_trips_strings_interior_nul() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine.clone(), "/text", DataType::String, Dataspace::new(vec![2]))?;
    dataset.write(&vec!["kept".to_string(), "kept too".to_string()])?;
    assert!(matches!(
        dataset.write(&vec!["ok".to_string(), "nul\0byte".to_string()]),
        Err(DatasetError::ConversionError(ConversionError::InteriorNul(1)))
    ));
    assert_eq!(dataset.read_elements::<Vec<String>>()?, ["kept", "kept too"]);
    assert_eq!(engine.vlen_allocations(), 0);
    Ok(())
}

#[test]
fn round_trips_raw_pointers() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine, "/raw", DataType::Float64, Dataspace::new(vec![3]))?;
    let values = vec![0.25f64, 0.5, 0.75];
    unsafe { dataset.write_ptr(values.as_ptr()) }?;
    let mut read_back = vec![0f64; 3];
    unsafe { dataset.read_ptr(read_back.as_mut_ptr()) }?;
    assert_eq!(read_back, values);
    assert_eq!(dataset.read_elements::<Vec<f64>>()?, values);
    Ok(())
}

#[test]
fn round_trips_dyn_engine() -> Result<(), Box<dyn std::error::Error>> {
    let engine: Arc<dyn dataset_io::storage::StorageEngine> = Arc::new(MemoryEngine::new());
    let dataset = Dataset::create(engine, "/dyn", DataType::String, Dataspace::new(vec![1]))?;
    dataset.write(&vec!["dynamic".to_string()])?;
    assert_eq!(dataset.read_elements::<Vec<String>>()?, ["dynamic"]);
    Ok(())
}
