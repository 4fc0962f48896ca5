use derive_more::Display;
use thiserror::Error;

use crate::{array::ConversionError, storage::StorageError};

use super::{DatasetPath, DatasetPathError};

/// A dataset transfer operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Operation {
    /// A read.
    #[display("read")]
    Read,
    /// A write.
    #[display("write")]
    Write,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn shape_mismatch_message(
    operation: &Operation,
    container_rank: &usize,
    dataset_rank: &usize,
) -> String {
    match operation {
        Operation::Read => format!(
            "impossible to read dataset of rank {dataset_rank} into a container of rank {container_rank}"
        ),
        Operation::Write => format!(
            "impossible to write a container of rank {container_rank} into dataset of rank {dataset_rank}"
        ),
    }
}

/// Dataset errors.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The rank of a container does not match the rank of the dataset.
    #[error("{}", shape_mismatch_message(.operation, .container_rank, .dataset_rank))]
    ShapeMismatch {
        /// The attempted operation.
        operation: Operation,
        /// The rank of the container.
        container_rank: usize,
        /// The rank of the dataset.
        dataset_rank: usize,
    },
    /// The dataspace of a dataset could not be retrieved.
    #[error("unable to get the dataspace of dataset {0}: {1}")]
    DataspaceError(DatasetPath, #[source] StorageError),
    /// The storage engine failed to read a dataset.
    #[error("error while reading dataset {0}: {1}")]
    ReadError(DatasetPath, #[source] StorageError),
    /// The storage engine failed to write a dataset.
    #[error("error while writing dataset {0}: {1}")]
    WriteError(DatasetPath, #[source] StorageError),
    /// A container could not be converted to or from the storage engine buffer.
    #[error(transparent)]
    ConversionError(#[from] ConversionError),
    /// Any other storage engine error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// An invalid dataset path.
    #[error(transparent)]
    DatasetPathError(#[from] DatasetPathError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_messages() {
        let read = DatasetError::ShapeMismatch {
            operation: Operation::Read,
            container_rank: 1,
            dataset_rank: 2,
        };
        assert_eq!(
            read.to_string(),
            "impossible to read dataset of rank 2 into a container of rank 1"
        );
        let write = DatasetError::ShapeMismatch {
            operation: Operation::Write,
            container_rank: 3,
            dataset_rank: 0,
        };
        assert_eq!(
            write.to_string(),
            "impossible to write a container of rank 3 into dataset of rank 0"
        );
    }

    #[test]
    fn read_error_message() {
        let path = DatasetPath::new("/a").unwrap();
        let err = DatasetError::ReadError(
            path.clone(),
            StorageError::DatasetNotFound(path),
        );
        assert_eq!(
            err.to_string(),
            "error while reading dataset /a: dataset /a does not exist"
        );
    }
}
