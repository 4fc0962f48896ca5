use derive_more::Display;
use thiserror::Error;

/// The absolute path of a dataset, such as `/group/temperature`.
///
/// A dataset is always a leaf below the root group, so `/` itself does not name a dataset.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{}", _0)]
pub struct DatasetPath(String);

/// An invalid dataset path.
#[derive(Debug, Error)]
#[error("invalid dataset path {0}")]
pub struct DatasetPathError(String);

impl DatasetPath {
    /// Create a dataset path from `path`.
    ///
    /// # Errors
    /// Returns [`DatasetPathError`] unless [`DatasetPath::validate`] accepts `path`.
    pub fn new(path: &str) -> Result<Self, DatasetPathError> {
        if Self::validate(path) {
            Ok(Self(path.to_string()))
        } else {
            Err(DatasetPathError(path.to_string()))
        }
    }

    /// Return the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the final component of the path, the name of the dataset.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Return the path of the group holding the dataset.
    #[must_use]
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(index) => &self.0[..index],
        }
    }

    /// Return true if `path` is absolute and made of one or more non-empty components other than `.` and `..`.
    #[must_use]
    pub fn validate(path: &str) -> bool {
        path.strip_prefix('/').is_some_and(|relative| {
            relative
                .split('/')
                .all(|name| !name.is_empty() && name != "." && name != "..")
        })
    }
}

impl TryFrom<&str> for DatasetPath {
    type Error = DatasetPathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}
