use derive_more::{Deref, From};
use itertools::Itertools;

use super::ArrayShape;

/// The on-disk shape of a dataset: its rank and per-dimension extents.
///
/// A dataspace with no dimensions is a scalar dataspace holding a single element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Deref, From)]
pub struct Dataspace(ArrayShape);

impl Dataspace {
    /// Create a new [`Dataspace`] from per-dimension extents.
    #[must_use]
    pub fn new(dimensions: ArrayShape) -> Self {
        Self(dimensions)
    }

    /// Create a scalar dataspace.
    #[must_use]
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    /// Return the number of dimensions (the rank).
    #[must_use]
    pub fn number_dimensions(&self) -> usize {
        self.0.len()
    }

    /// Return the per-dimension extents.
    #[must_use]
    pub fn dimensions(&self) -> &[u64] {
        &self.0
    }

    /// Return the total number of elements, or [`None`] if it overflows [`u64`].
    #[must_use]
    pub fn num_elements(&self) -> Option<u64> {
        self.0.iter().try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
    }

    /// Return the total number of elements as a [`usize`], or [`None`] if it is not addressable in memory.
    #[must_use]
    pub fn num_elements_usize(&self) -> Option<usize> {
        self.num_elements()
            .and_then(|num_elements| usize::try_from(num_elements).ok())
    }
}

impl core::fmt::Display for Dataspace {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}
