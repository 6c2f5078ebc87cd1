use thiserror::Error;
use tsp_matrix_providers::google_maps::GoogleMapsError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInstance {
    #[error("expected {expected} nodes, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("{duplicates} duplicate nodes among {actual}")]
    Duplicates { actual: usize, duplicates: usize },

    #[error("expected {expected} nodes, got {actual} with {duplicates} duplicates")]
    WrongCountAndDuplicates {
        expected: usize,
        actual: usize,
        duplicates: usize,
    },
}

/// A failed build. Each variant names the stage that failed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("not enough resolved locations: {available} available, {required} required")]
    InsufficientNodes { available: usize, required: usize },

    #[error("invalid instance: {0}")]
    InvalidInstance(#[from] InvalidInstance),

    #[error("distance matrix stage failed")]
    Matrix(#[source] anyhow::Error),

    #[error("distance matrix misses cells: expected {expected}, got {actual}")]
    IncompleteMatrix { expected: usize, actual: usize },
}

/// Why the geocoding capability gave no answer for an address.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// Transport failure, server error or rate limiting. Another attempt may
    /// succeed.
    #[error("{0}")]
    Transient(String),

    /// The request itself was refused, e.g. an invalid key.
    #[error("{0}")]
    Rejected(String),
}

impl GeocodeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GeocodeError::Transient(_))
    }
}

impl From<GoogleMapsError> for GeocodeError {
    fn from(err: GoogleMapsError) -> Self {
        if err.is_transient() {
            GeocodeError::Transient(err.to_string())
        } else {
            GeocodeError::Rejected(err.to_string())
        }
    }
}
