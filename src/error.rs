use thiserror::Error;

/// Error type used by operations in this crate.
#[derive(Debug, Error)]
pub enum KMeansError {
    /// Points or centroids do not form a consistent `(rows, D)` shape.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// A refinement parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A cluster received no points, so its mean is undefined.
    #[error("cluster {cluster} has no assigned points in iteration {iteration}")]
    EmptyCluster { cluster: usize, iteration: usize },
    /// Driver-level argument validation failed.
    #[error("{0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    ParseFloat(#[from] std::num::ParseFloatError),
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, KMeansError>;
