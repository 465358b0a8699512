//! Lloyd's k-means refinement over dense `ndarray` point sets.
//!
//! The caller supplies the points and the initial centroids; the refiner
//! alternates nearest-centroid assignment and mean updates until every
//! centroid moves less than `epsilon` or the iteration budget runs out.

pub mod dataset;
pub mod distance;
pub mod error;
pub mod nearest;
pub mod refiner;
pub mod synthetic;

pub use dataset::points_from_rows;
pub use distance::DistanceMetric;
pub use error::{KMeansError, Result};
pub use nearest::{assign_labels, nearest};
pub use refiner::{refine, KMeansRefiner, Refinement};
