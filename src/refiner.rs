//! Lloyd's iterative refinement of a fixed set of initial centroids.

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};

use crate::distance::DistanceMetric;
use crate::error::{KMeansError, Result};
use crate::nearest::{assign_labels, nearest};

/// Outcome of a refinement run.
#[derive(Debug, Clone)]
pub struct Refinement {
    /// Final centroids, one row per cluster in input order.
    pub centroids: Array2<f64>,
    /// Nearest-centroid label of every point against `centroids`.
    pub labels: Array1<usize>,
    /// Number of assign/update passes actually performed.
    pub iterations: usize,
    /// Whether the run stopped because every centroid moved less than epsilon.
    pub converged: bool,
}

/// Struct containing parameters for the Lloyd's K-Means refinement.
#[derive(Debug, Clone)]
pub struct KMeansRefiner {
    pub max_iterations: usize,
    pub epsilon: f64,
    pub metric: DistanceMetric,
}

impl KMeansRefiner {
    /// Creates a refiner with the given iteration budget and convergence threshold.
    ///
    /// A negative budget is rejected; `epsilon` is taken as is.
    pub fn new(max_iterations: i64, epsilon: f64) -> Result<Self> {
        let max_iterations = usize::try_from(max_iterations).map_err(|_| {
            KMeansError::InvalidParameter(format!(
                "max_iterations must be >= 0, got {max_iterations}"
            ))
        })?;
        Ok(KMeansRefiner {
            max_iterations,
            epsilon,
            metric: DistanceMetric::Euclidean,
        })
    }

    /// Runs the refinement and returns only the final centroids.
    pub fn run<S1, S2>(
        &self,
        points: &ArrayBase<S1, Ix2>,
        initial_centroids: &ArrayBase<S2, Ix2>,
    ) -> Result<Array2<f64>>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        self.refine_centroids(points, initial_centroids)
            .map(|(centroids, _, _)| centroids)
    }

    /// Runs the refinement and reports centroids, labels and loop statistics.
    ///
    /// The caller's `initial_centroids` are copied, never modified. Shapes are
    /// validated before the first pass, so an error either comes from
    /// validation or from a cluster running empty; there is no partial result.
    pub fn fit<S1, S2>(
        &self,
        points: &ArrayBase<S1, Ix2>,
        initial_centroids: &ArrayBase<S2, Ix2>,
    ) -> Result<Refinement>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        let (centroids, iterations, converged) = self.refine_centroids(points, initial_centroids)?;
        let labels = assign_labels(self.metric, points, &centroids);
        Ok(Refinement {
            centroids,
            labels,
            iterations,
            converged,
        })
    }

    /// The Lloyd loop: final centroids, passes performed, convergence flag.
    fn refine_centroids<S1, S2>(
        &self,
        points: &ArrayBase<S1, Ix2>,
        initial_centroids: &ArrayBase<S2, Ix2>,
    ) -> Result<(Array2<f64>, usize, bool)>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        validate_shapes(points, initial_centroids)?;

        let mut centroids = initial_centroids.to_owned();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations && !converged {
            let new_centroids = self.update(points, &centroids, iterations)?;
            converged = centroids
                .axis_iter(Axis(0))
                .zip(new_centroids.axis_iter(Axis(0)))
                .all(|(old, new)| self.metric.distance(&old, &new) < self.epsilon);
            centroids = new_centroids;
            iterations += 1;
        }

        Ok((centroids, iterations, converged))
    }

    /// One assignment pass followed by the mean update.
    fn update<S>(
        &self,
        points: &ArrayBase<S, Ix2>,
        centroids: &Array2<f64>,
        iteration: usize,
    ) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
    {
        let n_clusters = centroids.nrows();
        let mut sums = Array2::<f64>::zeros(centroids.raw_dim());
        let mut counts = vec![0usize; n_clusters];

        for x in points.axis_iter(Axis(0)) {
            let label = nearest(self.metric, centroids, &x);
            sums.row_mut(label).zip_mut_with(&x, |a, &b| *a += b);
            counts[label] += 1;
        }

        if let Some(cluster) = counts.iter().position(|&c| c == 0) {
            return Err(KMeansError::EmptyCluster { cluster, iteration });
        }

        for (mut c, &count) in sums.axis_iter_mut(Axis(0)).zip(counts.iter()) {
            c.mapv_inplace(|v| v / count as f64);
        }
        Ok(sums)
    }
}

/// Refines `initial_centroids` against `points` in one call.
pub fn refine<S1, S2>(
    points: &ArrayBase<S1, Ix2>,
    initial_centroids: &ArrayBase<S2, Ix2>,
    max_iterations: i64,
    epsilon: f64,
) -> Result<Array2<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    KMeansRefiner::new(max_iterations, epsilon)?.run(points, initial_centroids)
}

fn validate_shapes<S1, S2>(
    points: &ArrayBase<S1, Ix2>,
    centroids: &ArrayBase<S2, Ix2>,
) -> Result<()>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    if points.nrows() == 0 {
        return Err(KMeansError::InvalidShape("point set is empty".into()));
    }
    let dim = points.ncols();
    if dim == 0 {
        return Err(KMeansError::InvalidShape(
            "points must have at least one coordinate".into(),
        ));
    }
    if centroids.nrows() == 0 {
        return Err(KMeansError::InvalidShape("centroid set is empty".into()));
    }
    if centroids.ncols() != dim {
        return Err(KMeansError::InvalidShape(format!(
            "centroids have dimension {}, points have dimension {dim}",
            centroids.ncols()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn two_separated_clusters_converge() {
        let points = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
        let init = array![[0.0, 0.0], [10.0, 0.0]];
        let refiner = KMeansRefiner::new(10, 0.0001).unwrap();
        let out = refiner.fit(&points, &init).unwrap();

        assert!(out.converged);
        assert_eq!(out.iterations, 2);
        assert_abs_diff_eq!(out.centroids, array![[0.0, 0.5], [10.0, 0.5]], epsilon = 1e-12);
        assert_eq!(out.labels.to_vec(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn zero_iterations_returns_initial_centroids() {
        let points = array![[1.0], [2.0], [30.0]];
        let init = array![[5.0], [7.0]];
        let out = KMeansRefiner::new(0, 0.1).unwrap().fit(&points, &init).unwrap();
        assert_eq!(out.centroids, init);
        assert_eq!(out.iterations, 0);
        assert!(!out.converged);
    }

    #[test]
    fn caller_centroids_are_not_mutated() {
        let points = array![[0.0, 0.0], [2.0, 2.0]];
        let init = array![[5.0, 5.0]];
        let snapshot = init.clone();
        let out = refine(&points, &init, 5, 1e-9).unwrap();
        assert_eq!(init, snapshot);
        assert_abs_diff_eq!(out, array![[1.0, 1.0]], epsilon = 1e-12);
    }

    #[test]
    fn empty_cluster_is_an_error() {
        let points = array![[0.0, 0.0], [0.0, 1.0]];
        let init = array![[0.0, 0.0], [100.0, 100.0]];
        let err = refine(&points, &init, 1, 0.001).unwrap_err();
        assert!(matches!(
            err,
            KMeansError::EmptyCluster {
                cluster: 1,
                iteration: 0
            }
        ));
    }

    #[test]
    fn convergence_needs_movement_strictly_below_epsilon() {
        // Stationary from the first pass: every movement is exactly 0.0.
        let points = array![[0.0], [1.0]];
        let init = array![[0.0], [1.0]];

        let out = KMeansRefiner::new(3, 0.0).unwrap().fit(&points, &init).unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 3);
        assert_eq!(out.centroids, init);

        let out = KMeansRefiner::new(3, 1e-12).unwrap().fit(&points, &init).unwrap();
        assert!(out.converged);
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn run_matches_fit_centroids() {
        let points = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
        let init = array![[0.0, 0.0], [10.0, 0.0]];
        let refiner = KMeansRefiner::new(10, 1e-4).unwrap();
        assert_eq!(
            refiner.run(&points, &init).unwrap(),
            refiner.fit(&points, &init).unwrap().centroids
        );
    }

    #[test]
    fn negative_budget_is_rejected() {
        let err = KMeansRefiner::new(-1, 0.1).unwrap_err();
        assert!(matches!(err, KMeansError::InvalidParameter(_)));
    }

    #[test]
    fn shape_errors_are_reported_before_iterating() {
        let refiner = KMeansRefiner::new(3, 0.1).unwrap();

        let empty = Array2::<f64>::zeros((0, 2));
        let init = array![[0.0, 0.0]];
        assert!(matches!(
            refiner.run(&empty, &init),
            Err(KMeansError::InvalidShape(_))
        ));

        let points = array![[0.0, 0.0], [1.0, 1.0]];
        let no_centroids = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            refiner.run(&points, &no_centroids),
            Err(KMeansError::InvalidShape(_))
        ));

        let wrong_dim = array![[0.0, 0.0, 0.0]];
        assert!(matches!(
            refiner.run(&points, &wrong_dim),
            Err(KMeansError::InvalidShape(_))
        ));

        let zero_dim = Array2::<f64>::zeros((2, 0));
        let zero_dim_init = Array2::<f64>::zeros((1, 0));
        assert!(matches!(
            refiner.run(&zero_dim, &zero_dim_init),
            Err(KMeansError::InvalidShape(_))
        ));
    }

    #[test]
    fn budget_exhaustion_is_not_an_error() {
        let points = array![[0.0], [1.0], [2.0], [10.0], [11.0], [12.0]];
        let init = array![[0.0], [1.0]];
        let out = KMeansRefiner::new(1, 1e-12).unwrap().fit(&points, &init).unwrap();
        assert_eq!(out.iterations, 1);
        assert!(!out.converged);
        // Pass 1: {0} and {1, 2, 10, 11, 12}.
        assert_abs_diff_eq!(out.centroids, array![[0.0], [7.2]], epsilon = 1e-12);
    }
}
