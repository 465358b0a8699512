use ndarray::{Array1, ArrayBase, Axis, Data, Ix1, Ix2};

use crate::distance::DistanceMetric;

/// Returns the index of the centroid closest to `point`.
///
/// Ties go to the lowest index: a later centroid only wins when it is
/// strictly closer than the best seen so far. `centroids` must have at
/// least one row.
pub fn nearest<S1, S2>(
    metric: DistanceMetric,
    centroids: &ArrayBase<S1, Ix2>,
    point: &ArrayBase<S2, Ix1>,
) -> usize
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    debug_assert!(centroids.nrows() > 0, "nearest needs at least one centroid");
    let mut rows = centroids.axis_iter(Axis(0)).enumerate();
    let (mut min_j, mut min_dist) = match rows.next() {
        Some((j, c)) => (j, metric.distance(&c, point)),
        None => return 0,
    };
    for (j, c) in rows {
        let dist = metric.distance(&c, point);
        if dist < min_dist {
            min_dist = dist;
            min_j = j;
        }
    }
    min_j
}

/// Assigns labels to each sample based on the closest centroid.
pub fn assign_labels<S1, S2>(
    metric: DistanceMetric,
    points: &ArrayBase<S1, Ix2>,
    centroids: &ArrayBase<S2, Ix2>,
) -> Array1<usize>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    points
        .axis_iter(Axis(0))
        .map(|x| nearest(metric, centroids, &x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn picks_closest_centroid() {
        let centroids = array![[0.0, 0.0], [10.0, 10.0], [5.0, 5.0]];
        let point = array![6.0, 4.0];
        assert_eq!(nearest(DistanceMetric::Euclidean, &centroids, &point), 2);
    }

    #[test]
    fn equidistant_point_goes_to_lower_index() {
        let centroids = array![[-1.0, 0.0], [1.0, 0.0]];
        let point = array![0.0, 0.0];
        assert_eq!(nearest(DistanceMetric::Euclidean, &centroids, &point), 0);

        // Duplicate centroids: the first copy always wins.
        let centroids = array![[3.0, 3.0], [0.0, 0.0], [0.0, 0.0]];
        let point = array![0.1, 0.0];
        assert_eq!(nearest(DistanceMetric::Euclidean, &centroids, &point), 1);
    }

    #[test]
    fn single_centroid_is_always_nearest() {
        let centroids = array![[100.0]];
        assert_eq!(nearest(DistanceMetric::Euclidean, &centroids, &array![-5.0]), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "at least one centroid")]
    fn no_centroids_panics_in_debug() {
        let centroids = ndarray::Array2::<f64>::zeros((0, 2));
        nearest(DistanceMetric::Euclidean, &centroids, &array![1.0, 2.0]);
    }

    #[test]
    fn labels_follow_point_order() {
        let points = array![[0.0, 0.0], [9.0, 9.0], [0.5, 0.0], [10.0, 10.0]];
        let centroids = array![[0.0, 0.0], [10.0, 10.0]];
        let labels = assign_labels(DistanceMetric::Euclidean, &points, &centroids);
        assert_eq!(labels.to_vec(), vec![0, 1, 0, 1]);
    }
}
