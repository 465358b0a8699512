use ndarray::{ArrayBase, Data, Ix1};

/// Enum representing the distance metric to be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    /// L2 distance: square root of the summed squared coordinate differences.
    #[default]
    Euclidean,
}

impl DistanceMetric {
    /// Computes the distance between two points based on the selected metric.
    ///
    /// Both points must have the same length; this is not re-checked here.
    pub fn distance<S1, S2>(&self, x: &ArrayBase<S1, Ix1>, y: &ArrayBase<S2, Ix1>) -> f64
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        match self {
            DistanceMetric::Euclidean => x
                .iter()
                .zip(y.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn euclidean_three_four_five() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_abs_diff_eq!(DistanceMetric::Euclidean.distance(&a, &b), 5.0);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = array![1.5, -2.0, 7.25];
        assert_eq!(DistanceMetric::Euclidean.distance(&a, &a), 0.0);
    }

    #[test]
    fn symmetric_over_row_views() {
        let m: Array2<f64> = array![[1.0, 2.0, 3.0], [-1.0, 0.5, 9.0]];
        let d1 = DistanceMetric::default().distance(&m.row(0), &m.row(1));
        let d2 = DistanceMetric::default().distance(&m.row(1), &m.row(0));
        assert_eq!(d1, d2);
        assert_abs_diff_eq!(d1, (4.0f64 + 2.25 + 36.0).sqrt(), epsilon = 1e-12);
    }
}
