//! Gaussian blob generator used by the demo driver.

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

use crate::error::{KMeansError, Result};

/// Parameters for synthetic data generation.
#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub n_samples: usize,
    pub n_features: usize,
    pub n_clusters: usize,
    /// Mean and standard deviation of the blob center coordinates.
    pub center_mean: f64,
    pub center_std: f64,
    /// Spread of points around their center.
    pub spread: f64,
    pub seed: u64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            n_samples: 10_000,
            n_features: 10,
            n_clusters: 5,
            center_mean: 50.0,
            center_std: 10.0,
            spread: 5.0,
            seed: 0,
        }
    }
}

/// Generated points together with the ground truth they were drawn from.
#[derive(Debug, Clone)]
pub struct Blobs {
    pub points: Array2<f64>,
    pub centers: Array2<f64>,
    pub truth: Array1<usize>,
}

/// Draws `n_samples` points, each around a uniformly chosen random center.
pub fn generate_blobs(config: &BlobConfig) -> Result<Blobs> {
    if config.n_clusters == 0 || config.n_features == 0 {
        return Err(KMeansError::InvalidConfig(
            "blob generation needs at least one cluster and one feature".into(),
        ));
    }
    if !(config.spread >= 0.0) || !(config.center_std >= 0.0) {
        return Err(KMeansError::InvalidConfig(format!(
            "standard deviations must be non-negative, got center_std {} and spread {}",
            config.center_std, config.spread
        )));
    }
    let center_distribution = Normal::new(config.center_mean, config.center_std)
        .map_err(|e| KMeansError::InvalidConfig(format!("center distribution: {e}")))?;
    let point_distribution = Normal::new(0.0, config.spread)
        .map_err(|e| KMeansError::InvalidConfig(format!("point spread: {e}")))?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    // Step 1: Generate cluster centers.
    let centers = Array2::random_using(
        (config.n_clusters, config.n_features),
        center_distribution,
        &mut rng,
    );

    // Step 2: Assign each sample to a cluster and jitter it around that center.
    let cluster_assignment = Uniform::new(0, config.n_clusters);
    let truth: Array1<usize> = (0..config.n_samples)
        .map(|_| cluster_assignment.sample(&mut rng))
        .collect();
    let mut points = Array2::random_using(
        (config.n_samples, config.n_features),
        point_distribution,
        &mut rng,
    );
    for (mut row, &label) in points.axis_iter_mut(Axis(0)).zip(truth.iter()) {
        row += &centers.row(label);
    }

    Ok(Blobs {
        points,
        centers,
        truth,
    })
}
