//! Seeded k-means clustering.

use ndarray::{Array2, ArrayView1, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::MathError;

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster centers (k x n_features).
    pub centroids: Array2<f64>,
    /// Label of each input row.
    pub labels: Vec<usize>,
    /// Sum of squared distances from each row to its centroid.
    pub inertia: f64,
    /// Lloyd iterations run.
    pub iterations: usize,
}

impl KMeansFit {
    /// Number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }
}

/// Lloyd's k-means with k-means++ seeding from a fixed RNG seed.
///
/// Identical inputs and parameters always produce identical centroids.
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    /// Number of clusters.
    pub n_clusters: usize,
    /// Seed for center initialization.
    pub seed: u64,
    /// Maximum Lloyd iterations.
    pub max_iterations: usize,
    /// Convergence tolerance, relative to the mean per-feature variance.
    pub tolerance: f64,
}

impl KMeans {
    /// Create a k-means estimator with default iteration limits.
    #[must_use]
    pub const fn new(n_clusters: usize, seed: u64) -> Self {
        Self { n_clusters, seed, max_iterations: 300, tolerance: 1e-4 }
    }

    /// Set the maximum number of Lloyd iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the relative convergence tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fit centroids to the rows of `data`.
    ///
    /// # Errors
    /// Returns an error if `data` is empty, contains non-finite values, or
    /// has fewer rows than `n_clusters`.
    pub fn fit(&self, data: &Array2<f64>) -> Result<KMeansFit, MathError> {
        let n = data.nrows();
        let k = self.n_clusters;

        if n == 0 || data.ncols() == 0 {
            return Err(MathError::EmptyData);
        }
        if k == 0 {
            return Err(MathError::InvalidClusterCount(k));
        }
        if k > n {
            return Err(MathError::TooManyClusters { k, samples: n });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(MathError::NumericalInstability("non-finite value in input".to_string()));
        }

        let spread = mean_feature_variance(data);
        if !spread.is_finite() {
            return Err(overflow("feature variance"));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = plus_plus_init(data, k, &mut rng)?;
        let tol = self.tolerance * spread;

        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;
            let (labels, _) = assign(data, &centroids);
            let updated = update_centroids(data, &labels, &centroids);
            let shift: f64 = centroids
                .rows()
                .into_iter()
                .zip(updated.rows())
                .map(|(a, b)| sq_dist(a, b))
                .sum();
            centroids = updated;
            if shift <= tol {
                break;
            }
        }

        let (labels, inertia) = assign(data, &centroids);
        if !inertia.is_finite() {
            return Err(overflow("inertia"));
        }
        Ok(KMeansFit { centroids, labels, inertia, iterations })
    }
}

fn overflow(what: &str) -> MathError {
    MathError::NumericalInstability(format!("{what} overflows f64"))
}

fn sq_dist(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn mean_feature_variance(data: &Array2<f64>) -> f64 {
    data.var_axis(Axis(0), 0.0).mean().unwrap_or(0.0)
}

/// k-means++ seeding: each new center is drawn with probability
/// proportional to its squared distance from the nearest chosen center.
fn plus_plus_init(
    data: &Array2<f64>,
    k: usize,
    rng: &mut StdRng,
) -> Result<Array2<f64>, MathError> {
    let n = data.nrows();
    let mut centroids = Array2::zeros((k, data.ncols()));
    let first = rng.gen_range(0..n);
    centroids.row_mut(0).assign(&data.row(first));

    let mut closest: Vec<f64> = data.rows().into_iter().map(|r| sq_dist(r, data.row(first))).collect();

    for c in 1..k {
        let total: f64 = closest.iter().sum();
        if !total.is_finite() {
            return Err(overflow("squared distance"));
        }
        let chosen = if total > 0.0 {
            let target = rng.gen_range(0.0..total);
            let mut acc = 0.0;
            closest
                .iter()
                .position(|d| {
                    acc += d;
                    acc > target
                })
                .unwrap_or(n - 1)
        } else {
            // every remaining point coincides with a chosen center
            rng.gen_range(0..n)
        };
        centroids.row_mut(c).assign(&data.row(chosen));
        for (i, row) in data.rows().into_iter().enumerate() {
            closest[i] = closest[i].min(sq_dist(row, data.row(chosen)));
        }
    }
    Ok(centroids)
}

/// Label each row with its nearest centroid; returns labels and inertia.
fn assign(data: &Array2<f64>, centroids: &Array2<f64>) -> (Vec<usize>, f64) {
    let mut inertia = 0.0;
    let labels = data
        .rows()
        .into_iter()
        .map(|row| {
            let (label, dist) = nearest(row, centroids);
            inertia += dist;
            label
        })
        .collect();
    (labels, inertia)
}

fn nearest(row: ArrayView1<'_, f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (j, c) in centroids.rows().into_iter().enumerate() {
        let d = sq_dist(row, c);
        if d < best.1 {
            best = (j, d);
        }
    }
    best
}

/// Recompute centroids as member means. An empty cluster takes the row
/// farthest from its current centroid.
fn update_centroids(data: &Array2<f64>, labels: &[usize], previous: &Array2<f64>) -> Array2<f64> {
    let k = previous.nrows();
    let mut sums = Array2::<f64>::zeros(previous.raw_dim());
    let mut counts = vec![0usize; k];
    for (row, &label) in data.rows().into_iter().zip(labels) {
        let mut target = sums.row_mut(label);
        target += &row;
        counts[label] += 1;
    }

    let mut taken = vec![false; data.nrows()];
    for j in 0..k {
        if counts[j] > 0 {
            let mut row = sums.row_mut(j);
            row /= counts[j] as f64;
            continue;
        }
        let far = data
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !taken[*i])
            .map(|(i, row)| (i, sq_dist(row, previous.row(labels[i]))))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            });
        if let Some((i, _)) = far {
            taken[i] = true;
            sums.row_mut(j).assign(&data.row(i));
        } else {
            sums.row_mut(j).assign(&previous.row(j));
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    fn two_blobs() -> Array2<f64> {
        array![
            [0.10, 0.20, 1.00],
            [0.11, 0.21, 1.05],
            [0.09, 0.19, 0.98],
            [0.80, 0.90, 2.50],
            [0.82, 0.88, 2.45],
            [0.79, 0.91, 2.55],
        ]
    }

    #[test]
    fn separates_two_blobs() {
        let fit = KMeans::new(2, 42).fit(&two_blobs()).unwrap();
        assert_eq!(fit.k(), 2);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[3], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
    }

    #[test]
    fn fit_is_deterministic() {
        let data = two_blobs();
        let a = KMeans::new(3, 42).fit(&data).unwrap();
        let b = KMeans::new(3, 42).fit(&data).unwrap();
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn single_cluster_is_mean() {
        let data = two_blobs();
        let fit = KMeans::new(1, 7).fit(&data).unwrap();
        let mean = data.mean_axis(Axis(0)).unwrap();
        for (c, m) in fit.centroids.row(0).iter().zip(mean.iter()) {
            assert_relative_eq!(*c, *m, epsilon = 1e-12);
        }
    }

    #[test]
    fn k_equal_to_rows_has_zero_inertia() {
        let fit = KMeans::new(6, 42).fit(&two_blobs()).unwrap();
        assert_relative_eq!(fit.inertia, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inertia_non_increasing_in_k() {
        let data = two_blobs();
        let inertias: Vec<f64> =
            (1..=4).map(|k| KMeans::new(k, 42).fit(&data).unwrap().inertia).collect();
        assert!(inertias[0] > inertias[1]);
        assert!(inertias[1] >= inertias[3]);
    }

    #[test]
    fn duplicate_rows_fill_every_cluster() {
        let data = array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
        let fit = KMeans::new(2, 42).fit(&data).unwrap();
        assert_eq!(fit.k(), 2);
        assert_relative_eq!(fit.inertia, 0.0);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    fn rejects_bad_cluster_counts(#[case] k: usize) {
        assert!(KMeans::new(k, 42).fit(&two_blobs()).is_err());
    }

    #[test]
    fn rejects_non_finite_input() {
        let data = array![[1.0, f64::NAN, 1.0], [0.0, 0.0, 0.0]];
        assert!(matches!(
            KMeans::new(1, 42).fit(&data),
            Err(MathError::NumericalInstability(_))
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    fn rejects_overflowing_distances(#[case] k: usize) {
        let data = array![[0.1, 0.2, 1.0], [0.2, 0.3, 1.1], [1e200, 0.5, 1.0]];
        assert!(matches!(
            KMeans::new(k, 42).fit(&data),
            Err(MathError::NumericalInstability(_))
        ));
    }
}
