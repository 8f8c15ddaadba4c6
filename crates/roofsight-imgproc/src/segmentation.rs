use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use roofsight_image::{ImageError, PixelBuffer};

/// An RGB sample in floating point.
pub type Rgb = [f32; 3];

/// Strategy choosing the starting centroids of [`kmeans`].
pub trait CentroidInit {
    /// Pick `k` starting centroids from a non-empty sample set.
    fn init(&mut self, samples: &[Rgb], k: usize) -> Vec<Rgb>;
}

/// Picks starting centroids uniformly at random among the samples, with replacement.
pub struct RandomSampleInit {
    rng: StdRng,
}

impl RandomSampleInit {
    /// Reproducible initialization from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Initialization seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl CentroidInit for RandomSampleInit {
    fn init(&mut self, samples: &[Rgb], k: usize) -> Vec<Rgb> {
        (0..k)
            .map(|_| samples[self.rng.random_range(0..samples.len())])
            .collect()
    }
}

/// Parameters of the color segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansParams {
    /// Number of clusters.
    pub k: usize,
    /// Number of assign/update rounds. There is no convergence check.
    pub iterations: usize,
    /// Seed of the centroid initialization, or `None` for a random one.
    pub seed: Option<u64>,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            k: 6,
            iterations: 10,
            seed: None,
        }
    }
}

/// Centroids and per-sample labels produced by [`kmeans`].
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Final cluster centers.
    pub centroids: Vec<Rgb>,
    /// Index of the nearest centroid for every sample.
    pub labels: Vec<usize>,
}

fn distance_sq(a: &Rgb, b: &Rgb) -> f32 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn nearest(sample: &Rgb, centroids: &[Rgb]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = distance_sq(sample, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

fn assign(samples: &[Rgb], centroids: &[Rgb], labels: &mut [usize]) {
    labels
        .par_iter_mut()
        .zip(samples.par_iter())
        .for_each(|(label, sample)| *label = nearest(sample, centroids));
}

/// Cluster RGB samples with Lloyd's algorithm for a fixed number of rounds.
///
/// Each round assigns every sample to its nearest centroid by Euclidean
/// distance and moves each centroid to the mean of its samples. Centroids
/// that lose all their samples stay where they are.
///
/// Returns an empty clustering when `samples` is empty or `k` is 0.
pub fn kmeans(
    samples: &[Rgb],
    k: usize,
    iterations: usize,
    init: &mut impl CentroidInit,
) -> Clustering {
    if samples.is_empty() || k == 0 {
        return Clustering {
            centroids: Vec::new(),
            labels: Vec::new(),
        };
    }

    let mut centroids = init.init(samples, k);
    let mut labels = vec![0usize; samples.len()];

    for _ in 0..iterations {
        assign(samples, &centroids, &mut labels);

        let mut sums = vec![[0f64; 3]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (sample, &label) in samples.iter().zip(&labels) {
            for c in 0..3 {
                sums[label][c] += sample[c] as f64;
            }
            counts[label] += 1;
        }

        for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
            if count > 0 {
                for c in 0..3 {
                    centroid[c] = (sum[c] / count as f64) as f32;
                }
            }
        }
    }

    assign(samples, &centroids, &mut labels);

    Clustering { centroids, labels }
}

/// Posterize an image into its dominant colors with an explicit initializer.
///
/// Every pixel takes the color of its cluster centroid and becomes opaque.
/// An empty image or `k == 0` yields an unmodified copy.
pub fn kmeans_segment_with(
    src: &PixelBuffer,
    k: usize,
    iterations: usize,
    init: &mut impl CentroidInit,
) -> Result<PixelBuffer, ImageError> {
    let samples: Vec<Rgb> = src
        .as_slice()
        .chunks_exact(4)
        .map(|px| [px[0] as f32, px[1] as f32, px[2] as f32])
        .collect();

    let clustering = kmeans(&samples, k, iterations, init);
    if clustering.centroids.is_empty() {
        return Ok(src.clone());
    }

    let palette: Vec<[u8; 4]> = clustering
        .centroids
        .iter()
        .map(|c| {
            let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
            [q(c[0]), q(c[1]), q(c[2]), 255]
        })
        .collect();

    let data = clustering
        .labels
        .iter()
        .flat_map(|&label| palette[label])
        .collect();

    PixelBuffer::new(src.size(), data)
}

/// Posterize an image into `params.k` dominant colors.
///
/// Centroids start on randomly sampled pixels, seeded by `params.seed` when
/// set; without a seed the output differs from run to run.
pub fn kmeans_segment(src: &PixelBuffer, params: &KMeansParams) -> Result<PixelBuffer, ImageError> {
    let mut init = match params.seed {
        Some(seed) => RandomSampleInit::from_seed(seed),
        None => RandomSampleInit::from_entropy(),
    };
    let out = kmeans_segment_with(src, params.k, params.iterations, &mut init)?;
    log::debug!(
        "segmented {} into {} colors over {} iterations",
        src.size(),
        params.k,
        params.iterations
    );
    Ok(out)
}
