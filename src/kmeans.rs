//! Weighted k-means over RGB colour points.
//!
//! Centroids are seeded from distinct input points picked uniformly at
//! random, then refined by nearest-centroid assignment and weighted-mean
//! updates until no centroid moves by `min_diff` or more.

use rand::Rng;
use rand::seq::index;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Number of colour channels per point.
pub const DIMENSIONS: usize = 3;

/// A colour coordinate and the number of pixels carrying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPoint {
    pub coords: [f64; DIMENSIONS],
    pub weight: u32,
}

impl ColorPoint {
    /// Weights below one are raised to one.
    pub fn new(coords: [f64; DIMENSIONS], weight: u32) -> Self {
        Self {
            coords,
            weight: weight.max(1),
        }
    }

    pub fn distance(&self, other: &ColorPoint) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct Cluster {
    pub points: Vec<ColorPoint>,
    pub center: ColorPoint,
}

impl Cluster {
    fn seeded(point: ColorPoint) -> Self {
        Self {
            points: vec![point],
            center: ColorPoint::new(point.coords, 1),
        }
    }

    /// Total pixel weight of the members.
    pub fn weight(&self) -> u64 {
        self.points.iter().map(|p| u64::from(p.weight)).sum()
    }
}

/// Weighted mean of `points`, or `None` when there is nothing to average.
fn weighted_center(points: &[ColorPoint]) -> Option<ColorPoint> {
    let mut sums = [0.0f64; DIMENSIONS];
    let mut total = 0u64;
    for p in points {
        total += u64::from(p.weight);
        for (sum, c) in sums.iter_mut().zip(p.coords.iter()) {
            *sum += c * f64::from(p.weight);
        }
    }
    if total == 0 {
        return None;
    }
    Some(ColorPoint::new(sums.map(|s| s / total as f64), 1))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KmeansConfig {
    pub clusters: usize,
    /// Stop once the largest centroid shift drops below this many colour units.
    pub min_diff: f64,
    pub max_iterations: usize,
}

impl Default for KmeansConfig {
    fn default() -> Self {
        Self {
            clusters: 3,
            min_diff: 1.0,
            max_iterations: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    pub iterations: usize,
    pub converged: bool,
}

impl Clustering {
    pub fn centers(&self) -> impl Iterator<Item = [f64; DIMENSIONS]> + '_ {
        self.clusters.iter().map(|c| c.center.coords)
    }
}

/// Pick the initial centroids.
///
/// Up to `k` distinct points are drawn without replacement. When there are
/// fewer points than clusters the drawn points are repeated in order.
fn initial_clusters<R: Rng + ?Sized>(points: &[ColorPoint], k: usize, rng: &mut R) -> Vec<Cluster> {
    let picked: Vec<ColorPoint> = index::sample(rng, points.len(), k.min(points.len()))
        .into_iter()
        .map(|i| points[i])
        .collect();
    picked.iter().cycle().take(k).copied().map(Cluster::seeded).collect()
}

/// Index of the nearest centre; ties go to the earliest cluster.
fn nearest(point: &ColorPoint, clusters: &[Cluster]) -> usize {
    let mut best = 0;
    let mut smallest = f64::INFINITY;
    for (i, cluster) in clusters.iter().enumerate() {
        let distance = point.distance(&cluster.center);
        if distance < smallest {
            smallest = distance;
            best = i;
        }
    }
    best
}

/// Partition `points` into `config.clusters` clusters.
///
/// An empty cluster keeps its previous centre. If `max_iterations` passes
/// complete without converging, the latest clusters are returned with
/// `converged` unset.
pub fn kmeans<R: Rng + ?Sized>(
    points: &[ColorPoint],
    config: &KmeansConfig,
    rng: &mut R,
) -> Result<Clustering> {
    if config.clusters == 0 {
        return Err(Error::InvalidClusterCount(0));
    }
    if points.is_empty() {
        return Err(Error::NoPoints);
    }
    let clusters = initial_clusters(points, config.clusters, rng);
    Ok(refine(points, clusters, config))
}

/// Run k-means from explicit starting centres, one cluster per seed.
///
/// `config.clusters` is ignored in favour of `seeds.len()`.
pub fn kmeans_from(
    points: &[ColorPoint],
    seeds: &[[f64; DIMENSIONS]],
    config: &KmeansConfig,
) -> Result<Clustering> {
    if seeds.is_empty() {
        return Err(Error::InvalidClusterCount(0));
    }
    if points.is_empty() {
        return Err(Error::NoPoints);
    }
    let clusters = seeds
        .iter()
        .map(|&coords| Cluster::seeded(ColorPoint::new(coords, 1)))
        .collect();
    Ok(refine(points, clusters, config))
}

fn refine(points: &[ColorPoint], mut clusters: Vec<Cluster>, config: &KmeansConfig) -> Clustering {
    let k = clusters.len();
    let max_iterations = config.max_iterations.max(1);

    for iteration in 1..=max_iterations {
        let mut members: Vec<Vec<ColorPoint>> = vec![Vec::new(); k];
        for point in points {
            members[nearest(point, &clusters)].push(*point);
        }

        let mut diff = 0.0f64;
        for (cluster, assigned) in clusters.iter_mut().zip(members) {
            let center = match weighted_center(&assigned) {
                Some(center) => center,
                None => cluster.center,
            };
            diff = diff.max(cluster.center.distance(&center));
            *cluster = Cluster {
                points: assigned,
                center,
            };
        }

        debug!(iteration, diff, "k-means pass");
        if diff < config.min_diff {
            return Clustering {
                clusters,
                iterations: iteration,
                converged: true,
            };
        }
    }

    warn!(
        max_iterations,
        "k-means did not converge, using latest centroids"
    );
    Clustering {
        clusters,
        iterations: max_iterations,
        converged: false,
    }
}
