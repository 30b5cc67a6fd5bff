//! Distance metrics for vector comparison.

use std::fmt;

/// Distance metric used by a collection.
///
/// - **Cosine**: angle between vectors, ignoring magnitude. The natural
///   choice for text embeddings; distance is `1 - cosine_similarity`,
///   so it falls in `[0, 2]` for arbitrary vectors.
/// - **Euclidean**: straight-line (L2) distance, `[0, inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum DistanceMetric {
    /// Cosine distance (`1 - cosine_similarity`). Default.
    #[default]
    Cosine,

    /// Euclidean (L2) distance.
    Euclidean,
}

impl DistanceMetric {
    /// Compute the distance between two vectors. Lower means more similar.
    ///
    /// Callers guarantee equal lengths; the collection validates dimensions
    /// before any vector reaches this function.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "vector dimensions must match");

        match self {
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
            DistanceMetric::Euclidean => euclidean_distance(a, b),
        }
    }

    /// Convert a distance produced by this metric into a similarity score
    /// clipped to `[0, 1]`, where 1 means identical.
    #[inline]
    pub fn similarity(&self, distance: f32) -> f32 {
        let raw = match self {
            DistanceMetric::Cosine => 1.0 - distance,
            DistanceMetric::Euclidean => 1.0 / (1.0 + distance),
        };
        raw.clamp(0.0, 1.0)
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" | "cos" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    // Process four lanes per iteration; the compiler vectorizes this shape.
    let mut lanes_a = a.chunks_exact(4);
    let mut lanes_b = b.chunks_exact(4);
    for (la, lb) in lanes_a.by_ref().zip(lanes_b.by_ref()) {
        dot += la[0] * lb[0] + la[1] * lb[1] + la[2] * lb[2] + la[3] * lb[3];
        norm_a += la[0] * la[0] + la[1] * la[1] + la[2] * la[2] + la[3] * la[3];
        norm_b += lb[0] * lb[0] + lb[1] * lb[1] + lb[2] * lb[2] + lb[3] * lb[3];
    }
    for (x, y) in lanes_a.remainder().iter().zip(lanes_b.remainder()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}
