//! Sparse vector similarity.
//!
//! All sums run in ascending index order so a given pair of vectors always
//! produces bit-identical scores.

/// Sparse vector of `(index, weight)` pairs, indices strictly ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Build from entries already sorted by index.
    ///
    /// # Panics
    /// Panics if indices are not strictly ascending.
    pub fn from_sorted(entries: Vec<(usize, f32)>) -> Self {
        assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "Sparse indices must be strictly ascending"
        );
        Self { entries }
    }

    /// Euclidean norm, accumulated in f64.
    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, w)| f64::from(w) * f64::from(w))
            .sum::<f64>()
            .sqrt()
    }

    /// Normalize to unit length in place. Zero vectors stay zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in self.entries.iter_mut() {
                *w = (f64::from(*w) / norm) as f32;
            }
        }
    }

    /// Dot product by merge-join over indices, accumulated in f64.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f64;
        while i < self.entries.len() && j < other.entries.len() {
            let (ia, wa) = self.entries[i];
            let (ib, wb) = other.entries[j];
            match ia.cmp(&ib) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += f64::from(wa) * f64::from(wb);
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity between two non-negative sparse vectors, in `[0.0, 1.0]`.
///
/// Returns 0.0 when either vector is zero. Clamped, so identical vectors
/// score exactly 1.0.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (norm_a * norm_b)).clamp(0.0, 1.0) as f32
}

/// Upper-triangle similarities `(i, j, score)` with `i < j`, row-major.
///
/// `None` entries are ineligible and produce no pairs.
pub fn pairwise_similarities(vectors: &[Option<SparseVector>]) -> Vec<(usize, usize, f32)> {
    let mut pairs = Vec::new();
    for (i, a) in vectors.iter().enumerate() {
        let Some(a) = a else { continue };
        for (j, b) in vectors.iter().enumerate().skip(i + 1) {
            if let Some(b) = b {
                pairs.push((i, j, cosine_similarity(a, b)));
            }
        }
    }
    pairs
}
