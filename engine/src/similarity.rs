use crate::index::WeightMatrix;
use rayon::prelude::*;

/// Dense, symmetric cosine-similarity matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Computes `W · Wᵀ` through per-term postings so only shared terms contribute.
    pub fn build(weights: &WeightMatrix) -> Self {
        let n = weights.num_rows();
        let postings = weights.postings();
        let mut values = vec![0.0f64; n * n];
        if n == 0 {
            return Self { n, values };
        }

        values.par_chunks_mut(n).enumerate().for_each(|(i, out)| {
            let row = weights.row(i);
            if row.is_empty() {
                return;
            }
            // ascending term order keeps [i][j] and [j][i] bit-identical
            for tw in row {
                for p in &postings[tw.term_id as usize] {
                    out[p.doc_id as usize] += tw.weight * p.weight;
                }
            }
            out[i] = 1.0;
        });
        Self { n, values }
    }

    pub fn len(&self) -> usize { self.n }

    pub fn is_empty(&self) -> bool { self.n == 0 }

    pub fn get(&self, i: usize, j: usize) -> f64 { self.values[i * self.n + j] }

    pub fn row(&self, i: usize) -> &[f64] { &self.values[i * self.n..(i + 1) * self.n] }
}
