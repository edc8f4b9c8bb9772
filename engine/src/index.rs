use crate::vocabulary::{TermId, Vocabulary};
use rayon::prelude::*;
use std::collections::BTreeMap;

pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermWeight {
    pub term_id: TermId,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // normalized tf-idf weight
}

/// Sparse TF-IDF matrix. Row `i` holds entry `i`'s weights sorted by term id.
#[derive(Debug, Clone, Default)]
pub struct WeightMatrix {
    rows: Vec<Vec<TermWeight>>,
    num_terms: usize,
}

/// Smoothed idf: ln((1 + N) / (1 + df)) + 1.
pub fn idf(num_docs: usize, df: u32) -> f64 {
    ((1.0 + num_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

impl WeightMatrix {
    pub fn build(docs: &[Vec<String>], vocab: &Vocabulary) -> Self {
        let n = docs.len();
        let idfs: Vec<f64> = vocab.doc_freqs().iter().map(|&df| idf(n, df)).collect();
        let rows = docs
            .par_iter()
            .map(|tokens| weigh_row(tokens, vocab, &idfs))
            .collect();
        Self { rows, num_terms: vocab.len() }
    }

    pub fn num_rows(&self) -> usize { self.rows.len() }

    pub fn num_terms(&self) -> usize { self.num_terms }

    pub fn row(&self, doc: usize) -> &[TermWeight] { &self.rows[doc] }

    pub fn rows(&self) -> &[Vec<TermWeight>] { &self.rows }

    pub fn nnz(&self) -> usize { self.rows.iter().map(Vec::len).sum() }

    pub fn norm(&self, doc: usize) -> f64 {
        self.rows[doc].iter().map(|tw| tw.weight * tw.weight).sum::<f64>().sqrt()
    }

    /// Transpose into per-term postings, each sorted by doc id.
    pub fn postings(&self) -> Vec<Vec<Posting>> {
        let mut out: Vec<Vec<Posting>> = vec![Vec::new(); self.num_terms];
        for (doc_id, row) in self.rows.iter().enumerate() {
            for tw in row {
                out[tw.term_id as usize].push(Posting { doc_id: doc_id as DocId, weight: tw.weight });
            }
        }
        out
    }
}

fn weigh_row(tokens: &[String], vocab: &Vocabulary, idfs: &[f64]) -> Vec<TermWeight> {
    let mut tf: BTreeMap<TermId, u32> = BTreeMap::new();
    for tok in tokens {
        if let Some(tid) = vocab.term_id(tok) {
            *tf.entry(tid).or_insert(0) += 1;
        }
    }
    let mut row: Vec<TermWeight> = tf
        .into_iter()
        .map(|(term_id, count)| TermWeight { term_id, weight: count as f64 * idfs[term_id as usize] })
        .collect();

    let norm = row.iter().map(|tw| tw.weight * tw.weight).sum::<f64>().sqrt();
    if norm > 0.0 {
        for tw in row.iter_mut() {
            tw.weight /= norm;
        }
    }
    row
}
