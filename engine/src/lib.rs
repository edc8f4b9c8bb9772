pub mod catalog;
pub mod error;
pub mod index;
pub mod ranker;
pub mod similarity;
pub mod tokenizer;
pub mod vocabulary;

pub use catalog::{load_catalog, sample_entries, CatalogEntry, Facets, PackageType};
pub use error::IndexError;
pub use index::{DocId, Posting, TermWeight, WeightMatrix};
pub use ranker::{recommend, FilterCriteria, RankedHotel, RankedResult, Recommendation};
pub use similarity::SimilarityMatrix;
pub use vocabulary::{TermId, Vocabulary};

use std::time::Instant;

/// Everything a query needs, built once per corpus load and read-only afterwards.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    entries: Vec<CatalogEntry>,
    vocabulary: Vocabulary,
    weights: WeightMatrix,
    similarity: SimilarityMatrix,
}

impl IndexHandle {
    pub fn entries(&self) -> &[CatalogEntry] { &self.entries }
    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }
    pub fn weights(&self) -> &WeightMatrix { &self.weights }
    pub fn similarity(&self) -> &SimilarityMatrix { &self.similarity }
    pub fn facets(&self) -> Facets { Facets::from_entries(&self.entries) }
}

/// Tokenize, weight and compare every entry's descriptive text.
pub fn build_index(corpus: Vec<CatalogEntry>) -> Result<IndexHandle, IndexError> {
    if corpus.is_empty() {
        return Err(IndexError::EmptyCorpus);
    }
    let start = Instant::now();
    let docs: Vec<Vec<String>> = corpus.iter().map(|e| tokenizer::tokenize(&e.text)).collect();
    let vocabulary = Vocabulary::build(&docs);
    let weights = WeightMatrix::build(&docs, &vocabulary);
    let similarity = SimilarityMatrix::build(&weights);
    tracing::info!(
        entries = corpus.len(),
        terms = vocabulary.len(),
        nnz = weights.nnz(),
        took_s = start.elapsed().as_secs_f64(),
        "index built"
    );
    Ok(IndexHandle { entries: corpus, vocabulary, weights, similarity })
}
