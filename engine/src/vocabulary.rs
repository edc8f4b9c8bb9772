use std::collections::{BTreeSet, HashMap};

pub type TermId = u32;

/// Term dictionary plus per-term document frequency. Ids follow lexicographic term order.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
}

impl Vocabulary {
    /// Build from already tokenized documents.
    pub fn build(docs: &[Vec<String>]) -> Self {
        let terms: BTreeSet<&str> = docs.iter().flatten().map(String::as_str).collect();
        let dictionary: HashMap<String, TermId> = terms
            .into_iter()
            .enumerate()
            .map(|(id, term)| (term.to_string(), id as TermId))
            .collect();

        let mut df = vec![0u32; dictionary.len()];
        for tokens in docs {
            let seen: BTreeSet<TermId> = tokens.iter().filter_map(|t| dictionary.get(t).copied()).collect();
            for tid in seen {
                df[tid as usize] += 1;
            }
        }
        Self { dictionary, df }
    }

    pub fn len(&self) -> usize { self.df.len() }

    pub fn is_empty(&self) -> bool { self.df.is_empty() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn doc_freqs(&self) -> &[u32] { &self.df }

    pub fn doc_freq(&self, tid: TermId) -> u32 { self.df.get(tid as usize).copied().unwrap_or(0) }
}
