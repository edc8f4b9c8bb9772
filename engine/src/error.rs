#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,
}
