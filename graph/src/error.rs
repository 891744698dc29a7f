use thiserror::Error;

/// Fatal graph traversal failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Ancestry loops back into a commit still being collapsed
    #[error("ancestry cycle detected at commit {0}")]
    CycleDetected(String),
    /// A walk was started from a hash that is not in the graph
    #[error("commit {0} is not in the graph")]
    UnknownCommit(String),
}
