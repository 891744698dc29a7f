use serde::{Deserialize, Serialize};

use super::state::OutcomeState;

/// A classified commit in the history graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitNode {
    /// Sequence number from the commit history
    pub id: u32,
    /// Commit hash (the graph key)
    pub hash: String,
    /// Classified build/test outcome
    pub state: OutcomeState,
    /// Parent commit hashes, in recorded order
    pub parents: Vec<String>,
    /// Hashes of commits that list this one as a parent; filled in after
    /// the whole graph is built
    pub children: Vec<String>,
}

impl CommitNode {
    pub fn new(id: u32, hash: String, state: OutcomeState, parents: Vec<String>) -> Self {
        Self {
            id,
            hash,
            state,
            parents,
            children: Vec::new(),
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
