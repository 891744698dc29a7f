use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::node::CommitNode;
use super::state::OutcomeState;

/// Directed acyclic graph of classified commits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitDag {
    /// All nodes indexed by commit hash
    nodes: HashMap<String, CommitNode>,
    /// Hashes in insertion order; keeps children back-fill and rendering
    /// deterministic with respect to the commit history
    order: Vec<String>,
}

impl CommitDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit node, keyed by its hash
    pub fn insert(&mut self, node: CommitNode) {
        if !self.nodes.contains_key(&node.hash) {
            self.order.push(node.hash.clone());
        }
        self.nodes.insert(node.hash.clone(), node);
    }

    pub fn get(&self, hash: &str) -> Option<&CommitNode> {
        self.nodes.get(hash)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First inserted node, i.e. the newest commit of the history
    pub fn first(&self) -> Option<&CommitNode> {
        self.order.first().and_then(|hash| self.nodes.get(hash))
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CommitNode> {
        self.order.iter().filter_map(|hash| self.nodes.get(hash))
    }

    /// Back-fill every node's children list from the parent edges. Parent
    /// hashes absent from the graph are tolerated: they are the edge of
    /// known history.
    pub fn link_children(&mut self) {
        let edges: Vec<(String, String)> = self
            .iter()
            .flat_map(|node| {
                node.parents
                    .iter()
                    .map(move |parent| (parent.clone(), node.hash.clone()))
            })
            .collect();

        for (parent, child) in edges {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.push(child);
            }
        }
    }

    /// Get all root commits (no parents)
    pub fn roots(&self) -> Vec<&CommitNode> {
        self.iter().filter(|node| node.is_root()).collect()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> DagStats {
        let mut stats = DagStats {
            total_commits: self.nodes.len(),
            ..DagStats::default()
        };

        for node in self.nodes.values() {
            if node.is_merge() {
                stats.merge_commits += 1;
            }
            if node.is_root() {
                stats.root_commits += 1;
            }
            match node.state {
                OutcomeState::BuildError => stats.build_errors += 1,
                OutcomeState::TestBuildError => stats.test_build_errors += 1,
                OutcomeState::TestFail => stats.test_failures += 1,
                OutcomeState::TestSuccess => stats.test_successes += 1,
            }
        }

        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DagStats {
    pub total_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub build_errors: usize,
    pub test_build_errors: usize,
    pub test_failures: usize,
    pub test_successes: usize,
}
