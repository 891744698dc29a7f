use std::collections::{HashSet, VecDeque};

use crate::core::CommitDag;
use crate::error::GraphError;

/// Where ancestry first changes outcome, starting from a given commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Hashes of the first differing ancestor(s); `None` when known history
    /// was exhausted without a state change
    pub frontier: Option<Vec<String>>,
    /// Same-state commits seen before the frontier, in discovery order
    pub visited: Vec<String>,
}

/// Walk backward through ancestry to the nearest outcome change.
///
/// A parent missing from the graph ends the scan for that commit: there is
/// no further information upstream of it. At a merge, a differing parent
/// yields the whole parent set as the frontier.
pub fn locate(dag: &CommitDag, start: &str) -> Result<Divergence, GraphError> {
    let start = dag
        .get(start)
        .ok_or_else(|| GraphError::UnknownCommit(start.to_string()))?;

    let mut visited = vec![start.hash.clone()];
    let mut seen: HashSet<String> = visited.iter().cloned().collect();
    let mut queue = VecDeque::from([start.hash.clone()]);

    while let Some(hash) = queue.pop_front() {
        let Some(node) = dag.get(&hash) else {
            continue;
        };

        for parent_hash in &node.parents {
            let Some(parent) = dag.get(parent_hash) else {
                // edge of known history, nothing upstream to compare
                break;
            };

            if parent.state != node.state {
                if node.parents.len() >= 2 {
                    let context = visited
                        .iter()
                        .filter(|hash| !node.parents.contains(*hash))
                        .cloned()
                        .collect();
                    return Ok(Divergence {
                        frontier: Some(node.parents.clone()),
                        visited: context,
                    });
                }
                return Ok(Divergence {
                    frontier: Some(vec![parent_hash.clone()]),
                    visited,
                });
            }

            if seen.insert(parent_hash.clone()) {
                visited.push(parent_hash.clone());
                queue.push_back(parent_hash.clone());
            }
        }
    }

    Ok(Divergence {
        frontier: None,
        visited,
    })
}
