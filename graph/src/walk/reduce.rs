use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::core::CommitDag;
use crate::error::GraphError;

/// Collapse same-outcome runs of ancestry into direct edges.
///
/// The reduced graph keeps, of everything reachable from `root`: every
/// commit whose immediate parent has a different outcome, every merge
/// commit, and the history boundaries they end up pointing at. Parent
/// references are rewritten to skip the collapsed commits; the full graph
/// is left untouched.
pub fn reduce(dag: &CommitDag, root: &str) -> Result<CommitDag, GraphError> {
    if !dag.contains(root) {
        return Err(GraphError::UnknownCommit(root.to_string()));
    }

    let mut walk = Walk {
        dag,
        visited: HashSet::new(),
        on_stack: HashSet::new(),
        work: HashMap::new(),
        retained: Vec::new(),
        retained_set: HashSet::new(),
    };
    walk.run(root)?;
    Ok(walk.assemble(root))
}

/// One in-flight commit of the collapse walk
struct Frame {
    hash: String,
    /// Sentinel-filtered parent snapshot taken at entry
    parents: Vec<String>,
    /// Index of the parent currently being resolved
    idx: usize,
    /// Rewritten parent list under construction (merge commits)
    rewritten: Vec<String>,
    merge: bool,
}

struct Walk<'a> {
    dag: &'a CommitDag,
    /// Commits already entered, finished or not
    visited: HashSet<String>,
    /// Commits with a live frame; a parent edge back into this set is a cycle
    on_stack: HashSet<String>,
    /// Current (possibly rewritten) parent list per entered commit
    work: HashMap<String, Vec<String>>,
    /// Commits kept in the reduced graph, in retention order
    retained: Vec<String>,
    retained_set: HashSet<String>,
}

impl<'a> Walk<'a> {
    fn run(&mut self, root: &str) -> Result<(), GraphError> {
        let mut frames: Vec<Frame> = Vec::new();
        let mut enter = Some(root.to_string());
        let mut ret: Option<String> = None;

        'walk: loop {
            // descend until something returns a representative
            while let Some(hash) = enter.take() {
                if self.on_stack.contains(&hash) {
                    return Err(GraphError::CycleDetected(hash));
                }
                if self.visited.contains(&hash) {
                    ret = Some(hash);
                    break;
                }
                self.visited.insert(hash.clone());

                let Some(node) = self.dag.get(&hash) else {
                    return Err(GraphError::UnknownCommit(hash));
                };
                let mut parents = node.parents.clone();
                parents.retain(|parent| !parent.is_empty());
                self.work.insert(hash.clone(), parents.clone());

                if parents.len() >= 2 {
                    // merge commits are never elided
                    self.retain(&hash);
                    let idx = self.first_known(&hash, &parents, 0);
                    if idx == parents.len() {
                        self.work.insert(hash.clone(), Vec::new());
                        ret = Some(hash);
                        break;
                    }
                    let target = parents[idx].clone();
                    self.on_stack.insert(hash.clone());
                    frames.push(Frame {
                        hash,
                        parents,
                        idx,
                        rewritten: Vec::new(),
                        merge: true,
                    });
                    enter = Some(target);
                } else if parents.len() == 1 && self.dag.contains(&parents[0]) {
                    let target = parents[0].clone();
                    self.on_stack.insert(hash.clone());
                    frames.push(Frame {
                        hash,
                        parents,
                        idx: 0,
                        rewritten: Vec::new(),
                        merge: false,
                    });
                    enter = Some(target);
                } else {
                    // a root of history, or ancestry that leaves the dataset
                    ret = Some(hash);
                    break;
                }
            }

            // feed the returned representative to the caller frame
            let Some(rep) = ret.take() else {
                break 'walk;
            };
            let Some(frame) = frames.last_mut() else {
                break 'walk;
            };
            let target = self.substitute(&rep);

            if frame.merge {
                frame.rewritten.push(target);
                let next = self.first_known(&frame.hash, &frame.parents, frame.idx + 1);
                if next < frame.parents.len() {
                    frame.idx = next;
                    enter = Some(frame.parents[next].clone());
                    continue 'walk;
                }
                let Some(frame) = frames.pop() else {
                    break 'walk;
                };
                self.work.insert(frame.hash.clone(), frame.rewritten);
                self.on_stack.remove(&frame.hash);
                ret = Some(frame.hash);
            } else {
                self.work.insert(frame.hash.clone(), vec![target]);
                let hash = frame.hash.clone();
                let parent_hash = frame.parents[0].clone();
                frames.pop();
                self.on_stack.remove(&hash);

                let transition = match (self.dag.get(&hash), self.dag.get(&parent_hash)) {
                    (Some(node), Some(parent)) => {
                        parent.state != node.state || parent.children.len() > 1
                    }
                    _ => false,
                };

                if transition {
                    self.retain(&hash);
                    ret = Some(hash);
                } else if self.work.get(&rep).is_some_and(|p| !p.is_empty()) {
                    // collapsed: the representative stands in for this commit
                    ret = Some(rep);
                } else {
                    ret = Some(hash);
                }
            }
        }

        Ok(())
    }

    /// Parent reference a caller should record for a representative: an
    /// elided representative stands in for its own first parent, a retained
    /// one (or a boundary leaf) is referenced directly.
    fn substitute(&self, rep: &str) -> String {
        if self.retained_set.contains(rep) {
            return rep.to_string();
        }
        match self.work.get(rep).and_then(|parents| parents.first()) {
            Some(first) if self.dag.contains(first) => first.clone(),
            _ => rep.to_string(),
        }
    }

    /// Next parent index at or after `from` that exists in the graph.
    /// Unknown merge parents are outside known history and drop out of the
    /// reduced view.
    fn first_known(&self, hash: &str, parents: &[String], from: usize) -> usize {
        let mut idx = from;
        while idx < parents.len() && !self.dag.contains(&parents[idx]) {
            debug!(commit = %hash, parent = %parents[idx], "merge parent outside known history");
            idx += 1;
        }
        idx
    }

    fn retain(&mut self, hash: &str) {
        if self.retained_set.insert(hash.to_string()) {
            self.retained.push(hash.to_string());
        }
    }

    fn assemble(&self, root: &str) -> CommitDag {
        let mut reduced = CommitDag::new();

        for hash in &self.retained {
            if let Some(node) = self.dag.get(hash) {
                let mut node = node.clone();
                node.parents = self.work.get(hash).cloned().unwrap_or_default();
                reduced.insert(node);
            }
        }

        // history boundaries referenced by a retained commit come along so
        // the reduced view stays self-contained
        let referenced: Vec<String> = reduced
            .iter()
            .flat_map(|node| node.parents.clone())
            .filter(|parent| !reduced.contains(parent))
            .collect();
        for hash in referenced {
            if reduced.contains(&hash) {
                continue;
            }
            if let Some(node) = self.dag.get(&hash) {
                let mut node = node.clone();
                node.parents = self
                    .work
                    .get(&hash)
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|parent| self.dag.contains(parent))
                    .collect();
                reduced.insert(node);
            }
        }

        // a seed with no known ancestry still shows up in its own reduction
        if !reduced.contains(root) {
            if let Some(node) = self.dag.get(root) {
                let effective = self.work.get(root).cloned().unwrap_or_default();
                if !effective.iter().any(|parent| self.dag.contains(parent)) {
                    let mut node = node.clone();
                    node.parents = Vec::new();
                    reduced.insert(node);
                }
            }
        }

        reduced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommitNode, OutcomeState};
    use OutcomeState::{TestFail, TestSuccess};

    fn node(id: u32, hash: &str, state: OutcomeState, parents: &[&str]) -> CommitNode {
        CommitNode::new(
            id,
            hash.to_string(),
            state,
            parents.iter().map(|p| p.to_string()).collect(),
        )
    }

    fn dag(nodes: Vec<CommitNode>) -> CommitDag {
        let mut dag = CommitDag::new();
        for node in nodes {
            dag.insert(node);
        }
        dag.link_children();
        dag
    }

    #[test]
    fn test_chain_collapses_to_transition_and_boundary() {
        // a -> b -> c -> d, all green except the oldest commit d
        let dag = dag(vec![
            node(0, "a", TestSuccess, &["b"]),
            node(1, "b", TestSuccess, &["c"]),
            node(2, "c", TestSuccess, &["d"]),
            node(3, "d", TestFail, &[]),
        ]);

        let reduced = reduce(&dag, "a").unwrap();
        assert_eq!(reduced.len(), 2);
        // c is the transition commit; its run collapses onto the boundary d
        assert_eq!(reduced.get("c").unwrap().parents, vec!["d".to_string()]);
        assert!(reduced.get("d").unwrap().parents.is_empty());
        assert!(!reduced.contains("a"));
        assert!(!reduced.contains("b"));
    }

    #[test]
    fn test_transition_commit_keeps_direct_edge() {
        // the failing run sits between two green runs
        let dag = dag(vec![
            node(0, "a", TestSuccess, &["b"]),
            node(1, "b", TestFail, &["c"]),
            node(2, "c", TestFail, &["d"]),
            node(3, "d", TestSuccess, &[]),
        ]);

        let reduced = reduce(&dag, "a").unwrap();
        // a: parent flips to fail; c: parent flips back to success
        assert!(reduced.contains("a"));
        assert!(reduced.contains("c"));
        assert_eq!(reduced.get("a").unwrap().parents, vec!["c".to_string()]);
        assert_eq!(reduced.get("c").unwrap().parents, vec!["d".to_string()]);
        assert!(!reduced.contains("b"));
    }

    #[test]
    fn test_merge_commits_are_always_retained() {
        // every commit shares a state; only the merge and its branch point
        // survive, plus the boundary they reference
        let dag = dag(vec![
            node(0, "m", TestSuccess, &["x", "y"]),
            node(1, "x", TestSuccess, &["o"]),
            node(2, "y", TestSuccess, &["o"]),
            node(3, "o", TestSuccess, &[]),
        ]);

        let reduced = reduce(&dag, "m").unwrap();
        assert!(reduced.contains("m"));
        // x and y are retained: their parent o is a branch point
        assert_eq!(reduced.get("m").unwrap().parents, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(reduced.get("x").unwrap().parents, vec!["o".to_string()]);
        assert_eq!(reduced.get("y").unwrap().parents, vec!["o".to_string()]);
        assert!(reduced.get("o").unwrap().parents.is_empty());
    }

    #[test]
    fn test_merge_retained_across_state_match() {
        // same-state merge over two differing branches
        let dag = dag(vec![
            node(0, "a", TestSuccess, &["m"]),
            node(1, "m", TestSuccess, &["x", "y"]),
            node(2, "x", TestSuccess, &[]),
            node(3, "y", TestFail, &[]),
        ]);

        let reduced = reduce(&dag, "a").unwrap();
        assert!(reduced.contains("m"));
        // a is elided: its parent m shares its state and has one child
        assert!(!reduced.contains("a"));
        assert_eq!(
            reduced.get("m").unwrap().parents,
            vec!["x".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn test_long_same_state_run_between_transitions() {
        let mut nodes = vec![node(0, "fix", TestSuccess, &["r1"])];
        for i in 1..50 {
            nodes.push(node(
                i,
                &format!("r{i}"),
                TestFail,
                &[&format!("r{}", i + 1)],
            ));
        }
        nodes.push(node(50, "r50", TestSuccess, &[]));

        let reduced = reduce(&dag(nodes), "fix").unwrap();
        // fix (parent differs), r49 (parent differs), boundary r50; the
        // failing run collapses onto its retained representative r49
        assert_eq!(reduced.len(), 3);
        assert_eq!(reduced.get("fix").unwrap().parents, vec!["r49".to_string()]);
        assert_eq!(reduced.get("r49").unwrap().parents, vec!["r50".to_string()]);
        assert!(!reduced.contains("r1"));
    }

    #[test]
    fn test_reduced_nodes_keep_hash_and_state() {
        let full = dag(vec![
            node(0, "a", TestSuccess, &["b"]),
            node(1, "b", TestFail, &["c"]),
            node(2, "c", TestFail, &[]),
        ]);

        let reduced = reduce(&full, "a").unwrap();
        for node in reduced.iter() {
            let original = full.get(&node.hash).unwrap();
            assert_eq!(node.id, original.id);
            assert_eq!(node.state, original.state);
        }
    }

    #[test]
    fn test_reduced_parents_resolve_inside_reduced_graph() {
        let full = dag(vec![
            node(0, "m", TestSuccess, &["x", "y"]),
            node(1, "x", TestFail, &["o"]),
            node(2, "y", TestSuccess, &["o"]),
            node(3, "o", TestSuccess, &["p"]),
            node(4, "p", TestSuccess, &[]),
        ]);

        let reduced = reduce(&full, "m").unwrap();
        for node in reduced.iter() {
            for parent in &node.parents {
                assert!(reduced.contains(parent), "dangling parent {parent}");
            }
        }
    }

    #[test]
    fn test_broken_ancestry_is_a_boundary() {
        // b's parent was never part of the dataset
        let dag = dag(vec![
            node(0, "a", TestSuccess, &["b"]),
            node(1, "b", TestFail, &["gone"]),
        ]);

        let reduced = reduce(&dag, "a").unwrap();
        assert_eq!(reduced.get("a").unwrap().parents, vec!["b".to_string()]);
        // the unknown hash does not leak into the reduced view
        assert!(reduced.get("b").unwrap().parents.is_empty());
        assert!(!reduced.contains("gone"));
    }

    #[test]
    fn test_seed_without_parents_is_preserved() {
        let dag = dag(vec![node(0, "only", TestFail, &[])]);
        let reduced = reduce(&dag, "only").unwrap();
        assert_eq!(reduced.len(), 1);
        assert!(reduced.contains("only"));
    }

    #[test]
    fn test_seed_with_broken_ancestry_is_preserved() {
        let dag = dag(vec![node(0, "fix", TestFail, &["gone"])]);
        let reduced = reduce(&dag, "fix").unwrap();
        assert_eq!(reduced.len(), 1);
        assert!(reduced.get("fix").unwrap().parents.is_empty());
    }

    #[test]
    fn test_all_same_state_chain_reduces_to_boundary_run() {
        let dag = dag(vec![
            node(0, "a", TestSuccess, &["b"]),
            node(1, "b", TestSuccess, &["c"]),
            node(2, "c", TestSuccess, &[]),
        ]);

        // nothing transitions and nothing merges, so nothing is retained
        let reduced = reduce(&dag, "a").unwrap();
        assert!(reduced.is_empty());
    }

    #[test]
    fn test_cycle_is_a_fatal_error() {
        let dag = dag(vec![
            node(0, "a", TestSuccess, &["b"]),
            node(1, "b", TestSuccess, &["a"]),
        ]);

        assert_eq!(
            reduce(&dag, "a"),
            Err(GraphError::CycleDetected("a".to_string()))
        );
    }

    #[test]
    fn test_self_loop_is_a_fatal_error() {
        let dag = dag(vec![node(0, "a", TestSuccess, &["a"])]);
        assert!(matches!(reduce(&dag, "a"), Err(GraphError::CycleDetected(_))));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        // far deeper than any default call stack would allow
        let mut nodes = Vec::new();
        for i in 0..100_000u32 {
            nodes.push(node(
                i,
                &format!("c{i}"),
                TestSuccess,
                &[&format!("c{}", i + 1)],
            ));
        }
        nodes.push(node(100_000, "c100000", TestFail, &[]));

        let reduced = reduce(&dag(nodes), "c0").unwrap();
        assert_eq!(
            reduced.get("c99999").unwrap().parents,
            vec!["c100000".to_string()]
        );
    }

    #[test]
    fn test_unknown_root() {
        let dag = dag(vec![node(0, "a", TestSuccess, &[])]);
        assert_eq!(
            reduce(&dag, "zzz"),
            Err(GraphError::UnknownCommit("zzz".to_string()))
        );
    }

    #[test]
    fn test_merge_parent_outside_history_is_dropped_from_reduced_view() {
        let full = dag(vec![
            node(0, "m", TestSuccess, &["x", "gone"]),
            node(1, "x", TestFail, &[]),
        ]);

        let reduced = reduce(&full, "m").unwrap();
        assert_eq!(reduced.get("m").unwrap().parents, vec!["x".to_string()]);
        // the full graph still records the original edge
        assert_eq!(
            full.get("m").unwrap().parents,
            vec!["x".to_string(), "gone".to_string()]
        );
    }

    #[test]
    fn test_full_graph_is_not_mutated() {
        let full = dag(vec![
            node(0, "a", TestSuccess, &["b"]),
            node(1, "b", TestSuccess, &["c"]),
            node(2, "c", TestFail, &[]),
        ]);

        let before = full.clone();
        let _ = reduce(&full, "a").unwrap();
        for node in full.iter() {
            assert_eq!(node, before.get(&node.hash).unwrap());
        }
    }
}
