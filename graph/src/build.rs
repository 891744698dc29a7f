use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{CommitDag, CommitNode, OutcomeState, RawOutcome};

/// Yields the recorded build/test outcome for a commit, if the dataset
/// holds one.
pub trait OutcomeSource {
    /// `Ok(None)` means no result artifact exists for this commit and it is
    /// skipped. An error aborts graph construction; no partial graph is
    /// published.
    fn outcome(&self, id: u32, hash: &str) -> Result<Option<RawOutcome>>;
}

/// Resolves a commit hash to its ordered list of parent hashes.
///
/// The list may be empty and may contain the `""` no-parent sentinel, which
/// the builder filters out. Lookups may be expensive (a version-control
/// query per call); the builder performs exactly one per commit and keeps
/// no cache of its own.
pub trait AncestrySource {
    fn parents_of(&self, hash: &str) -> Result<Vec<String>>;
}

/// One row of the commit history file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u32,
    pub hash: String,
}

/// Per-commit record emitted alongside the graph, one per inserted node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: u32,
    pub commit: String,
    pub build: bool,
    pub build_test: bool,
    pub execute_test: bool,
    pub has_test_report: bool,
    pub state: OutcomeState,
    pub parents: Vec<String>,
}

impl CommitRecord {
    /// Field names, in column order
    pub const FIELDS: [&'static str; 8] = [
        "id",
        "commit",
        "build",
        "build_test",
        "execute_test",
        "has_test_report",
        "state",
        "parents",
    ];
}

/// Builds the full annotated graph from an ordered commit history
pub struct GraphBuilder<'a, O, A> {
    outcomes: &'a O,
    ancestry: &'a A,
}

impl<'a, O: OutcomeSource, A: AncestrySource> GraphBuilder<'a, O, A> {
    pub fn new(outcomes: &'a O, ancestry: &'a A) -> Self {
        Self { outcomes, ancestry }
    }

    /// Build the graph and the ordered record artifact.
    ///
    /// Commits without a result artifact are skipped silently; a malformed
    /// result aborts the build.
    pub fn build(&self, history: &[HistoryEntry]) -> Result<(CommitDag, Vec<CommitRecord>)> {
        let mut dag = CommitDag::new();
        let mut records = Vec::new();

        for entry in history {
            let raw = match self.outcomes.outcome(entry.id, &entry.hash)? {
                Some(raw) => raw,
                None => {
                    debug!(id = entry.id, hash = %entry.hash, "no result artifact, skipping");
                    continue;
                }
            };

            let state = OutcomeState::classify(&raw);
            let mut parents = self.ancestry.parents_of(&entry.hash)?;
            // "" is the no-parent sentinel some ancestry sources emit
            parents.retain(|parent| !parent.is_empty());

            records.push(CommitRecord {
                id: entry.id,
                commit: entry.hash.clone(),
                build: raw.source_build,
                build_test: raw.test_build,
                execute_test: raw.test_exec,
                has_test_report: raw.has_report,
                state,
                parents: parents.clone(),
            });
            dag.insert(CommitNode::new(entry.id, entry.hash.clone(), state, parents));
        }

        dag.link_children();
        info!(
            commits = dag.len(),
            skipped = history.len() - dag.len(),
            "commit graph built"
        );

        Ok((dag, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::collections::HashMap;

    struct MapOutcomes(HashMap<String, RawOutcome>);

    impl OutcomeSource for MapOutcomes {
        fn outcome(&self, _id: u32, hash: &str) -> Result<Option<RawOutcome>> {
            Ok(self.0.get(hash).copied())
        }
    }

    struct MapAncestry(HashMap<String, Vec<String>>);

    impl AncestrySource for MapAncestry {
        fn parents_of(&self, hash: &str) -> Result<Vec<String>> {
            Ok(self.0.get(hash).cloned().unwrap_or_default())
        }
    }

    struct BrokenOutcomes;

    impl OutcomeSource for BrokenOutcomes {
        fn outcome(&self, _id: u32, _hash: &str) -> Result<Option<RawOutcome>> {
            bail!("truncated result artifact")
        }
    }

    fn ok_outcome() -> RawOutcome {
        RawOutcome {
            source_build: true,
            test_build: true,
            test_exec: true,
            has_report: true,
        }
    }

    fn entry(id: u32, hash: &str) -> HistoryEntry {
        HistoryEntry {
            id,
            hash: hash.to_string(),
        }
    }

    #[test]
    fn test_build_skips_commits_without_results() {
        let outcomes = MapOutcomes(HashMap::from([
            ("a".to_string(), ok_outcome()),
            ("c".to_string(), ok_outcome()),
        ]));
        let ancestry = MapAncestry(HashMap::from([
            ("a".to_string(), vec!["b".to_string()]),
            ("c".to_string(), vec![]),
        ]));

        let builder = GraphBuilder::new(&outcomes, &ancestry);
        let (dag, records) = builder
            .build(&[entry(0, "a"), entry(1, "b"), entry(2, "c")])
            .unwrap();

        assert_eq!(dag.len(), 2);
        assert!(!dag.contains("b"));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].commit, "a");
        assert_eq!(records[1].commit, "c");
    }

    #[test]
    fn test_build_backfills_children() {
        let outcomes = MapOutcomes(HashMap::from([
            ("a".to_string(), ok_outcome()),
            ("b".to_string(), ok_outcome()),
        ]));
        let ancestry = MapAncestry(HashMap::from([(
            "a".to_string(),
            vec!["b".to_string()],
        )]));

        let builder = GraphBuilder::new(&outcomes, &ancestry);
        let (dag, _) = builder.build(&[entry(0, "a"), entry(1, "b")]).unwrap();

        assert_eq!(dag.get("b").unwrap().children, vec!["a".to_string()]);
        assert!(dag.get("a").unwrap().children.is_empty());
    }

    #[test]
    fn test_build_filters_sentinel_parents() {
        let outcomes = MapOutcomes(HashMap::from([("a".to_string(), ok_outcome())]));
        let ancestry = MapAncestry(HashMap::from([(
            "a".to_string(),
            vec!["".to_string(), "b".to_string(), "".to_string()],
        )]));

        let builder = GraphBuilder::new(&outcomes, &ancestry);
        let (dag, records) = builder.build(&[entry(0, "a")]).unwrap();

        assert_eq!(dag.get("a").unwrap().parents, vec!["b".to_string()]);
        assert_eq!(records[0].parents, vec!["b".to_string()]);
    }

    #[test]
    fn test_build_classifies_states() {
        let outcomes = MapOutcomes(HashMap::from([(
            "a".to_string(),
            RawOutcome {
                source_build: true,
                test_build: true,
                test_exec: false,
                has_report: true,
            },
        )]));
        let ancestry = MapAncestry(HashMap::new());

        let builder = GraphBuilder::new(&outcomes, &ancestry);
        let (dag, records) = builder.build(&[entry(7, "a")]).unwrap();

        let node = dag.get("a").unwrap();
        assert_eq!(node.id, 7);
        assert_eq!(node.state, OutcomeState::TestFail);
        assert_eq!(records[0].state, OutcomeState::TestFail);
        assert!(records[0].has_test_report);
    }

    #[test]
    fn test_build_aborts_on_malformed_result() {
        let ancestry = MapAncestry(HashMap::new());
        let builder = GraphBuilder::new(&BrokenOutcomes, &ancestry);
        assert!(builder.build(&[entry(0, "a")]).is_err());
    }
}
