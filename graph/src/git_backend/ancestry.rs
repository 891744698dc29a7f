use anyhow::{Context, Result};
use git2::{Oid, Repository};

use crate::build::AncestrySource;

/// Parent lookup backed by a local git repository.
///
/// Every call is a fresh object lookup against the repository; the graph
/// builder performs one per commit, and callers needing more should memoize
/// outside.
pub struct GitAncestry {
    repo: Repository,
}

impl GitAncestry {
    pub fn open(repo_path: Option<&str>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }
        .context("Failed to open repository")?;

        Ok(Self { repo })
    }

    /// Parent hashes of a commit, in recorded order
    pub fn parents_of(&self, hash: &str) -> Result<Vec<String>> {
        let oid = Oid::from_str(hash).with_context(|| format!("Invalid commit hash {}", hash))?;
        let commit = self
            .repo
            .find_commit(oid)
            .with_context(|| format!("Commit {} not found", hash))?;

        Ok(commit.parent_ids().map(|oid| oid.to_string()).collect())
    }
}

impl AncestrySource for GitAncestry {
    fn parents_of(&self, hash: &str) -> Result<Vec<String>> {
        GitAncestry::parents_of(self, hash)
    }
}
