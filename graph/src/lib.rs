pub mod build;
pub mod core;
pub mod error;
pub mod git_backend;
pub mod render;
pub mod walk;

pub use self::build::{AncestrySource, CommitRecord, GraphBuilder, HistoryEntry, OutcomeSource};
pub use self::core::{CommitDag, CommitNode, DagStats, OutcomeState, RawOutcome};
pub use self::error::GraphError;
pub use self::git_backend::GitAncestry;
pub use self::render::DotRenderer;
pub use self::walk::{locate, reduce, Divergence};
