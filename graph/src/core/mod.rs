pub mod dag;
pub mod node;
pub mod state;

pub use dag::{CommitDag, DagStats};
pub use node::CommitNode;
pub use state::{OutcomeState, RawOutcome};
