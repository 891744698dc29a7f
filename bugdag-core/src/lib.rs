pub mod dataset;
pub mod persist;
pub mod report;

pub use dataset::{Dataset, DatasetResults, RawResult};
pub use persist::{load_graph, save_graph};
pub use report::{save_records, write_records};
