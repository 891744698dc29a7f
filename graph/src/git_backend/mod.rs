pub mod ancestry;

pub use ancestry::GitAncestry;
