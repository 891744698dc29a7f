pub mod locate;
pub mod reduce;

pub use locate::{locate, Divergence};
pub use reduce::reduce;
