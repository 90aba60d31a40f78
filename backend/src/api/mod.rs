pub mod archive;
pub mod compare;

pub use archive::*;
pub use compare::*;
