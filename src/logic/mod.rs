pub mod aggregate;
pub mod assemble;
pub mod project;

pub use aggregate::*;
pub use assemble::*;
pub use project::*;
