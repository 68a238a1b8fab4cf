pub mod change_rule;
pub mod document;
pub mod element;
pub mod option;
pub mod record;

pub use change_rule::*;
pub use document::*;
pub use element::*;
pub use option::*;
pub use record::*;
