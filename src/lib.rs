pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{RowSet, StoreError};
pub use logic::{
    ChangeRuleProjector, ElementProjector, OptionAggregator, ProjectionOptions, ResponseAssembler,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};
