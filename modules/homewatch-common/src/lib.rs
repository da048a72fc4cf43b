pub mod config;
pub mod error;
pub mod stores;
pub mod topic;
pub mod types;
pub mod validate;

pub use config::Config;
pub use error::{StoreError, TransportError, ValidationError};
pub use stores::{DocumentStore, GraphStore, RelationalStore};
pub use topic::{property_id, route, subscription_filter, TopicInfo};
pub use types::*;
pub use validate::validate;
