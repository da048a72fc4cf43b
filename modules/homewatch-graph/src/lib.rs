pub mod client;
pub mod migrate;
#[cfg(feature = "test-utils")]
pub mod testutil;
pub mod writer;

pub use client::GraphClient;
pub use neo4rs::query;
pub use writer::GraphWriter;
