pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod store;
pub mod transform;

pub use pipeline::{Envelope, IngestReport, Pipeline};
