//! HTTP API layer for the mini firehose.

pub mod request;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, FirehoseRegistry};
