//! Core types, configuration and the sink contract for the firehose engine.

pub mod batch;
pub mod config;
pub mod error;
pub mod limits;
pub mod record;
pub mod sink;
pub mod trigger;

pub use batch::*;
pub use config::*;
pub use error::{DeliveryError, Error, Result};
pub use record::*;
pub use sink::*;
pub use trigger::{should_flush, time_elapsed};
