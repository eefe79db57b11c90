//! Configuration for the pooler controller.
//!
//! Holds the layered configuration loader and the shared configuration types used to
//! reach the pooler's administrative console and to bound the pause retry loop.

pub mod environment;
pub mod load;
pub mod shared;

pub use load::{Config, LoadConfigError, load_config, load_config_from};
