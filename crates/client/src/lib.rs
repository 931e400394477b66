//! REST client library for the orchard administration backend.
//!
//! Provides the [`CollectionBackend`] trait the controller is written
//! against, its HTTP implementation [`RestClient`], the API error model and
//! environment-driven client configuration.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;

pub use api::RestClient;
pub use backend::CollectionBackend;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
