//! Generic List-CRUD controller for the orchard administration front-end.
//!
//! One [`ListController`] per collection view, keyed by an entity schema
//! and backed by any [`verger_client::CollectionBackend`].

pub mod controller;
pub mod error;

pub use controller::{
    Availability, ControllerOptions, ListController, SubmitOutcome, TeardownHandle,
};
pub use error::{ControllerError, ControllerResult, LoadError};
