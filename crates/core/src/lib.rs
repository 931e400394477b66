//! Pure logic for the orchard administration front-end.
//!
//! Entity schemas, records, form sessions with local validation,
//! client-side filtering and pagination. Nothing in this crate performs
//! I/O, so it can back the controller, the console, or any other
//! rendering layer.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod form;
pub mod pagination;
pub mod record;
pub mod schema;
pub mod validation;
pub mod view;
