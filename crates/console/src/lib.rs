//! `verger` console library crate.
//!
//! Re-exports the command layer for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
