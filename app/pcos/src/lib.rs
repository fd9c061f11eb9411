//! Web form and command-line front end for the PCOS classifier.
//!
//! The binary in `main.rs` wires these modules together; integration tests
//! build the router directly with [`server::router`].

pub mod commands;
pub mod config;
pub mod error;
pub mod server;
pub mod sessions;

pub use error::AppError;
