//! A tax auditor assistant running on OCI Generative AI Agents.
//!
//! The crate wires the pieces together: it loads the settings, declares a
//! SQL tool over the flight data and a RAG tool over the policy knowledge
//! bases, and drives the conversation turns. The `taxagent` binary is a
//! thin CLI over this library.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod driver;
mod error;
pub mod presets;
pub mod settings;
pub mod tools;

pub use error::Error;

/// Re-exports of [`taxagent_core`] crate.
pub mod core {
    pub use taxagent_core::*;
}
