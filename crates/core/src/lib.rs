//! Core logic of the agent: tool declarations, function tool execution,
//! registration on the service and the turn loop.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod config;
mod error;
mod response;
pub mod tool;

pub use agent::{Agent, AgentBuilder, DEFAULT_MAX_STEPS};
pub use config::{AgentConfig, AgentPayload, ToolPayload};
pub use error::Error;
pub use response::RunResponse;
