//! Wire-level types for a managed agent service.
//!
//! This crate establishes the protocol between the agent and the remote
//! service that hosts it: endpoints, tool registrations, sessions and
//! chat turns. Types here mirror the JSON payloads of the service and
//! don't define any behavior, the [`AgentService`] trait is the only
//! seam implementors have to fill in.
//!
//! The HTTP implementation lives in its own crate, so do fakes used for
//! testing.

#![deny(missing_docs)]

mod agent;
mod chat;
mod error;
mod service;
mod tool;

pub use agent::*;
pub use chat::*;
pub use error::*;
pub use service::*;
pub use tool::*;
