#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Session admission and event routing.
//!
//! The [`SessionRegistry`] is the single shared object between concurrent
//! conversations: it maps connection ids to live sessions and routes inbound
//! transport events (connect, disconnect, message, feedback) to the right
//! connector. Everything inside a session is serialized by that session's
//! own mutex; the registry's table lock is held only for insert, remove and
//! lookup.

mod error;
mod registry;

pub use error::{Error, Result};
pub use registry::{AgentBuilder, DialogueSettings, PolicyAgentBuilder, SessionRegistry};
