//! The tripweaver agent: one entry point over the whole reasoning core.
//!
//! [`TravelAgent::handle`] runs the full turn pipeline — extraction, thought
//! chain, plan resolution, rate-limited collection, composition — and
//! maintains per-user session state across turns.

mod agent;

pub use agent::{HandleOptions, HandleResponse, TravelAgent};
