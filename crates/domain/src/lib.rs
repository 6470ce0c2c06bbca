//! Shared data model for the tripweaver reasoning core.
//!
//! Everything the pipeline crates exchange lives here: utterances, extracted
//! context, thought chains, service call plans, typed upstream payloads, turn
//! records, and the error taxonomy. This crate is deliberately free of I/O.

pub mod config;
pub mod context;
pub mod error;
pub mod extracted;
pub mod payload;
pub mod plan;
pub mod result;
pub mod thought;
pub mod turn;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use thought::{ServiceKind, Thought};
