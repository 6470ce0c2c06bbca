//! Reasoning plan construction.
//!
//! [`ThoughtChainBuilder`] turns an utterance plus extracted context into an
//! ordered thought chain — LLM-assisted when the Reasoner cooperates, a
//! canonical rule-based chain when it does not. [`resolve_plan`] then maps
//! the chain onto the concrete upstream calls a turn needs.

pub mod chain;
pub mod parse;
pub mod plan;
pub mod prompts;

pub use chain::ThoughtChainBuilder;
pub use plan::resolve_plan;
