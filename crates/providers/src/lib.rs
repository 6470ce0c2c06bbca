//! Collaborator contracts and adapters.
//!
//! The reasoning core consumes abstract interfaces: a [`Reasoner`] for LLM
//! completions and one client trait per upstream service family. Concrete
//! adapters for the Ark (OpenAI-compatible) completion endpoint and the Amap
//! web-service suite live here too; nothing else in the workspace speaks
//! HTTP.

pub mod amap;
pub mod ark;
pub mod ctx;
pub mod traits;
mod util;

pub use amap::AmapClient;
pub use ark::ArkReasoner;
pub use ctx::RequestCtx;
pub use traits::{
    ChatMessage, HintsClient, NavigationClient, PoiClient, Reasoner, Role, TrafficClient,
    TravelMode, WeatherClient,
};
