//! Concurrent data collection over rate-limited upstreams.
//!
//! [`RateLimiter`] enforces per-provider call discipline, [`ServiceRouter`]
//! maps one planned spec onto the right client, and [`DataCollector`] fans a
//! whole plan out with dedup, per-spec timeouts, failure isolation, and
//! cooperative cancellation.

pub mod collector;
pub mod limiter;
pub mod router;

pub use collector::DataCollector;
pub use limiter::RateLimiter;
pub use router::ServiceRouter;
