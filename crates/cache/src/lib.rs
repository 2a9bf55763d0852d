//! Cache layer (spec §4.G): a TTL+jitter store for aggregate quote results,
//! per-corridor support, and per-provider metadata, plus the single-flight
//! de-duplication that keeps concurrent requests for the same key from
//! stampeding the fan-out executor.

pub mod key;
pub mod single_flight;
pub mod store;
pub mod ttl;

pub use single_flight::SingleFlight;
pub use store::{InMemoryCache, QuoteCache};
pub use ttl::TtlPolicy;
