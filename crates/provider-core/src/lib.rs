//! The provider adapter contract (spec §4.B): a uniform interface every
//! provider implements, a tagged `RawResult` instead of exceptions-as-
//! control-flow, and a deadline type the fan-out executor and the adapter
//! both observe.

pub mod context;
pub mod deadline;
pub mod raw;

pub use context::AdapterContext;
pub use deadline::Deadline;
pub use raw::{DeliveryTime, RawError, RawResult};

use async_trait::async_trait;
use quote_model::QuoteRequest;

/// Provider-specific code implementing the §4.B contract. Adapters must
/// never panic or throw past this boundary — every failure mode becomes a
/// `RawResult` carrying a typed `error_kind` (Design Notes §9: "exceptions
/// as control flow").
///
/// Adapters depend only on an [`AdapterContext`], never on the registry or
/// coordinator, breaking the cyclic reference Design Notes §9 calls out.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier, used as the registry key and the cache/error map
    /// key.
    fn id(&self) -> &str;

    /// Human-readable name for the `/api/providers` surface.
    fn display_name(&self) -> &str;

    /// Corridors this adapter is statically known to support. `None` means
    /// the adapter must detect unsupported corridors inline during
    /// `quote()` and return `UnsupportedCorridor` itself.
    fn supported_corridors(&self) -> Option<Vec<(String, String)>> {
        None
    }

    /// Produce a quote for `request`, honoring `deadline`. May perform
    /// multiple underlying HTTP calls provided all complete before the
    /// deadline (spec §4.B: session bootstrap, token extraction, preflight,
    /// pricing).
    async fn quote(&self, request: &QuoteRequest, deadline: Deadline) -> RawResult;
}
