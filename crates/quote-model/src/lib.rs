//! Canonical data types shared by every crate in the aggregator: the
//! request/response shapes described in the corridor quote specification,
//! plus the small closed enums (§6) that every provider adapter normalizes
//! into.

pub mod error;
pub mod quote;
pub mod request;
pub mod result;
pub mod tokens;

pub use error::ErrorKind;
pub use quote::Quote;
pub use request::{QuoteRequest, QuoteRequestOptions, SortBy};
pub use result::{AggregateResult, FiltersApplied, ProviderError, RequestEcho};
pub use tokens::{DeliveryMethod, PaymentMethod};
