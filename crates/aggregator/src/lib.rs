//! Aggregator Coordinator (spec §4.H): the orchestration point that ties
//! the catalog, registry, fan-out executor, normalizer, filter/sort
//! pipeline and cache together into a single `get_all_quotes` call. Grounded
//! on the teacher's `run_loop.rs::single_run_` validate → probe → fan-out →
//! normalize → respond shape.

mod coordinator;
mod validate;

pub use coordinator::{Coordinator, CoordinatorConfig};
