//! Composition root (spec §6), grounded on
//! `crates/autopilot/src/{main,lib,run}.rs`: a thin `main.rs` that parses
//! `Arguments` and hands off to `run::run`, which wires every crate's
//! concrete type together and serves the HTTP and metrics surfaces until
//! shutdown.

pub mod run;

pub use quote_config::Arguments;
