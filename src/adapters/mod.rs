//! Adapters - concrete implementations of the ports.
//!
//! Postgres adapters back production persistence; the in-memory adapters
//! provide deterministic storage and event delivery for tests.

pub mod events;
pub mod memory;
pub mod postgres;
