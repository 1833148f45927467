//! Persisted extraction state
//!
//! The host owns durable storage: it hands the previously persisted state in
//! with every lifecycle event and stores whatever comes back. The connector
//! only mutates the in-memory copy, field by field, as phases complete.

mod types;

pub use types::{CardsPhaseState, ExtractionState, PhaseState};
