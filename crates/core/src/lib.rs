//! # Wayfinder Core
//!
//! Domain types, traits, and error definitions for the Wayfinder travel
//! assistant. This crate has **zero framework dependencies**: it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)
//!
//! The engine degrades instead of failing: classifier errors fall back to
//! the pattern verdict, fetch errors drop the payload for the turn, store
//! errors lose at most one turn's facts. Nothing here is fatal.

pub mod classify;
pub mod error;
pub mod external;
pub mod fact;
pub mod generate;
pub mod profile;
pub mod session;
pub mod store;
pub mod strategy;
pub mod topic;
pub mod verdict;

// Re-export key types at crate root for ergonomics
pub use classify::Classifier;
pub use error::{ClassifierError, Error, FetchError, GeneratorError, Result, StoreError};
pub use external::{
    Attraction, AttractionsReport, AttractionsSource, CurrentConditions, ExternalPayload,
    ExternalReport, ForecastEntry, PayloadCache, WeatherReport, WeatherSource,
};
pub use fact::{Fact, FactExtractor, FactSet};
pub use generate::{GenerateRequest, Generator};
pub use profile::{CompletenessProfile, CompletenessTier, InfoCategory};
pub use session::{SessionId, Turn, TurnRole};
pub use store::{ContextStore, SessionStore, TranscriptStore};
pub use strategy::{
    ExternalUse, GateReport, GateVerdict, ResponseDepth, StrategyDescriptor, StrategyKind,
};
pub use topic::{Scope, Topic};
pub use verdict::{ExternalDataKind, PatternVerdict, PrimaryVerdict, Verdict, VerdictSource};
