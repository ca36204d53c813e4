//! The per-turn decision pipeline for Wayfinder.
//!
//! The engine owns the order of operations for a turn: classify the
//! utterance, merge extracted facts into the session, gather whatever
//! external data the verdict asks for, score completeness, gate the
//! fetched data, and select a response strategy. The result is a
//! [`TurnDecision`] that the renderer turns into a generator prompt.
//!
//! Every stage degrades rather than fails: a dead classifier falls back
//! to patterns, a dead fetcher drops its payload, a dead store loses
//! persistence for the turn. `process_turn` itself never errors.

pub mod engine;
pub mod prompt;
pub mod turn;

pub use engine::Engine;
pub use prompt::PromptRenderer;
pub use turn::TurnDecision;
