//! Relevance gating and response-strategy selection.
//!
//! Two small deciders that shape the final answer: the gate rules on
//! whether fetched external data actually helps this question, and the
//! selector maps information completeness to how assertive the answer
//! should be.

pub mod gate;
pub mod selector;

pub use gate::RelevanceGate;
pub use selector::{StrategySelector, PRIOR_TURN_ESCALATION};
