//! Query classification for Wayfinder.
//!
//! Every utterance is seen by two classifiers: a generative one that
//! prompts the model for a strict-JSON verdict, and a deterministic
//! keyword matcher that can never fail. The combiner reconciles the two
//! into a single authoritative [`wayfinder_core::Verdict`].

pub mod combiner;
pub mod generative;
pub mod patterns;

pub use combiner::{combine, AGREEMENT_BONUS, PRIMARY_WEIGHT, SECONDARY_WEIGHT};
pub use generative::{GenerativeClassifier, NullClassifier};
pub use patterns::PatternClassifier;
