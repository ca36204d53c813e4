//! Text-generation backends for Wayfinder.
//!
//! All backends implement the `wayfinder_core::Generator` trait. The rest
//! of the system never knows which model answered.

pub mod gemini;

pub use gemini::GeminiGenerator;
