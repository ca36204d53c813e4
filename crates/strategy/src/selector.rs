//! The adaptive strategy selector.
//!
//! A fixed decision table over (completeness tier, permitted external data,
//! prior turn count). The escalation row exists because a conversation
//! stuck at minimal information means the questions aren't working;
//! re-asking a sixth time helps nobody.

use tracing::debug;
use wayfinder_core::profile::CompletenessTier;
use wayfinder_core::strategy::{
    ExternalUse, GateReport, ResponseDepth, StrategyDescriptor, StrategyKind,
};

/// With minimal information, after this many prior turns the assistant
/// stops interrogating and starts recommending anyway.
pub const PRIOR_TURN_ESCALATION: usize = 4;

pub struct StrategySelector;

impl StrategySelector {
    pub fn new() -> Self {
        Self
    }

    /// Pick the strategy for one turn. `prior_turns` counts turns recorded
    /// before this utterance.
    pub fn select(
        &self,
        tier: CompletenessTier,
        gate: &GateReport,
        prior_turns: usize,
    ) -> StrategyDescriptor {
        let use_external = ExternalUse {
            weather: gate.weather_allowed(),
            attractions: gate.attractions_allowed(),
        };

        // First matching row wins, top to bottom.
        let kind = match tier {
            CompletenessTier::Minimal if prior_turns <= PRIOR_TURN_ESCALATION => {
                StrategyKind::QuestionFocused
            }
            CompletenessTier::Minimal => StrategyKind::Hybrid,
            CompletenessTier::Partial if gate.allowed_count() == 0 => StrategyKind::Hybrid,
            CompletenessTier::Partial => StrategyKind::HybridWithExternal,
            CompletenessTier::Sufficient => StrategyKind::RecommendationFocused,
            CompletenessTier::Complete => StrategyKind::Detailed,
        };

        let ask_questions = matches!(
            kind,
            StrategyKind::QuestionFocused | StrategyKind::Hybrid | StrategyKind::HybridWithExternal
        );

        let target_depth = match kind {
            StrategyKind::QuestionFocused => ResponseDepth::Brief,
            StrategyKind::Hybrid | StrategyKind::HybridWithExternal => ResponseDepth::Balanced,
            StrategyKind::RecommendationFocused => ResponseDepth::Detailed,
            StrategyKind::Detailed => ResponseDepth::Exhaustive,
        };

        debug!(tier = %tier, strategy = %kind, prior_turns, "Strategy selected");

        StrategyDescriptor {
            kind,
            ask_questions,
            target_depth,
            use_external,
        }
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new()
    }
}
