//! The per-turn decision record.

use serde::{Deserialize, Serialize};
use wayfinder_core::external::ExternalPayload;
use wayfinder_core::fact::Fact;
use wayfinder_core::profile::CompletenessProfile;
use wayfinder_core::session::{SessionId, Turn};
use wayfinder_core::strategy::{GateReport, StrategyDescriptor};
use wayfinder_core::verdict::Verdict;

/// Everything the engine decided about one utterance.
///
/// Consumed by the prompt renderer and by inspection tooling; never
/// persisted. Serializes cleanly so a decision can be dumped as JSON and
/// read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnDecision {
    pub session: SessionId,

    /// The raw utterance this decision is about.
    pub utterance: String,

    /// Transcript window that was in front of the classifiers, oldest
    /// first. Does not include the utterance itself.
    pub recent_turns: Vec<Turn>,

    /// How many transcript entries existed before this utterance.
    pub prior_turns: usize,

    pub verdict: Verdict,

    pub profile: CompletenessProfile,

    pub gate: GateReport,

    pub strategy: StrategyDescriptor,

    /// Global facts as stored after this turn's merge.
    pub global_facts: Vec<Fact>,

    /// Facts for the classified topic as stored after this turn's merge.
    pub topic_facts: Vec<Fact>,

    /// Weather payload available this turn (fetched or cache hit). Whether
    /// it may be shown is the gate's call, mirrored in `strategy`.
    pub weather: Option<ExternalPayload>,

    /// Attractions payload available this turn.
    pub attractions: Option<ExternalPayload>,
}
