//! Event log records.
//!
//! Every resolved action and every governance resolution becomes one
//! [`EventRecord`]. The `details` payload is typed per kind and flattened
//! into a single JSON object together with the actor's rank.

use serde::Serialize;

use crate::enums::Outcome;
use crate::ids::AgentId;
use crate::outcomes::{
    AllianceDetails, AttackDetails, CoalitionDetails, MoveDetails, ProposalDetails,
    ResolutionDetails, RestDetails, StealDetails, TradeDetails, VoteDetails, WorkDetails,
};

/// Action label of a passed-and-applied governance resolution.
pub const RULE_CHANGE: &str = "RULE_CHANGE";

/// Action label of any other governance resolution.
pub const RULE_VOTE_RESULT: &str = "RULE_VOTE_RESULT";

/// Kind-specific event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailBody {
    /// No kind-specific fields (blocked actions, DO_NOTHING).
    Empty {},
    /// WORK.
    Work(WorkDetails),
    /// STEAL.
    Steal(StealDetails),
    /// ATTACK.
    Attack(AttackDetails),
    /// COALITION_ATTACK.
    Coalition(CoalitionDetails),
    /// TRADE.
    Trade(TradeDetails),
    /// REST.
    Rest(RestDetails),
    /// MOVE.
    Move(MoveDetails),
    /// FORM_ALLIANCE and BREAK_ALLIANCE.
    Alliance(AllianceDetails),
    /// PROPOSE_RULE.
    Proposal(ProposalDetails),
    /// VOTE_RULE.
    Vote(VoteDetails),
    /// Governance resolution.
    Resolution(ResolutionDetails),
}

macro_rules! detail_from {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(impl From<$ty> for DetailBody {
            fn from(details: $ty) -> Self {
                Self::$variant(details)
            }
        })+
    };
}

detail_from!(
    Work(WorkDetails),
    Steal(StealDetails),
    Attack(AttackDetails),
    Coalition(CoalitionDetails),
    Trade(TradeDetails),
    Rest(RestDetails),
    Move(MoveDetails),
    Alliance(AllianceDetails),
    Proposal(ProposalDetails),
    Vote(VoteDetails),
    Resolution(ResolutionDetails),
);

/// The `details` object of an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetails {
    /// Kind-specific fields.
    #[serde(flatten)]
    pub body: DetailBody,
    /// Actor's rank at log time, present when the actor is alive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_rank: Option<u32>,
}

impl EventDetails {
    /// Details without a rank annotation.
    pub fn new(body: impl Into<DetailBody>) -> Self {
        Self {
            body: body.into(),
            actor_rank: None,
        }
    }

    /// Empty details.
    pub const fn empty() -> Self {
        Self {
            body: DetailBody::Empty {},
            actor_rank: None,
        }
    }

    /// Attach the actor's rank.
    #[must_use]
    pub const fn with_rank(mut self, rank: Option<u32>) -> Self {
        self.actor_rank = rank;
        self
    }
}

/// One immutable entry of the event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Turn the event happened in.
    pub turn: u32,
    /// The acting agent (the proposer, for resolutions).
    pub actor: AgentId,
    /// External action label (`ELIMINATE` for attacks, `RULE_CHANGE`, ...).
    pub action: String,
    /// Target agent, if any.
    pub target: Option<AgentId>,
    /// Outcome label.
    pub outcome: Outcome,
    /// Machine-readable reason the action was allowed or blocked.
    pub rule_justification: String,
    /// Kind-specific payload.
    pub details: EventDetails,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::outcomes::{StealReason, WorkDetails};

    #[test]
    fn details_flatten_body_and_rank() {
        let details = EventDetails::new(WorkDetails {
            success: true,
            gain: 3,
        })
        .with_rank(Some(2));
        let value = serde_json::to_value(details).unwrap();
        assert_eq!(value, json!({"success": true, "gain": 3, "actor_rank": 2}));
    }

    #[test]
    fn empty_details_serialize_as_empty_object() {
        let value = serde_json::to_value(EventDetails::empty()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn record_serializes_outcome_as_label() {
        let record = EventRecord {
            turn: 1,
            actor: AgentId::new(3),
            action: String::from("STEAL"),
            target: Some(AgentId::new(4)),
            outcome: Outcome::Failed,
            rule_justification: String::from("steal_allowed_by_rules"),
            details: EventDetails::new(StealDetails {
                success: false,
                reason: StealReason::Failed,
                amount: 0,
                penalty: Some(1),
            }),
        };
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value.get("outcome"), Some(&json!("failed")));
        assert_eq!(value.get("target"), Some(&json!(4)));
        assert_eq!(
            value.get("details"),
            Some(&json!({"success": false, "reason": "failed", "amount": 0, "penalty": 1}))
        );
    }
}
