//! Outcome records produced by the resolvers and the governance system.
//!
//! Each record doubles as the `details` payload of the event it produces,
//! so field names here are the field names in the event log.

use serde::Serialize;

use crate::capabilities::Position;
use crate::ids::{AgentId, ProposalId};
use crate::observation::Proposal;

/// Declares a reason enum serialized in snake case, with `as_str`.
macro_rules! reason_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// The machine-readable reason string.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

reason_enum! {
    /// How a steal ended.
    StealReason {
        /// The target held nothing; no draw was made.
        TargetHasNoResources => "target_has_no_resources",
        /// Tokens were taken, then the thief was caught and fined.
        CaughtAfterSuccess => "caught_after_success",
        /// Tokens were taken without consequence.
        CleanSuccess => "clean_success",
        /// The attempt failed and the thief paid the fail penalty.
        Failed => "failed",
    }
}

reason_enum! {
    /// How an attack or coalition attack ended.
    AttackReason {
        /// The target died and was looted.
        TargetEliminated => "target_eliminated",
        /// The target lost health but survived.
        TargetWounded => "target_wounded",
        /// The attack missed and the attackers paid recoil.
        AttackFailed => "attack_failed",
    }
}

reason_enum! {
    /// How a trade ended.
    TradeReason {
        /// Both transfers happened.
        TradeCompleted => "trade_completed",
        /// The actor could not cover its offer.
        ActorInsufficientBalance => "actor_insufficient_balance",
        /// The partner could not cover the request.
        PartnerInsufficientBalance => "partner_insufficient_balance",
    }
}

reason_enum! {
    /// How an alliance action ended.
    AllianceReason {
        /// A new alliance is active.
        AllianceFormed => "alliance_formed",
        /// The pair was already allied.
        AlreadyAllied => "already_allied",
        /// The active alliance was dissolved.
        AllianceBroken => "alliance_broken",
        /// There was no active alliance to dissolve.
        NoAllianceFound => "no_alliance_found",
    }
}

reason_enum! {
    /// Result of opening a proposal.
    ProposeReason {
        /// The proposal is now pending.
        ProposalRegistered => "proposal_registered",
        /// Another proposal is still pending.
        ProposalAlreadyPending => "proposal_already_pending",
    }
}

reason_enum! {
    /// Result of casting a vote.
    VoteReason {
        /// The ballot was recorded (overwriting any earlier one).
        VoteRecorded => "vote_recorded",
        /// There is nothing to vote on.
        NoPendingProposal => "no_pending_proposal",
    }
}

// ---------------------------------------------------------------------------
// Resolver records
// ---------------------------------------------------------------------------

/// Result of WORK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkDetails {
    /// Always `true`.
    pub success: bool,
    /// Tokens earned.
    pub gain: i64,
}

/// Result of STEAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StealDetails {
    /// Whether tokens changed hands.
    pub success: bool,
    /// How the attempt ended.
    pub reason: StealReason,
    /// Tokens moved from target to actor.
    pub amount: i64,
    /// Tokens the actor paid as catch or fail penalty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<i64>,
}

/// Result of ATTACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackDetails {
    /// Whether the attack landed.
    pub success: bool,
    /// How the attack ended.
    pub reason: AttackReason,
    /// Tokens the attacker paid up front.
    pub cost: i64,
    /// Tokens looted on elimination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot: Option<i64>,
    /// Recoil paid on a miss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<i64>,
    /// Health removed, in health mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<i64>,
    /// Target health after the hit, in health mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_health: Option<i64>,
}

/// Result of COALITION_ATTACK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoalitionDetails {
    /// Whether the attack landed.
    pub success: bool,
    /// How the attack ended.
    pub reason: AttackReason,
    /// Initiator first, then allies in ascending id order.
    pub participants: Vec<AgentId>,
    /// Number of participants.
    pub coalition_size: u32,
    /// Tokens looted in total on elimination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot: Option<i64>,
    /// Tokens each participant received on elimination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot_per_actor: Option<i64>,
    /// Recoil paid across all participants on a miss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<i64>,
    /// Health removed, in health mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<i64>,
    /// Target health after the hit, in health mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_health: Option<i64>,
}

/// Result of TRADE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeDetails {
    /// Whether both transfers happened.
    pub success: bool,
    /// How the trade ended.
    pub reason: TradeReason,
    /// Tokens the actor gave.
    pub actor_gave: i64,
    /// Tokens the actor received.
    pub actor_received: i64,
}

/// Result of REST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestDetails {
    /// Always `true`.
    pub success: bool,
    /// Health actually restored.
    pub heal: i64,
    /// Health after resting.
    pub new_health: i64,
}

/// Result of MOVE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveDetails {
    /// Always `true`.
    pub success: bool,
    /// Cell before the move.
    pub from: Position,
    /// Cell after the move.
    pub to: Position,
}

/// Result of FORM_ALLIANCE or BREAK_ALLIANCE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllianceDetails {
    /// Whether the alliance registry changed.
    pub success: bool,
    /// What happened.
    pub reason: AllianceReason,
    /// The other party.
    pub partner: AgentId,
    /// Mean trust of the pair at formation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_level: Option<f64>,
    /// Combined strength of the pair at formation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<i64>,
}

// ---------------------------------------------------------------------------
// Governance records
// ---------------------------------------------------------------------------

/// Details of a PROPOSE_RULE event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProposalDetails {
    /// Governance verdict on the proposal.
    pub proposal_reason: ProposeReason,
    /// Id of the newly opened proposal, if it was registered.
    pub proposal_id: Option<ProposalId>,
}

/// Details of a VOTE_RULE event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteDetails {
    /// Governance verdict on the ballot.
    pub vote_reason: VoteReason,
}

/// Details of a proposal resolution event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionDetails {
    /// The proposal that resolved.
    pub proposal: Proposal,
    /// Rule table version after resolution.
    pub rules_version: u64,
    /// Token weight voting yes.
    pub yes_weight: i64,
    /// Token weight voting no.
    pub no_weight: i64,
    /// Tokens held by all alive agents.
    pub total_supply: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reason_labels_serialize_in_snake_case() {
        let json = serde_json::to_string(&StealReason::TargetHasNoResources).unwrap();
        assert_eq!(json, "\"target_has_no_resources\"");
        assert_eq!(AttackReason::TargetEliminated.as_str(), "target_eliminated");
        assert_eq!(VoteReason::NoPendingProposal.to_string(), "no_pending_proposal");
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let details = StealDetails {
            success: true,
            reason: StealReason::CleanSuccess,
            amount: 3,
            penalty: None,
        };
        let value = serde_json::to_value(details).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": true, "reason": "clean_success", "amount": 3})
        );
    }

    #[test]
    fn move_positions_serialize_as_pairs() {
        let details = MoveDetails {
            success: true,
            from: Position(0, 0),
            to: Position(2, 5),
        };
        let value = serde_json::to_value(details).unwrap();
        assert_eq!(value.get("to"), Some(&serde_json::json!([2, 5])));
    }
}
