//! Actions agents submit each turn.
//!
//! [`Action`] is a closed tagged type: each [`Intent`] variant carries only
//! the fields its kind needs, so a steal without a target or a vote of
//! `"maybe"` cannot be constructed. Strategies living outside the engine
//! speak the duck-typed [`RawAction`] form instead; converting it with
//! [`Action::try_from`] performs the construction-time checks and reports
//! the machine-readable reason as an [`ActionRejection`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capabilities::Position;
use crate::enums::{ActionKind, Ballot};
use crate::ids::AgentId;
use crate::rules::RuleValue;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// What an agent wants to do, with exactly the data that kind requires.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Earn income.
    Work,
    /// Pass the turn.
    DoNothing,
    /// Recover health.
    Rest,
    /// Take tokens from `target`.
    Steal {
        /// The victim.
        target: AgentId,
    },
    /// Attack `target`.
    Attack {
        /// The victim.
        target: AgentId,
    },
    /// Attack `target` together with every able ally.
    CoalitionAttack {
        /// The victim.
        target: AgentId,
    },
    /// Ally with `partner`.
    FormAlliance {
        /// The other party.
        partner: AgentId,
    },
    /// Dissolve the alliance with `partner`.
    BreakAlliance {
        /// The other party.
        partner: AgentId,
    },
    /// Give `offer` tokens to `partner` in exchange for `request` tokens.
    Trade {
        /// The other party.
        partner: AgentId,
        /// Tokens the actor gives.
        offer: i64,
        /// Tokens the actor receives.
        request: i64,
    },
    /// Move to `position`.
    Move {
        /// Destination cell.
        position: Position,
    },
    /// Propose setting rule `key` to `value`.
    ProposeRule {
        /// The rule key to change.
        key: String,
        /// The proposed new value.
        value: RuleValue,
    },
    /// Vote on the pending proposal.
    VoteRule {
        /// Yes or no.
        ballot: Ballot,
    },
}

impl Intent {
    /// The action kind of this intent.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Work => ActionKind::Work,
            Self::DoNothing => ActionKind::DoNothing,
            Self::Rest => ActionKind::Rest,
            Self::Steal { .. } => ActionKind::Steal,
            Self::Attack { .. } => ActionKind::Attack,
            Self::CoalitionAttack { .. } => ActionKind::CoalitionAttack,
            Self::FormAlliance { .. } => ActionKind::FormAlliance,
            Self::BreakAlliance { .. } => ActionKind::BreakAlliance,
            Self::Trade { .. } => ActionKind::Trade,
            Self::Move { .. } => ActionKind::Move,
            Self::ProposeRule { .. } => ActionKind::ProposeRule,
            Self::VoteRule { .. } => ActionKind::VoteRule,
        }
    }

    /// The other agent this intent is aimed at, if any.
    pub const fn target(&self) -> Option<AgentId> {
        match self {
            Self::Steal { target } | Self::Attack { target } | Self::CoalitionAttack { target } => {
                Some(*target)
            }
            Self::FormAlliance { partner }
            | Self::BreakAlliance { partner }
            | Self::Trade { partner, .. } => Some(*partner),
            Self::Work
            | Self::DoNothing
            | Self::Rest
            | Self::Move { .. }
            | Self::ProposeRule { .. }
            | Self::VoteRule { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// An immutable decision by `actor` for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// The agent acting.
    pub actor: AgentId,
    /// What it wants to do.
    pub intent: Intent,
}

impl Action {
    /// Build an action from its parts.
    pub const fn new(actor: AgentId, intent: Intent) -> Self {
        Self { actor, intent }
    }

    /// WORK.
    pub const fn work(actor: AgentId) -> Self {
        Self::new(actor, Intent::Work)
    }

    /// DO_NOTHING.
    pub const fn idle(actor: AgentId) -> Self {
        Self::new(actor, Intent::DoNothing)
    }

    /// STEAL from `target`.
    pub const fn steal(actor: AgentId, target: AgentId) -> Self {
        Self::new(actor, Intent::Steal { target })
    }

    /// ATTACK `target`.
    pub const fn attack(actor: AgentId, target: AgentId) -> Self {
        Self::new(actor, Intent::Attack { target })
    }

    /// PROPOSE_RULE setting `key` to `value`.
    pub fn propose(actor: AgentId, key: &str, value: impl Into<RuleValue>) -> Self {
        Self::new(
            actor,
            Intent::ProposeRule {
                key: key.to_owned(),
                value: value.into(),
            },
        )
    }

    /// VOTE_RULE with `ballot`.
    pub const fn vote(actor: AgentId, ballot: Ballot) -> Self {
        Self::new(actor, Intent::VoteRule { ballot })
    }

    /// The action kind.
    pub const fn kind(&self) -> ActionKind {
        self.intent.kind()
    }

    /// The target agent, if the kind has one.
    pub const fn target(&self) -> Option<AgentId> {
        self.intent.target()
    }
}

// ---------------------------------------------------------------------------
// RawAction
// ---------------------------------------------------------------------------

/// The duck-typed action shape accepted at the strategy boundary:
/// `{actor, kind, target, payload}` with a free-form payload map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    /// The agent acting.
    pub actor: AgentId,
    /// The action kind label, e.g. `"STEAL"`.
    pub kind: String,
    /// Target agent for targeted kinds.
    #[serde(default)]
    pub target: Option<AgentId>,
    /// Kind-specific fields: `{key, value}`, `{vote}`, `{offer, request}`, `{position}`.
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl RawAction {
    /// A raw action with an empty payload.
    pub fn new(actor: AgentId, kind: &str, target: Option<AgentId>) -> Self {
        Self {
            actor,
            kind: kind.to_owned(),
            target,
            payload: Map::new(),
        }
    }

    /// Add one payload field.
    #[must_use]
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.payload.insert(field.to_owned(), value);
        self
    }
}

// ---------------------------------------------------------------------------
// ActionRejection
// ---------------------------------------------------------------------------

/// Why a raw action could not become an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The kind label is not a known action kind.
    UnknownAction,
    /// STEAL without a target.
    StealRequiresTarget,
    /// ATTACK without a target.
    AttackRequiresTarget,
    /// Another targeted kind without a target.
    TargetRequired,
    /// PROPOSE_RULE without a usable `{key, value}` payload.
    ProposalPayloadRequired,
    /// VOTE_RULE whose vote is not exactly `"yes"` or `"no"`.
    VoteMustBeYesOrNo,
    /// TRADE whose amounts are not integers.
    InvalidTradeTerms,
    /// MOVE whose position is not an `[x, y]` integer pair.
    InvalidPosition,
}

impl RejectReason {
    /// The machine-readable reason string written to the log.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownAction => "unknown_action",
            Self::StealRequiresTarget => "steal_requires_target",
            Self::AttackRequiresTarget => "attack_requires_target",
            Self::TargetRequired => "target_required",
            Self::ProposalPayloadRequired => "proposal_payload_required",
            Self::VoteMustBeYesOrNo => "vote_must_be_yes_or_no",
            Self::InvalidTradeTerms => "invalid_trade_terms",
            Self::InvalidPosition => "invalid_position",
        }
    }
}

/// A raw action refused at construction time. The World logs it as
/// `blocked` under the raw kind label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRejection {
    /// The agent that submitted the action.
    pub actor: AgentId,
    /// The parsed kind, when the label was recognized.
    pub kind: Option<ActionKind>,
    /// The kind label exactly as submitted.
    pub label: String,
    /// The submitted target, if any.
    pub target: Option<AgentId>,
    /// Why the action was refused.
    pub reason: RejectReason,
}

impl TryFrom<RawAction> for Action {
    type Error = ActionRejection;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let reject = |kind: Option<ActionKind>, reason: RejectReason| ActionRejection {
            actor: raw.actor,
            kind,
            label: raw.kind.clone(),
            target: raw.target,
            reason,
        };

        let Ok(kind) = raw.kind.parse::<ActionKind>() else {
            return Err(reject(None, RejectReason::UnknownAction));
        };

        let target = match (kind.is_targeted(), raw.target) {
            (true, Some(target)) => Some(target),
            (true, None) => {
                let reason = match kind {
                    ActionKind::Steal => RejectReason::StealRequiresTarget,
                    ActionKind::Attack => RejectReason::AttackRequiresTarget,
                    _ => RejectReason::TargetRequired,
                };
                return Err(reject(Some(kind), reason));
            }
            (false, _) => None,
        };

        let intent = match (kind, target) {
            (ActionKind::Work, _) => Intent::Work,
            (ActionKind::DoNothing, _) => Intent::DoNothing,
            (ActionKind::Rest, _) => Intent::Rest,
            (ActionKind::Steal, Some(target)) => Intent::Steal { target },
            (ActionKind::Attack, Some(target)) => Intent::Attack { target },
            (ActionKind::CoalitionAttack, Some(target)) => Intent::CoalitionAttack { target },
            (ActionKind::FormAlliance, Some(partner)) => Intent::FormAlliance { partner },
            (ActionKind::BreakAlliance, Some(partner)) => Intent::BreakAlliance { partner },
            (ActionKind::Trade, Some(partner)) => {
                let offer = amount_field(&raw.payload, "offer");
                let request = amount_field(&raw.payload, "request");
                match (offer, request) {
                    (Some(offer), Some(request)) => Intent::Trade {
                        partner,
                        offer,
                        request,
                    },
                    _ => return Err(reject(Some(kind), RejectReason::InvalidTradeTerms)),
                }
            }
            (ActionKind::Move, _) => match position_field(&raw.payload) {
                Some(position) => Intent::Move { position },
                None => return Err(reject(Some(kind), RejectReason::InvalidPosition)),
            },
            (ActionKind::ProposeRule, _) => {
                let key = raw.payload.get("key").and_then(Value::as_str);
                let value = raw
                    .payload
                    .get("value")
                    .and_then(|v| serde_json::from_value::<RuleValue>(v.clone()).ok());
                match (key, value) {
                    (Some(key), Some(value)) => Intent::ProposeRule {
                        key: key.to_owned(),
                        value,
                    },
                    _ => return Err(reject(Some(kind), RejectReason::ProposalPayloadRequired)),
                }
            }
            (ActionKind::VoteRule, _) => {
                let ballot = raw
                    .payload
                    .get("vote")
                    .and_then(Value::as_str)
                    .and_then(|v| v.parse::<Ballot>().ok());
                match ballot {
                    Some(ballot) => Intent::VoteRule { ballot },
                    None => return Err(reject(Some(kind), RejectReason::VoteMustBeYesOrNo)),
                }
            }
            // Targeted kinds without a target returned above.
            (_, None) => return Err(reject(Some(kind), RejectReason::TargetRequired)),
        };

        Ok(Self::new(raw.actor, intent))
    }
}

/// A trade amount; absent means zero.
fn amount_field(payload: &Map<String, Value>, field: &str) -> Option<i64> {
    payload.get(field).map_or(Some(0), Value::as_i64)
}

/// A `[x, y]` position; absent means the origin.
fn position_field(payload: &Map<String, Value>) -> Option<Position> {
    let Some(value) = payload.get("position") else {
        return Some(Position::default());
    };
    let coords = value.as_array()?;
    let x = coords.first().and_then(Value::as_i64)?;
    let y = coords.get(1).and_then(Value::as_i64)?;
    if coords.len() != 2 {
        return None;
    }
    Some(Position(i32::try_from(x).ok()?, i32::try_from(y).ok()?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn actor() -> AgentId {
        AgentId::new(1)
    }

    // -----------------------------------------------------------------------
    // Accepted shapes
    // -----------------------------------------------------------------------

    #[test]
    fn raw_steal_with_target_converts() {
        let raw = RawAction::new(actor(), "STEAL", Some(AgentId::new(4)));
        let action = Action::try_from(raw).unwrap();
        assert_eq!(action, Action::steal(actor(), AgentId::new(4)));
    }

    #[test]
    fn raw_proposal_parses_typed_value() {
        let raw = RawAction::new(actor(), "PROPOSE_RULE", None)
            .with("key", json!("work_income"))
            .with("value", json!([3, 5]));
        let action = Action::try_from(raw).unwrap();
        assert_eq!(action.intent, Intent::ProposeRule {
            key: String::from("work_income"),
            value: RuleValue::Pair([3, 5]),
        });
    }

    #[test]
    fn raw_trade_defaults_missing_amounts_to_zero() {
        let raw = RawAction::new(actor(), "TRADE", Some(AgentId::new(2))).with("offer", json!(4));
        let action = Action::try_from(raw).unwrap();
        assert_eq!(action.intent, Intent::Trade {
            partner: AgentId::new(2),
            offer: 4,
            request: 0,
        });
    }

    #[test]
    fn raw_move_reads_pair() {
        let raw = RawAction::new(actor(), "MOVE", None).with("position", json!([3, 7]));
        let action = Action::try_from(raw).unwrap();
        assert_eq!(action.intent, Intent::Move { position: Position(3, 7) });
    }

    // -----------------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Action::try_from(RawAction::new(actor(), "BRIBE", None)).unwrap_err();
        assert_eq!(err.reason.as_str(), "unknown_action");
        assert_eq!(err.kind, None);
        assert_eq!(err.label, "BRIBE");
    }

    #[test]
    fn targetless_steal_and_attack_have_specific_reasons() {
        let steal = Action::try_from(RawAction::new(actor(), "STEAL", None)).unwrap_err();
        assert_eq!(steal.reason, RejectReason::StealRequiresTarget);
        let attack = Action::try_from(RawAction::new(actor(), "ATTACK", None)).unwrap_err();
        assert_eq!(attack.reason, RejectReason::AttackRequiresTarget);
        let trade = Action::try_from(RawAction::new(actor(), "TRADE", None)).unwrap_err();
        assert_eq!(trade.reason, RejectReason::TargetRequired);
    }

    #[test]
    fn malformed_vote_is_rejected() {
        let raw = RawAction::new(actor(), "VOTE_RULE", None).with("vote", json!("maybe"));
        let err = Action::try_from(raw).unwrap_err();
        assert_eq!(err.reason.as_str(), "vote_must_be_yes_or_no");
        assert_eq!(err.kind, Some(ActionKind::VoteRule));
    }

    #[test]
    fn empty_proposal_payload_is_rejected() {
        let err = Action::try_from(RawAction::new(actor(), "PROPOSE_RULE", None)).unwrap_err();
        assert_eq!(err.reason, RejectReason::ProposalPayloadRequired);
    }

    #[test]
    fn fractional_trade_amount_is_rejected() {
        let raw = RawAction::new(actor(), "TRADE", Some(AgentId::new(2))).with("offer", json!(1.5));
        let err = Action::try_from(raw).unwrap_err();
        assert_eq!(err.reason, RejectReason::InvalidTradeTerms);
    }

    #[test]
    fn three_coordinate_position_is_rejected() {
        let raw = RawAction::new(actor(), "MOVE", None).with("position", json!([1, 2, 3]));
        let err = Action::try_from(raw).unwrap_err();
        assert_eq!(err.reason, RejectReason::InvalidPosition);
    }
}
