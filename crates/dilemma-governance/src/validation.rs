//! Action legality under the current rules.
//!
//! Validation runs before any resolver and never consumes randomness. It
//! answers with an [`AllowReason`] or a [`BlockReason`]; both become the
//! `rule_justification` of the logged event.
//!
//! Checks in order:
//! 1. Capability -- extended kinds are unknown unless their capability is on.
//! 2. Rule switch -- `allow_steal`, `allow_attack`, `allow_proposals`, `allow_votes`.
//! 3. Balance -- steal minimum, attack cost.
//! 4. Kind-specific terms -- mutable proposal key, trade amounts, grid bounds.

use core::fmt;

use dilemma_types::{Action, ActionKind, Capabilities, Intent, keys};

use crate::rules::RuleSet;

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

/// Why an action was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowReason {
    /// WORK.
    WorkAlwaysAllowed,
    /// DO_NOTHING.
    IdleAllowed,
    /// STEAL.
    StealAllowedByRules,
    /// ATTACK.
    AttackAllowedByRules,
    /// COALITION_ATTACK.
    CoalitionAttackAllowedByRules,
    /// PROPOSE_RULE.
    ProposalAllowed,
    /// VOTE_RULE.
    VoteAllowed,
    /// REST.
    RestAllowed,
    /// MOVE.
    MoveAllowed,
    /// FORM_ALLIANCE and BREAK_ALLIANCE.
    AllianceChangeAllowed,
    /// TRADE.
    TradeAllowed,
}

impl AllowReason {
    /// The machine-readable reason string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WorkAlwaysAllowed => "work_always_allowed",
            Self::IdleAllowed => "idle_allowed",
            Self::StealAllowedByRules => "steal_allowed_by_rules",
            Self::AttackAllowedByRules => "attack_allowed_by_rules",
            Self::CoalitionAttackAllowedByRules => "coalition_attack_allowed_by_rules",
            Self::ProposalAllowed => "proposal_allowed",
            Self::VoteAllowed => "vote_allowed",
            Self::RestAllowed => "rest_allowed",
            Self::MoveAllowed => "move_allowed",
            Self::AllianceChangeAllowed => "alliance_change_allowed",
            Self::TradeAllowed => "trade_allowed",
        }
    }
}

/// Why an action was blocked.
///
/// Covers the rule checks made here plus the target and coalition checks
/// the world makes after rule validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// `allow_steal` is off.
    RuleDisallowsSteal,
    /// `allow_attack` is off.
    RuleDisallowsAttack,
    /// `allow_proposals` is off.
    RuleDisallowsProposals,
    /// `allow_votes` is off.
    RuleDisallowsVoting,
    /// Actor balance below `steal_min_token_balance`.
    InsufficientResourcesForSteal,
    /// Actor balance below `attack_cost`.
    InsufficientResourcesForAttack,
    /// Proposal key not in `mutable_keys`.
    ProposalKeyNotMutable,
    /// Negative trade amount.
    InvalidTradeTerms,
    /// Move destination off the grid.
    PositionOutOfBounds,
    /// The kind is not available in this world.
    UnknownAction,
    /// The actor targeted itself.
    SelfTargetNotAllowed,
    /// The target is dead.
    TargetNotAlive,
    /// No ally can join a coalition attack.
    NoAlliesAvailable,
}

impl BlockReason {
    /// The machine-readable reason string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuleDisallowsSteal => "rule_disallows_steal",
            Self::RuleDisallowsAttack => "rule_disallows_attack",
            Self::RuleDisallowsProposals => "rule_disallows_proposals",
            Self::RuleDisallowsVoting => "rule_disallows_voting",
            Self::InsufficientResourcesForSteal => "insufficient_resources_for_steal",
            Self::InsufficientResourcesForAttack => "insufficient_resources_for_attack",
            Self::ProposalKeyNotMutable => "proposal_key_not_mutable",
            Self::InvalidTradeTerms => "invalid_trade_terms",
            Self::PositionOutOfBounds => "position_out_of_bounds",
            Self::UnknownAction => "unknown_action",
            Self::SelfTargetNotAllowed => "self_target_not_allowed",
            Self::TargetNotAlive => "target_not_alive",
            Self::NoAlliesAvailable => "no_allies_available",
        }
    }
}

impl fmt::Display for AllowReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one action.
pub type Verdict = Result<AllowReason, BlockReason>;

// ---------------------------------------------------------------------------
// ValidationContext
// ---------------------------------------------------------------------------

/// Actor and world facts validation needs beyond the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    /// The actor's current token balance.
    pub actor_balance: i64,
    /// Mechanics enabled for this world.
    pub capabilities: Capabilities,
    /// Side length of the movement grid.
    pub grid_size: i32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl RuleSet {
    /// Capability and rule-switch gate for `kind`. Runs before anything
    /// about the action's target or payload is looked at.
    pub fn admits_kind(&self, kind: ActionKind, capabilities: Capabilities) -> Result<(), BlockReason> {
        if !capabilities.permits(kind) {
            return Err(BlockReason::UnknownAction);
        }
        let switch = match kind {
            ActionKind::Steal => Some((keys::ALLOW_STEAL, BlockReason::RuleDisallowsSteal)),
            ActionKind::Attack | ActionKind::CoalitionAttack => {
                Some((keys::ALLOW_ATTACK, BlockReason::RuleDisallowsAttack))
            }
            ActionKind::ProposeRule => Some((keys::ALLOW_PROPOSALS, BlockReason::RuleDisallowsProposals)),
            ActionKind::VoteRule => Some((keys::ALLOW_VOTES, BlockReason::RuleDisallowsVoting)),
            _ => None,
        };
        match switch {
            Some((key, block)) if !self.flag(key, true) => Err(block),
            _ => Ok(()),
        }
    }

    /// Decide whether `action` is legal for an actor in `ctx`.
    pub fn validate_action(&self, action: &Action, ctx: &ValidationContext) -> Verdict {
        self.admits_kind(action.kind(), ctx.capabilities)?;

        match &action.intent {
            Intent::Work => Ok(AllowReason::WorkAlwaysAllowed),
            Intent::DoNothing => Ok(AllowReason::IdleAllowed),
            Intent::Steal { .. } => {
                if ctx.actor_balance < self.int(keys::STEAL_MIN_TOKEN_BALANCE, 0) {
                    return Err(BlockReason::InsufficientResourcesForSteal);
                }
                Ok(AllowReason::StealAllowedByRules)
            }
            Intent::Attack { .. } => {
                if ctx.actor_balance < self.int(keys::ATTACK_COST, 0) {
                    return Err(BlockReason::InsufficientResourcesForAttack);
                }
                Ok(AllowReason::AttackAllowedByRules)
            }
            Intent::CoalitionAttack { .. } => {
                if ctx.actor_balance < self.int(keys::ATTACK_COST, 0) {
                    return Err(BlockReason::InsufficientResourcesForAttack);
                }
                Ok(AllowReason::CoalitionAttackAllowedByRules)
            }
            Intent::ProposeRule { key, .. } => {
                if !self.is_mutable(key) {
                    return Err(BlockReason::ProposalKeyNotMutable);
                }
                Ok(AllowReason::ProposalAllowed)
            }
            Intent::VoteRule { .. } => Ok(AllowReason::VoteAllowed),
            Intent::Rest => Ok(AllowReason::RestAllowed),
            Intent::Move { position } => {
                if !position.within(ctx.grid_size) {
                    return Err(BlockReason::PositionOutOfBounds);
                }
                Ok(AllowReason::MoveAllowed)
            }
            Intent::FormAlliance { .. } | Intent::BreakAlliance { .. } => {
                Ok(AllowReason::AllianceChangeAllowed)
            }
            Intent::Trade { offer, request, .. } => {
                if *offer < 0 || *request < 0 {
                    return Err(BlockReason::InvalidTradeTerms);
                }
                Ok(AllowReason::TradeAllowed)
            }
        }
    }
}
