//! Enumeration types for the Cheater's Dilemma turn engine.
//!
//! Action kinds, ballots, and the outcome labels written to the event log.
//! Wire labels are the upper-case names agents and observers already know
//! (`WORK`, `STEAL`, ...); outcome labels are lower snake case.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// Every kind of action an agent can choose on its turn.
///
/// The first six kinds form the base action set. The remaining six are
/// only legal when the matching capability is enabled at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// Earn a random income from the `work_income` rule.
    Work,
    /// Try to take tokens from another agent.
    Steal,
    /// Try to eliminate (or wound) another agent.
    Attack,
    /// Open a governance proposal to change one rule.
    ProposeRule,
    /// Vote on the pending proposal.
    VoteRule,
    /// Pass the turn.
    DoNothing,
    /// Form an alliance with another agent.
    FormAlliance,
    /// Dissolve an active alliance.
    BreakAlliance,
    /// Swap tokens with another agent.
    Trade,
    /// Move to a grid position.
    Move,
    /// Recover health.
    Rest,
    /// Attack together with every able ally.
    CoalitionAttack,
}

impl ActionKind {
    /// All action kinds in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Work,
        Self::Steal,
        Self::Attack,
        Self::ProposeRule,
        Self::VoteRule,
        Self::DoNothing,
        Self::FormAlliance,
        Self::BreakAlliance,
        Self::Trade,
        Self::Move,
        Self::Rest,
        Self::CoalitionAttack,
    ];

    /// The internal label used for routing and action counts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Steal => "STEAL",
            Self::Attack => "ATTACK",
            Self::ProposeRule => "PROPOSE_RULE",
            Self::VoteRule => "VOTE_RULE",
            Self::DoNothing => "DO_NOTHING",
            Self::FormAlliance => "FORM_ALLIANCE",
            Self::BreakAlliance => "BREAK_ALLIANCE",
            Self::Trade => "TRADE",
            Self::Move => "MOVE",
            Self::Rest => "REST",
            Self::CoalitionAttack => "COALITION_ATTACK",
        }
    }

    /// The label written to the `action` field of an event record.
    ///
    /// Only the field is remapped; routing always uses [`label`](Self::label).
    pub const fn external_label(self) -> &'static str {
        match self {
            Self::Attack => "ELIMINATE",
            other => other.label(),
        }
    }

    /// Whether this kind needs another agent as its target.
    pub const fn is_targeted(self) -> bool {
        matches!(
            self,
            Self::Steal
                | Self::Attack
                | Self::FormAlliance
                | Self::BreakAlliance
                | Self::Trade
                | Self::CoalitionAttack
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or(())
    }
}

// ---------------------------------------------------------------------------
// Ballot
// ---------------------------------------------------------------------------

/// A vote on the pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ballot {
    /// In favor.
    Yes,
    /// Against.
    No,
}

impl Ballot {
    /// The wire label (`"yes"` or `"no"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl FromStr for Ballot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The `outcome` field of an event record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action was illegal and had no effect.
    Blocked,
    /// The action resolved in the actor's favor.
    Success,
    /// The action resolved against the actor.
    Failed,
    /// A governance request (proposal or vote) was registered.
    Accepted,
    /// A governance request was refused by the state machine.
    Rejected,
    /// The action had nothing to resolve.
    Noop,
    /// The proposal passed and the rule was changed.
    ProposalPassed,
    /// The proposal failed the vote.
    ProposalRejected,
    /// The proposal passed the vote but the rule table refused the change.
    MutationFailed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocked => f.write_str("blocked"),
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
            Self::Noop => f.write_str("noop"),
            Self::ProposalPassed => f.write_str("proposal_passed"),
            Self::ProposalRejected => f.write_str("proposal_rejected"),
            Self::MutationFailed(reason) => {
                write!(f, "proposal_passed_but_mutation_failed:{reason}")
            }
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Outcome {
    /// Map a resolver's success flag onto `success` / `failed`.
    pub const fn from_success(success: bool) -> Self {
        if success { Self::Success } else { Self::Failed }
    }
}
