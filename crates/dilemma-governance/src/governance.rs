//! Token-weighted governance over the rule table.
//!
//! # State machine
//!
//! ```text
//! Idle --propose--> Open --try_resolve (decided or forced)--> Idle
//!                    |  ^
//!                    +--+ vote / try_resolve (undecided, not forced)
//! ```
//!
//! At most one proposal is pending. Votes are weighted by each alive
//! voter's current token balance; votes of dead agents are dropped at
//! tally time. Tallies compare doubled integer weights against the total
//! alive supply, so no rounding can tip a result.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use dilemma_types::{
    AgentId, Ballot, Outcome, Proposal, ProposalDetails, ProposalId, ProposeReason, RuleValue,
    VoteReason,
};

use crate::rules::RuleSet;

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Token weights behind a proposal at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    /// Balance held by alive agents voting yes.
    pub yes_weight: i64,
    /// Balance held by alive agents voting no.
    pub no_weight: i64,
    /// Balance held by all alive agents.
    pub total_supply: i64,
}

impl Tally {
    /// Weight of alive agents that have not voted.
    pub const fn undecided(&self) -> i64 {
        self.total_supply
            .saturating_sub(self.yes_weight)
            .saturating_sub(self.no_weight)
    }

    /// Yes strictly exceeds half the supply.
    pub const fn passes(&self) -> bool {
        self.yes_weight.saturating_mul(2) > self.total_supply
    }

    /// No reaches half the supply, or yes can no longer exceed half.
    pub const fn fails(&self) -> bool {
        let best_case_yes = self.yes_weight.saturating_add(self.undecided());
        self.no_weight.saturating_mul(2) >= self.total_supply
            || best_case_yes.saturating_mul(2) <= self.total_supply
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A proposal that left the pending slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProposal {
    /// The proposal as it was opened.
    pub proposal: Proposal,
    /// `proposal_passed`, `proposal_rejected`, or a mutation failure.
    pub outcome: Outcome,
    /// Weights at resolution time.
    pub tally: Tally,
    /// Rule table version after resolution.
    pub rules_version: u64,
}

impl ResolvedProposal {
    /// Whether the rule table actually changed.
    pub const fn applied(&self) -> bool {
        matches!(self.outcome, Outcome::ProposalPassed)
    }
}

/// Result of [`GovernanceSystem::try_resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing is pending.
    NoPendingProposal,
    /// Nobody is alive to vote; the proposal stays pending.
    NoAliveAgents,
    /// Undecided and not forced; the proposal stays pending.
    AwaitingVotes(Tally),
    /// The proposal passed or failed and the system is idle again.
    Resolved(ResolvedProposal),
}

// ---------------------------------------------------------------------------
// GovernanceSystem
// ---------------------------------------------------------------------------

/// The proposal/vote state machine and the rule table it governs.
#[derive(Debug, Clone)]
pub struct GovernanceSystem {
    rules: RuleSet,
    pending: Option<Proposal>,
    votes: BTreeMap<AgentId, Ballot>,
    proposal_counter: u64,
}

impl GovernanceSystem {
    /// Start idle over `rules`.
    pub const fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            pending: None,
            votes: BTreeMap::new(),
            proposal_counter: 0,
        }
    }

    /// The governed rule table.
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The pending proposal, if the system is open.
    pub const fn pending(&self) -> Option<&Proposal> {
        self.pending.as_ref()
    }

    /// Ballots cast on the pending proposal.
    pub const fn votes(&self) -> &BTreeMap<AgentId, Ballot> {
        &self.votes
    }

    /// Open a proposal to set `key` to `value`.
    ///
    /// Fails with `proposal_already_pending` unless idle. Otherwise assigns
    /// the next proposal id, clears votes, and opens.
    pub fn propose(&mut self, actor: AgentId, key: &str, value: &RuleValue, turn: u32) -> ProposalDetails {
        if self.pending.is_some() {
            return ProposalDetails {
                proposal_reason: ProposeReason::ProposalAlreadyPending,
                proposal_id: None,
            };
        }

        self.proposal_counter = self.proposal_counter.saturating_add(1);
        let proposal_id = ProposalId::new(self.proposal_counter);
        self.pending = Some(Proposal {
            proposal_id,
            actor,
            turn,
            key: key.to_owned(),
            value: value.clone(),
        });
        self.votes.clear();
        debug!(proposal = %proposal_id, actor = %actor, key, "proposal opened");

        ProposalDetails {
            proposal_reason: ProposeReason::ProposalRegistered,
            proposal_id: Some(proposal_id),
        }
    }

    /// Record `actor`'s ballot on the pending proposal. A later ballot by
    /// the same actor replaces the earlier one.
    pub fn vote(&mut self, actor: AgentId, ballot: Ballot) -> VoteReason {
        if self.pending.is_none() {
            return VoteReason::NoPendingProposal;
        }
        self.votes.insert(actor, ballot);
        VoteReason::VoteRecorded
    }

    /// Weigh the ballots of the alive agents given as `(id, balance)`.
    pub fn tally(&self, alive_balances: impl IntoIterator<Item = (AgentId, i64)>) -> Tally {
        alive_balances
            .into_iter()
            .fold(Tally::default(), |mut tally, (agent, balance)| {
                tally.total_supply = tally.total_supply.saturating_add(balance);
                match self.votes.get(&agent) {
                    Some(Ballot::Yes) => tally.yes_weight = tally.yes_weight.saturating_add(balance),
                    Some(Ballot::No) => tally.no_weight = tally.no_weight.saturating_add(balance),
                    None => {}
                }
                tally
            })
    }

    /// Resolve the pending proposal if the alive vote decides it, or
    /// unconditionally when `force` is set.
    ///
    /// A forced, undecided proposal is rejected. A passing proposal is
    /// applied to the rule table; if the table refuses it the outcome is
    /// `proposal_passed_but_mutation_failed:<reason>` and the vote still
    /// stands. Any resolution clears the pending slot and the votes.
    pub fn try_resolve(
        &mut self,
        alive_balances: impl IntoIterator<Item = (AgentId, i64)>,
        turn: u32,
        force: bool,
    ) -> Resolution {
        if self.pending.is_none() {
            return Resolution::NoPendingProposal;
        }

        let mut voters = 0_usize;
        let tally = self.tally(alive_balances.into_iter().inspect(|_| {
            voters = voters.saturating_add(1);
        }));
        if voters == 0 {
            return Resolution::NoAliveAgents;
        }

        let passed = tally.passes();
        if !force && !passed && !tally.fails() {
            return Resolution::AwaitingVotes(tally);
        }

        let Some(proposal) = self.pending.take() else {
            return Resolution::NoPendingProposal;
        };
        self.votes.clear();

        let outcome = if passed {
            match self
                .rules
                .apply_mutation(&proposal.key, &proposal.value, proposal.actor, turn)
            {
                Ok(_) => Outcome::ProposalPassed,
                Err(rejection) => {
                    warn!(
                        proposal = %proposal.proposal_id,
                        key = %proposal.key,
                        reason = %rejection,
                        "proposal passed but rule change was refused"
                    );
                    Outcome::MutationFailed(rejection.as_str().to_owned())
                }
            }
        } else {
            Outcome::ProposalRejected
        };

        info!(
            proposal = %proposal.proposal_id,
            key = %proposal.key,
            outcome = %outcome,
            yes = tally.yes_weight,
            no = tally.no_weight,
            supply = tally.total_supply,
            forced = force,
            "proposal resolved"
        );

        Resolution::Resolved(ResolvedProposal {
            proposal,
            outcome,
            tally,
            rules_version: self.rules.version(),
        })
    }
}
