//! The world orchestrator: owns all run state and drives the turn loop.
//!
//! # Turn structure
//!
//! A turn visits every agent slot in construction order. For each alive
//! agent the world:
//!
//! 1. builds a fresh [`AgentObservation`],
//! 2. asks the slot's [`DecisionStrategy`] for an action,
//! 3. validates it against the live rules, then checks its target,
//! 4. dispatches it to the conflict resolver or the governance system,
//! 5. updates reputation and appends one event to the log.
//!
//! A proposal or vote is followed by an unforced governance resolution.
//! After the last slot acts, any proposal still pending is force-resolved.
//!
//! # Determinism
//!
//! One [`ChaCha12Rng`] seeded from the run seed is the only source of
//! randomness. Construction draws every starting balance, then every
//! strength, in slot order; after that only strategies and resolvers draw,
//! in slot order. Same seed, roster, and rules give the same event log and
//! digest.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use tracing::{debug, info};

use dilemma_agents::{
    AgentError, AgentState, AllianceRegistry, ConflictResolver, Population, ReputationBook,
};
use dilemma_governance::{BlockReason, GovernanceSystem, Resolution, RuleSet, ValidationContext};
use dilemma_types::{
    Action, ActionKind, ActionRejection, AgentId, AgentObservation, Capabilities, EventDetails,
    EventRecord, ExtendedTuning, ExtendedView, Intent, LeaderboardRow, Outcome, Position,
    RULE_CHANGE, RULE_VOTE_RESULT, ResolutionDetails, RuleTable, Snapshot, VoteDetails,
    VoteReason, round4,
};

use crate::config::SimulationConfig;
use crate::decision::{DecisionError, DecisionStrategy};
use crate::logger::{EventLogger, LoggerError};
use crate::roster::{build_roster, roster_names};

/// Justification recorded on governance resolution events.
pub const GOVERNANCE_JUSTIFICATION: &str = "simple_majority";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that stop a world from being built or advanced.
///
/// Illegal actions are not errors; they are logged as `blocked`.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The roster size is outside the configured bounds.
    #[error("agent count {count} outside [{min}, {max}]")]
    AgentCount {
        /// Agents supplied.
        count: usize,
        /// Smallest accepted population.
        min: u32,
        /// Largest accepted population.
        max: u32,
    },

    /// A configured range has its bounds reversed.
    #[error("invalid {name} range [{low}, {high}]")]
    InvalidRange {
        /// Which range.
        name: &'static str,
        /// Lower bound as given.
        low: i64,
        /// Upper bound as given.
        high: i64,
    },

    /// Population bookkeeping failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The event log could not be fingerprinted.
    #[error("logger error: {source}")]
    Logger {
        /// The underlying logger error.
        #[from]
        source: LoggerError,
    },

    /// The roster named an unknown strategy.
    #[error("decision error: {source}")]
    Decision {
        /// The underlying decision error.
        #[from]
        source: DecisionError,
    },
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Everything a world needs besides its strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldParams {
    /// Seed of the run's generator.
    pub seed: u64,
    /// Turn budget.
    pub max_turns: u32,
    /// Smallest accepted population.
    pub min_agents: u32,
    /// Largest accepted population.
    pub max_agents: u32,
    /// Inclusive range of starting balances.
    pub initial_balance_range: [i64; 2],
    /// Inclusive range of strengths.
    pub strength_range: [i64; 2],
    /// The starting rule table.
    pub rules: RuleTable,
    /// Extended mechanics in play.
    pub capabilities: Capabilities,
    /// Numeric parameters of the extended mechanics.
    pub tuning: ExtendedTuning,
}

impl WorldParams {
    /// Parameters taken from a loaded configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            seed: config.world.seed,
            max_turns: config.world.max_turns,
            min_agents: config.world.min_agents,
            max_agents: config.world.max_agents,
            initial_balance_range: config.world.initial_balance_range,
            strength_range: config.world.strength_range,
            rules: config.rule_table(),
            capabilities: config.features.capabilities,
            tuning: config.features.tuning,
        }
    }
}

impl Default for WorldParams {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// One agent seat: a fixed id paired with its strategy.
struct AgentSlot {
    id: AgentId,
    label: String,
    strategy: Box<dyn DecisionStrategy>,
}

/// A single simulation run.
pub struct World {
    seed: u64,
    max_turns: u32,
    turns_completed: u32,
    capabilities: Capabilities,
    tuning: ExtendedTuning,
    rng: ChaCha12Rng,
    slots: Vec<AgentSlot>,
    population: Population,
    governance: GovernanceSystem,
    reputation: ReputationBook,
    alliances: AllianceRegistry,
    logger: EventLogger,
    action_counts: BTreeMap<ActionKind, u64>,
}

impl World {
    /// Build a world seating one agent per strategy, in order.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentCount`] if the roster size is outside
    /// `[min_agents, max_agents]` and [`WorldError::InvalidRange`] if a
    /// range has `low > high`. Nothing is drawn from the generator on error.
    pub fn new(
        params: WorldParams,
        strategies: Vec<Box<dyn DecisionStrategy>>,
    ) -> Result<Self, WorldError> {
        let count = strategies.len();
        let fits = u32::try_from(count)
            .is_ok_and(|n| (params.min_agents..=params.max_agents).contains(&n));
        if !fits {
            return Err(WorldError::AgentCount {
                count,
                min: params.min_agents,
                max: params.max_agents,
            });
        }
        let [balance_low, balance_high] = checked_range("initial balance", params.initial_balance_range)?;
        let [strength_low, strength_high] = checked_range("strength", params.strength_range)?;

        let slots: Vec<AgentSlot> = (0_u32..)
            .zip(strategies)
            .map(|(raw, strategy)| AgentSlot {
                id: AgentId::new(raw),
                label: strategy.label().to_owned(),
                strategy,
            })
            .collect();

        // All balances are drawn before any strength.
        let mut rng = ChaCha12Rng::seed_from_u64(params.seed);
        let mut states: Vec<AgentState> = slots
            .iter()
            .map(|_| AgentState::new(rng.random_range(balance_low..=balance_high), 0))
            .collect();
        for state in &mut states {
            state.strength = rng.random_range(strength_low..=strength_high);
        }

        let mut population = Population::new();
        for (slot, mut state) in slots.iter().zip(states) {
            if params.capabilities.health {
                state.health = Some(params.tuning.max_health);
            }
            if params.capabilities.movement {
                state.position = Some(Position::default());
            }
            population.insert(slot.id, state);
        }

        let mut reputation = ReputationBook::new();
        reputation.bootstrap(slots.iter().map(|slot| slot.id));

        info!(
            seed = params.seed,
            agents = count,
            max_turns = params.max_turns,
            extended = params.capabilities.any(),
            "world created"
        );

        Ok(Self {
            seed: params.seed,
            max_turns: params.max_turns,
            turns_completed: 0,
            capabilities: params.capabilities,
            tuning: params.tuning,
            rng,
            slots,
            population,
            governance: GovernanceSystem::new(RuleSet::new(params.rules)),
            reputation,
            alliances: AllianceRegistry::new(),
            logger: EventLogger::new(),
            action_counts: ActionKind::ALL.iter().map(|kind| (*kind, 0)).collect(),
        })
    }

    /// Build a world from a configuration, resolving its roster.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, WorldError> {
        let strategies = build_roster(&roster_names(&config.world))?;
        Self::new(WorldParams::from_config(config), strategies)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Seed of the run.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Turns fully executed so far.
    pub const fn turns_completed(&self) -> u32 {
        self.turns_completed
    }

    /// Extended mechanics in play.
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Per-agent state.
    pub const fn population(&self) -> &Population {
        &self.population
    }

    /// Rules and the proposal state machine.
    pub const fn governance(&self) -> &GovernanceSystem {
        &self.governance
    }

    /// Trust and aggression scores.
    pub const fn reputation(&self) -> &ReputationBook {
        &self.reputation
    }

    /// Alliances formed so far.
    pub const fn alliances(&self) -> &AllianceRegistry {
        &self.alliances
    }

    /// The event log.
    pub const fn logger(&self) -> &EventLogger {
        &self.logger
    }

    /// Whether no further turn will run.
    pub fn is_finished(&self) -> bool {
        self.population.alive_count() <= 1 || self.turns_completed >= self.max_turns
    }

    // -----------------------------------------------------------------------
    // Turn loop
    // -----------------------------------------------------------------------

    /// Run one turn. Returns `false` without doing anything once at most
    /// one agent is alive or the turn budget is spent.
    pub fn step(&mut self) -> Result<bool, WorldError> {
        if self.is_finished() {
            return Ok(false);
        }
        let turn = self.turns_completed.saturating_add(1);

        for index in 0..self.slots.len() {
            let Some(actor) = self.slots.get(index).map(|slot| slot.id) else {
                continue;
            };
            if !self.population.is_alive(actor) {
                continue;
            }

            let observation = self.observe(actor, turn)?;
            let Some(slot) = self.slots.get_mut(index) else {
                continue;
            };
            match slot.strategy.decide(&observation, &mut self.rng) {
                Ok(action) => self.act(turn, actor, action)?,
                Err(rejection) => self.reject(turn, actor, &rejection),
            }
        }

        self.resolve_governance(turn, true);
        self.turns_completed = turn;
        debug!(turn, alive = self.population.alive_count(), "turn complete");
        Ok(true)
    }

    /// Step until the run ends, then summarize it.
    pub fn run(&mut self) -> Result<Snapshot, WorldError> {
        while self.step()? {}
        let snapshot = self.snapshot()?;
        info!(
            turns = snapshot.turns_completed,
            alive = snapshot.alive.len(),
            events = snapshot.event_count,
            rules_version = snapshot.rules_version,
            digest = %snapshot.log_digest,
            "run finished"
        );
        Ok(snapshot)
    }

    /// Summary of the run so far.
    pub fn snapshot(&self) -> Result<Snapshot, WorldError> {
        let mut leaderboard = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let state = self.population.get(slot.id)?;
            leaderboard.push(LeaderboardRow {
                agent_id: slot.id,
                strategy: slot.label.clone(),
                token_balance: state.balance,
                strength: state.strength,
                alive: self.population.is_alive(slot.id),
                trust: round4(self.reputation.trust(slot.id)),
                aggression: round4(self.reputation.aggression(slot.id)),
                health: state.health,
            });
        }
        leaderboard.sort_by_key(|row| (Reverse(row.token_balance), row.agent_id));

        let rules = self.governance.rules();
        Ok(Snapshot {
            seed: self.seed,
            turns_completed: self.turns_completed,
            rules_version: rules.version(),
            leaderboard,
            alive: self.population.alive().iter().copied().collect(),
            action_counts: self.action_counts.clone(),
            event_count: self.logger.len(),
            log_digest: self.logger.digest()?,
            events: self.logger.events().to_vec(),
            rules: rules.values().clone(),
            rule_history: rules.history().to_vec(),
        })
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    fn observe(&self, actor: AgentId, turn: u32) -> Result<AgentObservation, WorldError> {
        let alive_ids: Vec<AgentId> = self.population.alive().iter().copied().collect();

        let mut balance_by_agent = BTreeMap::new();
        let mut strength_by_agent = BTreeMap::new();
        let mut trust_by_agent = BTreeMap::new();
        let mut aggression_by_agent = BTreeMap::new();
        let mut health_by_agent = BTreeMap::new();
        for &id in &alive_ids {
            let state = self.population.get(id)?;
            balance_by_agent.insert(id, state.balance);
            strength_by_agent.insert(id, state.strength);
            trust_by_agent.insert(id, self.reputation.trust(id));
            aggression_by_agent.insert(id, self.reputation.aggression(id));
            if let Some(health) = state.health {
                health_by_agent.insert(id, health);
            }
        }

        let me = self.population.get(actor)?;
        let extended = self.capabilities.any().then(|| ExtendedView {
            capabilities: self.capabilities,
            self_health: me.health,
            health_by_agent,
            allies: self.alliances.allies_of(actor),
            position: me.position,
        });

        Ok(AgentObservation {
            turn,
            self_id: actor,
            self_balance: me.balance,
            self_strength: me.strength,
            self_rank: self.population.rank_of(actor).unwrap_or_default(),
            alive_ids,
            balance_by_agent,
            strength_by_agent,
            trust_by_agent,
            aggression_by_agent,
            rules: self.governance.rules().values().clone(),
            pending_proposal: self.governance.pending().cloned(),
            last_harm_from: self.reputation.last_harm_from(actor),
            extended,
        })
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Validate and resolve one well-formed action.
    #[allow(clippy::too_many_lines)]
    fn act(&mut self, turn: u32, actor: AgentId, action: Action) -> Result<(), WorldError> {
        let kind = action.kind();
        self.count(kind);
        let label = kind.external_label();
        let target = action.target();

        let ctx = ValidationContext {
            actor_balance: self.population.balance(actor)?,
            capabilities: self.capabilities,
            grid_size: self.tuning.grid_size,
        };
        let allowed = match self.governance.rules().validate_action(&action, &ctx) {
            Ok(allowed) => allowed,
            Err(block) => {
                self.record_blocked(turn, actor, label, target, block);
                return Ok(());
            }
        };
        if let Some(target) = target {
            if let Err(block) = self.check_target(actor, target) {
                self.record_blocked(turn, actor, label, Some(target), block);
                return Ok(());
            }
        }
        let reason = allowed.as_str();

        let resolver = ConflictResolver::new(self.governance.rules(), self.tuning, self.capabilities.health);
        match action.intent {
            Intent::Work => {
                let details = resolver.resolve_work(actor, &mut self.population, &mut self.rng)?;
                self.reputation.record_work(actor);
                self.record(turn, actor, label, None, Outcome::Success, reason, EventDetails::new(details));
            }
            Intent::DoNothing => {
                self.record(turn, actor, label, None, Outcome::Noop, reason, EventDetails::empty());
            }
            Intent::Rest => {
                let details = resolver.resolve_rest(actor, &mut self.population)?;
                self.record(turn, actor, label, None, Outcome::Success, reason, EventDetails::new(details));
            }
            Intent::Move { position } => {
                let details = resolver.resolve_move(actor, position, &mut self.population)?;
                self.record(turn, actor, label, None, Outcome::Success, reason, EventDetails::new(details));
            }
            Intent::Steal { target } => {
                let details = resolver.resolve_steal(actor, target, &mut self.population, &mut self.rng)?;
                self.reputation.record_steal(actor, target, details.success);
                let outcome = Outcome::from_success(details.success);
                self.record(turn, actor, label, Some(target), outcome, reason, EventDetails::new(details));
            }
            Intent::Attack { target } => {
                let details = resolver.resolve_attack(actor, target, &mut self.population, &mut self.rng)?;
                self.reputation.record_attack(actor, target, details.success);
                let outcome = Outcome::from_success(details.success);
                self.record(turn, actor, label, Some(target), outcome, reason, EventDetails::new(details));
            }
            Intent::CoalitionAttack { target } => {
                let allies = self.alliances.allies_of(actor);
                let enlisted = resolver.coalition_allies(target, &allies, &self.population)?;
                if enlisted.is_empty() {
                    self.record_blocked(turn, actor, label, Some(target), BlockReason::NoAlliesAvailable);
                    return Ok(());
                }
                let details = resolver.resolve_coalition_attack(
                    actor,
                    &enlisted,
                    target,
                    &mut self.population,
                    &mut self.rng,
                )?;
                for &member in &details.participants {
                    self.reputation.record_attack(member, target, details.success);
                }
                let outcome = Outcome::from_success(details.success);
                self.record(turn, actor, label, Some(target), outcome, reason, EventDetails::new(details));
            }
            Intent::Trade {
                partner,
                offer,
                request,
            } => {
                let details = resolver.resolve_trade(actor, partner, offer, request, &mut self.population)?;
                let outcome = Outcome::from_success(details.success);
                self.record(turn, actor, label, Some(partner), outcome, reason, EventDetails::new(details));
            }
            Intent::FormAlliance { partner } => {
                let trust_level = (self.reputation.trust(actor) + self.reputation.trust(partner)) / 2.0;
                let strength = self
                    .population
                    .strength(actor)?
                    .saturating_add(self.population.strength(partner)?);
                let details = self.alliances.form(actor, partner, trust_level, strength, turn);
                let outcome = Outcome::from_success(details.success);
                let justification = details.reason.as_str();
                self.record(turn, actor, label, Some(partner), outcome, justification, EventDetails::new(details));
            }
            Intent::BreakAlliance { partner } => {
                let details = self.alliances.dissolve(actor, partner, turn);
                let outcome = Outcome::from_success(details.success);
                let justification = details.reason.as_str();
                self.record(turn, actor, label, Some(partner), outcome, justification, EventDetails::new(details));
            }
            Intent::ProposeRule { key, value } => {
                let details = self.governance.propose(actor, &key, &value, turn);
                let outcome = if details.proposal_id.is_some() {
                    Outcome::Accepted
                } else {
                    Outcome::Rejected
                };
                self.record(turn, actor, label, None, outcome, reason, EventDetails::new(details));
                self.resolve_governance(turn, false);
            }
            Intent::VoteRule { ballot } => {
                let vote_reason = self.governance.vote(actor, ballot);
                let outcome = if vote_reason == VoteReason::VoteRecorded {
                    Outcome::Accepted
                } else {
                    Outcome::Rejected
                };
                let details = VoteDetails { vote_reason };
                self.record(turn, actor, label, None, outcome, reason, EventDetails::new(details));
                self.resolve_governance(turn, false);
            }
        }
        Ok(())
    }

    /// Log a decision the strategy could not turn into a well-formed action.
    ///
    /// A known kind that is switched off (or not enabled) reports that first.
    fn reject(&mut self, turn: u32, actor: AgentId, rejection: &ActionRejection) {
        let gate = rejection
            .kind
            .and_then(|kind| self.governance.rules().admits_kind(kind, self.capabilities).err());
        let label = match rejection.kind {
            Some(kind) => {
                self.count(kind);
                kind.external_label()
            }
            None => rejection.label.as_str(),
        }
        .to_owned();
        let reason = gate.map_or_else(|| rejection.reason.as_str(), BlockReason::as_str);
        self.record(
            turn,
            actor,
            &label,
            rejection.target,
            Outcome::Blocked,
            reason,
            EventDetails::empty(),
        );
    }

    fn check_target(&self, actor: AgentId, target: AgentId) -> Result<(), BlockReason> {
        if target == actor {
            return Err(BlockReason::SelfTargetNotAllowed);
        }
        if !self.population.is_alive(target) {
            return Err(BlockReason::TargetNotAlive);
        }
        Ok(())
    }

    fn count(&mut self, kind: ActionKind) {
        let counter = self.action_counts.entry(kind).or_insert(0);
        *counter = counter.saturating_add(1);
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Resolve the pending proposal if the vote allows, logging the result.
    fn resolve_governance(&mut self, turn: u32, force: bool) {
        let resolution = self
            .governance
            .try_resolve(self.population.alive_balances(), turn, force);
        let Resolution::Resolved(resolved) = resolution else {
            return;
        };

        let action = if resolved.applied() {
            RULE_CHANGE
        } else {
            RULE_VOTE_RESULT
        };
        let actor = resolved.proposal.actor;
        info!(
            turn,
            proposal = %resolved.proposal.proposal_id,
            key = %resolved.proposal.key,
            outcome = %resolved.outcome,
            rules_version = resolved.rules_version,
            "proposal resolved"
        );
        let details = ResolutionDetails {
            proposal: resolved.proposal,
            rules_version: resolved.rules_version,
            yes_weight: resolved.tally.yes_weight,
            no_weight: resolved.tally.no_weight,
            total_supply: resolved.tally.total_supply,
        };
        self.logger.log(EventRecord {
            turn,
            actor,
            action: action.to_owned(),
            target: None,
            outcome: resolved.outcome,
            rule_justification: GOVERNANCE_JUSTIFICATION.to_owned(),
            details: EventDetails::new(details),
        });
    }

    // -----------------------------------------------------------------------
    // Logging
    // -----------------------------------------------------------------------

    /// Append an action event, annotated with the actor's current rank.
    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        turn: u32,
        actor: AgentId,
        label: &str,
        target: Option<AgentId>,
        outcome: Outcome,
        justification: &str,
        details: EventDetails,
    ) {
        debug!(turn, actor = %actor, action = label, outcome = %outcome, reason = justification, "action resolved");
        let details = details.with_rank(self.population.rank_of(actor));
        self.logger.log(EventRecord {
            turn,
            actor,
            action: label.to_owned(),
            target,
            outcome,
            rule_justification: justification.to_owned(),
            details,
        });
    }

    fn record_blocked(
        &mut self,
        turn: u32,
        actor: AgentId,
        label: &str,
        target: Option<AgentId>,
        block: BlockReason,
    ) {
        self.record(turn, actor, label, target, Outcome::Blocked, block.as_str(), EventDetails::empty());
    }
}

/// `[low, high]` if ordered.
fn checked_range(name: &'static str, range: [i64; 2]) -> Result<[i64; 2], WorldError> {
    let [low, high] = range;
    if low > high {
        return Err(WorldError::InvalidRange { name, low, high });
    }
    Ok(range)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use serde_json::json;

    use dilemma_governance::INITIAL_VERSION;
    use dilemma_types::{DetailBody, RawAction, RuleValue, keys};

    use super::*;
    use crate::decision::{ScriptedStrategy, StubStrategy};

    fn stubs(count: usize) -> Vec<Box<dyn DecisionStrategy>> {
        (0..count)
            .map(|_| Box::new(StubStrategy::new()) as Box<dyn DecisionStrategy>)
            .collect()
    }

    /// Agent 0 plays `script`; agents 1..count idle.
    fn scripted(script: Vec<RawAction>, count: usize) -> Vec<Box<dyn DecisionStrategy>> {
        let mut strategies = stubs(count.saturating_sub(1));
        strategies.insert(0, Box::new(ScriptedStrategy::new("script", script)));
        strategies
    }

    fn raw(kind: &str, target: Option<u32>) -> RawAction {
        RawAction::new(AgentId::new(0), kind, target.map(AgentId::new))
    }

    fn params(max_turns: u32, capabilities: Capabilities) -> WorldParams {
        WorldParams {
            max_turns,
            capabilities,
            ..WorldParams::default()
        }
    }

    fn first_event_of(world: &World, actor: u32) -> EventRecord {
        world
            .logger()
            .events()
            .iter()
            .find(|event| event.actor == AgentId::new(actor))
            .cloned()
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn agent_count_outside_bounds_is_refused() {
        let err = World::new(WorldParams::default(), stubs(2)).err().unwrap();
        assert!(matches!(err, WorldError::AgentCount { count: 2, min: 5, max: 20 }));

        let err = World::new(WorldParams::default(), stubs(21)).err().unwrap();
        assert!(matches!(err, WorldError::AgentCount { count: 21, .. }));
    }

    #[test]
    fn reversed_range_is_refused() {
        let params = WorldParams {
            strength_range: [9, 3],
            ..WorldParams::default()
        };
        let err = World::new(params, stubs(5)).err().unwrap();
        assert!(matches!(err, WorldError::InvalidRange { name: "strength", low: 9, high: 3 }));
    }

    #[test]
    fn construction_draws_within_ranges() {
        let world = World::new(WorldParams::default(), stubs(8)).unwrap();
        assert_eq!(world.population().alive_count(), 8);
        for (_, state) in world.population().iter() {
            assert!((10..=30).contains(&state.balance));
            assert!((1..=10).contains(&state.strength));
            assert_eq!(state.health, None);
            assert_eq!(state.position, None);
        }
    }

    #[test]
    fn extended_world_starts_at_full_health_on_the_origin() {
        let world = World::new(params(1, Capabilities::extended()), stubs(5)).unwrap();
        for (_, state) in world.population().iter() {
            assert_eq!(state.health, Some(50));
            assert_eq!(state.position, Some(Position(0, 0)));
        }
    }

    #[test]
    fn same_seed_gives_same_starting_state() {
        let a = World::new(WorldParams::default(), stubs(6)).unwrap();
        let b = World::new(WorldParams::default(), stubs(6)).unwrap();
        let balances = |w: &World| w.population().alive_balances().collect::<Vec<_>>();
        assert_eq!(balances(&a), balances(&b));
    }

    // -----------------------------------------------------------------------
    // Turn loop
    // -----------------------------------------------------------------------

    #[test]
    fn idle_world_runs_to_the_turn_budget() {
        let mut world = World::new(params(3, Capabilities::base()), stubs(5)).unwrap();
        let snapshot = world.run().unwrap();

        assert_eq!(snapshot.turns_completed, 3);
        assert_eq!(snapshot.event_count, 15);
        assert_eq!(snapshot.alive.len(), 5);
        assert_eq!(snapshot.action_counts.get(&ActionKind::DoNothing), Some(&15));
        assert_eq!(snapshot.action_counts.len(), ActionKind::ALL.len());
        assert_eq!(snapshot.log_digest.len(), 64);
        assert!(snapshot.events.iter().all(|e| e.outcome == Outcome::Noop));
        assert!(!world.step().unwrap());
    }

    #[test]
    fn leaderboard_orders_by_balance_then_id() {
        let world = World::new(WorldParams::default(), stubs(10)).unwrap();
        let snapshot = world.snapshot().unwrap();
        for pair in snapshot.leaderboard.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.token_balance > b.token_balance
                    || (a.token_balance == b.token_balance && a.agent_id < b.agent_id)
            );
        }
    }

    #[test]
    fn action_events_carry_actor_rank() {
        let mut world = World::new(params(1, Capabilities::base()), stubs(5)).unwrap();
        world.step().unwrap();
        for event in world.logger().events() {
            assert_eq!(event.details.actor_rank, world.population().rank_of(event.actor));
        }
    }

    // -----------------------------------------------------------------------
    // Blocking
    // -----------------------------------------------------------------------

    #[test]
    fn immutable_proposal_key_is_blocked() {
        let script = vec![
            raw("PROPOSE_RULE", None)
                .with("key", json!(keys::ALLOW_STEAL))
                .with("value", json!(false)),
        ];
        let mut world = World::new(params(1, Capabilities::base()), scripted(script, 5)).unwrap();
        world.step().unwrap();

        let event = first_event_of(&world, 0);
        assert_eq!(event.action, "PROPOSE_RULE");
        assert_eq!(event.outcome, Outcome::Blocked);
        assert_eq!(event.rule_justification, "proposal_key_not_mutable");
        assert!(world.governance().pending().is_none());
    }

    #[test]
    fn self_target_is_blocked() {
        let script = vec![raw("STEAL", Some(0))];
        let mut world = World::new(params(1, Capabilities::base()), scripted(script, 5)).unwrap();
        world.step().unwrap();

        let event = first_event_of(&world, 0);
        assert_eq!(event.outcome, Outcome::Blocked);
        assert_eq!(event.rule_justification, "self_target_not_allowed");
        assert_eq!(event.target, Some(AgentId::new(0)));
    }

    #[test]
    fn unknown_target_is_blocked_as_not_alive() {
        let script = vec![raw("ATTACK", Some(42))];
        let mut world = World::new(params(1, Capabilities::base()), scripted(script, 5)).unwrap();
        world.step().unwrap();

        let event = first_event_of(&world, 0);
        assert_eq!(event.action, "ELIMINATE");
        assert_eq!(event.rule_justification, "target_not_alive");
        assert_eq!(world.snapshot().unwrap().action_counts.get(&ActionKind::Attack), Some(&1));
    }

    #[test]
    fn malformed_decision_is_logged_under_its_raw_label() {
        let script = vec![raw("DANCE", None), raw("STEAL", None)];
        let mut world = World::new(params(2, Capabilities::base()), scripted(script, 5)).unwrap();
        world.run().unwrap();

        let mine: Vec<&EventRecord> = world
            .logger()
            .events()
            .iter()
            .filter(|e| e.actor == AgentId::new(0))
            .collect();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].action, "DANCE");
        assert_eq!(mine[0].rule_justification, "unknown_action");
        assert_eq!(mine[1].action, "STEAL");
        assert_eq!(mine[1].rule_justification, "steal_requires_target");

        let counts = world.snapshot().unwrap().action_counts;
        assert_eq!(counts.get(&ActionKind::Steal), Some(&1));
        assert_eq!(counts.get(&ActionKind::DoNothing), Some(&8));
    }

    #[test]
    fn switched_off_kind_reports_the_switch_before_missing_fields() {
        let script = vec![
            raw("STEAL", None),
            raw("VOTE_RULE", None).with("vote", json!("maybe")),
        ];
        let mut params = params(2, Capabilities::base());
        params.rules.insert(keys::ALLOW_STEAL.to_owned(), RuleValue::Flag(false));
        params.rules.insert(keys::ALLOW_VOTES.to_owned(), RuleValue::Flag(false));
        let mut world = World::new(params, scripted(script, 5)).unwrap();
        world.run().unwrap();

        let mine: Vec<&EventRecord> = world
            .logger()
            .events()
            .iter()
            .filter(|e| e.actor == AgentId::new(0))
            .collect();
        assert_eq!(mine[0].action, "STEAL");
        assert_eq!(mine[0].outcome, Outcome::Blocked);
        assert_eq!(mine[0].rule_justification, "rule_disallows_steal");
        assert_eq!(mine[1].action, "VOTE_RULE");
        assert_eq!(mine[1].rule_justification, "rule_disallows_voting");
    }

    #[test]
    fn extended_kinds_are_unknown_in_a_base_world() {
        let script = vec![raw("REST", None)];
        let mut world = World::new(params(1, Capabilities::base()), scripted(script, 5)).unwrap();
        world.step().unwrap();

        let event = first_event_of(&world, 0);
        assert_eq!(event.outcome, Outcome::Blocked);
        assert_eq!(event.rule_justification, "unknown_action");
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    #[test]
    fn unanimous_support_changes_the_rule_within_the_turn() {
        let propose = raw("PROPOSE_RULE", None)
            .with("key", json!(keys::STEAL_AMOUNT))
            .with("value", json!(4));
        let vote = || RawAction::new(AgentId::new(0), "VOTE_RULE", None).with("vote", json!("yes"));
        let mut strategies: Vec<Box<dyn DecisionStrategy>> =
            vec![Box::new(ScriptedStrategy::new("proposer", [propose]))];
        for _ in 1..5 {
            strategies.push(Box::new(ScriptedStrategy::new("voter", [vote()])));
        }

        let mut world = World::new(params(1, Capabilities::base()), strategies).unwrap();
        world.step().unwrap();

        let changes: Vec<&EventRecord> = world
            .logger()
            .events()
            .iter()
            .filter(|e| e.action == RULE_CHANGE)
            .collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].actor, AgentId::new(0));
        assert_eq!(changes[0].outcome, Outcome::ProposalPassed);
        assert_eq!(changes[0].rule_justification, "simple_majority");
        assert_eq!(changes[0].details.actor_rank, None);

        let rules = world.governance().rules();
        assert_eq!(rules.version(), INITIAL_VERSION + 1);
        assert_eq!(rules.values().get(keys::STEAL_AMOUNT), Some(&RuleValue::Int(4)));
        assert!(world.governance().pending().is_none());
    }

    #[test]
    fn undecided_proposal_is_forced_at_turn_end() {
        let propose = raw("PROPOSE_RULE", None)
            .with("key", json!(keys::ATTACK_COST))
            .with("value", json!(8));
        let mut world = World::new(params(1, Capabilities::base()), scripted(vec![propose], 5)).unwrap();
        world.step().unwrap();

        let last = world.logger().events().last().unwrap();
        assert_eq!(last.action, RULE_VOTE_RESULT);
        assert_eq!(last.outcome, Outcome::ProposalRejected);
        assert_eq!(world.governance().rules().version(), INITIAL_VERSION);
        assert!(world.governance().pending().is_none());
    }

    // -----------------------------------------------------------------------
    // Extended mechanics
    // -----------------------------------------------------------------------

    #[test]
    fn move_records_both_cells() {
        let script = vec![raw("MOVE", None).with("position", json!([3, 4]))];
        let mut world = World::new(params(1, Capabilities::extended()), scripted(script, 5)).unwrap();
        world.step().unwrap();

        let event = first_event_of(&world, 0);
        assert_eq!(event.outcome, Outcome::Success);
        assert_eq!(world.population().position(AgentId::new(0)).unwrap(), Some(Position(3, 4)));
    }

    #[test]
    fn move_off_the_grid_is_blocked() {
        let script = vec![raw("MOVE", None).with("position", json!([15, 0]))];
        let mut world = World::new(params(1, Capabilities::extended()), scripted(script, 5)).unwrap();
        world.step().unwrap();

        let event = first_event_of(&world, 0);
        assert_eq!(event.rule_justification, "position_out_of_bounds");
        assert_eq!(world.population().position(AgentId::new(0)).unwrap(), Some(Position(0, 0)));
    }

    #[test]
    fn coalition_without_allies_is_blocked() {
        let script = vec![raw("COALITION_ATTACK", Some(1))];
        let mut world = World::new(params(1, Capabilities::extended()), scripted(script, 5)).unwrap();
        let before = world.population().balance(AgentId::new(0)).unwrap();
        world.step().unwrap();

        let event = first_event_of(&world, 0);
        assert_eq!(event.outcome, Outcome::Blocked);
        assert_eq!(event.rule_justification, "no_allies_available");
        assert_eq!(world.population().balance(AgentId::new(0)).unwrap(), before);
    }

    #[test]
    fn allied_coalition_enlists_the_partner() {
        let script = vec![raw("FORM_ALLIANCE", Some(1)), raw("COALITION_ATTACK", Some(2))];
        let mut world = World::new(params(2, Capabilities::extended()), scripted(script, 5)).unwrap();
        world.run().unwrap();

        assert!(world.alliances().are_allied(AgentId::new(0), AgentId::new(1)));
        let coalition = world
            .logger()
            .events()
            .iter()
            .find(|e| e.action == "COALITION_ATTACK")
            .unwrap();
        let DetailBody::Coalition(details) = &coalition.details.body else {
            panic!("expected coalition details");
        };
        assert_eq!(details.participants, vec![AgentId::new(0), AgentId::new(1)]);
        assert_eq!(details.coalition_size, 2);
    }

    #[test]
    fn extended_observation_lists_allies() {
        let script = vec![raw("FORM_ALLIANCE", Some(3))];
        let mut world = World::new(params(1, Capabilities::extended()), scripted(script, 5)).unwrap();
        world.step().unwrap();

        let observation = world.observe(AgentId::new(3), 2).unwrap();
        let extended = observation.extended.unwrap();
        assert!(extended.allies.contains(&AgentId::new(0)));
        assert_eq!(extended.self_health, Some(50));
        assert_eq!(extended.health_by_agent.len(), 5);
    }
}
