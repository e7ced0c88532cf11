//! Optional feature set enabled at world construction.
//!
//! The base game only knows WORK, STEAL, ATTACK, PROPOSE_RULE, VOTE_RULE
//! and DO_NOTHING. Health, alliances, trade, movement and coalition attacks
//! are capabilities: the world is built with a [`Capabilities`] value and
//! dispatch is restricted to what it enables.

use serde::{Deserialize, Serialize};

use crate::enums::ActionKind;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Which extended mechanics are active for a run.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Per-agent health; attacks wound before they eliminate; REST heals.
    pub health: bool,
    /// FORM_ALLIANCE and BREAK_ALLIANCE.
    pub alliances: bool,
    /// TRADE between two agents.
    pub trade: bool,
    /// MOVE on a square grid.
    pub movement: bool,
    /// COALITION_ATTACK with allied agents. Needs `alliances`.
    pub coalition: bool,
}

impl Capabilities {
    /// The base game: every extended mechanic off.
    pub const fn base() -> Self {
        Self {
            health: false,
            alliances: false,
            trade: false,
            movement: false,
            coalition: false,
        }
    }

    /// Every extended mechanic on.
    pub const fn extended() -> Self {
        Self {
            health: true,
            alliances: true,
            trade: true,
            movement: true,
            coalition: true,
        }
    }

    /// Whether any extended mechanic is on.
    pub const fn any(self) -> bool {
        self.health || self.alliances || self.trade || self.movement || self.coalition
    }

    /// Whether actions of `kind` may be dispatched under this feature set.
    pub const fn permits(self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Work
            | ActionKind::Steal
            | ActionKind::Attack
            | ActionKind::ProposeRule
            | ActionKind::VoteRule
            | ActionKind::DoNothing => true,
            ActionKind::Rest => self.health,
            ActionKind::FormAlliance | ActionKind::BreakAlliance => self.alliances,
            ActionKind::Trade => self.trade,
            ActionKind::Move => self.movement,
            ActionKind::CoalitionAttack => self.coalition && self.alliances,
        }
    }
}

// ---------------------------------------------------------------------------
// ExtendedTuning
// ---------------------------------------------------------------------------

/// Numeric parameters of the extended mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedTuning {
    /// Health every agent starts with, and the ceiling for REST.
    pub max_health: i64,
    /// Health restored by one REST.
    pub rest_heal: i64,
    /// Damage of an evenly matched hit.
    pub attack_base_damage: i64,
    /// Floor on the damage of any successful hit.
    pub attack_min_damage: i64,
    /// Success probability bonus per ally beyond the initiator.
    pub coalition_bonus_per_ally: f64,
    /// Side length of the movement grid.
    pub grid_size: i32,
}

impl Default for ExtendedTuning {
    fn default() -> Self {
        Self {
            max_health: 50,
            rest_heal: 10,
            attack_base_damage: 20,
            attack_min_damage: 5,
            coalition_bonus_per_ally: 0.1,
            grid_size: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell on the movement grid. Serializes as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position(pub i32, pub i32);

impl Position {
    /// Whether the cell lies inside a `size` x `size` grid anchored at the origin.
    pub const fn within(self, size: i32) -> bool {
        self.0 >= 0 && self.1 >= 0 && self.0 < size && self.1 < size
    }
}
