//! Rule table values.
//!
//! The rule table is a heterogeneous map from rule key to [`RuleValue`].
//! Values deserialize untagged so the YAML config can be written naturally
//! (`allow_steal: true`, `work_income: [2, 4]`, `attack_cost: 5`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// Well-known rule keys recognized by the engine.
pub mod keys {
    /// Whether STEAL is legal.
    pub const ALLOW_STEAL: &str = "allow_steal";
    /// Whether ATTACK (and COALITION_ATTACK) is legal.
    pub const ALLOW_ATTACK: &str = "allow_attack";
    /// Whether PROPOSE_RULE is legal.
    pub const ALLOW_PROPOSALS: &str = "allow_proposals";
    /// Whether VOTE_RULE is legal.
    pub const ALLOW_VOTES: &str = "allow_votes";
    /// Inclusive `[low, high]` income range for WORK.
    pub const WORK_INCOME: &str = "work_income";
    /// Minimum actor balance required to attempt a steal.
    pub const STEAL_MIN_TOKEN_BALANCE: &str = "steal_min_token_balance";
    /// Maximum tokens taken by one successful steal.
    pub const STEAL_AMOUNT: &str = "steal_amount";
    /// Base steal success probability before the strength edge.
    pub const STEAL_SUCCESS_BASE: &str = "steal_success_base";
    /// Probability a successful thief is caught afterwards.
    pub const STEAL_CATCH_PROB: &str = "steal_catch_prob";
    /// Penalty paid by a thief caught after success.
    pub const STEAL_CATCH_PENALTY: &str = "steal_catch_penalty";
    /// Penalty paid by a thief who fails.
    pub const STEAL_FAIL_PENALTY: &str = "steal_fail_penalty";
    /// Upfront cost of an attack.
    pub const ATTACK_COST: &str = "attack_cost";
    /// Base attack success probability before the strength edge.
    pub const ATTACK_SUCCESS_BASE: &str = "attack_success_base";
    /// Recoil penalty paid by a failed attacker.
    pub const ATTACK_FAIL_PENALTY: &str = "attack_fail_penalty";
    /// Fraction of the victim's balance looted on elimination.
    pub const ATTACK_LOOT_RATIO: &str = "attack_loot_ratio";
    /// Allowlist of keys that proposals may change.
    pub const MUTABLE_KEYS: &str = "mutable_keys";
    /// Per-key numeric bounds for proposals.
    pub const KEY_RANGES: &str = "key_ranges";
}

// ---------------------------------------------------------------------------
// KeyRange
// ---------------------------------------------------------------------------

/// Inclusive numeric bounds for a mutable key. Either side may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyRange {
    /// Lower bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl KeyRange {
    /// Bounds on both sides.
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

// ---------------------------------------------------------------------------
// RuleValue
// ---------------------------------------------------------------------------

/// One value in the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// An on/off switch such as `allow_steal`.
    Flag(bool),
    /// An integer amount such as `attack_cost`.
    Int(i64),
    /// A probability or ratio such as `steal_success_base`.
    Float(f64),
    /// An inclusive integer pair such as `work_income`.
    Pair([i64; 2]),
    /// A list of rule keys (`mutable_keys`).
    Keys(Vec<String>),
    /// Per-key bounds (`key_ranges`).
    Ranges(BTreeMap<String, KeyRange>),
}

impl RuleValue {
    /// The value as a number, if it is one. Integers widen to `f64`.
    #[allow(clippy::cast_precision_loss)] // rule integers are small amounts
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for RuleValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<i64> for RuleValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for RuleValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<[i64; 2]> for RuleValue {
    fn from(v: [i64; 2]) -> Self {
        Self::Pair(v)
    }
}

/// The full rule table, ordered by key.
pub type RuleTable = BTreeMap<String, RuleValue>;

/// The rule table used when no configuration overrides it.
pub fn default_rule_table() -> RuleTable {
    let mut table = RuleTable::new();
    let mut put = |key: &str, value: RuleValue| {
        table.insert(key.to_owned(), value);
    };

    put(keys::ALLOW_STEAL, RuleValue::Flag(true));
    put(keys::ALLOW_ATTACK, RuleValue::Flag(true));
    put(keys::ALLOW_PROPOSALS, RuleValue::Flag(true));
    put(keys::ALLOW_VOTES, RuleValue::Flag(true));
    put(keys::WORK_INCOME, RuleValue::Pair([2, 4]));
    put(keys::STEAL_MIN_TOKEN_BALANCE, RuleValue::Int(0));
    put(keys::STEAL_AMOUNT, RuleValue::Int(3));
    put(keys::STEAL_SUCCESS_BASE, RuleValue::Float(0.45));
    put(keys::STEAL_CATCH_PROB, RuleValue::Float(0.25));
    put(keys::STEAL_CATCH_PENALTY, RuleValue::Int(2));
    put(keys::STEAL_FAIL_PENALTY, RuleValue::Int(1));
    put(keys::ATTACK_COST, RuleValue::Int(5));
    put(keys::ATTACK_SUCCESS_BASE, RuleValue::Float(0.12));
    put(keys::ATTACK_FAIL_PENALTY, RuleValue::Int(2));
    put(keys::ATTACK_LOOT_RATIO, RuleValue::Float(0.4));
    put(
        keys::MUTABLE_KEYS,
        RuleValue::Keys(
            [
                keys::WORK_INCOME,
                keys::STEAL_AMOUNT,
                keys::STEAL_SUCCESS_BASE,
                keys::STEAL_CATCH_PENALTY,
                keys::ATTACK_COST,
                keys::ATTACK_SUCCESS_BASE,
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        ),
    );

    let mut ranges = BTreeMap::new();
    ranges.insert(keys::STEAL_AMOUNT.to_owned(), KeyRange::between(1.0, 10.0));
    ranges.insert(keys::STEAL_SUCCESS_BASE.to_owned(), KeyRange::between(0.05, 0.9));
    ranges.insert(keys::STEAL_CATCH_PENALTY.to_owned(), KeyRange::between(0.0, 10.0));
    ranges.insert(keys::ATTACK_COST.to_owned(), KeyRange::between(1.0, 20.0));
    ranges.insert(keys::ATTACK_SUCCESS_BASE.to_owned(), KeyRange::between(0.01, 0.5));
    put(keys::KEY_RANGES, RuleValue::Ranges(ranges));

    table
}

// ---------------------------------------------------------------------------
// MutationRecord
// ---------------------------------------------------------------------------

/// One applied rule change, appended to the rule history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationRecord {
    /// Turn the change was applied.
    pub turn: u32,
    /// The agent whose proposal passed.
    pub by: AgentId,
    /// Rule table version after the change.
    pub version: u64,
    /// The key that changed.
    pub key: String,
    /// Value before the change, if the key existed.
    pub previous: Option<RuleValue>,
    /// Value after the change.
    pub value: RuleValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_values_deserialize_by_shape() {
        let parsed: Result<RuleTable, _> = serde_json::from_str(
            r#"{"allow_steal":false,"attack_cost":5,"steal_catch_prob":0.3,
                "work_income":[2,4],"mutable_keys":["attack_cost"],
                "key_ranges":{"attack_cost":{"min":1,"max":9}}}"#,
        );
        let table = parsed.unwrap_or_default();

        assert_eq!(table.get("allow_steal"), Some(&RuleValue::Flag(false)));
        assert_eq!(table.get("attack_cost"), Some(&RuleValue::Int(5)));
        assert_eq!(table.get("work_income"), Some(&RuleValue::Pair([2, 4])));
        assert!(matches!(table.get("steal_catch_prob"), Some(RuleValue::Float(_))));
        assert!(matches!(table.get("mutable_keys"), Some(RuleValue::Keys(k)) if k.len() == 1));
        assert!(matches!(table.get("key_ranges"), Some(RuleValue::Ranges(r)) if r.contains_key("attack_cost")));
    }

    #[test]
    fn key_range_is_inclusive_and_open_ended() {
        let bounded = KeyRange::between(1.0, 3.0);
        assert!(bounded.contains(1.0));
        assert!(bounded.contains(3.0));
        assert!(!bounded.contains(3.5));

        let floor_only = KeyRange {
            min: Some(0.0),
            max: None,
        };
        assert!(floor_only.contains(1e9));
        assert!(!floor_only.contains(-1.0));
    }

    #[test]
    fn default_table_lists_every_mutable_key_with_a_value() {
        let table = default_rule_table();
        let Some(RuleValue::Keys(mutable)) = table.get(keys::MUTABLE_KEYS) else {
            return;
        };
        for key in mutable {
            assert!(table.contains_key(key), "mutable key {key} has no default");
        }
    }
}
