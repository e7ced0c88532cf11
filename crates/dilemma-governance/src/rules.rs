//! The live rule table.
//!
//! # Invariants
//!
//! - `version` starts at 1 and grows by exactly one per applied mutation.
//! - Rule values change only through [`RuleSet::apply_mutation`].
//! - A mutation either applies fully (value, version, history) or not at all.

use core::fmt;

use dilemma_types::{AgentId, KeyRange, MutationRecord, RuleTable, RuleValue, keys};

/// Version of a freshly built rule table.
pub const INITIAL_VERSION: u64 = 1;

// ---------------------------------------------------------------------------
// MutationRejection
// ---------------------------------------------------------------------------

/// Why the rule table refused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationRejection {
    /// The key is not in `mutable_keys`.
    KeyNotMutable,
    /// The value falls outside the key's configured range.
    ValueOutOfRange,
}

impl MutationRejection {
    /// The machine-readable reason string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyNotMutable => "key_not_mutable",
            Self::ValueOutOfRange => "value_out_of_range",
        }
    }
}

impl fmt::Display for MutationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// The current rule values, their version, and every change applied so far.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    values: RuleTable,
    version: u64,
    history: Vec<MutationRecord>,
}

impl RuleSet {
    /// Wrap a rule table at version 1 with an empty history.
    pub const fn new(values: RuleTable) -> Self {
        Self {
            values,
            version: INITIAL_VERSION,
            history: Vec::new(),
        }
    }

    /// The current values.
    pub const fn values(&self) -> &RuleTable {
        &self.values
    }

    /// The current version.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Applied mutations, oldest first.
    pub fn history(&self) -> &[MutationRecord] {
        &self.history
    }

    // -----------------------------------------------------------------------
    // Typed lookups
    // -----------------------------------------------------------------------

    /// A boolean rule. Integers count as true when non-zero.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(RuleValue::Flag(v)) => *v,
            Some(RuleValue::Int(v)) => *v != 0,
            _ => default,
        }
    }

    /// An integer rule. Floats truncate toward zero.
    pub fn int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(RuleValue::Int(v)) => *v,
            Some(RuleValue::Float(v)) => truncate(*v),
            _ => default,
        }
    }

    /// A numeric rule as `f64`.
    pub fn float(&self, key: &str, default: f64) -> f64 {
        self.values
            .get(key)
            .and_then(RuleValue::as_number)
            .unwrap_or(default)
    }

    /// An inclusive integer pair, returned as `(low, high)` with `low <= high`.
    pub fn pair(&self, key: &str, default: (i64, i64)) -> (i64, i64) {
        let (a, b) = match self.values.get(key) {
            Some(RuleValue::Pair([a, b])) => (*a, *b),
            _ => default,
        };
        (a.min(b), a.max(b))
    }

    /// Whether proposals may change `key`.
    pub fn is_mutable(&self, key: &str) -> bool {
        match self.values.get(keys::MUTABLE_KEYS) {
            Some(RuleValue::Keys(mutable)) => mutable.iter().any(|k| k == key),
            _ => false,
        }
    }

    /// The configured bounds for `key`, if any.
    pub fn range_for(&self, key: &str) -> Option<&KeyRange> {
        match self.values.get(keys::KEY_RANGES) {
            Some(RuleValue::Ranges(ranges)) => ranges.get(key),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Set `key` to `value` on behalf of `by` during `turn`.
    ///
    /// Refuses keys outside `mutable_keys` and numeric values outside the
    /// key's `key_ranges` entry. Non-numeric values skip the range check.
    /// On success the version is bumped, a [`MutationRecord`] is appended,
    /// and the new version is returned.
    pub fn apply_mutation(
        &mut self,
        key: &str,
        value: &RuleValue,
        by: AgentId,
        turn: u32,
    ) -> Result<u64, MutationRejection> {
        if !self.is_mutable(key) {
            return Err(MutationRejection::KeyNotMutable);
        }

        let out_of_range = self
            .range_for(key)
            .zip(value.as_number())
            .is_some_and(|(range, number)| !range.contains(number));
        if out_of_range {
            return Err(MutationRejection::ValueOutOfRange);
        }

        let previous = self.values.insert(key.to_owned(), value.clone());
        self.version = self.version.saturating_add(1);
        self.history.push(MutationRecord {
            turn,
            by,
            version: self.version,
            key: key.to_owned(),
            previous,
            value: value.clone(),
        });
        Ok(self.version)
    }
}

/// Truncate a float rule toward zero, saturating at the `i64` bounds.
#[allow(clippy::cast_possible_truncation)] // `as` saturates for f64 -> i64
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
