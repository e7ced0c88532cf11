//! Append-only event log and its replay digest.
//!
//! The digest is SHA-256 over the compact JSON of the whole ordered event
//! list, with object keys sorted, hex-encoded. Two runs with the same seed,
//! roster, and rules produce the same digest.

use sha2::{Digest, Sha256};

use dilemma_types::EventRecord;

/// Errors raised while fingerprinting the log.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// An event could not be serialized.
    #[error("failed to serialize event log: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Ordered record of everything that happened in a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLogger {
    events: Vec<EventRecord>,
}

impl EventLogger {
    /// An empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append one record.
    pub fn log(&mut self, record: EventRecord) {
        self.events.push(record);
    }

    /// Every record, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Number of records.
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been logged.
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hex SHA-256 of the sorted-key compact JSON of the log.
    pub fn digest(&self) -> Result<String, LoggerError> {
        // Going through `Value` sorts object keys.
        let canonical = serde_json::to_value(&self.events)?;
        let bytes = serde_json::to_vec(&canonical)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dilemma_types::{AgentId, EventDetails, Outcome, WorkDetails};

    use super::*;

    fn work_event(turn: u32, gain: i64) -> EventRecord {
        EventRecord {
            turn,
            actor: AgentId::new(0),
            action: String::from("WORK"),
            target: None,
            outcome: Outcome::Success,
            rule_justification: String::from("work_always_allowed"),
            details: EventDetails::new(WorkDetails { success: true, gain }),
        }
    }

    #[test]
    fn empty_log_digest_is_hash_of_empty_array() {
        let logger = EventLogger::new();
        assert_eq!(
            logger.digest().unwrap(),
            hex::encode(Sha256::digest(b"[]"))
        );
    }

    #[test]
    fn digest_is_stable_for_equal_logs() {
        let mut a = EventLogger::new();
        let mut b = EventLogger::new();
        for logger in [&mut a, &mut b] {
            logger.log(work_event(1, 3));
            logger.log(work_event(2, 4));
        }
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);
    }

    #[test]
    fn digest_is_order_sensitive() {
        let mut a = EventLogger::new();
        a.log(work_event(1, 3));
        a.log(work_event(1, 4));
        let mut b = EventLogger::new();
        b.log(work_event(1, 4));
        b.log(work_event(1, 3));
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn canonical_form_sorts_keys() {
        let mut logger = EventLogger::new();
        logger.log(work_event(1, 2));
        let canonical = serde_json::to_value(logger.events()).unwrap();
        let text = serde_json::to_string(&canonical).unwrap();
        assert!(text.starts_with(r#"[{"action":"WORK","actor":0,"details":{"gain":2,"success":true}"#));
    }
}
