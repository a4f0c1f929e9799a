//! Append-only stage journal shared by publish and preview runs.

use super::JournalCorrupt;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped entry in a run journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    message: String,
    timestamp: DateTime<Utc>,
    duration_ms: Option<i64>,
}

impl StageEvent {
    /// Returns the human-readable stage message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns when the event was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns milliseconds elapsed since the previous event, if any.
    #[must_use]
    pub const fn duration_ms(&self) -> Option<i64> {
        self.duration_ms
    }

    /// Returns the elapsed time since the previous event, if any.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.duration_ms.map(TimeDelta::milliseconds)
    }
}

/// Ordered, append-only log of stage events.
///
/// Events are never removed or reordered. Each appended event carries the
/// wall-clock time elapsed since the event before it; the first event has
/// no duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal(Vec<StageEvent>);

impl Journal {
    /// Creates an empty journal.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns a journal whose only event is `message` at `now`.
    #[must_use]
    pub fn starting_with(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new().append(message, now)
    }

    /// Returns this journal with one more event appended.
    #[must_use]
    pub fn append(mut self, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        self.push(message, now);
        self
    }

    /// Appends an event in place.
    pub fn push(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        let duration_ms = self
            .0
            .last()
            .map(|previous| (now - previous.timestamp).num_milliseconds());
        self.0.push(StageEvent {
            message: message.into(),
            timestamp: now,
            duration_ms,
        });
    }

    /// Returns the recorded events in insertion order.
    #[must_use]
    pub fn events(&self) -> &[StageEvent] {
        &self.0
    }

    /// Returns the most recent event.
    #[must_use]
    pub fn last(&self) -> Option<&StageEvent> {
        self.0.last()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no event has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the journal into its persisted text form.
    ///
    /// # Errors
    ///
    /// Returns the serializer error when encoding fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a journal from its persisted text form.
    ///
    /// # Errors
    ///
    /// Returns [`JournalCorrupt`] when the text is not a valid journal.
    pub fn decode(raw: &str) -> Result<Self, JournalCorrupt> {
        serde_json::from_str(raw).map_err(|err| JournalCorrupt(err.to_string()))
    }

    /// Parses a persisted journal, falling back to an empty journal.
    ///
    /// Prior history is lost when the text is corrupt, but the run is never
    /// blocked by it.
    #[must_use]
    pub fn decode_or_empty(raw: &str) -> Self {
        match Self::decode(raw) {
            Ok(journal) => journal,
            Err(err) => {
                tracing::warn!(error = %err, "resetting corrupt stage journal");
                Self::new()
            }
        }
    }
}
