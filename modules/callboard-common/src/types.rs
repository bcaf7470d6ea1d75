use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CallboardError;

/// Default lead time between creating an event and its scheduled start.
const DEFAULT_START_DELAY_HOURS: i64 = 1;

// --- Identities ---

/// Stored admin account. The secret is compared verbatim; no hashing
/// scheme is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub secret: String,
}

/// Resolved caller identity. A failed or missing credential presentation
/// is always `Anonymous`, never an error, so ownership checks stay
/// exhaustive instead of treating a parse failure as a valid user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Verified(String),
}

impl Identity {
    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::Verified(u) => Some(u),
        }
    }

    /// True iff this identity is the event's owner. Ownerless
    /// (auto-created) events have no owner, so nobody owns them.
    pub fn owns(&self, event: &Event) -> bool {
        match (self.username(), event.owner.as_deref()) {
            (Some(caller), Some(owner)) => caller == owner,
            _ => false,
        }
    }
}

// --- Queue types ---

/// One named entry in an event's queue. `id` is the stable identity;
/// positions shift, ids never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: String,
    pub name: String,
}

/// A named queue event: one record per slug, serialized as a whole blob.
/// `start_time` travels as epoch milliseconds, matching what pollers
/// already consume. The Scheduled/Live phase is derived from `start_time`
/// on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub slug: String,
    /// Set once at creation, immutable after. `None` only for events
    /// auto-created in the permissive mode.
    pub owner: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    pub current_index: usize,
    pub items: Vec<QueueEntry>,
}

impl Event {
    /// New event with the default one-hour lead, empty queue.
    pub fn new(slug: impl Into<String>, owner: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            slug: slug.into(),
            owner,
            start_time: now + Duration::hours(DEFAULT_START_DELAY_HOURS),
            current_index: 0,
            items: Vec::new(),
        }
    }

    pub fn is_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    /// The entry being served: `items[current_index]` if in range, else
    /// none. A stale out-of-range index degrades to "queue complete"
    /// rather than panicking.
    pub fn current(&self) -> Option<&QueueEntry> {
        self.items.get(self.current_index)
    }

    /// Append a new entry with a fresh id. `current_index` is untouched.
    pub fn append(&mut self, name: &str) -> Result<QueueEntry, CallboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CallboardError::Validation(
                "entry name must not be empty".to_string(),
            ));
        }
        let entry = QueueEntry {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.items.push(entry.clone());
        Ok(entry)
    }

    /// Remove an entry by id. Returns false if no entry had that id.
    ///
    /// `current_index` follows the entry that was current *by identity*:
    /// it becomes that entry's new position if it survived the removal,
    /// and resets to 0 if it was the one removed (or nothing was current).
    /// Without this, removing an earlier entry would silently hand
    /// "current" to an unrelated neighbor.
    pub fn remove(&mut self, id: &str) -> bool {
        let current_id = self.current().map(|e| e.id.clone());
        let before = self.items.len();
        self.items.retain(|e| e.id != id);
        if self.items.len() == before {
            return false;
        }
        self.current_index = current_id
            .and_then(|cid| self.items.iter().position(|e| e.id == cid))
            .unwrap_or(0);
        true
    }

    /// Move to the next entry, saturating at the last one. A no-op on an
    /// empty queue and when already at the end.
    pub fn advance(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current_index = (self.current_index + 1).min(self.items.len() - 1);
    }

    /// Replace the start time outright. Rescheduling into the past is
    /// legal and flips the derived phase to Live on the next view.
    pub fn reschedule(&mut self, start_time: DateTime<Utc>) {
        self.start_time = start_time;
    }

    /// Apply a sparse patch: present fields replace wholesale, absent
    /// fields are untouched. Last write wins; there is no merge.
    pub fn apply(&mut self, patch: EventPatch) {
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(current_index) = patch.current_index {
            self.current_index = current_index;
        }
        if let Some(items) = patch.items {
            self.items = items;
        }
    }

    /// The visibility-filtered view for a caller. Before start, anyone
    /// but the owner gets the redacted form: start time and phase only,
    /// queue membership hidden. This is an information-hiding rule, not
    /// an optimization.
    pub fn view_for(&self, identity: &Identity, now: DateTime<Utc>) -> EventView {
        let is_started = self.is_started(now);
        if !is_started && !identity.owns(self) {
            return EventView {
                slug: None,
                start_time: self.start_time,
                is_started: false,
                current_index: None,
                current: None,
                queue: Vec::new(),
            };
        }
        EventView {
            slug: Some(self.slug.clone()),
            start_time: self.start_time,
            is_started,
            current_index: Some(self.current_index),
            current: self.current().cloned(),
            queue: self.items.clone(),
        }
    }
}

/// What a poller sees. The redacted pre-start form omits slug and index
/// entirely and serializes `current: null, queue: []`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    pub is_started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
    pub current: Option<QueueEntry>,
    pub queue: Vec<QueueEntry>,
}

/// Sparse field-level update over an event. `queue` is accepted as an
/// alias for `items` because that is the name the public view exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
    #[serde(default, alias = "queue", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<QueueEntry>>,
}
