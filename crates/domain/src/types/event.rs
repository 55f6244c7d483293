//! Calendar events and the "event created" notification

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as persisted by the calendar service.
///
/// Start and end times keep the offset they were created with so that
/// "local hour" decisions are made in the event's own timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub location: String,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event starts strictly after `now`.
    pub fn starts_after(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.with_timezone(&Utc) > now
    }
}

/// Body of an `event.created` broker message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreated {
    pub id: String,
    pub location: String,
    pub starts_at: DateTime<FixedOffset>,
}

impl EventCreated {
    /// Decode a message body.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

impl From<&Event> for EventCreated {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            location: event.location.clone(),
            starts_at: event.starts_at,
        }
    }
}
