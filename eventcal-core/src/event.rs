//! Event calendar entries.
//!
//! An `Event` carries everything the participation registry needs to know
//! about an entry: its capacity, its time window, the region and type codes
//! shown in listings, and who owns it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_window::TimeWindow;
use crate::user::UserId;

/// Object subtype under which event calendar entries are registered.
pub const SUBTYPE: &str = "event_calendar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EventId)
    }
}

/// Publication status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Draft,
    Published,
}

/// Per-event override of who may manage the event on personal calendars.
/// Only consulted when the site-wide policy is `by_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventManage {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub owner: UserId,

    /// Total number of spots available to participants
    #[serde(default)]
    pub spots: u32,
    #[serde(default)]
    pub status: EventStatus,

    // Listing attributes (raw codes, rendered through the registry)
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub event_type: String,

    pub start: DateTime<Utc>,
    /// None means the event occupies only its start instant
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_manage: Option<EventManage>,
}

impl Event {
    pub fn new(id: EventId, title: impl Into<String>, owner: UserId, start: DateTime<Utc>) -> Self {
        Event {
            id,
            title: title.into(),
            owner,
            spots: 0,
            status: EventStatus::default(),
            region: String::new(),
            event_type: String::new(),
            start,
            end: None,
            personal_manage: None,
        }
    }

    /// The span of time the event occupies, used for collision checks.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end.unwrap_or(self.start))
    }

    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }
}
