//! Legacy participation records.
//!
//! Before participation became a relationship, joining an event stored an
//! annotation named `personal_event` on the event whose value was the
//! user's id as text. Existing data still carries these rows, so they are
//! read alongside relationships and purged on leave, but never written by
//! a join.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::user::UserId;

/// Annotation and relationship name for personal calendar membership.
pub const PERSONAL_EVENT: &str = "personal_event";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyAnnotation {
    pub id: AnnotationId,
    pub event: EventId,
    pub name: String,
    pub value: String,
}

impl LegacyAnnotation {
    pub fn is_personal_event(&self) -> bool {
        self.name == PERSONAL_EVENT
    }

    /// The user this annotation records, if the value is a user id.
    pub fn user(&self) -> Option<UserId> {
        self.value.parse().ok()
    }

    pub fn records(&self, user: UserId) -> bool {
        self.is_personal_event() && self.user() == Some(user)
    }
}
