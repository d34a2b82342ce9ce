//! In-memory store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationId, LegacyAnnotation, PERSONAL_EVENT};
use crate::error::EventCalResult;
use crate::event::{Event, EventId};
use crate::store::{EntityStore, Page, ParticipationStore};
use crate::user::{User, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Relationship {
    user: UserId,
    event: EventId,
}

/// Store kept entirely in memory. Also the snapshot format of [`FileStore`](super::FileStore).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    events: BTreeMap<EventId, Event>,
    #[serde(default)]
    users: BTreeMap<UserId, User>,
    // Insertion order is listing order
    #[serde(default)]
    relationships: Vec<Relationship>,
    #[serde(default)]
    annotations: Vec<LegacyAnnotation>,
    #[serde(default)]
    next_annotation_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityStore for MemoryStore {
    fn event(&self, id: EventId) -> EventCalResult<Option<Event>> {
        Ok(self.events.get(&id).cloned())
    }

    fn user(&self, id: UserId) -> EventCalResult<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    fn events(&self) -> EventCalResult<Vec<Event>> {
        Ok(self.events.values().cloned().collect())
    }

    fn put_event(&mut self, event: Event) -> EventCalResult<()> {
        self.events.insert(event.id, event);
        Ok(())
    }

    fn put_user(&mut self, user: User) -> EventCalResult<()> {
        self.users.insert(user.id, user);
        Ok(())
    }
}

impl ParticipationStore for MemoryStore {
    fn add_relationship(&mut self, user: UserId, event: EventId) -> EventCalResult<bool> {
        let rel = Relationship { user, event };
        if self.relationships.contains(&rel) {
            return Ok(false);
        }
        self.relationships.push(rel);
        Ok(true)
    }

    fn remove_relationship(&mut self, user: UserId, event: EventId) -> EventCalResult<bool> {
        let before = self.relationships.len();
        self.relationships
            .retain(|r| !(r.user == user && r.event == event));
        Ok(self.relationships.len() != before)
    }

    fn has_relationship(&self, user: UserId, event: EventId) -> EventCalResult<bool> {
        Ok(self
            .relationships
            .iter()
            .any(|r| r.user == user && r.event == event))
    }

    fn count_relationships(&self, event: EventId) -> EventCalResult<u64> {
        Ok(self.relationships.iter().filter(|r| r.event == event).count() as u64)
    }

    fn list_relationships(&self, event: EventId, page: Page) -> EventCalResult<Vec<UserId>> {
        Ok(self
            .relationships
            .iter()
            .filter(|r| r.event == event)
            .skip(page.offset)
            .take(page.limit)
            .map(|r| r.user)
            .collect())
    }

    fn annotations(&self, event: EventId) -> EventCalResult<Vec<LegacyAnnotation>> {
        Ok(self
            .annotations
            .iter()
            .filter(|a| a.event == event && a.is_personal_event())
            .cloned()
            .collect())
    }

    fn add_annotation(&mut self, event: EventId, value: String) -> EventCalResult<AnnotationId> {
        self.next_annotation_id += 1;
        let id = AnnotationId(self.next_annotation_id);
        self.annotations.push(LegacyAnnotation {
            id,
            event,
            name: PERSONAL_EVENT.to_string(),
            value,
        });
        Ok(id)
    }

    fn delete_annotation(&mut self, id: AnnotationId) -> EventCalResult<bool> {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        Ok(self.annotations.len() != before)
    }
}
