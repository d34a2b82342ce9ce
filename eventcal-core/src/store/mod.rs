//! Storage collaborators for the participation registry.
//!
//! Participation is persisted in two forms: a `personal_event` relationship
//! from user to event (current) and `personal_event` annotations on the
//! event (legacy). Callers go through [`participates`] and the registry so
//! that both forms are always consulted together.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Deserialize;

use crate::annotation::{AnnotationId, LegacyAnnotation};
use crate::error::EventCalResult;
use crate::event::{Event, EventId};
use crate::user::{User, UserId};

const DEFAULT_PAGE_LIMIT: usize = 10;

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

/// Offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Page { offset, limit }
    }
}

/// Lookup of events and users.
pub trait EntityStore {
    fn event(&self, id: EventId) -> EventCalResult<Option<Event>>;
    fn user(&self, id: UserId) -> EventCalResult<Option<User>>;
    fn events(&self) -> EventCalResult<Vec<Event>>;

    fn put_event(&mut self, event: Event) -> EventCalResult<()>;
    fn put_user(&mut self, user: User) -> EventCalResult<()>;
}

/// Both participation forms.
pub trait ParticipationStore {
    /// Returns false when the relationship already existed.
    fn add_relationship(&mut self, user: UserId, event: EventId) -> EventCalResult<bool>;
    /// Returns false when there was nothing to remove.
    fn remove_relationship(&mut self, user: UserId, event: EventId) -> EventCalResult<bool>;
    fn has_relationship(&self, user: UserId, event: EventId) -> EventCalResult<bool>;
    fn count_relationships(&self, event: EventId) -> EventCalResult<u64>;
    /// Users related to `event`, oldest first.
    fn list_relationships(&self, event: EventId, page: Page) -> EventCalResult<Vec<UserId>>;

    /// Legacy `personal_event` annotations on `event`.
    fn annotations(&self, event: EventId) -> EventCalResult<Vec<LegacyAnnotation>>;
    /// Only used to import historical data.
    fn add_annotation(&mut self, event: EventId, value: String) -> EventCalResult<AnnotationId>;
    fn delete_annotation(&mut self, id: AnnotationId) -> EventCalResult<bool>;
}

/// Whether `user` participates in `event` in either form.
pub fn participates<S>(store: &S, event: EventId, user: UserId) -> EventCalResult<bool>
where
    S: ParticipationStore + ?Sized,
{
    if store.has_relationship(user, event)? {
        return Ok(true);
    }

    Ok(store.annotations(event)?.iter().any(|a| a.records(user)))
}
