//! JSON snapshot store.

use std::path::{Path, PathBuf};

use crate::annotation::{AnnotationId, LegacyAnnotation};
use crate::error::{EventCalError, EventCalResult};
use crate::event::{Event, EventId};
use crate::store::{EntityStore, MemoryStore, Page, ParticipationStore};
use crate::user::{User, UserId};

/// Keeps a [`MemoryStore`] in sync with a JSON file. Every mutation rewrites
/// the whole snapshot through a temp file and rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> EventCalResult<Self> {
        let path = path.into();

        let inner = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                EventCalError::Serialization(format!("{}: {e}", path.display()))
            })?
        } else {
            MemoryStore::default()
        };

        Ok(FileStore { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, snapshot: &MemoryStore) -> EventCalResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| EventCalError::Serialization(e.to_string()))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to a copy of the store and keep it only once the
    /// snapshot is on disk. `change` reports whether anything changed;
    /// unchanged copies are dropped without writing.
    fn commit<R>(
        &mut self,
        change: impl FnOnce(&mut MemoryStore) -> EventCalResult<(R, bool)>,
    ) -> EventCalResult<R> {
        let mut next = self.inner.clone();
        let (result, changed) = change(&mut next)?;

        if changed {
            self.write(&next)?;
            self.inner = next;
        }
        Ok(result)
    }
}

impl EntityStore for FileStore {
    fn event(&self, id: EventId) -> EventCalResult<Option<Event>> {
        self.inner.event(id)
    }

    fn user(&self, id: UserId) -> EventCalResult<Option<User>> {
        self.inner.user(id)
    }

    fn events(&self) -> EventCalResult<Vec<Event>> {
        self.inner.events()
    }

    fn put_event(&mut self, event: Event) -> EventCalResult<()> {
        self.commit(|store| Ok((store.put_event(event)?, true)))
    }

    fn put_user(&mut self, user: User) -> EventCalResult<()> {
        self.commit(|store| Ok((store.put_user(user)?, true)))
    }
}

impl ParticipationStore for FileStore {
    fn add_relationship(&mut self, user: UserId, event: EventId) -> EventCalResult<bool> {
        self.commit(|store| {
            let added = store.add_relationship(user, event)?;
            Ok((added, added))
        })
    }

    fn remove_relationship(&mut self, user: UserId, event: EventId) -> EventCalResult<bool> {
        self.commit(|store| {
            let removed = store.remove_relationship(user, event)?;
            Ok((removed, removed))
        })
    }

    fn has_relationship(&self, user: UserId, event: EventId) -> EventCalResult<bool> {
        self.inner.has_relationship(user, event)
    }

    fn count_relationships(&self, event: EventId) -> EventCalResult<u64> {
        self.inner.count_relationships(event)
    }

    fn list_relationships(&self, event: EventId, page: Page) -> EventCalResult<Vec<UserId>> {
        self.inner.list_relationships(event, page)
    }

    fn annotations(&self, event: EventId) -> EventCalResult<Vec<LegacyAnnotation>> {
        self.inner.annotations(event)
    }

    fn add_annotation(&mut self, event: EventId, value: String) -> EventCalResult<AnnotationId> {
        self.commit(|store| Ok((store.add_annotation(event, value)?, true)))
    }

    fn delete_annotation(&mut self, id: AnnotationId) -> EventCalResult<bool> {
        self.commit(|store| {
            let deleted = store.delete_annotation(id)?;
            Ok((deleted, deleted))
        })
    }
}
