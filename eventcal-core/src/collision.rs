//! Scheduling collision detection.

use tracing::debug;

use crate::config::Settings;
use crate::error::EventCalResult;
use crate::event::Event;
use crate::store::{participates, EntityStore, ParticipationStore};
use crate::user::UserId;

/// Decides whether joining `event` would clash with the user's calendar.
pub trait CollisionCheck<S: ?Sized> {
    fn has_collision(&self, store: &S, event: &Event, user: UserId) -> EventCalResult<bool>;
}

/// Rejects joining an event whose time window overlaps another event the
/// user already participates in. Disabled unless `no_collisions` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapCheck {
    enabled: bool,
}

impl OverlapCheck {
    pub fn new(enabled: bool) -> Self {
        OverlapCheck { enabled }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.no_collisions)
    }
}

impl<S> CollisionCheck<S> for OverlapCheck
where
    S: EntityStore + ParticipationStore + ?Sized,
{
    fn has_collision(&self, store: &S, event: &Event, user: UserId) -> EventCalResult<bool> {
        if !self.enabled {
            return Ok(false);
        }

        let window = event.window();

        for other in store.events()? {
            if other.id == event.id || !other.window().overlaps(&window) {
                continue;
            }
            if participates(store, other.id, user)? {
                debug!(event = %event.id, other = %other.id, user = %user, "Event collides");
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;
    use crate::store::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 14, hour, 0, 0).unwrap()
    }

    fn event(id: u64, start: u32, end: u32) -> Event {
        let mut event = Event::new(EventId(id), format!("event {id}"), UserId(100), at(start));
        event.end = Some(at(end));
        event
    }

    fn store_with(events: &[Event]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for e in events {
            store.put_event(e.clone()).unwrap();
        }
        store
    }

    #[test]
    fn disabled_check_never_collides() {
        let a = event(1, 9, 11);
        let b = event(2, 10, 12);
        let mut store = store_with(&[a.clone(), b.clone()]);
        store.add_relationship(UserId(1), a.id).unwrap();

        assert!(!OverlapCheck::new(false).has_collision(&store, &b, UserId(1)).unwrap());
    }

    #[test]
    fn overlapping_joined_event_collides() {
        let a = event(1, 9, 11);
        let b = event(2, 10, 12);
        let mut store = store_with(&[a.clone(), b.clone()]);
        store.add_relationship(UserId(1), a.id).unwrap();

        let check = OverlapCheck::new(true);
        assert!(check.has_collision(&store, &b, UserId(1)).unwrap());
        // Other users are unaffected
        assert!(!check.has_collision(&store, &b, UserId(2)).unwrap());
    }

    #[test]
    fn legacy_participation_also_collides() {
        let a = event(1, 9, 11);
        let b = event(2, 10, 12);
        let mut store = store_with(&[a.clone(), b.clone()]);
        store.add_annotation(a.id, "1".into()).unwrap();

        assert!(OverlapCheck::new(true).has_collision(&store, &b, UserId(1)).unwrap());
    }

    #[test]
    fn disjoint_event_does_not_collide() {
        let a = event(1, 9, 10);
        let b = event(2, 13, 14);
        let mut store = store_with(&[a.clone(), b.clone()]);
        store.add_relationship(UserId(1), a.id).unwrap();

        assert!(!OverlapCheck::new(true).has_collision(&store, &b, UserId(1)).unwrap());
    }

    #[test]
    fn event_does_not_collide_with_itself() {
        let a = event(1, 9, 10);
        let mut store = store_with(&[a.clone()]);
        store.add_relationship(UserId(1), a.id).unwrap();

        assert!(!OverlapCheck::new(true).has_collision(&store, &a, UserId(1)).unwrap());
    }
}
