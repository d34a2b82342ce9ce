//! Participation registry.
//!
//! Tracks which users have added an event to their personal calendar.
//! Reads merge the current relationship form with legacy annotations;
//! writes only ever create relationships.
//!
//! Known gap: a user recorded in both forms is counted and listed twice by
//! [`ParticipationRegistry::participant_count`] and
//! [`ParticipationRegistry::participants`]. Existing installations rely on
//! these numbers, so the sum is kept as is.

use std::fmt;

use tracing::{debug, info, warn};

use crate::collision::{CollisionCheck, OverlapCheck};
use crate::config::Settings;
use crate::error::{EventCalError, EventCalResult};
use crate::event::{Event, EventId};
use crate::i18n::{escape_html, Catalog, Translator};
use crate::permission::{self, ManageStatus};
use crate::store::{participates, EntityStore, Page, ParticipationStore};
use crate::user::{User, UserId};

/// Result of asking to join an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Added,
    AlreadyParticipating,
    Collision,
    Full,
}

impl JoinOutcome {
    pub fn added(&self) -> bool {
        *self == JoinOutcome::Added
    }
}

impl fmt::Display for JoinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            JoinOutcome::Added => "added",
            JoinOutcome::AlreadyParticipating => "already participating",
            JoinOutcome::Collision => "collides with another event",
            JoinOutcome::Full => "event is full",
        };
        write!(f, "{s}")
    }
}

pub struct ParticipationRegistry<S, C = OverlapCheck, T = Catalog> {
    store: S,
    collisions: C,
    translator: T,
    settings: Settings,
}

impl<S> ParticipationRegistry<S, OverlapCheck, Catalog>
where
    S: EntityStore + ParticipationStore,
{
    /// Registry with overlap detection driven by `settings` and English texts.
    pub fn with_settings(store: S, settings: Settings) -> Self {
        let collisions = OverlapCheck::from_settings(&settings);
        Self::new(store, collisions, Catalog::english(), settings)
    }
}

impl<S, C, T> ParticipationRegistry<S, C, T> {
    pub fn new(store: S, collisions: C, translator: T, settings: Settings) -> Self {
        ParticipationRegistry {
            store,
            collisions,
            translator,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }
}

impl<S, C, T> ParticipationRegistry<S, C, T>
where
    S: EntityStore + ParticipationStore,
    C: CollisionCheck<S>,
    T: Translator,
{
    pub fn find_event(&self, id: EventId) -> EventCalResult<Option<Event>> {
        self.store.event(id)
    }

    pub fn event(&self, id: EventId) -> EventCalResult<Event> {
        self.find_event(id)?.ok_or(EventCalError::EventNotFound(id))
    }

    pub fn find_user(&self, id: UserId) -> EventCalResult<Option<User>> {
        self.store.user(id)
    }

    pub fn user(&self, id: UserId) -> EventCalResult<User> {
        self.find_user(id)?.ok_or(EventCalError::UserNotFound(id))
    }

    /// Whether the event is on the user's personal calendar, in either form.
    /// A failing store reads as "not participating".
    pub fn is_participating(&self, event: &Event, user: &User) -> bool {
        participates(&self.store, event.id, user.id).unwrap_or_else(|e| {
            warn!(event = %event.id, user = %user.id, error = %e, "Participation lookup failed");
            false
        })
    }

    /// Add the event to the user's personal calendar.
    ///
    /// The steps run check-then-act without a lock; callers sharing a
    /// registry between requests must serialize joins themselves.
    pub fn join(&mut self, event: &Event, user: &User) -> EventCalResult<JoinOutcome> {
        let outcome = if self.is_participating(event, user) {
            JoinOutcome::AlreadyParticipating
        } else if self.collisions.has_collision(&self.store, event, user.id)? {
            JoinOutcome::Collision
        } else if self.is_full(event)? {
            JoinOutcome::Full
        } else if self.store.add_relationship(user.id, event.id)? {
            JoinOutcome::Added
        } else {
            JoinOutcome::AlreadyParticipating
        };

        if outcome.added() {
            info!(event = %event.id, user = %user.id, "Joined event");
        } else {
            debug!(event = %event.id, user = %user.id, %outcome, "Join rejected");
        }

        Ok(outcome)
    }

    /// Remove the event from the user's personal calendar, purging legacy
    /// records as well. Never fails; storage errors are logged.
    pub fn leave(&mut self, event: &Event, user: &User) {
        if let Err(e) = self.store.remove_relationship(user.id, event.id) {
            warn!(event = %event.id, user = %user.id, error = %e, "Could not remove relationship");
        }

        let annotations = match self.store.annotations(event.id) {
            Ok(annotations) => annotations,
            Err(e) => {
                warn!(event = %event.id, error = %e, "Could not read legacy annotations");
                return;
            }
        };

        for annotation in annotations.iter().filter(|a| a.records(user.id)) {
            if let Err(e) = self.store.delete_annotation(annotation.id) {
                warn!(annotation = %annotation.id, error = %e, "Could not delete legacy annotation");
            }
        }

        debug!(event = %event.id, user = %user.id, "Left event");
    }

    /// Legacy annotation rows plus relationships.
    pub fn participant_count(&self, event: &Event) -> EventCalResult<u64> {
        let legacy = self.store.annotations(event.id)?.len() as u64;
        let current = self.store.count_relationships(event.id)?;
        Ok(legacy + current)
    }

    /// Every user recorded by a legacy annotation, followed by one page of
    /// related users. The page only applies to the relationship part.
    pub fn participants(&self, event: &Event, page: Page) -> EventCalResult<Vec<User>> {
        let mut users = Vec::new();

        for annotation in self.store.annotations(event.id)? {
            let Some(id) = annotation.user() else {
                continue;
            };
            if let Some(user) = self.store.user(id)? {
                users.push(user);
            }
        }

        for id in self.store.list_relationships(event.id, page)? {
            if let Some(user) = self.store.user(id)? {
                users.push(user);
            }
        }

        Ok(users)
    }

    /// Only meaningful when capacity is enforced (`spots_display`).
    pub fn is_full(&self, event: &Event) -> EventCalResult<bool> {
        if !self.settings.spots_display {
            return Ok(false);
        }
        Ok(self.participant_count(event)? >= u64::from(event.spots))
    }

    /// Events on the user's personal calendar, in id order.
    pub fn personal_calendar(&self, user: &User) -> EventCalResult<Vec<Event>> {
        let mut events = Vec::new();
        for event in self.store.events()? {
            if participates(&self.store, event.id, user.id)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Region for display, escaped for HTML.
    pub fn region_label(&self, event: &Event) -> String {
        let region = event.region.trim();

        if self.settings.region_list_handles {
            let key = format!("event_calendar:region:{region}");
            escape_html(&self.translator.translate(&key))
        } else {
            escape_html(region)
        }
    }

    /// Event type for display, escaped for HTML. An empty type stays empty.
    pub fn type_label(&self, event: &Event) -> String {
        let event_type = event.event_type.trim();

        if event_type.is_empty() {
            return String::new();
        }

        if self.settings.type_list_handles {
            let key = format!("event_calendar:type:{event_type}");
            escape_html(&self.translator.translate(&key))
        } else {
            escape_html(event_type)
        }
    }

    pub fn can_manage(&self, event: &Event, acting: Option<&User>) -> ManageStatus {
        permission::resolve(self.settings.personal_manage, event, acting)
    }
}
