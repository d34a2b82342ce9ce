//! Core types for eventcal.
//!
//! - `ParticipationRegistry` tracks who has added an event to their
//!   personal calendar, enforcing capacity and collision rules
//! - `store` holds the storage traits and the memory/JSON implementations
//! - `config` loads the plugin settings the registry is built with

pub mod annotation;
pub mod collision;
pub mod config;
pub mod error;
pub mod event;
pub mod i18n;
pub mod permission;
pub mod registry;
pub mod store;
pub mod time_window;
pub mod user;

pub use annotation::{AnnotationId, LegacyAnnotation};
pub use collision::{CollisionCheck, OverlapCheck};
pub use config::{EventCalConfig, Settings};
pub use error::{EventCalError, EventCalResult};
pub use event::{Event, EventId, EventManage, EventStatus};
pub use i18n::{Catalog, Translator};
pub use permission::{ManageStatus, PersonalManage};
pub use registry::{JoinOutcome, ParticipationRegistry};
pub use store::{EntityStore, FileStore, MemoryStore, Page, ParticipationStore};
pub use user::{User, UserId};
