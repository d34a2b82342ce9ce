use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use eventcal_core::event::SUBTYPE;
use eventcal_core::{Catalog, EventCalConfig, FileStore, OverlapCheck, ParticipationRegistry};
use tracing::info;

use crate::notices::Notices;

pub type Registry = ParticipationRegistry<FileStore>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // Locked for a whole action so two joins cannot both pass the capacity check
    registry: Arc<Mutex<Registry>>,
    notices: Arc<Mutex<Notices>>,
}

impl AppState {
    pub fn new(config: &EventCalConfig) -> Result<Self> {
        let store = FileStore::open(config.data_path())?;
        info!(path = %store.path().display(), subtype = SUBTYPE, "Opened participation store");

        let catalog = match config.language_path() {
            Some(path) => Catalog::load(&path)?,
            None => Catalog::english(),
        };

        let settings = config.settings.clone();
        let collisions = OverlapCheck::from_settings(&settings);

        Ok(Self::from_registry(ParticipationRegistry::new(
            store, collisions, catalog, settings,
        )))
    }

    pub fn from_registry(registry: Registry) -> Self {
        AppState {
            registry: Arc::new(Mutex::new(registry)),
            notices: Arc::new(Mutex::new(Notices::default())),
        }
    }

    pub fn registry(&self) -> Result<MutexGuard<'_, Registry>> {
        self.registry
            .lock()
            .map_err(|_| anyhow!("Registry lock poisoned"))
    }

    pub fn notices(&self) -> Result<MutexGuard<'_, Notices>> {
        self.notices
            .lock()
            .map_err(|_| anyhow!("Notice queue lock poisoned"))
    }
}
