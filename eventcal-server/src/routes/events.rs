//! Read-only event views

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use eventcal_core::{Event, EventId, EventStatus, ManageStatus, Page, UserId};
use serde::Serialize;

use crate::routes::AppError;
use crate::session::SessionUser;
use crate::state::{AppState, Registry};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events/{id}", get(show_event))
        .route("/events/{id}/participants", get(list_participants))
        .route("/calendar", get(personal_calendar))
}

/// Event as shown on its page
#[derive(Serialize)]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub status: EventStatus,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub region: String,
    pub event_type: String,
    pub spots: u32,
    pub participants: u64,
    pub is_full: bool,
    pub participating: bool,
    pub can_manage: ManageStatus,
}

#[derive(Serialize)]
pub struct ParticipantView {
    pub id: UserId,
    pub name: String,
}

/// Short form used in calendar listings
#[derive(Serialize)]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub region: String,
    pub event_type: String,
}

impl EventSummary {
    fn new(registry: &Registry, event: &Event) -> Self {
        EventSummary {
            id: event.id,
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            region: registry.region_label(event),
            event_type: registry.type_label(event),
        }
    }
}

fn load_event(registry: &Registry, id: EventId) -> Result<Event, AppError> {
    registry
        .find_event(id)?
        .ok_or_else(|| AppError::not_found(format!("Event not found: {id}")))
}

/// GET /events/:id - Event details for the acting user
async fn show_event(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<EventId>,
) -> Result<Json<EventView>, AppError> {
    let registry = state.registry()?;
    let event = load_event(&registry, id)?;

    let participating = user
        .as_ref()
        .is_some_and(|u| registry.is_participating(&event, u));

    Ok(Json(EventView {
        id: event.id,
        title: event.title.clone(),
        status: event.status,
        start: event.start,
        end: event.end,
        region: registry.region_label(&event),
        event_type: registry.type_label(&event),
        spots: event.spots,
        participants: registry.participant_count(&event)?,
        is_full: registry.is_full(&event)?,
        participating,
        can_manage: registry.can_manage(&event, user.as_ref()),
    }))
}

/// GET /events/:id/participants - Users who added the event to their calendar
async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<ParticipantView>>, AppError> {
    let registry = state.registry()?;
    let event = load_event(&registry, id)?;

    let participants = registry
        .participants(&event, page)?
        .into_iter()
        .map(|u| ParticipantView {
            id: u.id,
            name: u.name,
        })
        .collect();

    Ok(Json(participants))
}

/// GET /calendar - The acting user's personal calendar
async fn personal_calendar(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    let user = user.ok_or_else(AppError::unauthorized)?;
    let registry = state.registry()?;

    let events = registry
        .personal_calendar(&user)?
        .iter()
        .map(|e| EventSummary::new(&registry, e))
        .collect();

    Ok(Json(events))
}
