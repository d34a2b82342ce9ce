//! Join and leave actions.
//!
//! Both actions always answer with a redirect back to the referring page.
//! Their outcome is reported as a notice the page picks up from `/notices`.

use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, header::REFERER},
    response::Redirect,
    routing::{get, post},
};
use eventcal_core::i18n::{
    ADD_TO_MY_CALENDAR_ERROR, ADD_TO_MY_CALENDAR_RESPONSE, REMOVE_FROM_MY_CALENDAR_RESPONSE,
};
use eventcal_core::{EventId, Translator};
use serde::Deserialize;
use tracing::{info, warn};

use crate::notices::{Notice, NoticeKind};
use crate::routes::AppError;
use crate::session::SessionUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/action/event_calendar/add_personal", post(add_personal))
        .route("/action/event_calendar/remove_personal", post(remove_personal))
        .route("/notices", get(list_notices))
}

/// Action input: `guid` of the event
#[derive(Deserialize)]
pub struct ActionForm {
    pub guid: Option<String>,
}

fn event_id(form: Result<Form<ActionForm>, FormRejection>) -> Option<EventId> {
    form.ok()?.0.guid?.parse().ok()
}

fn back(headers: &HeaderMap) -> Redirect {
    let target = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("/");
    Redirect::to(target)
}

/// POST /action/event_calendar/add_personal - Add an event to the user's calendar
async fn add_personal(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    headers: HeaderMap,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let redirect = back(&headers);

    let (Some(event_id), Some(user)) = (event_id(form), user) else {
        return Ok(redirect);
    };

    let (kind, message) = {
        let mut registry = state.registry()?;

        let Some(event) = registry.find_event(event_id)? else {
            return Ok(redirect);
        };

        if registry.is_participating(&event, &user) {
            return Ok(redirect);
        }

        let (kind, key) = match registry.join(&event, &user) {
            Ok(outcome) if outcome.added() => (NoticeKind::Success, ADD_TO_MY_CALENDAR_RESPONSE),
            Ok(outcome) => {
                info!(event = %event.id, user = %user.id, %outcome, "Could not add event to calendar");
                (NoticeKind::Error, ADD_TO_MY_CALENDAR_ERROR)
            }
            Err(e) => {
                warn!(event = %event.id, user = %user.id, error = %e, "Join failed");
                (NoticeKind::Error, ADD_TO_MY_CALENDAR_ERROR)
            }
        };

        (kind, registry.translator().translate(key))
    };

    state.notices()?.push(user.id, kind, message);
    Ok(redirect)
}

/// POST /action/event_calendar/remove_personal - Remove an event from the user's calendar
async fn remove_personal(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    headers: HeaderMap,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let redirect = back(&headers);

    let (Some(event_id), Some(user)) = (event_id(form), user) else {
        return Ok(redirect);
    };

    let message = {
        let mut registry = state.registry()?;

        let Some(event) = registry.find_event(event_id)? else {
            return Ok(redirect);
        };

        registry.leave(&event, &user);
        registry
            .translator()
            .translate(REMOVE_FROM_MY_CALENDAR_RESPONSE)
    };

    state.notices()?.push(user.id, NoticeKind::Success, message);
    Ok(redirect)
}

/// GET /notices - Pop queued notices for the logged-in user
async fn list_notices(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> Result<Json<Vec<Notice>>, AppError> {
    let user = user.ok_or_else(AppError::unauthorized)?;
    let notices = state.notices()?.drain(user.id);
    Ok(Json(notices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use crate::session::USER_HEADER;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{TimeZone, Utc};
    use eventcal_core::{
        EntityStore, Event, FileStore, ParticipationRegistry, ParticipationStore, Settings, User,
        UserId,
    };
    use tower::ServiceExt;

    struct Fixture {
        _dir: tempfile::TempDir,
        state: AppState,
        app: Router,
    }

    fn fixture(spots: u32) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("store.json")).unwrap();

        let start = Utc.with_ymd_and_hms(2025, 10, 4, 18, 0, 0).unwrap();
        let mut event = Event::new(EventId(10), "Harvest dinner", UserId(1), start);
        event.spots = spots;
        store.put_event(event).unwrap();
        for (id, name) in [(1, "owner"), (2, "alice"), (3, "bob")] {
            store.put_user(User::new(UserId(id), name)).unwrap();
        }

        let settings = Settings {
            spots_display: true,
            ..Settings::default()
        };
        let state = AppState::from_registry(ParticipationRegistry::with_settings(store, settings));
        let app = routes::router(state.clone());

        Fixture {
            _dir: dir,
            state,
            app,
        }
    }

    fn action(path: &str, user: Option<u64>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::REFERER, "/event_calendar/view/10")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(id) = user {
            builder = builder.header(USER_HEADER, id.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn join(user: u64) -> Request<Body> {
        action("/action/event_calendar/add_personal", Some(user), "guid=10")
    }

    fn leave(user: u64) -> Request<Body> {
        action("/action/event_calendar/remove_personal", Some(user), "guid=10")
    }

    fn participating(state: &AppState, user: u64) -> bool {
        let registry = state.registry().unwrap();
        let event = registry.event(EventId(10)).unwrap();
        let user = registry.user(UserId(user)).unwrap();
        registry.is_participating(&event, &user)
    }

    fn notices(state: &AppState, user: u64) -> Vec<Notice> {
        state.notices().unwrap().drain(UserId(user))
    }

    #[tokio::test]
    async fn join_redirects_back_with_success_notice() {
        let f = fixture(5);

        let response = f.app.clone().oneshot(join(2)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/event_calendar/view/10"
        );
        assert!(participating(&f.state, 2));

        let notices = notices(&f.state, 2);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(
            notices[0].message,
            "This event has been added to your personal calendar."
        );
    }

    #[tokio::test]
    async fn joining_twice_is_silent() {
        let f = fixture(5);

        f.app.clone().oneshot(join(2)).await.unwrap();
        notices(&f.state, 2);

        let response = f.app.clone().oneshot(join(2)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(notices(&f.state, 2).is_empty());
    }

    #[tokio::test]
    async fn full_event_reports_error_notice() {
        let f = fixture(1);

        f.app.clone().oneshot(join(2)).await.unwrap();
        f.app.clone().oneshot(join(3)).await.unwrap();

        assert!(!participating(&f.state, 3));
        let notices = notices(&f.state, 3);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_joins_fill_a_single_spot_once() {
        let f = fixture(1);
        {
            let mut registry = f.state.registry().unwrap();
            for id in 4..=12 {
                registry
                    .store_mut()
                    .put_user(User::new(UserId(id), format!("guest{id}")))
                    .unwrap();
            }
        }

        let joins: Vec<_> = (2..=12)
            .map(|user| tokio::spawn(f.app.clone().oneshot(join(user))))
            .collect();
        for handle in joins {
            let response = handle.await.unwrap().unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let joined: Vec<u64> = (2..=12).filter(|&u| participating(&f.state, u)).collect();
        assert_eq!(joined.len(), 1);

        let successes = (2..=12)
            .flat_map(|u| notices(&f.state, u))
            .filter(|n| n.kind == NoticeKind::Success)
            .count();
        assert_eq!(successes, 1);

        let registry = f.state.registry().unwrap();
        let event = registry.event(EventId(10)).unwrap();
        assert_eq!(registry.participant_count(&event).unwrap(), 1);
    }

    #[tokio::test]
    async fn leave_frees_the_spot() {
        let f = fixture(1);

        f.app.clone().oneshot(join(2)).await.unwrap();
        f.app.clone().oneshot(leave(2)).await.unwrap();
        f.app.clone().oneshot(join(3)).await.unwrap();

        assert!(!participating(&f.state, 2));
        assert!(participating(&f.state, 3));
    }

    #[tokio::test]
    async fn leave_without_joining_still_succeeds() {
        let f = fixture(5);

        let response = f.app.clone().oneshot(leave(3)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let notices = notices(&f.state, 3);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Success);
    }

    #[tokio::test]
    async fn leave_purges_legacy_records() {
        let f = fixture(5);
        f.state
            .registry()
            .unwrap()
            .store_mut()
            .add_annotation(EventId(10), "3".into())
            .unwrap();
        assert!(participating(&f.state, 3));

        f.app.clone().oneshot(leave(3)).await.unwrap();

        assert!(!participating(&f.state, 3));
        let registry = f.state.registry().unwrap();
        assert!(registry.store().annotations(EventId(10)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_event_or_user_does_nothing() {
        let f = fixture(5);

        let missing_event = action("/action/event_calendar/add_personal", Some(2), "guid=99");
        let response = f.app.clone().oneshot(missing_event).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let garbage = action("/action/event_calendar/add_personal", Some(2), "guid=abc");
        f.app.clone().oneshot(garbage).await.unwrap();

        let anonymous = action("/action/event_calendar/add_personal", None, "guid=10");
        f.app.clone().oneshot(anonymous).await.unwrap();

        assert!(!participating(&f.state, 2));
        assert!(notices(&f.state, 2).is_empty());
    }

    #[tokio::test]
    async fn missing_referer_redirects_home() {
        let f = fixture(5);
        let request = Request::builder()
            .method("POST")
            .uri("/action/event_calendar/add_personal")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(USER_HEADER, "2")
            .body(Body::from("guid=10"))
            .unwrap();

        let response = f.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn notices_endpoint_drains_queue() {
        let f = fixture(5);
        f.app.clone().oneshot(join(2)).await.unwrap();

        let request = || {
            Request::builder()
                .uri("/notices")
                .header(USER_HEADER, "2")
                .body(Body::empty())
                .unwrap()
        };

        let response = f.app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let notices: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(notices[0]["kind"], "success");

        let response = f.app.clone().oneshot(request()).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"[]");
    }

    #[tokio::test]
    async fn notices_require_login() {
        let f = fixture(5);
        let request = Request::builder().uri("/notices").body(Body::empty()).unwrap();

        let response = f.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
