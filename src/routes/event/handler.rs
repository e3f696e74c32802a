use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::error::AppError;
use crate::model::{Event, EventDetail};
use crate::routes::public::invalidate_event_cache;
use crate::store::EventStore;
use crate::utils::Claims;

use super::model::{ChangedResponse, CreateEventRequest, UpdateEventRequest};

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDetail>), AppError> {
    let detail = Event::create(state.store.as_ref(), &state.notifier, req, claims.sub).await?;

    tracing::info!("user {} created event {}", claims.sub, detail.event.id);
    Ok((StatusCode::CREATED, Json(detail)))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<EventDetail>, AppError> {
    let detail = Event::update(state.store.as_ref(), event_id, req, claims.sub).await?;

    invalidate_event_cache(&state.redis, event_id).await;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    Event::delete(state.store.as_ref(), event_id, claims.sub).await?;

    invalidate_event_cache(&state.redis, event_id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn join_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<ChangedResponse>, AppError> {
    let changed = Event::join(state.store.as_ref(), event_id, claims.sub).await?;

    if changed {
        invalidate_event_cache(&state.redis, event_id).await;
    }
    Ok(Json(ChangedResponse { changed }))
}

#[axum::debug_handler]
pub async fn leave_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<ChangedResponse>, AppError> {
    let changed = Event::leave(state.store.as_ref(), event_id, claims.sub).await?;

    if changed {
        invalidate_event_cache(&state.redis, event_id).await;
    }
    Ok(Json(ChangedResponse { changed }))
}

#[axum::debug_handler]
pub async fn remove_participant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((event_id, participant_id)): Path<(i64, i64)>,
) -> Result<Json<ChangedResponse>, AppError> {
    let changed =
        Event::remove_participant(state.store.as_ref(), event_id, participant_id, claims.sub)
            .await?;

    if changed {
        invalidate_event_cache(&state.redis, event_id).await;
    }
    Ok(Json(ChangedResponse { changed }))
}

#[axum::debug_handler]
pub async fn my_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = state.store.events_created_by(claims.sub).await?;
    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn joined_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = state.store.events_joined_by(claims.sub).await?;
    Ok(Json(events))
}
