//! Request handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;

use super::{ApiError, AppState};
use crate::flashcard::{Flashcard, FlashcardUpdate, NewFlashcard};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const SCRIPT_JS: &str = include_str!("../../static/script.js");

type ApiResult<T> = std::result::Result<T, ApiError>;

pub(super) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(super) async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}

pub(super) async fn list_flashcards(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Flashcard>>> {
    let cards = state
        .run(|store| store.get_all())
        .await
        .map_err(|e| ApiError::from_store("Failed to get flashcards", e))?;
    Ok(Json(cards))
}

pub(super) async fn add_flashcard(
    State(state): State<AppState>,
    payload: Result<Json<NewFlashcard>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Flashcard>)> {
    let Json(card) = payload.map_err(|r| ApiError::invalid_payload(&r))?;

    let created = state
        .run(move |store| store.add(&card))
        .await
        .map_err(|e| ApiError::from_store("Failed to add flashcard", e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_flashcard(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Flashcard>> {
    let Path(id) = id.map_err(|r| ApiError::invalid_id(&r))?;

    let card = state
        .run(move |store| store.get(id))
        .await
        .map_err(|e| ApiError::from_store("Failed to retrieve flashcard", e))?;
    Ok(Json(card))
}

// The id is checked before the body so a bad id wins over a bad payload.
pub(super) async fn update_flashcard(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<FlashcardUpdate>, JsonRejection>,
) -> ApiResult<Json<Flashcard>> {
    let Path(id) = id.map_err(|r| ApiError::invalid_id(&r))?;
    let Json(update) = payload.map_err(|r| ApiError::invalid_payload(&r))?;

    let card = state
        .run(move |store| store.update(id, &update))
        .await
        .map_err(|e| ApiError::from_store("Failed to update flashcard", e))?;
    Ok(Json(card))
}

pub(super) async fn delete_flashcard(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id.map_err(|r| ApiError::invalid_id(&r))?;

    state
        .run(move |store| store.delete(id))
        .await
        .map_err(|e| ApiError::from_store("Failed to delete flashcard", e))?;
    Ok(StatusCode::OK)
}
