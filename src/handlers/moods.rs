use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{DeleteResponse, MoodResponse};
use crate::error::{AppError, AppResult};
use crate::models::mood::{parse_date_key, Mood, MoodEntry, UpsertMoodRequest};
use crate::store::paths;
use crate::AppState;

fn check_date_key(date: &str) -> AppResult<()> {
    parse_date_key(date)
        .map(|_| ())
        .ok_or_else(|| AppError::Validation("Mood date must be YYYY-MM-DD".into()))
}

/// Newest first.
pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<MoodResponse>>> {
    let moods = state.wellness.load_moods(&auth_user.id).await?;
    Ok(Json(moods.into_values().rev().map(MoodResponse::from).collect()))
}

/// One mood per day; a second write for the same day replaces the first.
pub async fn upsert_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(body): Json<UpsertMoodRequest>,
) -> AppResult<Json<MoodResponse>> {
    check_date_key(&date)?;
    body.validate()?;

    let mood = Mood::from_token(&body.mood)
        .ok_or_else(|| AppError::Validation(format!("Unknown mood: {}", body.mood)))?;
    let note = body
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    // null note clears a previous one
    state
        .store
        .upsert(
            &paths::mood(&auth_user.id, &date),
            json!({ "mood": mood.token(), "note": note }),
        )
        .await?;

    tracing::info!(user_id = %auth_user.id, date = %date, "Mood logged");
    state.recompute.schedule(&auth_user.id).await;

    Ok(Json(MoodResponse::from(MoodEntry {
        date_key: date,
        mood: mood.token().to_string(),
        note,
        timestamp: None,
    })))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    check_date_key(&date)?;

    let path = paths::mood(&auth_user.id, &date);
    if state.store.read_path(&path).await?.is_none() {
        return Err(AppError::NotFound("No mood logged for that day".into()));
    }
    state.store.delete(&path).await?;
    state.recompute.schedule(&auth_user.id).await;

    Ok(Json(DeleteResponse {
        deleted: true,
        id: date,
    }))
}
