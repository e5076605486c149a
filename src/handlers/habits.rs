use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{DeleteResponse, HabitResponse};
use crate::error::{AppError, AppResult};
use crate::models::habit::{CreateHabitRequest, Habit, UpdateHabitRequest};
use crate::store::paths;
use crate::AppState;

async fn load_habit(state: &AppState, uid: &str, habit_id: &str) -> AppResult<Habit> {
    let value = state
        .store
        .read_path(&paths::habit(uid, habit_id))
        .await?
        .filter(Value::is_object)
        .ok_or_else(|| AppError::NotFound("Habit not found".into()))?;

    let mut habit: Habit = serde_json::from_value(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored habit is unreadable: {}", e)))?;
    habit.id = habit_id.to_string();
    Ok(habit)
}

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<HabitResponse>>> {
    let mut habits = state
        .wellness
        .load_habits_on(&auth_user.id, Utc::now().date_naive())
        .await?;
    habits.sort_by_key(|h| h.created_at);

    Ok(Json(habits.into_iter().map(HabitResponse::from).collect()))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateHabitRequest>,
) -> AppResult<Json<HabitResponse>> {
    body.validate()?;

    let id = Uuid::new_v4().to_string();
    let habit = body.into_habit(id, Utc::now().timestamp_millis());

    state
        .store
        .upsert(
            &paths::habit(&auth_user.id, &habit.id),
            serde_json::to_value(&habit)?,
        )
        .await?;

    tracing::info!(user_id = %auth_user.id, habit_id = %habit.id, "Habit created");
    state.recompute.schedule(&auth_user.id).await;

    Ok(Json(habit.into()))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<String>,
    Json(body): Json<UpdateHabitRequest>,
) -> AppResult<Json<HabitResponse>> {
    body.validate()?;

    let patch = body.to_patch();
    if patch.is_empty() {
        return Err(AppError::Validation("No fields to update".into()));
    }

    // 404 rather than creating a habit from a partial patch
    load_habit(&state, &auth_user.id, &habit_id).await?;

    state
        .store
        .upsert(&paths::habit(&auth_user.id, &habit_id), Value::Object(patch))
        .await?;
    state.recompute.schedule(&auth_user.id).await;

    let mut habit = load_habit(&state, &auth_user.id, &habit_id).await?;
    habit.settle(Utc::now().date_naive());
    Ok(Json(habit.into()))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    load_habit(&state, &auth_user.id, &habit_id).await?;

    state
        .store
        .delete(&paths::habit(&auth_user.id, &habit_id))
        .await?;

    tracing::info!(user_id = %auth_user.id, habit_id = %habit_id, "Habit deleted");
    state.recompute.schedule(&auth_user.id).await;

    Ok(Json(DeleteResponse {
        deleted: true,
        id: habit_id,
    }))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<String>,
) -> AppResult<Json<HabitResponse>> {
    let mut habit = load_habit(&state, &auth_user.id, &habit_id).await?;
    habit.toggle(Utc::now().date_naive());

    state
        .store
        .upsert(
            &paths::habit(&auth_user.id, &habit_id),
            habit.completion_patch(),
        )
        .await?;

    tracing::debug!(
        user_id = %auth_user.id,
        habit_id = %habit_id,
        completed = habit.completed_today,
        "Habit toggled"
    );
    state.recompute.schedule(&auth_user.id).await;

    Ok(Json(habit.into()))
}

/// Mark every habit done for today. Habits already done are left untouched.
pub async fn complete_all(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<HabitResponse>>> {
    let today = Utc::now().date_naive();
    let mut habits = state.wellness.load_habits_on(&auth_user.id, today).await?;
    habits.sort_by_key(|h| h.created_at);

    let mut changed = 0;
    for habit in habits.iter_mut().filter(|h| !h.completed_today) {
        habit.complete(today);
        state
            .store
            .upsert(
                &paths::habit(&auth_user.id, &habit.id),
                habit.completion_patch(),
            )
            .await?;
        changed += 1;
    }

    tracing::info!(user_id = %auth_user.id, changed, "Marked all habits complete");
    if changed > 0 {
        state.recompute.schedule(&auth_user.id).await;
    }

    Ok(Json(habits.into_iter().map(HabitResponse::from).collect()))
}
