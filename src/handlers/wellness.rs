use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::auth::middleware::AuthUser;
use crate::dto::RangeQuery;
use crate::error::AppResult;
use crate::models::stats::DailyStats;
use crate::models::wellness::WellnessScore;
use crate::services::AnalyticsReport;
use crate::wellness::{ScorePoint, TimeWindow};
use crate::AppState;

fn window(state: &AppState, query: &RangeQuery) -> TimeWindow {
    query
        .range
        .as_deref()
        .map(TimeWindow::parse)
        .unwrap_or(state.config.default_window)
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<DailyStats>> {
    Ok(Json(state.wellness.load_stats(&auth_user.id).await?))
}

/// Recompute now instead of waiting for the debounced run.
pub async fn recompute(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WellnessScore>> {
    let record = state.wellness.recompute(&auth_user.id, Utc::now()).await?;
    Ok(Json(record))
}

pub async fn list_scores(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<ScorePoint>>> {
    let series = state
        .wellness
        .score_history(&auth_user.id, window(&state, &query), Utc::now())
        .await?;
    Ok(Json(series))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<AnalyticsReport>> {
    let report = state
        .wellness
        .analytics(&auth_user.id, window(&state, &query), Utc::now())
        .await?;
    Ok(Json(report))
}
