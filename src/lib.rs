use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod wellness;

use config::Config;
use services::{RecomputeDebouncer, WellnessService};
use store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub wellness: WellnessService,
    pub recompute: RecomputeDebouncer,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        let wellness = WellnessService::new(store.clone());
        let recompute = RecomputeDebouncer::new(wellness.clone(), config.recompute_debounce);
        Self {
            store,
            wellness,
            recompute,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler));

    let protected_routes = Router::new()
        // Habits
        .route(
            "/api/habits",
            get(handlers::habits::list_habits).post(handlers::habits::create_habit),
        )
        .route(
            "/api/habits/complete-all",
            post(handlers::habits::complete_all),
        )
        .route(
            "/api/habits/:id",
            put(handlers::habits::update_habit).delete(handlers::habits::delete_habit),
        )
        .route(
            "/api/habits/:id/toggle",
            post(handlers::habits::toggle_habit),
        )
        // Moods
        .route("/api/moods", get(handlers::moods::list_moods))
        .route(
            "/api/moods/:date",
            put(handlers::moods::upsert_mood).delete(handlers::moods::delete_mood),
        )
        // Stats & wellness
        .route("/api/stats", get(handlers::wellness::get_stats))
        .route(
            "/api/wellness/recompute",
            post(handlers::wellness::recompute),
        )
        .route("/api/wellness/scores", get(handlers::wellness::list_scores))
        .route("/api/analytics", get(handlers::wellness::get_analytics))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
