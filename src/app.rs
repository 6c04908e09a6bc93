use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login_form))
        .route("/register", post(handlers::register_form))
        .route("/logout", post(handlers::logout))
        .route("/api/register", post(handlers::api_register))
        .route("/api/login", post(handlers::api_login))
        .route("/api/session", delete(handlers::close_session))
        .route("/api/live-details", get(handlers::live_details))
        .route("/api/booked-by-provider", get(handlers::booked_by_provider))
        .route("/api/metrics", get(handlers::metrics))
        .route("/api/details", get(handlers::details))
        .route("/api/show-rate", get(handlers::show_rate))
        .route("/api/latest-date", get(handlers::latest_date))
        .route("/api/records/reload", post(handlers::reload_records))
        .with_state(state)
}
