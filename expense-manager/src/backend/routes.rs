use axum::{
    routing::{get, post, put},
    Router,
};
use crate::backend::{handlers, AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout).post(handlers::logout))
}

/// Everything under `/api` requires a session.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user", get(handlers::profile))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/api/categories/:category_id/budget", put(handlers::set_budget))
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/api/budget-status", get(handlers::budget_status))
}
