pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};
use sqlx::{Pool, Sqlite};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::domain::{AccountStore, BudgetAggregator, CategoryLedger, ExpenseLedger, PasswordHasher};
use session::{InMemorySessions, SessionGate};

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    pub categories: CategoryLedger,
    pub expenses: ExpenseLedger,
    pub budgets: BudgetAggregator,
    pub sessions: Arc<dyn SessionGate>,
    pub cookie_secure: bool,
    pub session_ttl: TimeDelta,
}

impl AppState {
    pub fn new(pool: Pool<Sqlite>, config: &AppConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let sessions = Arc::new(InMemorySessions::new(clock.clone(), config.session_ttl));
        Self::with_parts(pool, config, clock, sessions)
    }

    pub fn with_parts(
        pool: Pool<Sqlite>,
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        sessions: Arc<dyn SessionGate>,
    ) -> Self {
        let hasher = PasswordHasher::new(config.password_hash_iterations);
        Self {
            accounts: AccountStore::new(pool.clone(), hasher),
            categories: CategoryLedger::new(pool.clone()),
            expenses: ExpenseLedger::new(pool.clone()),
            budgets: BudgetAggregator::new(pool, clock),
            sessions,
            cookie_secure: config.session_cookie_secure,
            session_ttl: config.session_ttl,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(routes::auth_routes())
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(pool: Pool<Sqlite>, config: &AppConfig) -> anyhow::Result<()> {
    let app = build_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
