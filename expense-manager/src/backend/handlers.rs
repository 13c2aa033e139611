// src/backend/handlers.rs
use axum::{
    extract::{FromRequest, Path, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backend::error::{ApiError, ApiResult};
use crate::backend::session::{self, AuthUser};
use crate::backend::AppState;
use crate::domain::{CategoryId, ExpenseId, Money, UserId};

/// `Json` whose rejection renders through [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub budget: Money,
}

#[derive(Debug, Deserialize)]
pub struct SetBudget {
    pub budget: Money,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpense {
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Money,
    pub expense_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct UserCreated {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct CategoryCreated {
    pub category_id: CategoryId,
}

#[derive(Debug, Serialize)]
pub struct ExpenseCreated {
    pub expense_id: ExpenseId,
}

pub async fn health() -> &'static str {
    "Backend is running"
}

/* ==========Accounts========== */

pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = state
        .accounts
        .register(&payload.name, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(UserCreated { user_id })))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = state
        .accounts
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.sessions.open(user_id);
    let cookie = session::session_cookie(&token, state.session_ttl, state.cookie_secure);
    Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(UserCreated { user_id })))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session::session_token(&headers) {
        state.sessions.close(token);
    }
    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, session::expired_session_cookie(state.cookie_secure))],
    )
}

pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.accounts.get_profile(user_id).await?))
}

/* ==========Categories========== */

pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.categories.list_for_user(user_id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateCategory>,
) -> ApiResult<impl IntoResponse> {
    let category_id = state
        .categories
        .create(user_id, &payload.name, payload.budget)
        .await?;
    Ok((StatusCode::CREATED, Json(CategoryCreated { category_id })))
}

pub async fn set_budget(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(category_id): Path<CategoryId>,
    ApiJson(payload): ApiJson<SetBudget>,
) -> ApiResult<impl IntoResponse> {
    state
        .categories
        .set_budget(user_id, category_id, payload.budget)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/* ==========Expenses========== */

pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.expenses.list_for_user(user_id).await?))
}

pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateExpense>,
) -> ApiResult<impl IntoResponse> {
    let expense_id = state
        .expenses
        .create(
            user_id,
            payload.category_id,
            payload.description.as_deref().unwrap_or_default(),
            payload.amount,
            payload.expense_date,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ExpenseCreated { expense_id })))
}

/* ==========Budget status========== */

pub async fn budget_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.budgets.current_status(user_id).await?))
}
