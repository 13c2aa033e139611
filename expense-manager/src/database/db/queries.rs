use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Pool, Row, Sqlite};

use crate::database::models::{BudgetStatus, Category, ExpenseItem, UserCredentials, UserProfile};
use crate::domain::{CategoryId, ExpenseId, Money, UserId};
/*
SQL for the account store, both ledgers and the budget view.
Every statement binds its inputs; none is assembled from caller text.
Money columns are integer cents.
 */

/*==========User Queries=========== */

pub async fn insert_user(
    pool: &Pool<Sqlite>,
    name: &str,
    email: &str,
    password_hash: &str,
    avatar_url: &str,
) -> Result<UserId, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (name, email, password_hash, avatar_url)
        VALUES (?, ?, ?, ?)
        RETURNING user_id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(avatar_url)
    .fetch_one(pool)
    .await?
    .try_get("user_id")
}

// email column is NOCASE, callers still pass the normalised form
pub async fn find_credentials_by_email(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query("SELECT user_id, password_hash FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .map(|row| -> Result<UserCredentials, sqlx::Error> {
            Ok(UserCredentials {
                user_id: row.try_get("user_id")?,
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
}

pub async fn find_profile(
    pool: &Pool<Sqlite>,
    user_id: UserId,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query("SELECT user_id, name, email, avatar_url FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(|row| -> Result<UserProfile, sqlx::Error> {
            Ok(UserProfile {
                user_id: row.try_get("user_id")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                avatar_url: row.try_get("avatar_url")?,
            })
        })
        .transpose()
}

/*==========Category Queries=========== */

pub async fn insert_category(
    pool: &Pool<Sqlite>,
    user_id: UserId,
    name: &str,
    name_key: &str,
    budget_cents: i64,
) -> Result<CategoryId, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO categories (user_id, name, name_key, budget_cents)
        VALUES (?, ?, ?, ?)
        RETURNING category_id
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(name_key)
    .bind(budget_cents)
    .fetch_one(pool)
    .await?
    .try_get("category_id")
}

pub async fn get_categories_by_user(
    pool: &Pool<Sqlite>,
    user_id: UserId,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT category_id, user_id, name, budget_cents
        FROM categories
        WHERE user_id = ?
        ORDER BY name_key ASC, category_id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| -> Result<Category, sqlx::Error> {
        Ok(Category {
            category_id: row.try_get("category_id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            budget: money_column(&row, "budget_cents")?,
        })
    })
    .collect()
}

/// Returns whether a row owned by `user_id` was updated.
pub async fn update_category_budget(
    pool: &Pool<Sqlite>,
    user_id: UserId,
    category_id: CategoryId,
    budget_cents: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE categories
        SET budget_cents = ?
        WHERE category_id = ? AND user_id = ?
        "#,
    )
    .bind(budget_cents)
    .bind(category_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn category_owner<'e, E>(
    executor: E,
    category_id: CategoryId,
) -> Result<Option<UserId>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("SELECT user_id FROM categories WHERE category_id = ?")
        .bind(category_id)
        .fetch_optional(executor)
        .await?
        .map(|row| row.try_get("user_id"))
        .transpose()
}

/*==========Expense Queries=========== */

pub async fn insert_expense<'e, E>(
    executor: E,
    user_id: UserId,
    category_id: CategoryId,
    description: &str,
    amount_cents: i64,
    expense_date: NaiveDate,
) -> Result<ExpenseId, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO expenses (user_id, category_id, description, amount_cents, expense_date)
        VALUES (?, ?, ?, ?, ?)
        RETURNING expense_id
        "#,
    )
    .bind(user_id)
    .bind(category_id)
    .bind(description)
    .bind(amount_cents)
    .bind(expense_date)
    .fetch_one(executor)
    .await?
    .try_get("expense_id")
}

// Newest first; same-day entries fall back to insertion order, latest first.
pub async fn get_expenses_by_user(
    pool: &Pool<Sqlite>,
    user_id: UserId,
) -> Result<Vec<ExpenseItem>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT
            e.expense_id,
            e.category_id,
            c.name AS category_name,
            e.description,
            e.amount_cents,
            e.expense_date
        FROM expenses e
        JOIN categories c
            ON c.category_id = e.category_id AND c.user_id = e.user_id
        WHERE e.user_id = ?
        ORDER BY e.expense_date DESC, e.expense_id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| -> Result<ExpenseItem, sqlx::Error> {
        Ok(ExpenseItem {
            expense_id: row.try_get("expense_id")?,
            category_id: row.try_get("category_id")?,
            category_name: row.try_get("category_name")?,
            description: row.try_get("description")?,
            amount: money_column(&row, "amount_cents")?,
            expense_date: row.try_get("expense_date")?,
        })
    })
    .collect()
}

/*==========Budget Status=========== */

/// One row per category of `user_id`, with the sum of its expenses dated in
/// `[window_start, window_end)`. Categories are the anchor set (left join),
/// so a category with no matching expenses reports zero.
pub async fn budget_status_by_user(
    pool: &Pool<Sqlite>,
    user_id: UserId,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<BudgetStatus>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT
            c.category_id,
            c.name,
            c.budget_cents,
            COALESCE(SUM(e.amount_cents), 0) AS spent_cents
        FROM categories c
        LEFT JOIN expenses e
            ON e.category_id = c.category_id
            AND e.user_id = c.user_id
            AND e.expense_date >= ?
            AND e.expense_date < ?
        WHERE c.user_id = ?
        GROUP BY c.category_id, c.name, c.name_key, c.budget_cents
        ORDER BY c.name_key ASC, c.category_id ASC
        "#,
    )
    .bind(window_start)
    .bind(window_end)
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| -> Result<BudgetStatus, sqlx::Error> {
        Ok(BudgetStatus {
            category_id: row.try_get("category_id")?,
            name: row.try_get("name")?,
            budget: money_column(&row, "budget_cents")?,
            spent: money_column(&row, "spent_cents")?,
        })
    })
    .collect()
}

fn money_column(row: &SqliteRow, column: &str) -> Result<Money, sqlx::Error> {
    row.try_get::<i64, _>(column).map(Money::from_cents)
}
