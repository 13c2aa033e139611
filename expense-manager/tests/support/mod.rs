//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};

use expense_manager::config::AppConfig;
use expense_manager::database::db::{connection, migrate};
use expense_manager::domain::{
    AccountStore, BudgetAggregator, CategoryLedger, ExpenseLedger, Money, PasswordHasher, UserId,
};

pub const TEST_PASSWORD: &str = "correct horse battery";

pub async fn migrated_pool() -> Pool<Sqlite> {
    let pool = connection::in_memory_pool().await.expect("in-memory pool");
    migrate::run_migrations(&pool).await.expect("migrations apply");
    pool
}

/// Defaults, with a cheap password hash so tests stay fast.
pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "PASSWORD_HASH_ITERATIONS" => Some("1000".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn money(amount: &str) -> Money {
    Money(Decimal::from_str(amount).expect("decimal literal"))
}

/// Clock frozen at a single instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC keeps the local date inside the same month in every time zone
    /// for any day between the 2nd and the 27th.
    pub fn at_noon(year: i32, month: u32, day: u32) -> Arc<Self> {
        let instant = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("unambiguous instant");
        Arc::new(Self(instant))
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct Ledgers {
    pub pool: Pool<Sqlite>,
    pub accounts: AccountStore,
    pub categories: CategoryLedger,
    pub expenses: ExpenseLedger,
    pub budgets: BudgetAggregator,
}

impl Ledgers {
    pub async fn new() -> Self {
        let pool = migrated_pool().await;
        let clock = FixedClock::at_noon(2026, 10, 17);
        Self {
            accounts: AccountStore::new(pool.clone(), PasswordHasher::new(1_000)),
            categories: CategoryLedger::new(pool.clone()),
            expenses: ExpenseLedger::new(pool.clone()),
            budgets: BudgetAggregator::new(pool.clone(), clock),
            pool,
        }
    }

    pub async fn user(&self, name: &str) -> UserId {
        let email = format!("{}@example.com", name.to_lowercase());
        self.accounts
            .register(name, &email, TEST_PASSWORD)
            .await
            .expect("registration succeeds")
    }

    pub async fn expense_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await
            .expect("count expenses")
    }
}
