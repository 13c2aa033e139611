//! Budget aggregator: spend in the current calendar month against each category's ceiling.
//!
//! Owns no state. Each call is a single grouped query, so the category list and
//! the sums come from the same snapshot.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use mockable::Clock;
use sqlx::{Pool, Sqlite};
use tracing::debug;

use super::UserId;
use crate::database::db::queries;
use crate::database::models::BudgetStatus;
use crate::error::{LedgerError, LedgerResult};

#[derive(Clone)]
pub struct BudgetAggregator {
    pool: Pool<Sqlite>,
    clock: Arc<dyn Clock>,
}

impl BudgetAggregator {
    pub fn new(pool: Pool<Sqlite>, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Status for the month containing today's local date.
    pub async fn current_status(&self, user_id: UserId) -> LedgerResult<Vec<BudgetStatus>> {
        let today = self.clock.local().date_naive();
        self.status_at(user_id, today).await
    }

    /// One row per category owned by `user_id`, ordered by name then id.
    pub async fn status_at(
        &self,
        user_id: UserId,
        reference: NaiveDate,
    ) -> LedgerResult<Vec<BudgetStatus>> {
        let (start, end) = month_window(reference)?;
        debug!(%user_id, %start, %end, "computing budget status");
        Ok(queries::budget_status_by_user(&self.pool, user_id, start, end).await?)
    }
}

/// Half-open `[first of month, first of next month)` window around `reference`.
pub fn month_window(reference: NaiveDate) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let (year, month) = (reference.year(), reference.month());
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let start = NaiveDate::from_ymd_opt(year, month, 1);
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1);
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(LedgerError::invalid(format!(
            "no calendar month window for {reference}"
        ))),
    }
}
