//! Expense ledger. Every write re-checks that the referenced category belongs to the caller.

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

use super::{CategoryId, ExpenseId, Money, UserId};
use crate::database::db::queries;
use crate::database::models::ExpenseItem;
use crate::error::{LedgerError, LedgerResult};

const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Clone)]
pub struct ExpenseLedger {
    pool: Pool<Sqlite>,
}

impl ExpenseLedger {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// The ownership lookup and the insert share one transaction; a rejected
    /// write leaves nothing behind.
    pub async fn create(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        description: &str,
        amount: Money,
        expense_date: NaiveDate,
    ) -> LedgerResult<ExpenseId> {
        if !amount.is_positive() {
            return Err(LedgerError::invalid(format!("amount {amount} must be greater than zero")));
        }
        let amount_cents = amount.to_cents()?;
        let description = description.trim();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(LedgerError::invalid(format!(
                "description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }

        let mut tx = self.pool.begin().await?;

        match queries::category_owner(&mut *tx, category_id).await? {
            None => return Err(LedgerError::CategoryNotFound(category_id)),
            Some(owner) if owner != user_id => {
                warn!(
                    %user_id,
                    %owner,
                    %category_id,
                    "expense rejected: category owned by another user"
                );
                return Err(LedgerError::CategoryOwnershipMismatch(category_id));
            }
            Some(_) => {}
        }

        let expense_id = queries::insert_expense(
            &mut *tx,
            user_id,
            category_id,
            description,
            amount_cents,
            expense_date,
        )
        .await?;

        tx.commit().await?;

        info!(%user_id, %category_id, %expense_id, "expense recorded");
        Ok(expense_id)
    }

    /// Newest expense date first; same-day entries latest-inserted first.
    pub async fn list_for_user(&self, user_id: UserId) -> LedgerResult<Vec<ExpenseItem>> {
        Ok(queries::get_expenses_by_user(&self.pool, user_id).await?)
    }
}
