//! Category ledger. Names are unique per user, compared on their Unicode lowercase form.

use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

use super::{CategoryId, Money, UserId};
use crate::database::db::queries;
use crate::database::models::Category;
use crate::error::{is_unique_violation, LedgerError, LedgerResult};

const MAX_NAME_LEN: usize = 100;

#[derive(Clone)]
pub struct CategoryLedger {
    pool: Pool<Sqlite>,
}

impl CategoryLedger {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: UserId, name: &str, budget: Money) -> LedgerResult<CategoryId> {
        let name = validate_name(name)?;
        let budget_cents = budget_cents(budget)?;

        let key = name_key(name);
        let category_id = queries::insert_category(&self.pool, user_id, name, &key, budget_cents)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    LedgerError::DuplicateName(name.to_owned())
                } else {
                    LedgerError::StoreUnavailable(e)
                }
            })?;

        info!(%user_id, %category_id, "category created");
        Ok(category_id)
    }

    /// Ordered by name, then id. Empty when the user owns no categories.
    pub async fn list_for_user(&self, user_id: UserId) -> LedgerResult<Vec<Category>> {
        Ok(queries::get_categories_by_user(&self.pool, user_id).await?)
    }

    pub async fn set_budget(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        budget: Money,
    ) -> LedgerResult<()> {
        let budget_cents = budget_cents(budget)?;

        if queries::update_category_budget(&self.pool, user_id, category_id, budget_cents).await? {
            info!(%user_id, %category_id, "category budget updated");
            return Ok(());
        }

        // nothing updated: tell apart a missing category from someone else's
        match queries::category_owner(&self.pool, category_id).await? {
            None => Err(LedgerError::CategoryNotFound(category_id)),
            Some(owner) => {
                warn!(%user_id, %owner, %category_id, "budget update on a category owned by another user");
                Err(LedgerError::CategoryOwnershipMismatch(category_id))
            }
        }
    }
}

fn validate_name(name: &str) -> LedgerResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid("category name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::invalid(format!(
            "category name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

/// Uniqueness and ordering key; folds non-ASCII letters as well.
fn name_key(name: &str) -> String {
    name.to_lowercase()
}

fn budget_cents(budget: Money) -> LedgerResult<i64> {
    if budget.is_negative() {
        return Err(LedgerError::invalid(format!("budget {budget} must not be negative")));
    }
    budget.to_cents()
}
