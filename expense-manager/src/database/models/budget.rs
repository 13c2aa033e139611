use serde::Serialize;

use crate::domain::{CategoryId, Money};

/// Spend within the reference month against one category's ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetStatus {
    pub category_id: CategoryId,
    pub name: String,
    pub budget: Money,
    pub spent: Money,
}
