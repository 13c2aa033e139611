use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CategoryId, ExpenseId, Money};

/// An expense joined with the name of its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseItem {
    pub expense_id: ExpenseId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub description: String,
    pub amount: Money,
    pub expense_date: NaiveDate,
}
