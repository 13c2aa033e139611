use serde::Serialize;

use crate::domain::{CategoryId, Money, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    pub budget: Money, // monthly ceiling, informational only
}
