//! Ledger services. Every operation takes the caller's `UserId` as its scoping key.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod accounts;
pub mod budget;
pub mod categories;
pub mod expenses;
pub mod money;
pub mod password;

pub use accounts::AccountStore;
pub use budget::{month_window, BudgetAggregator};
pub use categories::CategoryLedger;
pub use expenses::ExpenseLedger;
pub use money::{Money, MAX_CENTS};
pub use password::PasswordHasher;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a registered user; the scoping key for all ledgers.
    UserId
);
row_id!(CategoryId);
row_id!(ExpenseId);
