pub mod budget;
pub mod category;
pub mod expense;
pub mod user;

pub use budget::BudgetStatus;
pub use category::Category;
pub use expense::ExpenseItem;
pub use user::{UserCredentials, UserProfile};
