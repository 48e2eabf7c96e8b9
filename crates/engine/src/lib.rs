pub use commands::{
    AdminUserUpdate, ExpenseUpdate, IncomeUpdate, NewExpense, NewIncome, NewSaving, NewUser, Page,
    ProfileUpdate, SavingUpdate,
};
pub use error::EngineError;
pub use expenses::Expense;
pub use incomes::Income;
pub use money::MoneyCents;
pub use ops::{BalanceSummary, Engine, EngineBuilder};
pub use permissions::{Permission, Principal, Role, has_permission};
pub use savings::Saving;
pub use users::User;

mod commands;
mod error;
mod expenses;
mod incomes;
mod money;
mod ops;
mod permissions;
mod savings;
mod users;

pub(crate) type ResultEngine<T> = Result<T, EngineError>;
