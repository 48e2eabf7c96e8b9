//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and making the mutable field set of each entity statically
//! enumerable (partial updates are applied field by field, never via a
//! dynamic attribute loop).

use chrono::{DateTime, Utc};

use crate::MoneyCents;

/// Pagination window for list operations.
///
/// Results are ordered by insertion (ascending id), which is stable across
/// pages.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

/// Register a new user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Self-service profile update; every field is optional.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Admin-only user moderation fields.
///
/// Setting `balance` rewrites the denormalized ledger balance under the same
/// user-row lock the mutation protocol takes.
#[derive(Clone, Debug, Default)]
pub struct AdminUserUpdate {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub balance: Option<MoneyCents>,
}

/// Create an income entry.
#[derive(Clone, Debug)]
pub struct NewIncome {
    pub amount: MoneyCents,
    pub source: String,
    pub date: Option<DateTime<Utc>>,
}

/// Partial income update.
#[derive(Clone, Debug, Default)]
pub struct IncomeUpdate {
    pub amount: Option<MoneyCents>,
    pub source: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Create an expense entry.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub amount: MoneyCents,
    pub category: String,
    pub date: Option<DateTime<Utc>>,
}

/// Partial expense update.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub amount: Option<MoneyCents>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Create a savings goal.
#[derive(Clone, Debug)]
pub struct NewSaving {
    pub amount: MoneyCents,
    pub current_amount: Option<MoneyCents>,
    pub target_date: Option<DateTime<Utc>>,
    pub duration_months: Option<i32>,
    pub description: Option<String>,
}

/// Partial savings update.
#[derive(Clone, Debug, Default)]
pub struct SavingUpdate {
    pub amount: Option<MoneyCents>,
    pub current_amount: Option<MoneyCents>,
    pub target_date: Option<DateTime<Utc>>,
    pub duration_months: Option<i32>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}
