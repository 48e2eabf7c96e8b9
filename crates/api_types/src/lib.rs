//! Request/response bodies shared between the server and its clients.
//!
//! Monetary amounts travel as decimal strings (`"75.50"`) via
//! [`engine::MoneyCents`]'s serde impls, never as floats.

use chrono::{DateTime, Utc};
use engine::{MoneyCents, Role};
use serde::{Deserialize, Serialize};

/// Uniform response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignupRequest {
        pub email: String,
        pub password: String,
        pub first_name: String,
        pub last_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub access_token: String,
        /// Always `"bearer"`.
        pub token_type: String,
        /// Seconds until the token expires.
        pub expires_in: u64,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub role: Role,
        pub balance: MoneyCents,
        pub is_active: bool,
        pub is_verified: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<engine::User> for UserView {
        fn from(user: engine::User) -> Self {
            Self {
                id: user.id,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
                balance: user.balance,
                is_active: user.is_active,
                is_verified: user.is_verified,
                created_at: user.created_at,
                updated_at: user.updated_at,
            }
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdateRequest {
        pub email: Option<String>,
        pub password: Option<String>,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
    }

    /// Admin moderation body; `role` is one of `user`, `admin`, `moderator`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AdminUserUpdateRequest {
        pub role: Option<String>,
        pub is_active: Option<bool>,
        pub is_verified: Option<bool>,
        pub balance: Option<MoneyCents>,
    }
}

pub mod income {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub amount: MoneyCents,
        pub source: String,
        pub date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeUpdate {
        pub amount: Option<MoneyCents>,
        pub source: Option<String>,
        pub date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: i32,
        pub amount: MoneyCents,
        pub source: String,
        pub date: DateTime<Utc>,
        pub user_id: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<engine::Income> for IncomeView {
        fn from(income: engine::Income) -> Self {
            Self {
                id: income.id,
                amount: income.amount,
                source: income.source,
                date: income.date,
                user_id: income.user_id,
                created_at: income.created_at,
                updated_at: income.updated_at,
            }
        }
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount: MoneyCents,
        pub category: String,
        pub date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount: Option<MoneyCents>,
        pub category: Option<String>,
        pub date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i32,
        pub amount: MoneyCents,
        pub category: String,
        pub date: DateTime<Utc>,
        pub user_id: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<engine::Expense> for ExpenseView {
        fn from(expense: engine::Expense) -> Self {
            Self {
                id: expense.id,
                amount: expense.amount,
                category: expense.category,
                date: expense.date,
                user_id: expense.user_id,
                created_at: expense.created_at,
                updated_at: expense.updated_at,
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTotal {
        pub total: MoneyCents,
    }
}

pub mod saving {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingNew {
        pub amount: MoneyCents,
        pub current_amount: Option<MoneyCents>,
        pub target_date: Option<DateTime<Utc>>,
        pub duration_months: Option<i32>,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SavingUpdate {
        pub amount: Option<MoneyCents>,
        pub current_amount: Option<MoneyCents>,
        pub target_date: Option<DateTime<Utc>>,
        pub duration_months: Option<i32>,
        pub description: Option<String>,
        pub is_completed: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingView {
        pub id: i32,
        pub user_id: i32,
        pub amount: MoneyCents,
        pub current_amount: MoneyCents,
        pub target_date: Option<DateTime<Utc>>,
        pub duration_months: Option<i32>,
        pub description: Option<String>,
        pub is_completed: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<engine::Saving> for SavingView {
        fn from(saving: engine::Saving) -> Self {
            Self {
                id: saving.id,
                user_id: saving.user_id,
                amount: saving.amount,
                current_amount: saving.current_amount,
                target_date: saving.target_date,
                duration_months: saving.duration_months,
                description: saving.description,
                is_completed: saving.is_completed,
                created_at: saving.created_at,
                updated_at: saving.updated_at,
            }
        }
    }
}

pub mod dashboard {
    use super::*;

    /// Both balance notions side by side: `balance` is derived from the
    /// ledger tables (income - expense - savings), `ledger_balance` is the
    /// persisted per-user scalar, absent for the all-users aggregate.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub total_income: MoneyCents,
        pub total_expense: MoneyCents,
        pub total_savings: MoneyCents,
        pub balance: MoneyCents,
        pub net_balance: MoneyCents,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub ledger_balance: Option<MoneyCents>,
    }

    impl From<engine::BalanceSummary> for SummaryView {
        fn from(summary: engine::BalanceSummary) -> Self {
            Self {
                total_income: summary.total_income,
                total_expense: summary.total_expense,
                total_savings: summary.total_savings,
                balance: summary.balance,
                net_balance: summary.net_balance,
                ledger_balance: summary.ledger_balance,
            }
        }
    }
}
