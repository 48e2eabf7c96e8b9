//! Read-only balance summary.
//!
//! The summary recomputes totals from the ledger tables instead of trusting
//! the denormalized user balance, and exposes both figures side by side:
//! `balance` is the derived available amount (income minus expenses minus
//! savings), `ledger_balance` is the persisted scalar the mutation protocol
//! maintains (which savings never touch). The two legitimately diverge once
//! savings exist.

use sea_orm::{ConnectionTrait, EntityTrait, Statement};
use serde::Serialize;

use crate::{EngineError, MoneyCents, Permission, Principal, ResultEngine, users};

use super::Engine;

/// Aggregated financial position for one user or, for admins, the whole
/// system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    pub total_savings: MoneyCents,
    /// Derived: income - expense - savings.
    pub balance: MoneyCents,
    /// Derived: income - expense.
    pub net_balance: MoneyCents,
    /// The persisted per-user balance; absent for the all-users aggregate.
    pub ledger_balance: Option<MoneyCents>,
}

impl Engine {
    async fn sum_amount_cents(&self, table: &str, user_id: Option<i32>) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = match user_id {
            Some(user_id) => Statement::from_sql_and_values(
                backend,
                format!("SELECT COALESCE(SUM(amount_cents), 0) AS sum FROM {table} WHERE user_id = ?"),
                vec![user_id.into()],
            ),
            None => Statement::from_sql_and_values(
                backend,
                format!("SELECT COALESCE(SUM(amount_cents), 0) AS sum FROM {table}"),
                vec![],
            ),
        };
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }

    /// Computes the summary for a user, or for every user at once.
    ///
    /// Non-admins always get their own summary and may not name anyone else.
    /// Admins pick a user with `user_id`, or omit it for the system-wide
    /// aggregate.
    pub async fn balance_summary(
        &self,
        principal: &Principal,
        user_id: Option<i32>,
    ) -> ResultEngine<BalanceSummary> {
        principal.require(Permission::DashboardRead)?;
        let scope = match user_id {
            None if principal.is_admin() => None,
            None => Some(principal.id),
            Some(id) if principal.is_owner_or_admin(id) => Some(id),
            Some(_) => {
                return Err(EngineError::Forbidden(
                    Permission::AdminRead.as_str().to_string(),
                ));
            }
        };

        let total_income = self.sum_amount_cents("incomes", scope).await?;
        let total_expense = self.sum_amount_cents("expenses", scope).await?;
        let total_savings = self.sum_amount_cents("savings", scope).await?;

        let ledger_balance = match scope {
            None => None,
            Some(user_id) => {
                let user = users::Entity::find_by_id(user_id)
                    .one(&self.database)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
                Some(MoneyCents::new(user.balance_cents))
            }
        };

        Ok(BalanceSummary {
            total_income: MoneyCents::new(total_income),
            total_expense: MoneyCents::new(total_expense),
            total_savings: MoneyCents::new(total_savings),
            balance: MoneyCents::new(total_income - total_expense - total_savings),
            net_balance: MoneyCents::new(total_income - total_expense),
            ledger_balance,
        })
    }
}
