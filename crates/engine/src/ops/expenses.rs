//! Expense operations.
//!
//! Same transaction and lock discipline as incomes, with one extra rule: any
//! mutation that would reduce the balance is checked against the locked
//! balance first and refused with `InsufficientBalance` if it does not fit.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    EngineError, Expense, ExpenseUpdate, MoneyCents, NewExpense, Page, Permission, Principal,
    ResultEngine, expenses,
};

use super::{
    Engine,
    access::{ListScope, scope_by_owner},
    normalize_required_text, require_positive, with_tx,
};

impl Engine {
    /// Records an expense for the principal, refusing it when the locked
    /// balance cannot cover the amount.
    pub async fn create_expense(
        &self,
        principal: &Principal,
        cmd: NewExpense,
    ) -> ResultEngine<Expense> {
        principal.require(Permission::ExpenseWrite)?;
        let amount = require_positive(cmd.amount, "amount")?;
        let category = normalize_required_text(&cmd.category, "category")?;

        with_tx!(self, |db_tx| {
            let user = self.lock_user_row(&db_tx, principal.id).await?;
            if user.balance_cents < amount.cents() {
                return Err(EngineError::InsufficientBalance(format!(
                    "balance {} cannot cover expense {}",
                    MoneyCents::new(user.balance_cents),
                    amount
                )));
            }
            let now = Utc::now();
            let model = expenses::ActiveModel {
                amount_cents: ActiveValue::Set(amount.cents()),
                category: ActiveValue::Set(category),
                date: ActiveValue::Set(cmd.date.unwrap_or(now)),
                user_id: ActiveValue::Set(user.id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            let inserted = model.insert(&db_tx).await?;
            self.set_user_balance(&db_tx, user.id, user.balance_cents - amount.cents())
                .await?;
            Ok(Expense::from(inserted))
        })
    }

    /// Lists expenses visible to the principal, own rows only unless admin.
    pub async fn expenses(&self, principal: &Principal, page: Page) -> ResultEngine<Vec<Expense>> {
        principal.require(Permission::ExpenseRead)?;
        let rows = scope_by_owner(
            expenses::Entity::find(),
            expenses::Column::UserId,
            ListScope::for_principal(principal),
        )
        .order_by_asc(expenses::Column::Id)
        .offset(page.skip)
        .limit(page.limit)
        .all(&self.database)
        .await?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    /// Fetches a single expense. Rows owned by someone else read as absent
    /// for non-admins.
    pub async fn expense(&self, principal: &Principal, id: i32) -> ResultEngine<Expense> {
        principal.require(Permission::ExpenseRead)?;
        let model = expenses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("expense".to_string()))?;
        if !principal.is_owner_or_admin(model.user_id) {
            return Err(EngineError::NotFound("expense".to_string()));
        }
        Ok(Expense::from(model))
    }

    /// Exact-match category filter over the principal's visible expenses. The
    /// filter runs over the full scoped collection, never a pagination
    /// window.
    pub async fn expenses_by_category(
        &self,
        principal: &Principal,
        category: &str,
    ) -> ResultEngine<Vec<Expense>> {
        principal.require(Permission::ExpenseRead)?;
        let all = self.all_expenses(principal).await?;
        Ok(Expense::filter_by_category(&all, category)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Sum of every expense visible to the principal, unpaginated.
    pub async fn total_expenses(&self, principal: &Principal) -> ResultEngine<MoneyCents> {
        principal.require(Permission::ExpenseRead)?;
        let all = self.all_expenses(principal).await?;
        Ok(Expense::total(&all))
    }

    /// Every expense visible to the principal, unpaginated.
    async fn all_expenses(&self, principal: &Principal) -> ResultEngine<Vec<Expense>> {
        let rows = scope_by_owner(
            expenses::Entity::find(),
            expenses::Column::UserId,
            ListScope::for_principal(principal),
        )
        .order_by_asc(expenses::Column::Id)
        .all(&self.database)
        .await?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    /// Applies a partial update. An amount increase must fit in the locked
    /// balance; a decrease refunds the difference.
    pub async fn update_expense(
        &self,
        principal: &Principal,
        id: i32,
        upd: ExpenseUpdate,
    ) -> ResultEngine<Expense> {
        principal.require(Permission::ExpenseWrite)?;
        let new_amount = upd
            .amount
            .map(|amount| require_positive(amount, "amount"))
            .transpose()?;
        let new_category = upd
            .category
            .as_deref()
            .map(|category| normalize_required_text(category, "category"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            // Unlocked read to learn the owner, so the user lock can be taken
            // before the row lock.
            let current = expenses::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("expense".to_string()))?;
            if !principal.is_owner_or_admin(current.user_id) {
                return Err(EngineError::NotFound("expense".to_string()));
            }
            let user = self.lock_user_row(&db_tx, current.user_id).await?;
            let current = expenses::Entity::find_by_id(id)
                .lock_exclusive()
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("expense".to_string()))?;

            let delta = new_amount
                .map(|amount| amount.cents() - current.amount_cents)
                .unwrap_or(0);
            if delta > 0 && user.balance_cents < delta {
                return Err(EngineError::InsufficientBalance(format!(
                    "balance {} cannot cover increase {}",
                    MoneyCents::new(user.balance_cents),
                    MoneyCents::new(delta)
                )));
            }

            let mut model: expenses::ActiveModel = current.into();
            if let Some(amount) = new_amount {
                model.amount_cents = ActiveValue::Set(amount.cents());
            }
            if let Some(category) = new_category {
                model.category = ActiveValue::Set(category);
            }
            if let Some(date) = upd.date {
                model.date = ActiveValue::Set(date);
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            let updated = model.update(&db_tx).await?;

            if delta != 0 {
                self.set_user_balance(&db_tx, user.id, user.balance_cents - delta)
                    .await?;
            }
            Ok(Expense::from(updated))
        })
    }

    /// Deletes an expense and refunds its amount to the owner's balance.
    pub async fn delete_expense(&self, principal: &Principal, id: i32) -> ResultEngine<()> {
        principal.require(Permission::ExpenseDelete)?;

        with_tx!(self, |db_tx| {
            let current = expenses::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("expense".to_string()))?;
            if !principal.is_owner_or_admin(current.user_id) {
                return Err(EngineError::NotFound("expense".to_string()));
            }
            let user = self.lock_user_row(&db_tx, current.user_id).await?;
            let current = expenses::Entity::find_by_id(id)
                .lock_exclusive()
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("expense".to_string()))?;

            let amount = current.amount_cents;
            expenses::Entity::delete_by_id(current.id).exec(&db_tx).await?;
            self.set_user_balance(&db_tx, user.id, user.balance_cents + amount)
                .await?;
            Ok(())
        })
    }
}
