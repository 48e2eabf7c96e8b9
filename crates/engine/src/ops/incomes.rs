//! Income operations.
//!
//! Every balance-affecting mutation runs inside a single transaction and
//! follows the locking protocol: exclusive lock on the owning user row first,
//! then on the income row being mutated. Incomes are never subject to a
//! sufficiency check, so reductions and deletions can drive the persisted
//! balance below zero.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    EngineError, Income, IncomeUpdate, NewIncome, Page, Permission, Principal, ResultEngine,
    incomes,
};

use super::{
    Engine,
    access::{ListScope, scope_by_owner},
    normalize_required_text, require_positive, with_tx,
};

impl Engine {
    /// Records an income for the principal and credits their balance in the
    /// same transaction.
    pub async fn create_income(
        &self,
        principal: &Principal,
        cmd: NewIncome,
    ) -> ResultEngine<Income> {
        principal.require(Permission::IncomeWrite)?;
        let amount = require_positive(cmd.amount, "amount")?;
        let source = normalize_required_text(&cmd.source, "source")?;

        with_tx!(self, |db_tx| {
            let user = self.lock_user_row(&db_tx, principal.id).await?;
            let now = Utc::now();
            let model = incomes::ActiveModel {
                amount_cents: ActiveValue::Set(amount.cents()),
                source: ActiveValue::Set(source),
                date: ActiveValue::Set(cmd.date.unwrap_or(now)),
                user_id: ActiveValue::Set(user.id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            let inserted = model.insert(&db_tx).await?;
            self.set_user_balance(&db_tx, user.id, user.balance_cents + amount.cents())
                .await?;
            Ok(Income::from(inserted))
        })
    }

    /// Lists incomes visible to the principal, own rows only unless admin.
    pub async fn incomes(&self, principal: &Principal, page: Page) -> ResultEngine<Vec<Income>> {
        principal.require(Permission::IncomeRead)?;
        let rows = scope_by_owner(
            incomes::Entity::find(),
            incomes::Column::UserId,
            ListScope::for_principal(principal),
        )
        .order_by_asc(incomes::Column::Id)
        .offset(page.skip)
        .limit(page.limit)
        .all(&self.database)
        .await?;
        Ok(rows.into_iter().map(Income::from).collect())
    }

    /// Fetches a single income. Rows owned by someone else read as absent for
    /// non-admins.
    pub async fn income(&self, principal: &Principal, id: i32) -> ResultEngine<Income> {
        principal.require(Permission::IncomeRead)?;
        let model = incomes::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("income".to_string()))?;
        if !principal.is_owner_or_admin(model.user_id) {
            return Err(EngineError::NotFound("income".to_string()));
        }
        Ok(Income::from(model))
    }

    /// Exact-match source filter over the principal's visible incomes. The
    /// filter runs over the full scoped collection, never a pagination
    /// window.
    pub async fn incomes_by_source(
        &self,
        principal: &Principal,
        source: &str,
    ) -> ResultEngine<Vec<Income>> {
        principal.require(Permission::IncomeRead)?;
        let all = self.all_incomes(principal).await?;
        Ok(Income::filter_by_source(&all, source)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Every income visible to the principal, unpaginated.
    async fn all_incomes(&self, principal: &Principal) -> ResultEngine<Vec<Income>> {
        let rows = scope_by_owner(
            incomes::Entity::find(),
            incomes::Column::UserId,
            ListScope::for_principal(principal),
        )
        .order_by_asc(incomes::Column::Id)
        .all(&self.database)
        .await?;
        Ok(rows.into_iter().map(Income::from).collect())
    }

    /// Applies a partial update, adjusting the owner's balance by the amount
    /// delta when the amount changes.
    pub async fn update_income(
        &self,
        principal: &Principal,
        id: i32,
        upd: IncomeUpdate,
    ) -> ResultEngine<Income> {
        principal.require(Permission::IncomeWrite)?;
        let new_amount = upd
            .amount
            .map(|amount| require_positive(amount, "amount"))
            .transpose()?;
        let new_source = upd
            .source
            .as_deref()
            .map(|source| normalize_required_text(source, "source"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            // Unlocked read to learn the owner, so the user lock can be taken
            // before the row lock.
            let current = incomes::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("income".to_string()))?;
            if !principal.is_owner_or_admin(current.user_id) {
                return Err(EngineError::NotFound("income".to_string()));
            }
            let user = self.lock_user_row(&db_tx, current.user_id).await?;
            let current = incomes::Entity::find_by_id(id)
                .lock_exclusive()
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("income".to_string()))?;

            let delta = new_amount
                .map(|amount| amount.cents() - current.amount_cents)
                .unwrap_or(0);

            let mut model: incomes::ActiveModel = current.into();
            if let Some(amount) = new_amount {
                model.amount_cents = ActiveValue::Set(amount.cents());
            }
            if let Some(source) = new_source {
                model.source = ActiveValue::Set(source);
            }
            if let Some(date) = upd.date {
                model.date = ActiveValue::Set(date);
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            let updated = model.update(&db_tx).await?;

            // Income reductions are always permitted, even past net zero.
            if delta != 0 {
                self.set_user_balance(&db_tx, user.id, user.balance_cents + delta)
                    .await?;
            }
            Ok(Income::from(updated))
        })
    }

    /// Deletes an income and debits its amount from the owner's balance. The
    /// debit is unconditional and may leave the balance negative.
    pub async fn delete_income(&self, principal: &Principal, id: i32) -> ResultEngine<()> {
        principal.require(Permission::IncomeDelete)?;

        with_tx!(self, |db_tx| {
            let current = incomes::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("income".to_string()))?;
            if !principal.is_owner_or_admin(current.user_id) {
                return Err(EngineError::NotFound("income".to_string()));
            }
            let user = self.lock_user_row(&db_tx, current.user_id).await?;
            let current = incomes::Entity::find_by_id(id)
                .lock_exclusive()
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("income".to_string()))?;

            let amount = current.amount_cents;
            incomes::Entity::delete_by_id(current.id).exec(&db_tx).await?;
            self.set_user_balance(&db_tx, user.id, user.balance_cents - amount)
                .await?;
            Ok(())
        })
    }
}
