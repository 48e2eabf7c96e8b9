//! Savings goal operations.
//!
//! Savings track a target and progress toward it; they never touch the
//! denormalized user balance, so these operations skip the locking protocol
//! entirely.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryOrder, QuerySelect, prelude::*};

use crate::{
    EngineError, NewSaving, Page, Permission, Principal, ResultEngine, Saving, SavingUpdate,
    savings,
};

use super::{
    Engine,
    access::{ListScope, scope_by_owner},
    require_non_negative,
};

fn validate_duration(duration_months: Option<i32>) -> ResultEngine<Option<i32>> {
    if let Some(months) = duration_months
        && months <= 0
    {
        return Err(EngineError::InvalidField(
            "duration_months must be > 0".to_string(),
        ));
    }
    Ok(duration_months)
}

impl Engine {
    /// Creates a savings goal for the principal.
    pub async fn create_saving(
        &self,
        principal: &Principal,
        cmd: NewSaving,
    ) -> ResultEngine<Saving> {
        principal.require(Permission::SavingsWrite)?;
        let amount = require_non_negative(cmd.amount, "amount")?;
        let current = require_non_negative(
            cmd.current_amount.unwrap_or_default(),
            "current_amount",
        )?;
        let duration_months = validate_duration(cmd.duration_months)?;

        let now = Utc::now();
        let model = savings::ActiveModel {
            user_id: ActiveValue::Set(principal.id),
            amount_cents: ActiveValue::Set(amount.cents()),
            current_amount_cents: ActiveValue::Set(current.cents()),
            target_date: ActiveValue::Set(cmd.target_date),
            duration_months: ActiveValue::Set(duration_months),
            description: ActiveValue::Set(cmd.description),
            is_completed: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let inserted = model.insert(&self.database).await?;
        Ok(Saving::from(inserted))
    }

    /// Lists savings visible to the principal, own rows only unless admin.
    pub async fn savings(&self, principal: &Principal, page: Page) -> ResultEngine<Vec<Saving>> {
        principal.require(Permission::SavingsRead)?;
        let rows = scope_by_owner(
            savings::Entity::find(),
            savings::Column::UserId,
            ListScope::for_principal(principal),
        )
        .order_by_asc(savings::Column::Id)
        .offset(page.skip)
        .limit(page.limit)
        .all(&self.database)
        .await?;
        Ok(rows.into_iter().map(Saving::from).collect())
    }

    /// Fetches a single savings goal. Rows owned by someone else read as
    /// absent for non-admins.
    pub async fn saving(&self, principal: &Principal, id: i32) -> ResultEngine<Saving> {
        principal.require(Permission::SavingsRead)?;
        let model = savings::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("saving".to_string()))?;
        if !principal.is_owner_or_admin(model.user_id) {
            return Err(EngineError::NotFound("saving".to_string()));
        }
        Ok(Saving::from(model))
    }

    /// Applies a partial update to a savings goal.
    pub async fn update_saving(
        &self,
        principal: &Principal,
        id: i32,
        upd: SavingUpdate,
    ) -> ResultEngine<Saving> {
        principal.require(Permission::SavingsWrite)?;
        let new_amount = upd
            .amount
            .map(|amount| require_non_negative(amount, "amount"))
            .transpose()?;
        let new_current = upd
            .current_amount
            .map(|amount| require_non_negative(amount, "current_amount"))
            .transpose()?;
        validate_duration(upd.duration_months)?;

        let current = savings::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("saving".to_string()))?;
        if !principal.is_owner_or_admin(current.user_id) {
            return Err(EngineError::NotFound("saving".to_string()));
        }

        let mut model: savings::ActiveModel = current.into();
        if let Some(amount) = new_amount {
            model.amount_cents = ActiveValue::Set(amount.cents());
        }
        if let Some(amount) = new_current {
            model.current_amount_cents = ActiveValue::Set(amount.cents());
        }
        if let Some(target_date) = upd.target_date {
            model.target_date = ActiveValue::Set(Some(target_date));
        }
        if let Some(months) = upd.duration_months {
            model.duration_months = ActiveValue::Set(Some(months));
        }
        if let Some(description) = upd.description {
            model.description = ActiveValue::Set(Some(description));
        }
        if let Some(is_completed) = upd.is_completed {
            model.is_completed = ActiveValue::Set(is_completed);
        }
        model.updated_at = ActiveValue::Set(Utc::now());
        let updated = model.update(&self.database).await?;
        Ok(Saving::from(updated))
    }

    /// Deletes a savings goal. The user balance is untouched.
    pub async fn delete_saving(&self, principal: &Principal, id: i32) -> ResultEngine<()> {
        principal.require(Permission::SavingsDelete)?;
        let current = savings::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("saving".to_string()))?;
        if !principal.is_owner_or_admin(current.user_id) {
            return Err(EngineError::NotFound("saving".to_string()));
        }
        savings::Entity::delete_by_id(current.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
