//! Shared authorization and locking plumbing for the ops modules.
//!
//! Two rules hold everywhere:
//!
//! - single-resource access that fails the ownership check surfaces
//!   `NotFound`, never `Forbidden`, so non-admins cannot probe for existence;
//! - the admin "see all" toggle for list endpoints is decided once here via
//!   [`ListScope`], not re-implemented per route.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Select,
    prelude::*,
};

use crate::{EngineError, Principal, ResultEngine, users};

use super::Engine;

/// Query scope for list/aggregate operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ListScope {
    Own(i32),
    All,
}

impl ListScope {
    pub(super) fn for_principal(principal: &Principal) -> Self {
        if principal.is_admin() {
            Self::All
        } else {
            Self::Own(principal.id)
        }
    }
}

/// Applies a [`ListScope`] to a select, filtering on the entity's owner
/// column when scoped to a single user.
pub(super) fn scope_by_owner<E, C>(select: Select<E>, user_col: C, scope: ListScope) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match scope {
        ListScope::All => select,
        ListScope::Own(user_id) => select.filter(user_col.eq(user_id)),
    }
}

impl Engine {
    /// Acquires an exclusive lock on the user row, held until the enclosing
    /// transaction commits or aborts.
    ///
    /// Lock-acquire-before-read is the contract: the balance must only be
    /// read from the locked row. Lock ordering is always user row first, then
    /// the ledger row being mutated, so concurrent mutations on the same pair
    /// cannot deadlock.
    pub(super) async fn lock_user_row(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    /// Persists a new denormalized balance for a user already locked by the
    /// caller.
    pub(super) async fn set_user_balance(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
        balance_cents: i64,
    ) -> ResultEngine<()> {
        let model = users::ActiveModel {
            id: ActiveValue::Set(user_id),
            balance_cents: ActiveValue::Set(balance_cents),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        model.update(db_tx).await?;
        Ok(())
    }
}
