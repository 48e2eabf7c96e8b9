//! User operations: registration, self-service profile, admin management.
//!
//! Registration is the only unauthenticated engine entry point. Admin
//! management is gated on the `admin:*` permissions; the balance override
//! goes through the same user-row lock as the ledger mutations.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ColumnTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    AdminUserUpdate, EngineError, NewUser, Page, Permission, Principal, ProfileUpdate,
    ResultEngine, Role, User, expenses, incomes, savings, users,
};

use super::{Engine, normalize_email, normalize_required_text, with_tx};

impl Engine {
    /// Registers a new user with the default role and a zero balance.
    pub async fn signup(&self, cmd: NewUser) -> ResultEngine<User> {
        let email = normalize_email(&cmd.email)?;
        let first_name = normalize_required_text(&cmd.first_name, "first_name")?;
        let last_name = normalize_required_text(&cmd.last_name, "last_name")?;
        let password = normalize_required_text(&cmd.password, "password")?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::Conflict(email));
        }

        let now = Utc::now();
        let model = users::ActiveModel {
            email: ActiveValue::Set(email),
            password: ActiveValue::Set(password),
            first_name: ActiveValue::Set(first_name),
            last_name: ActiveValue::Set(last_name),
            role: ActiveValue::Set(Role::User.as_str().to_string()),
            balance_cents: ActiveValue::Set(0),
            is_active: ActiveValue::Set(true),
            is_verified: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let inserted = model.insert(&self.database).await?;
        User::try_from(inserted)
    }

    /// Returns the principal's own profile.
    pub async fn profile(&self, principal: &Principal) -> ResultEngine<User> {
        principal.require(Permission::UserRead)?;
        let model = users::Entity::find_by_id(principal.id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
        User::try_from(model)
    }

    /// Self-service partial profile update. An email change is re-checked for
    /// uniqueness.
    pub async fn update_profile(
        &self,
        principal: &Principal,
        upd: ProfileUpdate,
    ) -> ResultEngine<User> {
        principal.require(Permission::UserWrite)?;
        let new_email = upd
            .email
            .as_deref()
            .map(normalize_email)
            .transpose()?;
        let new_first = upd
            .first_name
            .as_deref()
            .map(|name| normalize_required_text(name, "first_name"))
            .transpose()?;
        let new_last = upd
            .last_name
            .as_deref()
            .map(|name| normalize_required_text(name, "last_name"))
            .transpose()?;
        let new_password = upd
            .password
            .as_deref()
            .map(|password| normalize_required_text(password, "password"))
            .transpose()?;

        let current = users::Entity::find_by_id(principal.id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))?;

        if let Some(email) = &new_email
            && *email != current.email
        {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&self.database)
                .await?;
            if taken.is_some() {
                return Err(EngineError::Conflict(email.clone()));
            }
        }

        let mut model: users::ActiveModel = current.into();
        if let Some(email) = new_email {
            model.email = ActiveValue::Set(email);
        }
        if let Some(first_name) = new_first {
            model.first_name = ActiveValue::Set(first_name);
        }
        if let Some(last_name) = new_last {
            model.last_name = ActiveValue::Set(last_name);
        }
        if let Some(password) = new_password {
            model.password = ActiveValue::Set(password);
        }
        model.updated_at = ActiveValue::Set(Utc::now());
        let updated = model.update(&self.database).await?;
        User::try_from(updated)
    }

    /// Admin: paginated list of all users.
    pub async fn users(&self, principal: &Principal, page: Page) -> ResultEngine<Vec<User>> {
        principal.require(Permission::AdminRead)?;
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.database)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    /// Admin: fetch any user by id.
    pub async fn user(&self, principal: &Principal, id: i32) -> ResultEngine<User> {
        principal.require(Permission::AdminRead)?;
        let model = users::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))?;
        User::try_from(model)
    }

    /// Admin: moderate a user. A balance override rewrites the ledger
    /// balance under the same user-row lock the mutation protocol takes.
    pub async fn admin_update_user(
        &self,
        principal: &Principal,
        id: i32,
        upd: AdminUserUpdate,
    ) -> ResultEngine<User> {
        principal.require(Permission::AdminWrite)?;
        let new_role = upd
            .role
            .as_deref()
            .map(Role::try_from)
            .transpose()?;

        with_tx!(self, |db_tx| {
            let user = self.lock_user_row(&db_tx, id).await?;
            let mut model: users::ActiveModel = user.into();
            if let Some(role) = new_role {
                model.role = ActiveValue::Set(role.as_str().to_string());
            }
            if let Some(is_active) = upd.is_active {
                model.is_active = ActiveValue::Set(is_active);
            }
            if let Some(is_verified) = upd.is_verified {
                model.is_verified = ActiveValue::Set(is_verified);
            }
            if let Some(balance) = upd.balance {
                model.balance_cents = ActiveValue::Set(balance.cents());
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            let updated = model.update(&db_tx).await?;
            User::try_from(updated)
        })
    }

    /// Admin: delete a user and every ledger row they own, atomically.
    pub async fn delete_user(&self, principal: &Principal, id: i32) -> ResultEngine<()> {
        principal.require(Permission::UserDelete)?;

        with_tx!(self, |db_tx| {
            let user = self.lock_user_row(&db_tx, id).await?;
            incomes::Entity::delete_many()
                .filter(incomes::Column::UserId.eq(user.id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::UserId.eq(user.id))
                .exec(&db_tx)
                .await?;
            savings::Entity::delete_many()
                .filter(savings::Column::UserId.eq(user.id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
