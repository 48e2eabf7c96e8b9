//! Savings goals.
//!
//! Savings are informational targets, not ledger movements: they never adjust
//! `users.balance_cents`. The summary aggregator still subtracts them when
//! computing the derived "available balance".

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub amount_cents: i64,
    pub current_amount_cents: i64,
    pub target_date: Option<DateTimeUtc>,
    pub duration_months: Option<i32>,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A savings goal as exposed by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saving {
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

impl From<Model> for Saving {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            amount: MoneyCents::new(model.amount_cents),
            current_amount: MoneyCents::new(model.current_amount_cents),
            target_date: model.target_date,
            duration_months: model.duration_months,
            description: model.description,
            is_completed: model.is_completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
