//! Income ledger entries.
//!
//! An income increases the owning user's balance when created and refunds the
//! increase when deleted; the adjustment always happens in the same database
//! transaction as the row change.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub amount_cents: i64,
    pub source: String,
    pub date: DateTimeUtc,
    pub user_id: i32,
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

/// An income entry as exposed by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub id: i32,
    pub amount: MoneyCents,
    pub source: String,
    pub date: DateTime<Utc>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Income {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            amount: MoneyCents::new(model.amount_cents),
            source: model.source,
            date: model.date,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl Income {
    /// Sums a fetched collection; 0 for an empty one.
    pub fn total(incomes: &[Income]) -> MoneyCents {
        incomes
            .iter()
            .fold(MoneyCents::ZERO, |acc, income| acc + income.amount)
    }

    /// Exact-match, case-sensitive source filter over a fetched collection.
    pub fn filter_by_source<'a>(incomes: &'a [Income], source: &str) -> Vec<&'a Income> {
        incomes
            .iter()
            .filter(|income| income.source == source)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income(id: i32, cents: i64, source: &str) -> Income {
        let now = Utc::now();
        Income {
            id,
            amount: MoneyCents::new(cents),
            source: source.to_string(),
            date: now,
            user_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn total_of_empty_collection_is_zero() {
        assert_eq!(Income::total(&[]), MoneyCents::ZERO);
    }

    #[test]
    fn total_sums_amounts() {
        let incomes = vec![income(1, 1000, "salary"), income(2, 250, "gift")];
        assert_eq!(Income::total(&incomes), MoneyCents::new(1250));
    }

    #[test]
    fn source_filter_is_exact_and_case_sensitive() {
        let incomes = vec![
            income(1, 1000, "Salary"),
            income(2, 250, "salary"),
            income(3, 50, "gift"),
        ];
        let filtered = Income::filter_by_source(&incomes, "salary");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }
}
