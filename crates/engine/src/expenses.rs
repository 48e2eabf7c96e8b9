//! Expense ledger entries.
//!
//! An expense decreases the owning user's balance; creation and increases are
//! gated by the balance-sufficiency check, deletion refunds the amount.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub amount_cents: i64,
    pub category: String,
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

/// An expense entry as exposed by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i32,
    pub amount: MoneyCents,
    pub category: String,
    pub date: DateTime<Utc>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            amount: MoneyCents::new(model.amount_cents),
            category: model.category,
            date: model.date,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl Expense {
    /// Sums a fetched collection; 0 for an empty one.
    pub fn total(expenses: &[Expense]) -> MoneyCents {
        expenses
            .iter()
            .fold(MoneyCents::ZERO, |acc, expense| acc + expense.amount)
    }

    /// Exact-match, case-sensitive category filter over a fetched collection.
    pub fn filter_by_category<'a>(expenses: &'a [Expense], category: &str) -> Vec<&'a Expense> {
        expenses
            .iter()
            .filter(|expense| expense.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(id: i32, cents: i64, category: &str) -> Expense {
        let now = Utc::now();
        Expense {
            id,
            amount: MoneyCents::new(cents),
            category: category.to_string(),
            date: now,
            user_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn total_of_empty_collection_is_zero() {
        assert_eq!(Expense::total(&[]), MoneyCents::ZERO);
    }

    #[test]
    fn category_filter_is_exact_and_case_sensitive() {
        let expenses = vec![
            expense(1, 7550, "Food"),
            expense(2, 1200, "food"),
            expense(3, 300, "Transport"),
        ];
        let filtered = Expense::filter_by_category(&expenses, "Food");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
        assert_eq!(Expense::total(&expenses), MoneyCents::new(9050));
    }
}
