use sea_orm::Database;

use engine::{
    Engine, EngineError, ExpenseUpdate, MoneyCents, NewExpense, NewIncome, NewUser, Page,
    Principal, Role,
};
use migration::MigratorTrait;

async fn engine_with_user(email: &str) -> (Engine, Principal) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build();
    let user = engine
        .signup(NewUser {
            email: email.to_string(),
            password: "password".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
        })
        .await
        .unwrap();
    let principal = Principal {
        id: user.id,
        role: Role::User,
    };
    (engine, principal)
}

fn money(text: &str) -> MoneyCents {
    text.parse().unwrap()
}

async fn ledger_balance(engine: &Engine, principal: &Principal) -> MoneyCents {
    engine.profile(principal).await.unwrap().balance
}

async fn fund(engine: &Engine, principal: &Principal, amount: &str) {
    engine
        .create_income(
            principal,
            NewIncome {
                amount: money(amount),
                source: "salary".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn expense_delete_refunds_the_exact_amount() {
    let (engine, alice) = engine_with_user("alice@example.com").await;
    fund(&engine, &alice, "1000.00").await;
    assert_eq!(ledger_balance(&engine, &alice).await, money("1000.00"));

    let expense = engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("75.50"),
                category: "Food".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(ledger_balance(&engine, &alice).await, money("924.50"));

    engine.delete_expense(&alice, expense.id).await.unwrap();
    assert_eq!(ledger_balance(&engine, &alice).await, money("1000.00"));
}

#[tokio::test]
async fn expense_exceeding_balance_is_rejected_without_writes() {
    let (engine, alice) = engine_with_user("alice@example.com").await;
    fund(&engine, &alice, "50.00").await;

    let result = engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("100.00"),
                category: "Food".to_string(),
                date: None,
            },
        )
        .await;
    assert!(matches!(result, Err(EngineError::InsufficientBalance(_))));

    assert_eq!(ledger_balance(&engine, &alice).await, money("50.00"));
    let expenses = engine.expenses(&alice, Page::default()).await.unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn expense_update_applies_the_amount_delta() {
    let (engine, alice) = engine_with_user("alice@example.com").await;
    fund(&engine, &alice, "1000.00").await;

    let expense = engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("100.00"),
                category: "Food".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(ledger_balance(&engine, &alice).await, money("900.00"));

    engine
        .update_expense(
            &alice,
            expense.id,
            ExpenseUpdate {
                amount: Some(money("150.00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ledger_balance(&engine, &alice).await, money("850.00"));

    engine
        .update_expense(
            &alice,
            expense.id,
            ExpenseUpdate {
                amount: Some(money("50.00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ledger_balance(&engine, &alice).await, money("950.00"));
}

#[tokio::test]
async fn expense_increase_past_balance_is_rejected() {
    let (engine, alice) = engine_with_user("alice@example.com").await;
    fund(&engine, &alice, "100.00").await;

    let expense = engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("60.00"),
                category: "Food".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();

    // Increase of 60.00 does not fit in the remaining 40.00.
    let result = engine
        .update_expense(
            &alice,
            expense.id,
            ExpenseUpdate {
                amount: Some(money("120.00")),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(EngineError::InsufficientBalance(_))));
    assert_eq!(ledger_balance(&engine, &alice).await, money("40.00"));
    assert_eq!(
        engine.expense(&alice, expense.id).await.unwrap().amount,
        money("60.00")
    );
}

#[tokio::test]
async fn income_delete_may_drive_balance_negative() {
    let (engine, alice) = engine_with_user("alice@example.com").await;

    let income = engine
        .create_income(
            &alice,
            NewIncome {
                amount: money("100.00"),
                source: "salary".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();
    engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("80.00"),
                category: "Rent".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();

    // The income debit is unconditional.
    engine.delete_income(&alice, income.id).await.unwrap();
    assert_eq!(ledger_balance(&engine, &alice).await, money("-80.00"));
}

#[tokio::test]
async fn second_expense_sees_the_committed_balance() {
    let (engine, alice) = engine_with_user("alice@example.com").await;
    fund(&engine, &alice, "100.00").await;

    // Each expense fits alone; together they overdraw.
    let first = engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("70.00"),
                category: "Food".to_string(),
                date: None,
            },
        )
        .await;
    assert!(first.is_ok());

    let second = engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("70.00"),
                category: "Rent".to_string(),
                date: None,
            },
        )
        .await;
    assert!(matches!(second, Err(EngineError::InsufficientBalance(_))));
    assert_eq!(ledger_balance(&engine, &alice).await, money("30.00"));
}

#[tokio::test]
async fn racing_expenses_never_overdraw() {
    let (engine, alice) = engine_with_user("alice@example.com").await;
    fund(&engine, &alice, "100.00").await;

    let expense = |category: &str| {
        engine.create_expense(
            &alice,
            NewExpense {
                amount: money("70.00"),
                category: category.to_string(),
                date: None,
            },
        )
    };
    let (first, second) = tokio::join!(expense("Food"), expense("Rent"));

    // Exactly one of the racing expenses commits; the loser reads the
    // committed balance and is refused.
    let (winner, loser) = if first.is_ok() {
        (first, second)
    } else {
        (second, first)
    };
    assert!(winner.is_ok());
    assert!(matches!(loser, Err(EngineError::InsufficientBalance(_))));
    assert_eq!(ledger_balance(&engine, &alice).await, money("30.00"));
}

#[tokio::test]
async fn income_update_adjusts_balance_without_a_floor() {
    let (engine, alice) = engine_with_user("alice@example.com").await;
    let income = engine
        .create_income(
            &alice,
            NewIncome {
                amount: money("100.00"),
                source: "salary".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();
    engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("90.00"),
                category: "Rent".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();

    // Shrinking the income below what was already spent is permitted.
    engine
        .update_income(
            &alice,
            income.id,
            engine::IncomeUpdate {
                amount: Some(money("20.00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ledger_balance(&engine, &alice).await, money("-70.00"));
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (engine, alice) = engine_with_user("alice@example.com").await;

    let zero_income = engine
        .create_income(
            &alice,
            NewIncome {
                amount: MoneyCents::ZERO,
                source: "salary".to_string(),
                date: None,
            },
        )
        .await;
    assert!(matches!(zero_income, Err(EngineError::InvalidAmount(_))));

    let negative_expense = engine
        .create_expense(
            &alice,
            NewExpense {
                amount: money("-5.00"),
                category: "Food".to_string(),
                date: None,
            },
        )
        .await;
    assert!(matches!(
        negative_expense,
        Err(EngineError::InvalidAmount(_))
    ));
}
