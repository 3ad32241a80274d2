// Service-level tests against sea-orm's mock database

use super::*;
use chrono::TimeZone;
use sea_orm::{
    DatabaseBackend, IdenStatic, Iterable, MockDatabase, MockExecResult, ModelTrait, Value,
};
use std::collections::BTreeMap;

const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

fn user_model(points: i64, streak: i32) -> user::Model {
    user::Model {
        id: Uuid::from_u128(1),
        wallet_address: WALLET.to_owned(),
        network: "solana".to_owned(),
        email: None,
        points,
        streak,
        last_check_in: None,
        points_history: None,
        created_at: 1_700_000_000,
    }
}

fn check_in_model(day: NaiveDate, points: i64) -> check_in::Model {
    check_in::Model {
        id: Uuid::new_v4(),
        user_id: Uuid::from_u128(1),
        points,
        signature: "sig".to_owned(),
        network: "solana".to_owned(),
        day,
        created_at: 1_700_000_000,
    }
}

fn stake_model(amount: i64, start_date: i64, days: i64) -> stake::Model {
    stake::Model {
        id: Uuid::from_u128(9),
        user_id: Uuid::from_u128(1),
        amount,
        start_date,
        end_date: points::stake_end_date(start_date, days),
        signature: "sig".to_owned(),
        is_active: true,
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    let mut row = BTreeMap::new();
    row.insert("num_items", Value::BigInt(Some(n)));
    row
}

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn second_check_in_same_day_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(10, 1)]])
        .append_query_results(vec![vec![check_in_model(date(2025, 3, 1), 10)]])
        .into_connection();

    let result = check_in(&db, WALLET, Network::Solana, "sig", now()).await;
    assert!(matches!(result, Err(CivicError::AlreadyCheckedIn)));
}

#[tokio::test]
async fn check_in_after_yesterday_extends_streak() {
    let mut updated = user_model(55, 4);
    updated.last_check_in = Some(now().timestamp());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(40, 3)]])
        .append_query_results(vec![Vec::<check_in::Model>::new()])
        .append_query_results(vec![vec![check_in_model(date(2025, 2, 28), 12)]])
        .append_query_results(vec![vec![check_in_model(date(2025, 3, 1), 15)]])
        .append_query_results(vec![vec![updated.clone()]])
        .append_query_results(vec![vec![count_row(2)]])
        .append_exec_results(vec![exec_ok()])
        .into_connection();

    let response = check_in(&db, WALLET, Network::Solana, "sig", now())
        .await
        .unwrap();
    assert_eq!(response.points_earned, 15);
    assert_eq!(response.user.user, updated);
    assert_eq!(response.user.leaderboard_rank, 3);
}

#[tokio::test]
async fn check_in_after_gap_resets_streak() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(200, 20)]])
        .append_query_results(vec![Vec::<check_in::Model>::new()])
        .append_query_results(vec![vec![check_in_model(date(2025, 2, 20), 20)]])
        .append_query_results(vec![vec![check_in_model(date(2025, 3, 1), 10)]])
        .append_query_results(vec![vec![user_model(210, 1)]])
        .append_query_results(vec![vec![count_row(0)]])
        .append_exec_results(vec![exec_ok()])
        .into_connection();

    let response = check_in(&db, WALLET, Network::Solana, "sig", now())
        .await
        .unwrap();
    assert_eq!(response.points_earned, 10);
    assert_eq!(response.user.leaderboard_rank, 1);
}

fn prefixed_row<E: EntityTrait>(
    prefix: &str,
    model: &E::Model,
    row: &mut BTreeMap<String, Value>,
) {
    for column in E::Column::iter() {
        row.insert(format!("{}{}", prefix, column.as_str()), model.get(column));
    }
}

fn leaderboard_row(rank: i64, wallet_address: &str, points: i64) -> BTreeMap<&'static str, Value> {
    let mut row = BTreeMap::new();
    row.insert("user_rank", Value::BigInt(Some(rank)));
    row.insert("id", Value::Uuid(Some(Box::new(Uuid::from_u128(rank as u128)))));
    row.insert(
        "wallet_address",
        Value::String(Some(Box::new(wallet_address.to_owned()))),
    );
    row.insert("network", Value::String(Some(Box::new("solana".to_owned()))));
    row.insert("points", Value::BigInt(Some(points)));
    row.insert("streak", Value::Int(Some(3)));
    row
}

#[tokio::test]
async fn rank_counts_users_with_more_points() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(4)]])
        .into_connection();

    assert_eq!(leaderboard_rank(&db, &user_model(30, 2)).await.unwrap(), 5);

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains(r#"\"points\" > $1"#), "{}", log);
    assert!(!log.contains(r#"\"network\" = $"#), "{}", log);
}

#[tokio::test]
async fn register_fills_missing_email() {
    let mut with_email = user_model(0, 0);
    with_email.email = Some("ada@civicly.app".to_owned());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(0, 0)]])
        .append_query_results(vec![vec![with_email.clone()]])
        .into_connection();

    let user = register_user(&db, WALLET, Network::Solana, Some("ada@civicly.app"), 0)
        .await
        .unwrap();
    assert_eq!(user, with_email);
}

#[tokio::test]
async fn register_keeps_existing_email() {
    let mut existing = user_model(0, 0);
    existing.email = Some("first@civicly.app".to_owned());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![existing.clone()]])
        .into_connection();

    let user = register_user(&db, WALLET, Network::Solana, Some("second@civicly.app"), 0)
        .await
        .unwrap();
    assert_eq!(user.email.as_deref(), Some("first@civicly.app"));
    assert_eq!(db.into_transaction_log().len(), 1);
}

#[tokio::test]
async fn messages_carry_author_wallet_newest_first() {
    let message = message::Model {
        id: Uuid::from_u128(5),
        user_id: Uuid::from_u128(1),
        content: "gm".to_owned(),
        signature: "sig".to_owned(),
        created_at: 1_740_000_000,
    };
    let mut row = BTreeMap::new();
    prefixed_row::<message::Entity>("A_", &message, &mut row);
    prefixed_row::<user::Entity>("B_", &user_model(10, 1), &mut row);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let messages = messages(&db, 2, 10).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message, message);
    assert_eq!(
        messages[0].user.as_ref().map(|u| u.wallet_address.as_str()),
        Some(WALLET)
    );

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains(r#"\"created_at\" DESC"#), "{}", log);
    assert!(log.contains(r#"\"id\" DESC"#), "{}", log);
}

#[tokio::test]
async fn leaderboard_maps_ranked_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            leaderboard_row(1, WALLET, 120),
            leaderboard_row(1, "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", 120),
        ]])
        .into_connection();

    let entries = leaderboard(&db, Network::Solana, 1, 20).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].wallet_short, "7xKX...gAsU");
    assert_eq!(entries[1].wallet_short, "9WzD...AWWM");
    assert_eq!(entries[1].rank, 1);
    assert_eq!(entries[0].points, 120);
}

#[tokio::test]
async fn leaderboard_rejects_out_of_range_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let result = leaderboard(&db, Network::Solana, i64::MAX, 20).await;
    assert!(matches!(result, Err(CivicError::BadRequest(_))));
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn history_marks_checked_days() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(30, 2)]])
        .append_query_results(vec![vec![
            check_in_model(date(2025, 2, 27), 10),
            check_in_model(date(2025, 3, 1), 12),
        ]])
        .into_connection();

    let history = check_in_history(&db, WALLET, Network::Solana, date(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(history.len(), 7);
    assert_eq!(history[0].date, "2025-02-23");
    assert_eq!(history[6].date, "2025-03-01");
    let checked: Vec<bool> = history.iter().map(|d| d.checked).collect();
    assert_eq!(checked, vec![false, false, false, false, true, false, true]);
}

#[tokio::test]
async fn history_for_unknown_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<user::Model>::new()])
        .into_connection();

    let result = check_in_history(&db, WALLET, Network::Solana, date(2025, 3, 1)).await;
    match result {
        Err(error) => assert_eq!(error.code(), 404),
        Ok(_) => panic!("expected not found"),
    }
}

#[tokio::test]
async fn stake_validates_amount_and_duration() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let zero_amount = StakeInput {
        wallet_address: WALLET,
        network: Network::Solana,
        amount: 0,
        duration_days: 7,
        signature: "sig",
    };
    assert!(matches!(
        stake(&db, zero_amount, 365, 0).await,
        Err(CivicError::BadRequest(_))
    ));

    let too_long = StakeInput {
        wallet_address: WALLET,
        network: Network::Solana,
        amount: 10,
        duration_days: 366,
        signature: "sig",
    };
    assert!(matches!(
        stake(&db, too_long, 365, 0).await,
        Err(CivicError::BadRequest(_))
    ));
}

#[tokio::test]
async fn stake_needs_enough_points() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(5, 1)]])
        .into_connection();
    let input = StakeInput {
        wallet_address: WALLET,
        network: Network::Solana,
        amount: 10,
        duration_days: 7,
        signature: "sig",
    };
    assert!(matches!(
        stake(&db, input, 365, 0).await,
        Err(CivicError::InsufficientPoints)
    ));
}

#[tokio::test]
async fn stake_deducts_points() {
    let now = 1_740_000_000;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(100, 1)]])
        .append_query_results(vec![vec![stake_model(60, now, 7)]])
        .append_query_results(vec![vec![user_model(40, 1)]])
        .append_query_results(vec![vec![count_row(1)]])
        .append_exec_results(vec![exec_ok()])
        .into_connection();
    let input = StakeInput {
        wallet_address: WALLET,
        network: Network::Solana,
        amount: 60,
        duration_days: 7,
        signature: "sig",
    };

    let response = stake(&db, input, 365, now).await.unwrap();
    assert_eq!(response.stake.amount, 60);
    assert_eq!(response.user.user.points, 40);
    assert_eq!(response.user.leaderboard_rank, 2);
}

#[tokio::test]
async fn stake_loses_race_for_points() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(100, 1)]])
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let input = StakeInput {
        wallet_address: WALLET,
        network: Network::Solana,
        amount: 100,
        duration_days: 7,
        signature: "sig",
    };
    assert!(matches!(
        stake(&db, input, 365, 0).await,
        Err(CivicError::InsufficientPoints)
    ));
}

#[tokio::test]
async fn unstake_unknown_stake_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(0, 1)]])
        .append_query_results(vec![Vec::<stake::Model>::new()])
        .into_connection();

    let result = unstake(&db, WALLET, Network::Solana, Uuid::from_u128(9), 0).await;
    match result {
        Err(CivicError::NotFound(message)) => assert_eq!(message, "Stake not found"),
        _ => panic!("expected stake not found"),
    }
}

#[tokio::test]
async fn unstake_at_term_pays_bonus() {
    let start = 1_700_000_000;
    let stake = stake_model(100, start, 30);
    let now = stake.end_date + 60;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(0, 1)]])
        .append_query_results(vec![vec![stake]])
        .append_query_results(vec![vec![user_model(112, 1)]])
        .append_query_results(vec![vec![count_row(0)]])
        .append_exec_results(vec![exec_ok(), exec_ok()])
        .into_connection();

    let response = unstake(&db, WALLET, Network::Solana, Uuid::from_u128(9), now)
        .await
        .unwrap();
    assert_eq!(response.unstaked, 100);
    assert_eq!(response.reward, 12);
    assert_eq!(response.user.user.points, 112);
}

#[tokio::test]
async fn early_unstake_pays_no_bonus() {
    let start = 1_700_000_000;
    let stake = stake_model(100, start, 7);
    let now = stake.end_date - 1;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(0, 1)]])
        .append_query_results(vec![vec![stake]])
        .append_query_results(vec![vec![user_model(100, 1)]])
        .append_query_results(vec![vec![count_row(0)]])
        .append_exec_results(vec![exec_ok(), exec_ok()])
        .into_connection();

    let response = unstake(&db, WALLET, Network::Solana, Uuid::from_u128(9), now)
        .await
        .unwrap();
    assert_eq!(response.reward, 0);
}

#[tokio::test]
async fn long_messages_are_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let content = "a".repeat(11);
    let input = PostMessageInput {
        wallet_address: WALLET,
        network: Network::Solana,
        content: &content,
        signature: "sig",
    };
    assert!(matches!(
        post_message(&db, input, 10, 0).await,
        Err(CivicError::BadRequest(_))
    ));
}

#[tokio::test]
async fn message_for_unknown_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<user::Model>::new()])
        .into_connection();
    let input = PostMessageInput {
        wallet_address: WALLET,
        network: Network::Solana,
        content: "gm",
        signature: "sig",
    };
    let result = post_message(&db, input, 500, 0).await;
    assert!(matches!(result, Err(CivicError::NotFound(_))));
}
