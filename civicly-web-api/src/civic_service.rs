use crate::dto::{
    page_offset, CheckInResponse, HistoryDay, LeaderboardEntry, MessageAuthor, MessageWithAuthor,
    Network, StakeResponse, UnstakeResponse, UserWithRank,
};
use crate::error::{is_unique_violation, CivicError, Result};
use crate::points;
use crate::sql_stmt::{DB_BACKEND, LEADERBOARD};
use chrono::{DateTime, NaiveDate, Utc};
use civicly_db_entity::db::{check_in, message, stake, user};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait,
};
use serde_json::json;
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn find_user<C: ConnectionTrait>(
    db: &C,
    wallet_address: &str,
    network: Network,
) -> Result<Option<user::Model>> {
    let user = user::Entity::find()
        .filter(user::Column::WalletAddress.eq(wallet_address))
        .filter(user::Column::Network.eq(network.to_string()))
        .one(db)
        .await?;
    Ok(user)
}

pub async fn require_user<C: ConnectionTrait>(
    db: &C,
    wallet_address: &str,
    network: Network,
) -> Result<user::Model> {
    match find_user(db, wallet_address, network).await? {
        Some(user) => Ok(user),
        None => {
            warn!("User not found: {} ({})", wallet_address, network);
            Err(CivicError::user_not_found())
        }
    }
}

/// Must not run inside a transaction: a lost insert race is resolved by re-reading,
/// which Postgres refuses in an aborted transaction.
pub async fn find_or_create_user(
    db: &DatabaseConnection,
    wallet_address: &str,
    network: Network,
    email: Option<&str>,
    now: i64,
) -> Result<user::Model> {
    if let Some(user) = find_user(db, wallet_address, network).await? {
        return Ok(user);
    }

    let new_user = user::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        wallet_address: ActiveValue::Set(wallet_address.to_owned()),
        network: ActiveValue::Set(network.to_string()),
        email: ActiveValue::Set(email.map(str::to_owned)),
        points: ActiveValue::Set(0),
        streak: ActiveValue::Set(0),
        last_check_in: ActiveValue::Set(None),
        points_history: ActiveValue::Set(None),
        created_at: ActiveValue::Set(now),
    };

    match new_user.insert(db).await {
        Ok(user) => {
            info!("Created user {} on {}", wallet_address, network);
            Ok(user)
        }
        Err(error) if is_unique_violation(&error) => find_user(db, wallet_address, network)
            .await?
            .ok_or(CivicError::Database(error)),
        Err(error) => Err(error.into()),
    }
}

/// Global rank: one plus the number of users, on any network, with strictly more points.
pub async fn leaderboard_rank<C: ConnectionTrait>(db: &C, user: &user::Model) -> Result<i64> {
    let higher = user::Entity::find()
        .filter(user::Column::Points.gt(user.points))
        .count(db)
        .await?;
    Ok(higher as i64 + 1)
}

pub async fn with_rank<C: ConnectionTrait>(db: &C, user: user::Model) -> Result<UserWithRank> {
    let leaderboard_rank = leaderboard_rank(db, &user).await?;
    Ok(UserWithRank {
        user,
        leaderboard_rank,
    })
}

async fn reload_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(CivicError::user_not_found)
}

/// Find or create the user; a missing email is filled in from the request.
pub async fn register_user(
    db: &DatabaseConnection,
    wallet_address: &str,
    network: Network,
    email: Option<&str>,
    now: i64,
) -> Result<user::Model> {
    let user = find_or_create_user(db, wallet_address, network, email, now).await?;
    match (user.email.as_deref(), email) {
        (None, Some(email)) => {
            let mut active: user::ActiveModel = user.into();
            active.email = ActiveValue::Set(Some(email.to_owned()));
            Ok(active.update(db).await?)
        }
        _ => Ok(user),
    }
}

pub async fn user_data(
    db: &DatabaseConnection,
    wallet_address: &str,
    network: Network,
    now: i64,
) -> Result<UserWithRank> {
    let user = find_or_create_user(db, wallet_address, network, None, now).await?;
    with_rank(db, user).await
}

pub async fn check_in(
    db: &DatabaseConnection,
    wallet_address: &str,
    network: Network,
    signature: &str,
    now: DateTime<Utc>,
) -> Result<CheckInResponse> {
    let now_ts = now.timestamp();
    let today = now.date_naive();
    let user = find_or_create_user(db, wallet_address, network, None, now_ts).await?;

    let txn = db.begin().await?;

    let today_check_in = check_in::Entity::find()
        .filter(check_in::Column::UserId.eq(user.id))
        .filter(check_in::Column::Day.eq(today))
        .one(&txn)
        .await?;
    if today_check_in.is_some() {
        return Err(CivicError::AlreadyCheckedIn);
    }

    let latest_check_in = check_in::Entity::find()
        .filter(check_in::Column::UserId.eq(user.id))
        .order_by_desc(check_in::Column::Day)
        .one(&txn)
        .await?;
    let streak = points::next_streak(latest_check_in.map(|c| c.day), today, user.streak);
    let points_earned = points::points_for_streak(streak);

    let record = check_in::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        user_id: ActiveValue::Set(user.id),
        points: ActiveValue::Set(points_earned),
        signature: ActiveValue::Set(signature.to_owned()),
        network: ActiveValue::Set(network.to_string()),
        day: ActiveValue::Set(today),
        created_at: ActiveValue::Set(now_ts),
    };
    if let Err(error) = record.insert(&txn).await {
        // a concurrent check-in won the (user_id, day) index
        return Err(if is_unique_violation(&error) {
            CivicError::AlreadyCheckedIn
        } else {
            error.into()
        });
    }

    user::Entity::update_many()
        .col_expr(
            user::Column::Points,
            Expr::col(user::Column::Points).add(points_earned),
        )
        .col_expr(user::Column::Streak, Expr::value(streak))
        .col_expr(user::Column::LastCheckIn, Expr::value(now_ts))
        .col_expr(
            user::Column::PointsHistory,
            Expr::value(json!({ "lastWeek": user.points })),
        )
        .filter(user::Column::Id.eq(user.id))
        .exec(&txn)
        .await?;

    let user = reload_user(&txn, user.id).await?;
    let user = with_rank(&txn, user).await?;
    txn.commit().await?;

    info!(
        "Check-in for {}: streak {} (x{}) earned {}",
        wallet_address,
        streak,
        points::multiplier(streak),
        points_earned
    );
    Ok(CheckInResponse {
        user,
        points_earned,
    })
}

pub async fn check_in_history<C: ConnectionTrait>(
    db: &C,
    wallet_address: &str,
    network: Network,
    today: NaiveDate,
) -> Result<Vec<HistoryDay>> {
    let user = require_user(db, wallet_address, network).await?;
    let days = points::recent_days(today);
    let since = days.first().copied().unwrap_or(today);

    let checked: HashSet<NaiveDate> = check_in::Entity::find()
        .filter(check_in::Column::UserId.eq(user.id))
        .filter(check_in::Column::Day.gte(since))
        .order_by_asc(check_in::Column::Day)
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.day)
        .collect();

    Ok(days
        .iter()
        .map(|day| HistoryDay {
            date: day.format("%Y-%m-%d").to_string(),
            checked: checked.contains(day),
        })
        .collect())
}

pub struct StakeInput<'a> {
    pub wallet_address: &'a str,
    pub network: Network,
    pub amount: i64,
    pub duration_days: i64,
    pub signature: &'a str,
}

pub async fn stake(
    db: &DatabaseConnection,
    input: StakeInput<'_>,
    max_stake_days: i64,
    now: i64,
) -> Result<StakeResponse> {
    if input.amount <= 0 {
        return Err(CivicError::BadRequest("'amount' should be positive".to_owned()));
    }
    if input.duration_days < 1 || input.duration_days > max_stake_days {
        return Err(CivicError::BadRequest(format!(
            "'duration' should be between 1 and {} days",
            max_stake_days
        )));
    }

    let txn = db.begin().await?;
    let user = require_user(&txn, input.wallet_address, input.network).await?;
    if user.points < input.amount {
        return Err(CivicError::InsufficientPoints);
    }

    let deducted = user::Entity::update_many()
        .col_expr(
            user::Column::Points,
            Expr::col(user::Column::Points).sub(input.amount),
        )
        .filter(user::Column::Id.eq(user.id))
        .filter(user::Column::Points.gte(input.amount))
        .exec(&txn)
        .await?;
    if deducted.rows_affected == 0 {
        return Err(CivicError::InsufficientPoints);
    }

    let stake = stake::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        user_id: ActiveValue::Set(user.id),
        amount: ActiveValue::Set(input.amount),
        start_date: ActiveValue::Set(now),
        end_date: ActiveValue::Set(points::stake_end_date(now, input.duration_days)),
        signature: ActiveValue::Set(input.signature.to_owned()),
        is_active: ActiveValue::Set(true),
    }
    .insert(&txn)
    .await?;

    let user = reload_user(&txn, user.id).await?;
    let user = with_rank(&txn, user).await?;
    txn.commit().await?;

    info!(
        "{} staked {} points for {} days",
        input.wallet_address, input.amount, input.duration_days
    );
    Ok(StakeResponse { stake, user })
}

pub async fn unstake(
    db: &DatabaseConnection,
    wallet_address: &str,
    network: Network,
    stake_id: Uuid,
    now: i64,
) -> Result<UnstakeResponse> {
    let txn = db.begin().await?;
    let user = require_user(&txn, wallet_address, network).await?;

    let stake = stake::Entity::find()
        .filter(stake::Column::Id.eq(stake_id))
        .filter(stake::Column::UserId.eq(user.id))
        .filter(stake::Column::IsActive.eq(true))
        .one(&txn)
        .await?
        .ok_or_else(|| CivicError::NotFound("Stake not found".to_owned()))?;

    let reward = points::stake_reward(stake.amount, stake.start_date, stake.end_date, now);

    let closed = stake::Entity::update_many()
        .col_expr(stake::Column::IsActive, Expr::value(false))
        .filter(stake::Column::Id.eq(stake.id))
        .filter(stake::Column::IsActive.eq(true))
        .exec(&txn)
        .await?;
    if closed.rows_affected == 0 {
        return Err(CivicError::NotFound("Stake not found".to_owned()));
    }

    user::Entity::update_many()
        .col_expr(
            user::Column::Points,
            Expr::col(user::Column::Points).add(stake.amount + reward),
        )
        .filter(user::Column::Id.eq(user.id))
        .exec(&txn)
        .await?;

    let user = reload_user(&txn, user.id).await?;
    let user = with_rank(&txn, user).await?;
    txn.commit().await?;

    info!(
        "{} unstaked {} points with reward {}",
        wallet_address, stake.amount, reward
    );
    Ok(UnstakeResponse {
        user,
        unstaked: stake.amount,
        reward,
    })
}

pub async fn active_stakes<C: ConnectionTrait>(
    db: &C,
    wallet_address: &str,
    network: Network,
) -> Result<Vec<stake::Model>> {
    let user = require_user(db, wallet_address, network).await?;
    let stakes = stake::Entity::find()
        .filter(stake::Column::UserId.eq(user.id))
        .filter(stake::Column::IsActive.eq(true))
        .order_by_asc(stake::Column::EndDate)
        .all(db)
        .await?;
    Ok(stakes)
}

pub async fn leaderboard<C: ConnectionTrait>(
    db: &C,
    network: Network,
    page: i64,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>> {
    let start = page_offset(page, limit)?;
    let rows = db
        .query_all(Statement::from_sql_and_values(
            DB_BACKEND,
            LEADERBOARD,
            vec![network.to_string().into(), start.into(), limit.into()],
        ))
        .await?;
    let entries = rows
        .iter()
        .map(LeaderboardEntry::new)
        .collect::<std::result::Result<Vec<_>, DbErr>>()?;
    Ok(entries)
}

pub async fn messages<C: ConnectionTrait>(
    db: &C,
    page: i64,
    limit: i64,
) -> Result<Vec<MessageWithAuthor>> {
    let rows = message::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(message::Column::CreatedAt)
        .order_by_desc(message::Column::Id)
        .offset(page_offset(page, limit)? as u64)
        .limit(limit as u64)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(message, author)| MessageWithAuthor {
            message,
            user: author.map(|u| MessageAuthor {
                wallet_address: u.wallet_address,
            }),
        })
        .collect())
}

pub struct PostMessageInput<'a> {
    pub wallet_address: &'a str,
    pub network: Network,
    pub content: &'a str,
    pub signature: &'a str,
}

pub async fn post_message<C: ConnectionTrait>(
    db: &C,
    input: PostMessageInput<'_>,
    max_length: usize,
    now: i64,
) -> Result<message::Model> {
    let content = input.content.trim();
    if content.chars().count() > max_length {
        return Err(CivicError::BadRequest(format!(
            "Message can not be longer than {} characters",
            max_length
        )));
    }
    let user = require_user(db, input.wallet_address, input.network).await?;
    let message = message::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        user_id: ActiveValue::Set(user.id),
        content: ActiveValue::Set(content.to_owned()),
        signature: ActiveValue::Set(input.signature.to_owned()),
        created_at: ActiveValue::Set(now),
    }
    .insert(db)
    .await?;
    Ok(message)
}

#[cfg(test)]
#[path = "civic_service_tests.rs"]
mod civic_service_tests;
