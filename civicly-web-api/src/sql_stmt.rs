use sea_orm::DbBackend;

pub const DB_BACKEND: DbBackend = DbBackend::Postgres;

pub const LEADERBOARD: &str = r#"SELECT RANK() OVER (ORDER BY users.points DESC) user_rank,
    users.id,
    users.wallet_address,
    users.network,
    users.points,
    users.streak
    FROM users
    WHERE users.network = $1
    ORDER BY users.points DESC, users.created_at ASC OFFSET $2 ROWS LIMIT $3"#;
