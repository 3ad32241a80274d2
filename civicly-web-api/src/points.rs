use chrono::{Duration, NaiveDate};

pub const BASE_POINTS: i64 = 10;
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
/// Terms at least this long earn the long-term bonus
pub const LONG_TERM_DAYS: i64 = 30;
pub const SHORT_TERM_RATE_PERCENT: i64 = 5;
pub const LONG_TERM_RATE_PERCENT: i64 = 12;
pub const HISTORY_DAYS: i64 = 7;

// Multiplier expressed in quarters so point math stays in integers.
fn multiplier_quarters(streak: i32) -> i64 {
    match streak {
        i32::MIN..=1 => 4,
        2..=3 => 5,
        4..=7 => 6,
        8..=14 => 7,
        _ => 8,
    }
}

pub fn multiplier(streak: i32) -> f64 {
    multiplier_quarters(streak) as f64 / 4.0
}

/// `floor(BASE_POINTS * multiplier(streak))`
pub fn points_for_streak(streak: i32) -> i64 {
    BASE_POINTS * multiplier_quarters(streak) / 4
}

/// Streak continues only when the previous check-in fell exactly on the day before `today`.
pub fn next_streak(last_check_in_day: Option<NaiveDate>, today: NaiveDate, current_streak: i32) -> i32 {
    match last_check_in_day {
        Some(day) if Some(day) == today.pred_opt() => current_streak.max(0) + 1,
        _ => 1,
    }
}

pub fn stake_end_date(start_date: i64, duration_days: i64) -> i64 {
    start_date + duration_days * SECONDS_PER_DAY
}

pub fn stake_rate_percent(start_date: i64, end_date: i64) -> i64 {
    if end_date - start_date >= LONG_TERM_DAYS * SECONDS_PER_DAY {
        LONG_TERM_RATE_PERCENT
    } else {
        SHORT_TERM_RATE_PERCENT
    }
}

/// Bonus paid on unstake. Nothing is paid before `end_date`.
pub fn stake_reward(amount: i64, start_date: i64, end_date: i64, now: i64) -> i64 {
    if now < end_date || amount <= 0 {
        return 0;
    }
    amount * stake_rate_percent(start_date, end_date) / 100
}

/// The `HISTORY_DAYS` days ending at `today`, oldest first.
pub fn recent_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..HISTORY_DAYS)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// `abcd...wxyz`
pub fn wallet_short(wallet_address: &str) -> String {
    let chars: Vec<char> = wallet_address.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
#[path = "points_tests.rs"]
mod points_tests;
