use super::*;
use chrono::TimeZone;

const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
const KEY: &str = "test-jwt-key";

fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn token() -> String {
    generate_jwt_token(WALLET, "Sign in to Civicly", "sig", KEY, issued_at()).unwrap()
}

#[test]
fn token_verifies_for_its_wallet() {
    assert!(verify_jwt_token(KEY, WALLET, &token(), issued_at()));
}

#[test]
fn token_fails_for_another_wallet() {
    assert!(!verify_jwt_token(
        KEY,
        "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
        &token(),
        issued_at()
    ));
}

#[test]
fn token_fails_with_another_key() {
    assert!(!verify_jwt_token("other-key", WALLET, &token(), issued_at()));
}

#[test]
fn token_expires_after_a_day() {
    let token = token();
    assert!(verify_jwt_token(
        KEY,
        WALLET,
        &token,
        issued_at() + Duration::hours(23)
    ));
    assert!(!verify_jwt_token(
        KEY,
        WALLET,
        &token,
        issued_at() + Duration::hours(25)
    ));
}

#[test]
fn garbage_token_fails() {
    assert!(!verify_jwt_token(KEY, WALLET, "not.a.token", issued_at()));
}
