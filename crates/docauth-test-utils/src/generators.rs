// Record generators for adapter tests.
//
// Every generated value is unique per call so suites can run against a
// shared, long-lived database. Timestamps are truncated to milliseconds,
// the precision of a BSON date, so values survive a store round trip intact.

use chrono::{DateTime, TimeDelta, Utc};

use docauth_core::db::models::{AdapterAccount, AdapterSession, NewUser, VerificationToken};

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Truncate a timestamp to millisecond precision.
pub fn truncate_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt)
}

fn random_past() -> DateTime<Utc> {
    let offset = rand::random::<u32>() as i64 % (365 * 24 * 3600);
    truncate_millis(Utc::now() - TimeDelta::seconds(offset))
}

/// A user with a unique email, verified at some point in the past year.
pub fn generate_test_user() -> NewUser {
    let id = short_id();
    NewUser {
        name: Some(format!("user-{id}")),
        email: Some(format!("user-{id}@email.com")),
        email_verified: Some(random_past()),
        image: None,
    }
}

/// A session for `user_id` expiring in 30 days.
pub fn generate_test_session(user_id: &str) -> AdapterSession {
    AdapterSession {
        session_token: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        expires: truncate_millis(Utc::now() + TimeDelta::days(30)),
    }
}

/// An OAuth account for `user_id` under the `test` provider.
pub fn generate_test_account(user_id: &str) -> AdapterAccount {
    let mut account = AdapterAccount::oauth(user_id, "test", uuid::Uuid::new_v4().to_string());
    account.access_token = Some(uuid::Uuid::new_v4().to_string());
    account.refresh_token = Some(uuid::Uuid::new_v4().to_string());
    account.expires_at = Some((Utc::now() + TimeDelta::hours(1)).timestamp());
    account.token_type = Some("bearer".into());
    account.scope = Some("read:user".into());
    account
}

/// A verification token expiring in one hour.
pub fn generate_test_verification_token() -> VerificationToken {
    VerificationToken {
        identifier: format!("user-{}@email.com", short_id()),
        token: uuid::Uuid::new_v4().to_string(),
        expires: truncate_millis(Utc::now() + TimeDelta::hours(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_test_user() {
        let user = generate_test_user();
        assert!(user.email.as_deref().unwrap().ends_with("@email.com"));
        assert!(user.email_verified.unwrap() <= Utc::now());
        assert_ne!(generate_test_user().email, user.email);
    }

    #[test]
    fn test_generate_test_session() {
        let session = generate_test_session("user-123");
        assert_eq!(session.user_id, "user-123");
        assert!(session.expires > Utc::now());
    }

    #[test]
    fn test_generate_test_account() {
        let account = generate_test_account("user-456");
        assert_eq!(account.user_id, "user-456");
        assert_eq!(account.provider, "test");
        assert!(account.access_token.is_some());
    }

    #[test]
    fn test_timestamps_have_millisecond_precision() {
        let token = generate_test_verification_token();
        assert_eq!(token.expires.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
