// Adapter conformance checks.
//
// Each check drives an `Adapter` through one observable contract: id
// round trips, joins, single-use tokens, uniqueness, and the error taxonomy.
// `run_all` executes them in order and stops at the first failure.

use std::time::Instant;

use docauth_core::db::adapter::Adapter;
use docauth_core::db::models::{SessionUpdate, UserUpdate};
use docauth_core::error::AdapterError;

use crate::generators::{
    generate_test_account, generate_test_session, generate_test_user,
    generate_test_verification_token,
};

/// A failed conformance check.
#[derive(Debug, thiserror::Error)]
pub enum ConformanceError {
    #[error("{check}: {message}")]
    Failed { check: &'static str, message: String },

    #[error("{check}: unexpected adapter error: {source}")]
    Adapter {
        check: &'static str,
        #[source]
        source: AdapterError,
    },
}

/// Names of the checks that passed, in order.
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    pub adapter_name: String,
    pub passed: Vec<&'static str>,
    pub duration_ms: f64,
}

type CheckResult = Result<(), ConformanceError>;

trait InCheck<T> {
    fn in_check(self, check: &'static str) -> Result<T, ConformanceError>;
}

impl<T> InCheck<T> for Result<T, AdapterError> {
    fn in_check(self, check: &'static str) -> Result<T, ConformanceError> {
        self.map_err(|source| ConformanceError::Adapter { check, source })
    }
}

fn ensure(check: &'static str, cond: bool, message: impl Into<String>) -> CheckResult {
    if cond {
        Ok(())
    } else {
        Err(ConformanceError::Failed {
            check,
            message: message.into(),
        })
    }
}

/// Assert `result` failed with an error accepted by `matches`.
fn expect_error<T: std::fmt::Debug>(
    check: &'static str,
    result: Result<T, AdapterError>,
    expected: &str,
    matches: impl Fn(&AdapterError) -> bool,
) -> CheckResult {
    match result {
        Err(e) if matches(&e) => Ok(()),
        other => Err(ConformanceError::Failed {
            check,
            message: format!("expected {expected}, got {other:?}"),
        }),
    }
}

// ─── Checks ──────────────────────────────────────────────────────

/// A created user reads back identically by id and by email.
pub async fn user_round_trip(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "user_round_trip";
    let new_user = generate_test_user();
    let user = adapter.create_user(new_user.clone()).await.in_check(CHECK)?;

    ensure(CHECK, !user.id.is_empty(), "created user has no id")?;
    ensure(CHECK, user.email == new_user.email, "email changed on create")?;

    let by_id = adapter.get_user(&user.id).await.in_check(CHECK)?;
    ensure(CHECK, by_id.as_ref() == Some(&user), format!("get_user returned {by_id:?}"))?;

    let email = user.email.clone().unwrap_or_default();
    let by_email = adapter.get_user_by_email(&email).await.in_check(CHECK)?;
    ensure(
        CHECK,
        by_email.as_ref() == Some(&user),
        format!("get_user_by_email returned {by_email:?}"),
    )
}

/// Malformed ids are rejected; well-formed unknown ids are simply absent.
pub async fn malformed_identifier(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "malformed_identifier";
    for bad in ["", "not-an-id", "0123456789ABCDEF01234567", "0123456789abcdef0123456"] {
        expect_error(
            CHECK,
            adapter.get_user(bad).await,
            "MalformedIdentifier",
            AdapterError::is_malformed_identifier,
        )?;
    }

    let absent = adapter
        .get_user("000000000000000000000000")
        .await
        .in_check(CHECK)?;
    ensure(CHECK, absent.is_none(), "unknown id resolved to a user")?;

    // Every operation taking an external user id decodes it at the boundary.
    const BAD: &str = "0123456789ABCDEF01234567";
    expect_error(
        CHECK,
        adapter.create_session(generate_test_session(BAD)).await,
        "MalformedIdentifier from create_session",
        AdapterError::is_malformed_identifier,
    )?;
    expect_error(
        CHECK,
        adapter.link_account(generate_test_account(BAD)).await,
        "MalformedIdentifier from link_account",
        AdapterError::is_malformed_identifier,
    )?;
    expect_error(
        CHECK,
        adapter
            .update_user(UserUpdate {
                id: BAD.to_string(),
                name: Some("renamed".into()),
                ..Default::default()
            })
            .await,
        "MalformedIdentifier from update_user",
        AdapterError::is_malformed_identifier,
    )?;
    expect_error(
        CHECK,
        adapter
            .update_session(SessionUpdate {
                session_token: "no-such-session".into(),
                user_id: Some(BAD.to_string()),
                expires: None,
            })
            .await,
        "MalformedIdentifier from update_session",
        AdapterError::is_malformed_identifier,
    )
}

/// A second session with the same token is rejected.
pub async fn duplicate_session_token(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "duplicate_session_token";
    let user = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let session = generate_test_session(&user.id);

    adapter.create_session(session.clone()).await.in_check(CHECK)?;
    expect_error(
        CHECK,
        adapter.create_session(session).await,
        "InsertFailure",
        AdapterError::is_insert_failure,
    )
}

/// A linked account resolves back to its owning user.
pub async fn account_join(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "account_join";
    let user = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let account = generate_test_account(&user.id);

    let linked = adapter.link_account(account.clone()).await.in_check(CHECK)?;
    ensure(CHECK, linked == account, "link_account altered the account")?;

    let owner = adapter
        .get_user_by_account(&account.provider, &account.provider_account_id)
        .await
        .in_check(CHECK)?;
    ensure(CHECK, owner.as_ref() == Some(&user), format!("resolved {owner:?}"))?;

    let stranger = adapter
        .get_user_by_account(&account.provider, "no-such-account")
        .await
        .in_check(CHECK)?;
    ensure(CHECK, stranger.is_none(), "unknown account resolved to a user")
}

/// Linking the same provider identity twice is rejected.
pub async fn duplicate_account(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "duplicate_account";
    let user = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let account = generate_test_account(&user.id);

    adapter.link_account(account.clone()).await.in_check(CHECK)?;
    expect_error(
        CHECK,
        adapter.link_account(account).await,
        "InsertFailure",
        AdapterError::is_insert_failure,
    )
}

/// Unlinking removes the account; unlinking again reports NotFound.
pub async fn unlink_account(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "unlink_account";
    let user = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let account = generate_test_account(&user.id);
    adapter.link_account(account.clone()).await.in_check(CHECK)?;

    adapter
        .unlink_account(&account.provider, &account.provider_account_id)
        .await
        .in_check(CHECK)?;
    let owner = adapter
        .get_user_by_account(&account.provider, &account.provider_account_id)
        .await
        .in_check(CHECK)?;
    ensure(CHECK, owner.is_none(), "account still linked after unlink")?;

    expect_error(
        CHECK,
        adapter
            .unlink_account(&account.provider, &account.provider_account_id)
            .await,
        "NotFound",
        AdapterError::is_not_found,
    )
}

/// A verification token is returned once, then absent.
pub async fn single_use_token(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "single_use_token";
    let token = generate_test_verification_token();
    adapter
        .create_verification_token(token.clone())
        .await
        .in_check(CHECK)?;

    let first = adapter
        .use_verification_token(&token.identifier, &token.token)
        .await
        .in_check(CHECK)?;
    ensure(CHECK, first.as_ref() == Some(&token), format!("first use returned {first:?}"))?;

    let second = adapter
        .use_verification_token(&token.identifier, &token.token)
        .await
        .in_check(CHECK)?;
    ensure(CHECK, second.is_none(), "token consumed twice")
}

/// A session joins back to its owner.
pub async fn session_round_trip(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "session_round_trip";
    let user = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let session = generate_test_session(&user.id);

    let created = adapter.create_session(session.clone()).await.in_check(CHECK)?;
    ensure(CHECK, created == session, "create_session altered the session")?;

    let joined = adapter
        .get_session_and_user(&session.session_token)
        .await
        .in_check(CHECK)?;
    let Some(joined) = joined else {
        return ensure(CHECK, false, "session not found after create");
    };
    ensure(CHECK, joined.session.user_id == user.id, "session owner mismatch")?;
    ensure(CHECK, joined.session.expires == session.expires, "expiry mismatch")?;
    ensure(CHECK, joined.user == user, format!("joined user {:?}", joined.user))?;

    let missing = adapter
        .get_session_and_user("no-such-session")
        .await
        .in_check(CHECK)?;
    ensure(CHECK, missing.is_none(), "unknown token resolved")
}

/// Update validation and the UpdateFailure taxonomy.
pub async fn update_semantics(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "update_semantics";
    expect_error(
        CHECK,
        adapter.update_user(UserUpdate::default()).await,
        "Validation",
        AdapterError::is_validation,
    )?;

    expect_error(
        CHECK,
        adapter
            .update_session(SessionUpdate::extend("no-such-session", chrono::Utc::now()))
            .await,
        "UpdateFailure",
        AdapterError::is_update_failure,
    )?;

    let user = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let updated = adapter
        .update_user(UserUpdate {
            id: user.id.clone(),
            name: Some("renamed".into()),
            ..Default::default()
        })
        .await
        .in_check(CHECK)?;
    ensure(CHECK, updated.name.as_deref() == Some("renamed"), "name not updated")?;
    ensure(CHECK, updated.email == user.email, "untouched field changed")?;

    let session = generate_test_session(&user.id);
    adapter.create_session(session.clone()).await.in_check(CHECK)?;
    let later = session.expires + chrono::TimeDelta::days(1);
    let renewed = adapter
        .update_session(SessionUpdate::extend(session.session_token.clone(), later))
        .await
        .in_check(CHECK)?;
    ensure(CHECK, renewed.expires == later, "expiry not extended")?;
    ensure(CHECK, renewed.user_id == user.id, "owner changed on renewal")?;

    let heir = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let moved = adapter
        .update_session(SessionUpdate {
            session_token: session.session_token.clone(),
            user_id: Some(heir.id.clone()),
            expires: None,
        })
        .await
        .in_check(CHECK)?;
    ensure(CHECK, moved.user_id == heir.id, "owner not reassigned")?;
    ensure(CHECK, moved.expires == later, "expiry changed on reassignment")?;

    let joined = adapter
        .get_session_and_user(&session.session_token)
        .await
        .in_check(CHECK)?;
    ensure(
        CHECK,
        joined.map(|j| j.user) == Some(heir),
        "session does not join to its new owner",
    )
}

/// Deleting a session twice reports NotFound the second time.
pub async fn delete_session(adapter: &dyn Adapter) -> CheckResult {
    const CHECK: &str = "delete_session";
    let user = adapter.create_user(generate_test_user()).await.in_check(CHECK)?;
    let session = generate_test_session(&user.id);
    adapter.create_session(session.clone()).await.in_check(CHECK)?;

    adapter
        .delete_session(&session.session_token)
        .await
        .in_check(CHECK)?;
    expect_error(
        CHECK,
        adapter.delete_session(&session.session_token).await,
        "NotFound",
        AdapterError::is_not_found,
    )
}

// ─── Runner ──────────────────────────────────────────────────────

/// Run every check against `adapter`, stopping at the first failure.
pub async fn run_all(
    adapter_name: &str,
    adapter: &dyn Adapter,
) -> Result<ConformanceReport, ConformanceError> {
    let start = Instant::now();
    let mut report = ConformanceReport {
        adapter_name: adapter_name.to_string(),
        ..Default::default()
    };

    macro_rules! check {
        ($name:ident) => {
            tracing::info!("[{}] running {}", adapter_name, stringify!($name));
            if let Err(e) = $name(adapter).await {
                tracing::error!("[{}] ✗ {}", adapter_name, e);
                return Err(e);
            }
            report.passed.push(stringify!($name));
        };
    }

    check!(user_round_trip);
    check!(malformed_identifier);
    check!(duplicate_session_token);
    check!(account_join);
    check!(duplicate_account);
    check!(unlink_account);
    check!(single_use_token);
    check!(session_round_trip);
    check!(update_semantics);
    check!(delete_session);

    report.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(
        "[{}] {} checks passed in {:.2}ms",
        adapter_name,
        report.passed.len(),
        report.duration_ms
    );
    Ok(report)
}
