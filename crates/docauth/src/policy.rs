// Session policy: token enrichment at issuance, session projection at
// lookup, and the rolling-expiry parameters.
//
// These run in the protocol layer's callbacks, not inside the adapter. The
// policy only exposes `max_age` and `update_age`; deciding when to reissue a
// token is up to the caller.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use docauth_core::db::models::AdapterUser;
use docauth_core::error::{AdapterError, AdapterResult, ConfigError};
use docauth_core::options::SessionOptions;

/// The user portion of a token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: String,
}

/// Token payload. Claims set by other callbacks ride along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub user: TokenUser,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// User portion of the externally visible session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionViewUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The session object handed to application code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub user: SessionViewUser,
    pub expires: DateTime<Utc>,
}

/// Attach the signing-in user's id to the token.
///
/// Only the initial sign-in carries both a user and a provider profile; on
/// every later call the token passes through unchanged.
pub fn enrich_token(
    mut claims: TokenClaims,
    user: Option<&AdapterUser>,
    profile: Option<&serde_json::Value>,
) -> TokenClaims {
    if let (Some(user), Some(_)) = (user, profile) {
        claims.user.id = user.id.clone();
    }
    claims
}

/// Copy the token's user id onto the session the application sees.
pub fn project_session(mut session: SessionView, claims: &TokenClaims) -> SessionView {
    session.user.id = claims.user.id.clone();
    session
}

/// Wire form of a signed token: the payload plus standard time claims.
#[derive(Debug, Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    payload: TokenClaims,
    iat: i64,
    exp: i64,
}

/// Rolling-expiry configuration plus token signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    max_age: TimeDelta,
    update_age: TimeDelta,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            max_age: TimeDelta::days(30),
            update_age: TimeDelta::hours(24),
        }
    }
}

/// Convert a configured number of seconds, rejecting values chrono cannot hold.
fn seconds(name: &'static str, value: u64) -> Result<TimeDelta, ConfigError> {
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| ConfigError::Invalid {
            name,
            reason: format!("{value} seconds is out of range"),
        })
}

impl SessionPolicy {
    pub fn new(options: SessionOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            max_age: seconds("maxAge", options.max_age)?,
            update_age: seconds("updateAge", options.update_age)?,
        })
    }

    /// Absolute session lifetime.
    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// Renewal threshold.
    pub fn update_age(&self) -> TimeDelta {
        self.update_age
    }

    /// Expiry for a session (re)issued at `now`. `Validation` if the result
    /// falls outside the representable date range.
    pub fn expires_at(&self, now: DateTime<Utc>) -> AdapterResult<DateTime<Utc>> {
        now.checked_add_signed(self.max_age).ok_or_else(|| {
            AdapterError::Validation(format!(
                "session expiry overflows: {now} + {}s",
                self.max_age.num_seconds()
            ))
        })
    }

    /// Sign `claims` with HS256, valid for `max_age` from `now`.
    pub fn encode_token(
        &self,
        claims: &TokenClaims,
        secret: &str,
        now: DateTime<Utc>,
    ) -> AdapterResult<String> {
        let signed = SignedClaims {
            payload: claims.clone(),
            iat: now.timestamp(),
            exp: self.expires_at(now)?.timestamp(),
        };
        let key = EncodingKey::from_secret(secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &signed, &key)
            .map_err(|e| AdapterError::Validation(format!("token signing failed: {e}")))
    }

    /// Verify and decode a token. `None` if the signature is wrong or it expired.
    pub fn decode_token(&self, token: &str, secret: &str) -> Option<TokenClaims> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<SignedClaims>(token, &key, &validation)
            .ok()
            .map(|data| data.claims.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> AdapterUser {
        AdapterUser {
            id: id.into(),
            name: None,
            email: None,
            email_verified: None,
            image: None,
        }
    }

    #[test]
    fn test_enrich_on_sign_in() {
        let profile = serde_json::json!({"login": "octocat"});
        let claims = enrich_token(TokenClaims::default(), Some(&user("u1")), Some(&profile));
        assert_eq!(claims.user.id, "u1");
    }

    #[test]
    fn test_enrich_without_profile_is_passthrough() {
        let mut claims = TokenClaims::default();
        claims.user.id = "existing".into();
        let out = enrich_token(claims.clone(), Some(&user("u2")), None);
        assert_eq!(out, claims);

        let out = enrich_token(claims.clone(), None, Some(&serde_json::json!({})));
        assert_eq!(out, claims);
    }

    #[test]
    fn test_project_session() {
        let mut claims = TokenClaims::default();
        claims.user.id = "u9".into();
        let session = SessionView {
            user: SessionViewUser {
                name: Some("Ada".into()),
                ..Default::default()
            },
            expires: Utc::now(),
        };
        let projected = project_session(session, &claims);
        assert_eq!(projected.user.id, "u9");
        assert_eq!(projected.user.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_default_windows() {
        let policy = SessionPolicy::default();
        assert_eq!(policy.max_age(), TimeDelta::days(30));
        assert_eq!(policy.update_age(), TimeDelta::hours(24));

        let now = Utc::now();
        assert_eq!(policy.expires_at(now).unwrap() - now, TimeDelta::days(30));
        assert_eq!(SessionPolicy::new(SessionOptions::default()).unwrap(), policy);
    }

    #[test]
    fn test_out_of_range_lifetime_rejected() {
        let err = SessionPolicy::new(SessionOptions {
            max_age: u64::MAX,
            update_age: 60,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "maxAge", .. }));

        let opts: SessionOptions =
            serde_json::from_str(r#"{"maxAge": 60, "updateAge": 100000000000000000}"#).unwrap();
        let err = SessionPolicy::new(opts).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "updateAge", .. }));
    }

    #[test]
    fn test_largest_lifetime_accepted() {
        let max = (i64::MAX / 1000) as u64;
        let policy = SessionPolicy::new(SessionOptions {
            max_age: max,
            update_age: 0,
        })
        .unwrap();
        assert_eq!(policy.max_age().num_seconds(), max as i64);
        assert!(SessionPolicy::new(SessionOptions {
            max_age: max + 1,
            update_age: 0,
        })
        .is_err());
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        // Representable as a duration, but far past chrono's last date.
        let policy = SessionPolicy::new(SessionOptions {
            max_age: 10_000_000_000_000,
            update_age: 86_400,
        })
        .unwrap();
        let err = policy.expires_at(Utc::now()).unwrap_err();
        assert!(err.is_validation());

        let err = policy
            .encode_token(&TokenClaims::default(), "secret", Utc::now())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_token_round_trip_keeps_extra_claims() {
        let policy = SessionPolicy::default();
        let mut claims = TokenClaims::default();
        claims.user.id = "u1".into();
        claims
            .extra
            .insert("email".into(), serde_json::json!("a@b.com"));

        let token = policy.encode_token(&claims, "secret", Utc::now()).unwrap();
        assert_eq!(policy.decode_token(&token, "secret"), Some(claims));
    }

    #[test]
    fn test_token_wrong_secret() {
        let policy = SessionPolicy::default();
        let token = policy
            .encode_token(&TokenClaims::default(), "secret", Utc::now())
            .unwrap();
        assert_eq!(policy.decode_token(&token, "other"), None);
    }

    #[test]
    fn test_token_expired() {
        let policy = SessionPolicy::new(SessionOptions {
            max_age: 60,
            update_age: 30,
        })
        .unwrap();
        let issued = Utc::now() - TimeDelta::hours(1);
        let token = policy
            .encode_token(&TokenClaims::default(), "secret", issued)
            .unwrap();
        assert_eq!(policy.decode_token(&token, "secret"), None);
    }
}
