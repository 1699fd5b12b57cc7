// Configuration options for sessions and collection naming.

use serde::{Deserialize, Serialize};

/// Rolling-expiry session configuration, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    /// Absolute session lifetime (default: 2592000 = 30 days).
    #[serde(default = "default_session_max_age")]
    pub max_age: u64,

    /// Renewal threshold (default: 86400 = 24 hours). Once less than
    /// `max_age - update_age` remains, the protocol layer reissues.
    #[serde(default = "default_session_update_age")]
    pub update_age: u64,
}

fn default_session_max_age() -> u64 { 2_592_000 } // 30 days
fn default_session_update_age() -> u64 { 86_400 } // 24 hours

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_age: default_session_max_age(),
            update_age: default_session_update_age(),
        }
    }
}

/// Collection names used by document-store backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionNames {
    #[serde(default = "default_users")]
    pub users: String,
    #[serde(default = "default_sessions")]
    pub sessions: String,
    #[serde(default = "default_accounts")]
    pub accounts: String,
    #[serde(default = "default_verification_tokens")]
    pub verification_tokens: String,
}

fn default_users() -> String { "users".into() }
fn default_sessions() -> String { "sessions".into() }
fn default_accounts() -> String { "accounts".into() }
fn default_verification_tokens() -> String { "verificationTokens".into() }

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            users: default_users(),
            sessions: default_sessions(),
            accounts: default_accounts(),
            verification_tokens: default_verification_tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults() {
        let opts = SessionOptions::default();
        assert_eq!(opts.max_age, 30 * 24 * 60 * 60);
        assert_eq!(opts.update_age, 24 * 60 * 60);
    }

    #[test]
    fn test_session_options_partial_json() {
        let opts: SessionOptions = serde_json::from_str(r#"{"maxAge": 3600}"#).unwrap();
        assert_eq!(opts.max_age, 3600);
        assert_eq!(opts.update_age, 86_400);
    }

    #[test]
    fn test_collection_name_defaults() {
        let names: CollectionNames = serde_json::from_str("{}").unwrap();
        assert_eq!(names, CollectionNames::default());
        assert_eq!(names.verification_tokens, "verificationTokens");
    }
}
