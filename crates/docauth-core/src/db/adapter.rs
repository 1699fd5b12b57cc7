// Protocol adapter trait: the exact set of operations the authentication
// protocol layer calls to persist users, sessions, accounts and
// verification tokens.
//
// Implemented once by the adapter service; store backends plug in beneath it
// through the accessor traits in `db::store`.

use std::fmt;

use async_trait::async_trait;

use crate::db::models::{
    AdapterAccount, AdapterSession, AdapterUser, NewUser, SessionAndUser, SessionUpdate,
    UserUpdate, VerificationToken,
};
use crate::error::AdapterResult;

/// The persistence contract consumed by the authentication protocol layer.
///
/// Lookups return `Ok(None)` when the entity is absent; `Err` is reserved for
/// failures. All identifiers are external string ids.
#[async_trait]
pub trait Adapter: Send + Sync + fmt::Debug {
    // ─── Users ───────────────────────────────────────────────────

    /// Insert a user and return it with its newly assigned id.
    async fn create_user(&self, user: NewUser) -> AdapterResult<AdapterUser>;

    async fn get_user(&self, id: &str) -> AdapterResult<Option<AdapterUser>>;

    async fn get_user_by_email(&self, email: &str) -> AdapterResult<Option<AdapterUser>>;

    /// Resolve the user linked to a provider identity.
    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AdapterUser>>;

    /// Apply a partial update and return the user as now stored.
    /// An empty `id` is rejected before the store is touched.
    async fn update_user(&self, user: UserUpdate) -> AdapterResult<AdapterUser>;

    // ─── Sessions ────────────────────────────────────────────────

    async fn create_session(&self, session: AdapterSession) -> AdapterResult<AdapterSession>;

    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> AdapterResult<Option<SessionAndUser>>;

    async fn update_session(&self, session: SessionUpdate) -> AdapterResult<AdapterSession>;

    /// Fails with `NotFound` if no session had this token.
    async fn delete_session(&self, session_token: &str) -> AdapterResult<()>;

    // ─── Accounts ────────────────────────────────────────────────

    async fn link_account(&self, account: AdapterAccount) -> AdapterResult<AdapterAccount>;

    /// Fails with `NotFound` if no account matched.
    async fn unlink_account(&self, provider: &str, provider_account_id: &str)
        -> AdapterResult<()>;

    // ─── Verification Tokens ─────────────────────────────────────

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> AdapterResult<VerificationToken>;

    /// Consume a token. Returns it on the first call and `None` afterwards.
    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> AdapterResult<Option<VerificationToken>>;
}
