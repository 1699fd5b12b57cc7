// Entity accessor traits: one typed gateway per collection.
//
// Accessors are store-shaped: they take and return records keyed by
// `ObjectId` and never see external string ids.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::records::{
    AccountRecord, SessionPatch, SessionRecord, UserFields, UserPatch, UserRecord,
    VerificationTokenRecord,
};
use crate::error::AdapterResult;

/// Gateway to the users collection.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    /// Insert a user; the store assigns the key. `InsertFailure` on rejection.
    async fn insert(&self, fields: UserFields) -> AdapterResult<UserRecord>;

    async fn find_by_key(&self, key: ObjectId) -> AdapterResult<Option<UserRecord>>;

    async fn find_by_email(&self, email: &str) -> AdapterResult<Option<UserRecord>>;

    /// Apply `patch`; `UpdateFailure` if no document has `key`.
    async fn update(&self, key: ObjectId, patch: UserPatch) -> AdapterResult<UserRecord>;
}

/// Gateway to the sessions collection.
#[async_trait]
pub trait SessionStore: Send + Sync + fmt::Debug {
    async fn insert(&self, record: SessionRecord) -> AdapterResult<SessionRecord>;

    async fn find_by_token(&self, session_token: &str) -> AdapterResult<Option<SessionRecord>>;

    /// Apply `patch`; `UpdateFailure` if the token is unknown.
    async fn update(
        &self,
        session_token: &str,
        patch: SessionPatch,
    ) -> AdapterResult<SessionRecord>;

    /// `NotFound` if nothing was deleted.
    async fn delete_by_token(&self, session_token: &str) -> AdapterResult<()>;
}

/// Gateway to the accounts collection.
#[async_trait]
pub trait AccountStore: Send + Sync + fmt::Debug {
    async fn insert(&self, record: AccountRecord) -> AdapterResult<AccountRecord>;

    async fn find_by_provider_identity(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AccountRecord>>;

    /// `NotFound` if nothing was deleted.
    async fn delete_by_provider_identity(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<()>;
}

/// Gateway to the verification tokens collection.
#[async_trait]
pub trait VerificationTokenStore: Send + Sync + fmt::Debug {
    async fn insert(
        &self,
        record: VerificationTokenRecord,
    ) -> AdapterResult<VerificationTokenRecord>;

    /// Atomically find and delete the token. `None` once it has been consumed.
    async fn consume(
        &self,
        identifier: &str,
        token: &str,
    ) -> AdapterResult<Option<VerificationTokenRecord>>;
}

/// The four accessors a backend provides, bundled for the adapter service.
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub verification_tokens: Arc<dyn VerificationTokenStore>,
}
