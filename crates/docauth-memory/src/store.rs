// In-memory store: one set of tables implementing all four accessor traits.
//
// Thread-safe via `tokio::sync::RwLock`. Every operation holds the lock for
// its whole duration, so each call is atomic the way a single-document store
// operation is.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use docauth_core::db::records::{
    AccountRecord, SessionPatch, SessionRecord, UserFields, UserPatch, UserRecord,
    VerificationTokenRecord,
};
use docauth_core::db::store::{
    AccountStore, SessionStore, Stores, UserStore, VerificationTokenStore,
};
use docauth_core::error::{AdapterError, AdapterResult};
use docauth_core::ObjectId;

type PairKey = (String, String);

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<ObjectId, UserRecord>,
    sessions: HashMap<String, SessionRecord>,
    accounts: HashMap<PairKey, AccountRecord>,
    verification_tokens: HashMap<PairKey, VerificationTokenRecord>,
}

impl Tables {
    /// Whether a user other than `except` already has `email`.
    fn email_taken(&self, email: &str, except: Option<ObjectId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.as_deref() == Some(email))
    }
}

fn pair(a: &str, b: &str) -> PairKey {
    (a.to_string(), b.to_string())
}

/// In-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this store as all four accessors.
    pub fn stores(&self) -> Stores {
        Stores {
            users: Arc::new(self.clone()),
            sessions: Arc::new(self.clone()),
            accounts: Arc::new(self.clone()),
            verification_tokens: Arc::new(self.clone()),
        }
    }

    /// Number of sessions currently stored.
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    /// Number of verification tokens currently stored.
    pub async fn verification_token_count(&self) -> usize {
        self.tables.read().await.verification_tokens.len()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

// ─── Users ───────────────────────────────────────────────────────

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, fields: UserFields) -> AdapterResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if let Some(email) = fields.email.as_deref() {
            if tables.email_taken(email, None) {
                return Err(AdapterError::InsertFailure(format!(
                    "duplicate key: users.email {email}"
                )));
            }
        }
        let record = UserRecord::from_fields(ObjectId::new(), fields);
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_key(&self, key: ObjectId) -> AdapterResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&key).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AdapterResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn update(&self, key: ObjectId, patch: UserPatch) -> AdapterResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if let Some(email) = patch.email.as_deref() {
            if tables.email_taken(email, Some(key)) {
                return Err(AdapterError::UpdateFailure(format!(
                    "duplicate key: users.email {email}"
                )));
            }
        }
        let record = tables
            .users
            .get_mut(&key)
            .ok_or_else(|| AdapterError::UpdateFailure(format!("no user with key {key}")))?;
        patch.apply_to(record);
        Ok(record.clone())
    }
}

// ─── Sessions ────────────────────────────────────────────────────

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, record: SessionRecord) -> AdapterResult<SessionRecord> {
        let mut tables = self.tables.write().await;
        if tables.sessions.contains_key(&record.session_token) {
            return Err(AdapterError::InsertFailure(
                "duplicate key: sessions.sessionToken".into(),
            ));
        }
        tables
            .sessions
            .insert(record.session_token.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_token(&self, session_token: &str) -> AdapterResult<Option<SessionRecord>> {
        Ok(self.tables.read().await.sessions.get(session_token).cloned())
    }

    async fn update(
        &self,
        session_token: &str,
        patch: SessionPatch,
    ) -> AdapterResult<SessionRecord> {
        let mut tables = self.tables.write().await;
        let record = tables
            .sessions
            .get_mut(session_token)
            .ok_or_else(|| AdapterError::UpdateFailure("no session with this token".into()))?;
        patch.apply_to(record);
        Ok(record.clone())
    }

    async fn delete_by_token(&self, session_token: &str) -> AdapterResult<()> {
        match self.tables.write().await.sessions.remove(session_token) {
            Some(_) => Ok(()),
            None => Err(AdapterError::NotFound("session".into())),
        }
    }
}

// ─── Accounts ────────────────────────────────────────────────────

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert(&self, record: AccountRecord) -> AdapterResult<AccountRecord> {
        let key = pair(&record.provider, &record.provider_account_id);
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&key) {
            return Err(AdapterError::InsertFailure(format!(
                "duplicate key: accounts {}/{}",
                record.provider, record.provider_account_id
            )));
        }
        tables.accounts.insert(key, record.clone());
        Ok(record)
    }

    async fn find_by_provider_identity(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AccountRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .get(&pair(provider, provider_account_id))
            .cloned())
    }

    async fn delete_by_provider_identity(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<()> {
        let mut tables = self.tables.write().await;
        match tables.accounts.remove(&pair(provider, provider_account_id)) {
            Some(_) => Ok(()),
            None => Err(AdapterError::NotFound(format!(
                "account {provider}/{provider_account_id}"
            ))),
        }
    }
}

// ─── Verification Tokens ─────────────────────────────────────────

#[async_trait]
impl VerificationTokenStore for MemoryStore {
    async fn insert(
        &self,
        record: VerificationTokenRecord,
    ) -> AdapterResult<VerificationTokenRecord> {
        let key = pair(&record.identifier, &record.token);
        let mut tables = self.tables.write().await;
        if tables.verification_tokens.contains_key(&key) {
            return Err(AdapterError::InsertFailure(
                "duplicate key: verificationTokens (identifier, token)".into(),
            ));
        }
        tables.verification_tokens.insert(key, record.clone());
        Ok(record)
    }

    async fn consume(
        &self,
        identifier: &str,
        token: &str,
    ) -> AdapterResult<Option<VerificationTokenRecord>> {
        let mut tables = self.tables.write().await;
        Ok(tables.verification_tokens.remove(&pair(identifier, token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docauth_core::db::models::AccountType;

    fn account(user_id: ObjectId, provider: &str, id: &str) -> AccountRecord {
        AccountRecord {
            user_id,
            account_type: AccountType::Oauth,
            provider: provider.into(),
            provider_account_id: id.into(),
            refresh_token: None,
            access_token: None,
            expires_at: None,
            token_type: None,
            scope: None,
            id_token: None,
            session_state: None,
        }
    }

    #[tokio::test]
    async fn test_user_insert_assigns_distinct_keys() {
        let store = MemoryStore::new();
        let a = UserStore::insert(&store, UserFields::default()).await.unwrap();
        let b = UserStore::insert(&store, UserFields::default()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.find_by_key(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_users_without_email_do_not_collide() {
        let store = MemoryStore::new();
        UserStore::insert(&store, UserFields::default()).await.unwrap();
        UserStore::insert(&store, UserFields::default()).await.unwrap();
        assert_eq!(store.find_by_email("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let fields = UserFields {
            email: Some("a@b.com".into()),
            ..Default::default()
        };
        UserStore::insert(&store, fields.clone()).await.unwrap();
        let err = UserStore::insert(&store, fields).await.unwrap_err();
        assert!(err.is_insert_failure());
    }

    #[tokio::test]
    async fn test_user_update_missing_key() {
        let store = MemoryStore::new();
        let err = UserStore::update(&store, ObjectId::new(), UserPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_update_failure());
    }

    #[tokio::test]
    async fn test_session_delete_twice() {
        let store = MemoryStore::new();
        SessionStore::insert(
            &store,
            SessionRecord {
                session_token: "s".into(),
                user_id: ObjectId::new(),
                expires: bson_now(),
            },
        )
        .await
        .unwrap();
        assert_eq!(store.session_count().await, 1);
        store.delete_by_token("s").await.unwrap();
        assert!(store.delete_by_token("s").await.unwrap_err().is_not_found());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_account_pair_uniqueness() {
        let store = MemoryStore::new();
        let owner = ObjectId::new();
        AccountStore::insert(&store, account(owner, "gh", "1")).await.unwrap();
        AccountStore::insert(&store, account(owner, "gl", "1")).await.unwrap();
        let err = AccountStore::insert(&store, account(ObjectId::new(), "gh", "1"))
            .await
            .unwrap_err();
        assert!(err.is_insert_failure());
    }

    #[tokio::test]
    async fn test_consume_is_idempotent() {
        let store = MemoryStore::new();
        let record = VerificationTokenRecord {
            identifier: "a@b.com".into(),
            token: "T".into(),
            expires: bson_now(),
        };
        VerificationTokenStore::insert(&store, record.clone()).await.unwrap();
        assert_eq!(store.consume("a@b.com", "T").await.unwrap(), Some(record));
        assert_eq!(store.consume("a@b.com", "T").await.unwrap(), None);
        assert_eq!(store.verification_token_count().await, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        UserStore::insert(&store, UserFields::default()).await.unwrap();
        store.clear().await;
        assert!(store.tables.read().await.users.is_empty());
    }

    fn bson_now() -> bson::DateTime {
        bson::DateTime::now()
    }
}
