// Adapter service: composes the four entity accessors into the protocol
// `Adapter` contract.
//
// This is the only layer that sees external string ids. Ids are decoded to
// `ObjectId` on the way in and encoded on the way out, so accessors stay
// purely store-shaped. Nothing here spans more than one document atomically:
// joins (session → user, account → user) are two independent reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use docauth_core::db::adapter::Adapter;
use docauth_core::db::models::{
    AdapterAccount, AdapterSession, AdapterUser, NewUser, SessionAndUser, SessionUpdate,
    UserUpdate, VerificationToken,
};
use docauth_core::db::records::{
    AccountRecord, SessionPatch, SessionRecord, UserFields, UserPatch, UserRecord,
    VerificationTokenRecord,
};
use docauth_core::db::store::Stores;
use docauth_core::error::{AdapterError, AdapterResult};
use docauth_core::utils::id::{decode_id, encode_id};

/// The adapter service. Cheap to clone; share one per process.
#[derive(Debug, Clone)]
pub struct AuthAdapter {
    stores: Stores,
}

impl AuthAdapter {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Access the underlying accessors.
    pub fn stores(&self) -> &Stores {
        &self.stores
    }
}

// ─── Translation ─────────────────────────────────────────────────

fn to_bson_date(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_chrono(dt)
}

fn from_bson_date(dt: bson::DateTime) -> DateTime<Utc> {
    dt.to_chrono()
}

fn user_view(record: UserRecord) -> AdapterUser {
    AdapterUser {
        id: encode_id(&record.id),
        name: record.name,
        email: record.email,
        email_verified: record.email_verified.map(from_bson_date),
        image: record.image,
    }
}

fn session_view(record: SessionRecord) -> AdapterSession {
    AdapterSession {
        session_token: record.session_token,
        user_id: encode_id(&record.user_id),
        expires: from_bson_date(record.expires),
    }
}

fn token_view(record: VerificationTokenRecord) -> VerificationToken {
    VerificationToken {
        identifier: record.identifier,
        token: record.token,
        expires: from_bson_date(record.expires),
    }
}

fn account_record(account: &AdapterAccount) -> AdapterResult<AccountRecord> {
    Ok(AccountRecord {
        user_id: decode_id(&account.user_id)?,
        account_type: account.account_type,
        provider: account.provider.clone(),
        provider_account_id: account.provider_account_id.clone(),
        refresh_token: account.refresh_token.clone(),
        access_token: account.access_token.clone(),
        expires_at: account.expires_at,
        token_type: account.token_type.clone(),
        scope: account.scope.clone(),
        id_token: account.id_token.clone(),
        session_state: account.session_state.clone(),
    })
}

/// Level a propagating failure is logged at. A delete that found nothing is
/// an absence, not a fault.
fn failure_level(e: &AdapterError) -> tracing::Level {
    if e.is_not_found() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    }
}

/// Log a propagating failure before handing it back to the caller.
fn logged<T>(op: &'static str, result: AdapterResult<T>) -> AdapterResult<T> {
    if let Err(ref e) = result {
        if failure_level(e) == tracing::Level::DEBUG {
            tracing::debug!(operation = op, "adapter operation found nothing: {e}");
        } else {
            tracing::warn!(operation = op, "adapter operation failed: {e}");
        }
    }
    result
}

// ─── Operations ──────────────────────────────────────────────────

impl AuthAdapter {
    async fn find_user(&self, id: &str) -> AdapterResult<Option<AdapterUser>> {
        let key = decode_id(id)?;
        Ok(self.stores.users.find_by_key(key).await?.map(user_view))
    }

    /// Two-step join: account by provider identity, then its owner.
    async fn find_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AdapterUser>> {
        let Some(account) = self
            .stores
            .accounts
            .find_by_provider_identity(provider, provider_account_id)
            .await?
        else {
            return Ok(None);
        };
        Ok(self
            .stores
            .users
            .find_by_key(account.user_id)
            .await?
            .map(user_view))
    }

    async fn apply_user_update(&self, user: UserUpdate) -> AdapterResult<AdapterUser> {
        if user.id.is_empty() {
            return Err(AdapterError::Validation("user id is required".into()));
        }
        let key = decode_id(&user.id)?;
        let patch = UserPatch {
            name: user.name,
            email: user.email,
            email_verified: user.email_verified.map(to_bson_date),
            image: user.image,
        };
        self.stores.users.update(key, patch).await?;

        // Return what is stored now, not what the update reported.
        let fresh = self.stores.users.find_by_key(key).await?.ok_or_else(|| {
            AdapterError::UpdateFailure(format!("user {} vanished after update", user.id))
        })?;
        Ok(user_view(fresh))
    }

    async fn insert_session(&self, session: AdapterSession) -> AdapterResult<AdapterSession> {
        let user_id = decode_id(&session.user_id)?;
        if self.stores.users.find_by_key(user_id).await?.is_none() {
            return Err(AdapterError::InsertFailure(format!(
                "session references unknown user {}",
                session.user_id
            )));
        }
        self.stores
            .sessions
            .insert(SessionRecord {
                session_token: session.session_token.clone(),
                user_id,
                expires: to_bson_date(session.expires),
            })
            .await?;
        Ok(session)
    }

    async fn find_session_and_user(
        &self,
        session_token: &str,
    ) -> AdapterResult<Option<SessionAndUser>> {
        let Some(session) = self.stores.sessions.find_by_token(session_token).await? else {
            return Ok(None);
        };
        let Some(user) = self.stores.users.find_by_key(session.user_id).await? else {
            tracing::debug!("session owner {} not found", session.user_id);
            return Ok(None);
        };
        Ok(Some(SessionAndUser {
            session: session_view(session),
            user: user_view(user),
        }))
    }

    async fn apply_session_update(
        &self,
        session: SessionUpdate,
    ) -> AdapterResult<AdapterSession> {
        let patch = SessionPatch {
            user_id: session.user_id.as_deref().map(decode_id).transpose()?,
            expires: session.expires.map(to_bson_date),
        };
        self.stores
            .sessions
            .update(&session.session_token, patch)
            .await?;

        let fresh = self
            .stores
            .sessions
            .find_by_token(&session.session_token)
            .await?
            .ok_or_else(|| AdapterError::UpdateFailure("session vanished after update".into()))?;
        Ok(session_view(fresh))
    }

    async fn insert_account(&self, account: AdapterAccount) -> AdapterResult<AdapterAccount> {
        let record = account_record(&account)?;
        self.stores.accounts.insert(record).await?;
        Ok(account)
    }

    async fn insert_verification_token(
        &self,
        token: VerificationToken,
    ) -> AdapterResult<VerificationToken> {
        self.stores
            .verification_tokens
            .insert(VerificationTokenRecord {
                identifier: token.identifier.clone(),
                token: token.token.clone(),
                expires: to_bson_date(token.expires),
            })
            .await?;
        Ok(token)
    }
}

// ─── Adapter ─────────────────────────────────────────────────────

#[async_trait]
impl Adapter for AuthAdapter {
    async fn create_user(&self, user: NewUser) -> AdapterResult<AdapterUser> {
        let fields = UserFields {
            name: user.name,
            email: user.email,
            email_verified: user.email_verified.map(to_bson_date),
            image: user.image,
        };
        let result = self.stores.users.insert(fields).await.map(user_view);
        if let Ok(ref created) = result {
            tracing::debug!("created user {}", created.id);
        }
        logged("create_user", result)
    }

    async fn get_user(&self, id: &str) -> AdapterResult<Option<AdapterUser>> {
        tracing::debug!("get_user {id}");
        logged("get_user", self.find_user(id).await)
    }

    async fn get_user_by_email(&self, email: &str) -> AdapterResult<Option<AdapterUser>> {
        tracing::debug!("get_user_by_email");
        let result = self.stores.users.find_by_email(email).await;
        logged("get_user_by_email", result.map(|u| u.map(user_view)))
    }

    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AdapterUser>> {
        tracing::debug!("get_user_by_account {provider}/{provider_account_id}");
        logged(
            "get_user_by_account",
            self.find_user_by_account(provider, provider_account_id).await,
        )
    }

    async fn update_user(&self, user: UserUpdate) -> AdapterResult<AdapterUser> {
        tracing::debug!("update_user {}", user.id);
        logged("update_user", self.apply_user_update(user).await)
    }

    async fn create_session(&self, session: AdapterSession) -> AdapterResult<AdapterSession> {
        tracing::debug!("create_session for user {}", session.user_id);
        logged("create_session", self.insert_session(session).await)
    }

    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> AdapterResult<Option<SessionAndUser>> {
        tracing::debug!("get_session_and_user");
        logged(
            "get_session_and_user",
            self.find_session_and_user(session_token).await,
        )
    }

    async fn update_session(&self, session: SessionUpdate) -> AdapterResult<AdapterSession> {
        tracing::debug!("update_session");
        logged("update_session", self.apply_session_update(session).await)
    }

    async fn delete_session(&self, session_token: &str) -> AdapterResult<()> {
        tracing::debug!("delete_session");
        logged(
            "delete_session",
            self.stores.sessions.delete_by_token(session_token).await,
        )
    }

    async fn link_account(&self, account: AdapterAccount) -> AdapterResult<AdapterAccount> {
        tracing::debug!(
            "link_account {}/{} to user {}",
            account.provider,
            account.provider_account_id,
            account.user_id
        );
        logged("link_account", self.insert_account(account).await)
    }

    async fn unlink_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<()> {
        tracing::debug!("unlink_account {provider}/{provider_account_id}");
        logged(
            "unlink_account",
            self.stores
                .accounts
                .delete_by_provider_identity(provider, provider_account_id)
                .await,
        )
    }

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> AdapterResult<VerificationToken> {
        tracing::debug!("create_verification_token for {}", token.identifier);
        logged(
            "create_verification_token",
            self.insert_verification_token(token).await,
        )
    }

    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> AdapterResult<Option<VerificationToken>> {
        tracing::debug!("use_verification_token for {identifier}");
        let result = self.stores.verification_tokens.consume(identifier, token).await;
        if let Ok(None) = result {
            tracing::debug!("verification token for {identifier} already consumed or unknown");
        }
        logged("use_verification_token", result.map(|t| t.map(token_view)))
    }
}
