// docauth-mongodb: MongoDB backend for the docauth adapter.
//
// Maps the four entity accessors onto collections:
// - users, sessions, accounts, verificationTokens (names configurable)
// - uniqueness invariants → unique indexes created at connect
// - one process-wide client shared by every accessor

pub mod client;
pub mod collections;
pub mod indexes;

pub use client::{shared_client, ClientCell};
pub use collections::{
    stores, MongoAccountStore, MongoSessionStore, MongoUserStore, MongoVerificationTokenStore,
};
pub use indexes::ensure_indexes;

use docauth::AuthAdapter;
use docauth_core::env::AuthEnv;
use docauth_core::error::AdapterResult;
use docauth_core::options::CollectionNames;

/// Build an adapter from the loaded environment, using the default
/// collection names.
pub async fn connect(env: &AuthEnv) -> AdapterResult<AuthAdapter> {
    connect_with(&env.mongodb_url, &env.db_name, &CollectionNames::default()).await
}

/// Build an adapter against `db_name` on the shared client for `uri`.
///
/// Indexes are ensured on every call; creating an existing index is a no-op.
pub async fn connect_with(
    uri: &str,
    db_name: &str,
    names: &CollectionNames,
) -> AdapterResult<AuthAdapter> {
    let client = shared_client(uri).await?;
    let db = client.database(db_name);
    ensure_indexes(&db, names).await?;
    tracing::info!(db = db_name, "MongoDB adapter ready");
    Ok(AuthAdapter::new(stores(&db, names)))
}
