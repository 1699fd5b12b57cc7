// docauth-core: shared contracts for the document-store authentication adapter.
//
// Holds everything both sides of the adapter agree on: the protocol-facing
// models and `Adapter` trait, the store-shaped records and accessor traits,
// the identifier codec, and the ambient config/logging helpers.

pub mod db;
pub mod env;
pub mod error;
pub mod options;
pub mod utils;

// Re-exports for convenience
pub use bson::oid::ObjectId;
pub use db::adapter::Adapter;
pub use db::models::{
    AccountType, AdapterAccount, AdapterSession, AdapterUser, NewUser, SessionAndUser,
    SessionUpdate, UserUpdate, VerificationToken,
};
pub use db::store::{AccountStore, SessionStore, Stores, UserStore, VerificationTokenStore};
pub use env::{AuthEnv, EnvMode};
pub use error::{AdapterError, AdapterResult, ConfigError};
pub use options::{CollectionNames, SessionOptions};
