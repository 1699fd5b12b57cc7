pub mod adapter;
pub mod models;
pub mod records;
pub mod store;

pub use adapter::Adapter;
pub use models::{AdapterAccount, AdapterSession, AdapterUser, VerificationToken};
pub use records::{AccountRecord, SessionRecord, UserRecord, VerificationTokenRecord};
pub use store::{AccountStore, SessionStore, Stores, UserStore, VerificationTokenStore};
