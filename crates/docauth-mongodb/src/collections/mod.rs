// Collection-backed accessors, one per entity.
//
// Driver errors are mapped at each call site: inserts → `InsertFailure`,
// reads and deletes → `Database`, updates → `UpdateFailure` on a uniqueness
// violation and `Database` otherwise.

mod accounts;
mod sessions;
mod users;
mod verification_tokens;

use std::sync::Arc;

use mongodb::error::{Error, ErrorKind, WriteFailure};
use mongodb::Database;

use docauth_core::db::store::Stores;
use docauth_core::error::AdapterError;
use docauth_core::options::CollectionNames;

pub use accounts::MongoAccountStore;
pub use sessions::MongoSessionStore;
pub use users::MongoUserStore;
pub use verification_tokens::MongoVerificationTokenStore;

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// All four accessors over `db`.
pub fn stores(db: &Database, names: &CollectionNames) -> Stores {
    Stores {
        users: Arc::new(MongoUserStore::new(db, &names.users)),
        sessions: Arc::new(MongoSessionStore::new(db, &names.sessions)),
        accounts: Arc::new(MongoAccountStore::new(db, &names.accounts)),
        verification_tokens: Arc::new(MongoVerificationTokenStore::new(
            db,
            &names.verification_tokens,
        )),
    }
}

pub(crate) fn is_duplicate_key(e: &Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(w)) => w.code == DUPLICATE_KEY,
        ErrorKind::Command(c) => c.code == DUPLICATE_KEY,
        _ => false,
    }
}

pub(crate) fn insert_error(collection: &str, e: Error) -> AdapterError {
    AdapterError::InsertFailure(format!("{collection}: {e}"))
}

pub(crate) fn read_error(collection: &str, e: Error) -> AdapterError {
    AdapterError::Database(format!("{collection}: {e}"))
}

pub(crate) fn update_error(collection: &str, e: Error) -> AdapterError {
    if is_duplicate_key(&e) {
        AdapterError::UpdateFailure(format!("{collection}: {e}"))
    } else {
        AdapterError::Database(format!("{collection}: {e}"))
    }
}

pub(crate) fn encode_error(collection: &str, e: mongodb::bson::ser::Error) -> AdapterError {
    AdapterError::Validation(format!("{collection}: could not encode update: {e}"))
}
