use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};

use docauth_core::db::records::VerificationTokenRecord;
use docauth_core::db::store::VerificationTokenStore;
use docauth_core::error::AdapterResult;

use super::{insert_error, read_error};

/// Verification tokens collection accessor.
#[derive(Debug, Clone)]
pub struct MongoVerificationTokenStore {
    tokens: Collection<VerificationTokenRecord>,
}

impl MongoVerificationTokenStore {
    pub fn new(db: &Database, name: &str) -> Self {
        Self {
            tokens: db.collection(name),
        }
    }

    fn name(&self) -> &str {
        self.tokens.name()
    }
}

fn pair_filter(identifier: &str, token: &str) -> Document {
    doc! { "identifier": identifier, "token": token }
}

#[async_trait]
impl VerificationTokenStore for MongoVerificationTokenStore {
    async fn insert(
        &self,
        record: VerificationTokenRecord,
    ) -> AdapterResult<VerificationTokenRecord> {
        self.tokens
            .insert_one(&record)
            .await
            .map_err(|e| insert_error(self.name(), e))?;
        Ok(record)
    }

    // find_one_and_delete is a single server-side operation, so of two
    // racing consumers exactly one receives the document.
    async fn consume(
        &self,
        identifier: &str,
        token: &str,
    ) -> AdapterResult<Option<VerificationTokenRecord>> {
        self.tokens
            .find_one_and_delete(pair_filter(identifier, token))
            .await
            .map_err(|e| read_error(self.name(), e))
    }
}
