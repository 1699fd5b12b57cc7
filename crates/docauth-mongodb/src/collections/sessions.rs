use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use docauth_core::db::records::{SessionPatch, SessionRecord};
use docauth_core::db::store::SessionStore;
use docauth_core::error::{AdapterError, AdapterResult};

use super::{encode_error, insert_error, read_error, update_error};

/// Sessions collection accessor.
#[derive(Debug, Clone)]
pub struct MongoSessionStore {
    sessions: Collection<SessionRecord>,
}

impl MongoSessionStore {
    pub fn new(db: &Database, name: &str) -> Self {
        Self {
            sessions: db.collection(name),
        }
    }

    fn name(&self) -> &str {
        self.sessions.name()
    }
}

fn token_filter(session_token: &str) -> Document {
    doc! { "sessionToken": session_token }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn insert(&self, record: SessionRecord) -> AdapterResult<SessionRecord> {
        self.sessions
            .insert_one(&record)
            .await
            .map_err(|e| insert_error(self.name(), e))?;
        Ok(record)
    }

    async fn find_by_token(&self, session_token: &str) -> AdapterResult<Option<SessionRecord>> {
        self.sessions
            .find_one(token_filter(session_token))
            .await
            .map_err(|e| read_error(self.name(), e))
    }

    async fn update(
        &self,
        session_token: &str,
        patch: SessionPatch,
    ) -> AdapterResult<SessionRecord> {
        let missing = || AdapterError::UpdateFailure(format!("no session {session_token:?}"));

        if patch.is_empty() {
            return self.find_by_token(session_token).await?.ok_or_else(missing);
        }

        let set = mongodb::bson::to_document(&patch).map_err(|e| encode_error(self.name(), e))?;
        self.sessions
            .find_one_and_update(token_filter(session_token), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| update_error(self.name(), e))?
            .ok_or_else(missing)
    }

    async fn delete_by_token(&self, session_token: &str) -> AdapterResult<()> {
        let result = self
            .sessions
            .delete_one(token_filter(session_token))
            .await
            .map_err(|e| read_error(self.name(), e))?;

        if result.deleted_count == 0 {
            return Err(AdapterError::NotFound(format!("session {session_token:?}")));
        }
        Ok(())
    }
}
