use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use docauth_core::db::records::{UserFields, UserPatch, UserRecord};
use docauth_core::db::store::UserStore;
use docauth_core::error::{AdapterError, AdapterResult};
use docauth_core::ObjectId;

use super::{encode_error, insert_error, read_error, update_error};

/// Users collection accessor.
#[derive(Debug, Clone)]
pub struct MongoUserStore {
    users: Collection<UserRecord>,
}

impl MongoUserStore {
    pub fn new(db: &Database, name: &str) -> Self {
        Self {
            users: db.collection(name),
        }
    }

    fn name(&self) -> &str {
        self.users.name()
    }
}

fn key_filter(key: ObjectId) -> Document {
    doc! { "_id": key }
}

fn missing(key: ObjectId) -> AdapterError {
    AdapterError::UpdateFailure(format!("no user with id {key}"))
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, fields: UserFields) -> AdapterResult<UserRecord> {
        let result = self
            .users
            .clone_with_type::<UserFields>()
            .insert_one(&fields)
            .await
            .map_err(|e| insert_error(self.name(), e))?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            AdapterError::InsertFailure(format!("{}: inserted id is not an ObjectId", self.name()))
        })?;
        Ok(UserRecord::from_fields(id, fields))
    }

    async fn find_by_key(&self, key: ObjectId) -> AdapterResult<Option<UserRecord>> {
        self.users
            .find_one(key_filter(key))
            .await
            .map_err(|e| read_error(self.name(), e))
    }

    async fn find_by_email(&self, email: &str) -> AdapterResult<Option<UserRecord>> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| read_error(self.name(), e))
    }

    async fn update(&self, key: ObjectId, patch: UserPatch) -> AdapterResult<UserRecord> {
        if patch.is_empty() {
            return self.find_by_key(key).await?.ok_or_else(|| missing(key));
        }

        let set = mongodb::bson::to_document(&patch).map_err(|e| encode_error(self.name(), e))?;
        self.users
            .find_one_and_update(key_filter(key), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| update_error(self.name(), e))?
            .ok_or_else(|| missing(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_filter_targets_underscore_id() {
        let key = ObjectId::new();
        assert_eq!(key_filter(key).get_object_id("_id").unwrap(), key);
    }

    #[test]
    fn test_patch_set_body_omits_unset_fields() {
        let patch = UserPatch {
            image: Some("a.png".into()),
            ..Default::default()
        };
        let set = mongodb::bson::to_document(&patch).unwrap();
        assert_eq!(set, doc! { "image": "a.png" });
    }
}
