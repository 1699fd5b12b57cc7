use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};

use docauth_core::db::records::AccountRecord;
use docauth_core::db::store::AccountStore;
use docauth_core::error::{AdapterError, AdapterResult};

use super::{insert_error, read_error};

/// Accounts collection accessor.
#[derive(Debug, Clone)]
pub struct MongoAccountStore {
    accounts: Collection<AccountRecord>,
}

impl MongoAccountStore {
    pub fn new(db: &Database, name: &str) -> Self {
        Self {
            accounts: db.collection(name),
        }
    }

    fn name(&self) -> &str {
        self.accounts.name()
    }
}

fn identity_filter(provider: &str, provider_account_id: &str) -> Document {
    doc! { "provider": provider, "providerAccountId": provider_account_id }
}

#[async_trait]
impl AccountStore for MongoAccountStore {
    async fn insert(&self, record: AccountRecord) -> AdapterResult<AccountRecord> {
        self.accounts
            .insert_one(&record)
            .await
            .map_err(|e| insert_error(self.name(), e))?;
        Ok(record)
    }

    async fn find_by_provider_identity(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AccountRecord>> {
        self.accounts
            .find_one(identity_filter(provider, provider_account_id))
            .await
            .map_err(|e| read_error(self.name(), e))
    }

    async fn delete_by_provider_identity(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<()> {
        let result = self
            .accounts
            .delete_one(identity_filter(provider, provider_account_id))
            .await
            .map_err(|e| read_error(self.name(), e))?;

        if result.deleted_count == 0 {
            return Err(AdapterError::NotFound(format!(
                "account {provider}/{provider_account_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_filter_matches_index_fields() {
        let filter = identity_filter("github", "42");
        assert_eq!(filter.get_str("provider").unwrap(), "github");
        assert_eq!(filter.get_str("providerAccountId").unwrap(), "42");
        assert_eq!(filter.len(), 2);
    }
}
