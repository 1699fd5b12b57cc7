// Index bootstrap.
//
// The unique indexes are what enforce the uniqueness invariants: one user per
// email, one session per token, one account per provider identity, one
// verification token per (identifier, token).

use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};

use docauth_core::error::{AdapterError, AdapterResult};
use docauth_core::options::CollectionNames;

/// Index specs as (collection, model) pairs.
pub fn index_specs(names: &CollectionNames) -> Vec<(String, IndexModel)> {
    vec![
        // email is optional; sparse keeps users without one from colliding
        (names.users.clone(), unique(doc! { "email": 1 }, true)),
        (names.sessions.clone(), unique(doc! { "sessionToken": 1 }, false)),
        (names.sessions.clone(), plain(doc! { "userId": 1 })),
        (
            names.accounts.clone(),
            unique(doc! { "provider": 1, "providerAccountId": 1 }, false),
        ),
        (names.accounts.clone(), plain(doc! { "userId": 1 })),
        (
            names.verification_tokens.clone(),
            unique(doc! { "identifier": 1, "token": 1 }, false),
        ),
    ]
}

fn unique(keys: Document, sparse: bool) -> IndexModel {
    let options = IndexOptions::builder().unique(true).sparse(sparse).build();
    IndexModel::builder().keys(keys).options(options).build()
}

fn plain(keys: Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

/// Create every index. Safe to run repeatedly.
pub async fn ensure_indexes(db: &Database, names: &CollectionNames) -> AdapterResult<()> {
    for (collection, model) in index_specs(names) {
        tracing::debug!(collection = %collection, keys = ?model.keys, "Ensuring index");
        db.collection::<Document>(&collection)
            .create_index(model)
            .await
            .map_err(|e| AdapterError::Database(format!("{collection}: index creation failed: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unique(model: &IndexModel) -> bool {
        model
            .options
            .as_ref()
            .and_then(|o| o.unique)
            .unwrap_or(false)
    }

    #[test]
    fn test_unique_indexes_cover_invariants() {
        let specs = index_specs(&CollectionNames::default());
        let unique: Vec<_> = specs
            .iter()
            .filter(|(_, m)| is_unique(m))
            .map(|(c, m)| (c.as_str(), m.keys.clone()))
            .collect();

        assert_eq!(
            unique,
            vec![
                ("users", doc! { "email": 1 }),
                ("sessions", doc! { "sessionToken": 1 }),
                ("accounts", doc! { "provider": 1, "providerAccountId": 1 }),
                ("verificationTokens", doc! { "identifier": 1, "token": 1 }),
            ]
        );
    }

    #[test]
    fn test_only_email_index_is_sparse() {
        for (collection, model) in index_specs(&CollectionNames::default()) {
            let sparse = model
                .options
                .as_ref()
                .and_then(|o| o.sparse)
                .unwrap_or(false);
            assert_eq!(sparse, collection == "users", "{collection}");
        }
    }

    #[test]
    fn test_custom_collection_names() {
        let names = CollectionNames {
            users: "people".into(),
            ..Default::default()
        };
        assert_eq!(index_specs(&names)[0].0, "people");
    }
}
