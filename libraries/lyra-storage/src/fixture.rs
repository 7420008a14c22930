//! JSON seed fixtures
//!
//! ```json
//! {
//!   "auth": [{"email": "mira@example.com", "password": "secret1", "uid": "u1"}],
//!   "users": {"u1": {"displayName": "Mira", "likedTracks": ["t1"]}},
//!   "tracks": {"t1": {"title": "Intro", "author": {"$ref": "users/u1"}}}
//! }
//! ```
//!
//! References are spelled `{"$ref": "collection/id"}` and timestamps
//! `{"$ts": "RFC3339"}`.

use lyra_core::error::{LyraError, Result};
use lyra_core::types::{Collection, DocRef, Value};
use std::path::Path;

use crate::MemoryStore;

/// Top-level key listing email/password accounts
pub const AUTH_KEY: &str = "auth";

impl MemoryStore {
    /// Build a store from a fixture value
    pub fn from_json(fixture: serde_json::Value) -> Result<Self> {
        let store = Self::new();
        store.seed_from_json(fixture)?;
        Ok(store)
    }

    /// Build a store from a fixture file
    pub fn from_fixture_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LyraError::invalid_input(format!("cannot read fixture {}: {e}", path.display()))
        })?;
        Self::from_json(serde_json::from_str(&text)?)
    }

    /// Load documents and accounts; existing documents with the same id are replaced
    pub fn seed_from_json(&self, fixture: serde_json::Value) -> Result<()> {
        let serde_json::Value::Object(top) = fixture else {
            return Err(LyraError::invalid_input("fixture must be a JSON object"));
        };

        let mut loaded = 0usize;
        for (key, body) in top {
            if key == AUTH_KEY {
                self.seed_accounts(body)?;
                continue;
            }

            let collection: Collection = key.parse()?;
            let serde_json::Value::Object(docs) = body else {
                return Err(LyraError::invalid_input(format!(
                    "collection {collection} must map ids to documents"
                )));
            };
            for (id, doc) in docs {
                let doc_ref = DocRef::new(collection, id);
                let Value::Map(fields) = Value::from_json(doc) else {
                    return Err(LyraError::malformed(&doc_ref, "document must be an object"));
                };
                self.insert_raw(&doc_ref, fields);
                loaded += 1;
            }
        }

        tracing::info!(documents = loaded, "Fixture loaded");
        Ok(())
    }

    fn seed_accounts(&self, body: serde_json::Value) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct SeedAccount {
            email: String,
            password: String,
            uid: String,
        }

        let accounts: Vec<SeedAccount> = serde_json::from_value(body)?;
        for account in accounts {
            self.add_account(&account.email, &account.password, account.uid)?;
        }
        Ok(())
    }
}
