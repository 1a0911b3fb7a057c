//! Document store backed by `localStorage`. wasm only.
//!
//! Keys are `tap_earn/{collection}/{id}`; values are the document as JSON.
//! Subscriptions only see writes from this tab.

use std::rc::Rc;

use super::{
    apply_write, rank_documents, Collection, Direction, Document, DocumentStore, SetOptions,
    StoreError, StoreResult, Subscribers, Subscription,
};

/// Key prefix in localStorage.
const KEY_PREFIX: &str = "tap_earn";

pub struct LocalStorageStore {
    storage: web_sys::Storage,
    subscribers: Rc<Subscribers>,
}

impl LocalStorageStore {
    /// Fails where localStorage is unavailable (private mode and the like).
    pub fn open() -> StoreResult<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StoreError::Unavailable("localStorage is not available".into()))?;
        Ok(Self {
            storage,
            subscribers: Subscribers::new(),
        })
    }

    fn key(collection: Collection, id: &str) -> String {
        format!("{}/{}/{}", KEY_PREFIX, collection.as_str(), id)
    }

    fn read(&self, collection: Collection, id: &str, key: &str) -> StoreResult<Option<Document>> {
        let json = self
            .storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        match json {
            None => Ok(None),
            Some(json) => serde_json::from_str::<Document>(&json)
                .map(Some)
                .map_err(|e| StoreError::Malformed {
                    collection: collection.as_str(),
                    id: id.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl DocumentStore for LocalStorageStore {
    fn get_document(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        self.read(collection, id, &Self::key(collection, id))
    }

    fn set_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
        options: SetOptions,
    ) -> StoreResult<()> {
        let key = Self::key(collection, id);
        let existing = if options.merge {
            self.read(collection, id, &key)?
        } else {
            None
        };
        let doc = apply_write(existing, fields, options);
        let json = serde_json::to_string(&doc).map_err(|e| StoreError::Malformed {
            collection: collection.as_str(),
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        self.storage
            .set_item(&key, &json)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        self.subscribers.notify(collection, id, &doc);
        Ok(())
    }

    fn subscribe(
        &self,
        collection: Collection,
        id: &str,
        callback: Box<dyn Fn(&Document)>,
    ) -> Subscription {
        self.subscribers.add(collection, id, callback)
    }

    fn query_top_n(
        &self,
        collection: Collection,
        order_by: &str,
        direction: Direction,
        limit: usize,
    ) -> StoreResult<Vec<(String, Document)>> {
        let prefix = format!("{}/{}/", KEY_PREFIX, collection.as_str());
        let len = self
            .storage
            .length()
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        let mut docs = Vec::new();
        for i in 0..len {
            let Ok(Some(key)) = self.storage.key(i) else {
                continue;
            };
            let Some(id) = key.strip_prefix(&prefix) else {
                continue;
            };
            match self.read(collection, id, &key) {
                Ok(Some(doc)) => docs.push((id.to_string(), doc)),
                Ok(None) => {}
                // Broken documents are left out of the ranking
                Err(e) => web_sys::console::warn_1(&format!("Tap Earn: {e}").into()),
            }
        }
        Ok(rank_documents(docs, order_by, direction, limit))
    }
}
