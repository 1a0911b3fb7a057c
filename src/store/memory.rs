//! In-process document store.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{
    apply_write, rank_documents, Collection, Direction, Document, DocumentStore, SetOptions,
    StoreError, StoreResult, Subscribers, Subscription,
};

/// Documents kept in a map. Writes can be switched off to exercise the
/// failure paths of the game.
#[derive(Default)]
pub struct MemoryStore {
    docs: RefCell<BTreeMap<(Collection, String), Document>>,
    subscribers: Rc<Subscribers>,
    offline: Cell<bool>,
    writes: Cell<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every write fails with [`StoreError::Unavailable`].
    /// Reads keep working.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl DocumentStore for MemoryStore {
    fn get_document(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .docs
            .borrow()
            .get(&(collection, id.to_string()))
            .cloned())
    }

    fn set_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
        options: SetOptions,
    ) -> StoreResult<()> {
        if self.offline.get() {
            return Err(StoreError::Unavailable(format!(
                "write to {}/{} rejected: store offline",
                collection.as_str(),
                id
            )));
        }
        let written = {
            let mut docs = self.docs.borrow_mut();
            let key = (collection, id.to_string());
            let doc = apply_write(docs.remove(&key), fields, options);
            docs.insert(key, doc.clone());
            doc
        };
        self.writes.set(self.writes.get() + 1);
        self.subscribers.notify(collection, id, &written);
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
        let docs: Vec<(String, Document)> = self
            .docs
            .borrow()
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, id), doc)| (id.clone(), doc.clone()))
            .collect();
        Ok(rank_documents(docs, order_by, direction, limit))
    }
}
