//! Document persistence boundary.
//!
//! The game never talks to a concrete database. It reads and writes JSON
//! documents addressed by `(collection, id)` through [`DocumentStore`], and
//! learns about writes made elsewhere through [`DocumentStore::subscribe`].
//!
//! Two backends exist:
//! - [`MemoryStore`]: in-process, used by tests and simulations.
//! - `LocalStorageStore`: the browser's `localStorage` (wasm only).

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod local;

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore;

/// A persisted document: a JSON object.
pub type Document = Map<String, Value>;

/// Collections the game reads and writes. The names are an external
/// contract: other tooling reads these documents directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Users,
    Energy,
    Boosters,
    LoginInfo,
    ClaimedRewards,
    LeaderboardByCoins,
    LeaderboardByLevel,
    Wallets,
    UserMissions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Energy => "energy",
            Collection::Boosters => "boosters",
            Collection::LoginInfo => "login_info",
            Collection::ClaimedRewards => "claimed_rewards",
            Collection::LeaderboardByCoins => "leaderboardByCoins",
            Collection::LeaderboardByLevel => "leaderboardByLevel",
            Collection::Wallets => "wallets",
            Collection::UserMissions => "userMissions",
        }
    }
}

/// Write mode for [`DocumentStore::set_document`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge into the existing document instead of replacing it.
    /// Nested objects are merged recursively.
    pub merge: bool,
}

impl SetOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }

    pub fn replace() -> Self {
        Self { merge: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("{0}")]
    Unavailable(String),

    /// A stored document could not be decoded.
    #[error("malformed document {collection}/{id}: {reason}")]
    Malformed {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence service used by the game.
///
/// Implementations use interior mutability: the browser runtime is single
/// threaded and the store is shared between the session and the view.
pub trait DocumentStore {
    /// Fetch one document. `Ok(None)` when it does not exist.
    fn get_document(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Write one document. Subscribers of `(collection, id)` are notified
    /// with the resulting document after the write succeeds.
    fn set_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
        options: SetOptions,
    ) -> StoreResult<()>;

    /// Register for future writes to `(collection, id)`. The callback does
    /// not fire for the current contents. Dropping the returned
    /// [`Subscription`] unsubscribes.
    fn subscribe(
        &self,
        collection: Collection,
        id: &str,
        callback: Box<dyn Fn(&Document)>,
    ) -> Subscription;

    /// The first `limit` documents of a collection ordered by a numeric
    /// field. Documents without the field sort as the smallest value; ties
    /// are broken by ascending id.
    fn query_top_n(
        &self,
        collection: Collection,
        order_by: &str,
        direction: Direction,
        limit: usize,
    ) -> StoreResult<Vec<(String, Document)>>;
}

type Callback = Rc<dyn Fn(&Document)>;

struct Listener {
    key: u64,
    collection: Collection,
    id: String,
    callback: Callback,
}

/// Listener registry shared by the store backends.
#[derive(Default)]
pub struct Subscribers {
    next_key: Cell<u64>,
    listeners: RefCell<Vec<Listener>>,
}

impl Subscribers {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn add(
        self: &Rc<Self>,
        collection: Collection,
        id: &str,
        callback: Box<dyn Fn(&Document)>,
    ) -> Subscription {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        self.listeners.borrow_mut().push(Listener {
            key,
            collection,
            id: id.to_string(),
            callback: Rc::from(callback),
        });
        Subscription {
            key,
            registry: Rc::downgrade(self),
        }
    }

    /// Deliver `doc` to every listener of `(collection, id)`.
    pub fn notify(&self, collection: Collection, id: &str, doc: &Document) {
        // Collect first: a callback may subscribe or unsubscribe.
        let callbacks: Vec<Callback> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.collection == collection && l.id == id)
            .map(|l| l.callback.clone())
            .collect();
        for cb in callbacks {
            cb(doc);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn remove(&self, key: u64) {
        self.listeners.borrow_mut().retain(|l| l.key != key);
    }
}

/// Handle for an active subscription. Unsubscribes on drop.
pub struct Subscription {
    key: u64,
    registry: Weak<Subscribers>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.key);
        }
    }
}

/// Apply a write to an existing document.
pub fn apply_write(existing: Option<Document>, fields: Document, options: SetOptions) -> Document {
    match existing {
        Some(mut doc) if options.merge => {
            merge_into(&mut doc, fields);
            doc
        }
        _ => fields,
    }
}

fn merge_into(target: &mut Document, fields: Document) {
    for (k, v) in fields {
        match v {
            Value::Object(incoming) => match target.get_mut(&k) {
                Some(Value::Object(existing)) => merge_into(existing, incoming),
                _ => {
                    target.insert(k, Value::Object(incoming));
                }
            },
            v => {
                target.insert(k, v);
            }
        }
    }
}

/// Sort documents for [`DocumentStore::query_top_n`] and truncate.
pub fn rank_documents(
    mut docs: Vec<(String, Document)>,
    order_by: &str,
    direction: Direction,
    limit: usize,
) -> Vec<(String, Document)> {
    let score = |d: &Document| d.get(order_by).and_then(Value::as_f64);
    docs.sort_by(|(ida, a), (idb, b)| {
        let ord = match (score(a), score(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        let ord = match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        };
        ord.then_with(|| ida.cmp(idb))
    });
    docs.truncate(limit);
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn collection_names_follow_external_contract() {
        assert_eq!(Collection::LoginInfo.as_str(), "login_info");
        assert_eq!(Collection::ClaimedRewards.as_str(), "claimed_rewards");
        assert_eq!(Collection::LeaderboardByCoins.as_str(), "leaderboardByCoins");
        assert_eq!(Collection::UserMissions.as_str(), "userMissions");
    }

    #[test]
    fn merge_write_keeps_untouched_fields() {
        let existing = doc(json!({"a": 1, "b": {"x": 1, "y": 2}}));
        let out = apply_write(
            Some(existing),
            doc(json!({"b": {"y": 3}, "c": true})),
            SetOptions::merge(),
        );
        assert_eq!(Value::Object(out), json!({"a": 1, "b": {"x": 1, "y": 3}, "c": true}));
    }

    #[test]
    fn replace_write_drops_old_fields() {
        let existing = doc(json!({"a": 1}));
        let out = apply_write(Some(existing), doc(json!({"b": 2})), SetOptions::replace());
        assert_eq!(Value::Object(out), json!({"b": 2}));
    }

    #[test]
    fn rank_orders_and_truncates() {
        let docs = vec![
            ("a".to_string(), doc(json!({"score": 5}))),
            ("b".to_string(), doc(json!({"score": 9}))),
            ("c".to_string(), doc(json!({}))),
            ("d".to_string(), doc(json!({"score": 9}))),
        ];
        let ranked = rank_documents(docs.clone(), "score", Direction::Descending, 3);
        let ids: Vec<&str> = ranked.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a"]);

        let ranked = rank_documents(docs, "score", Direction::Ascending, 10);
        let ids: Vec<&str> = ranked.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b", "d"]);
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let subs = Subscribers::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let sub = subs.add(Collection::Users, "u1", Box::new(move |_| h.set(h.get() + 1)));
        subs.notify(Collection::Users, "u1", &Document::new());
        subs.notify(Collection::Users, "u2", &Document::new());
        assert_eq!(hits.get(), 1);

        drop(sub);
        assert_eq!(subs.len(), 0);
        subs.notify(Collection::Users, "u1", &Document::new());
        assert_eq!(hits.get(), 1);
    }
}
