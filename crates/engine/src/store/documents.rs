// In-memory document collection with write-through persistence.
//
// Every mutation persists the whole collection before returning. If the
// write fails the in-memory change is rolled back, so memory and storage
// never diverge.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use ghostwrite_common::types::{Document, User};
use tracing::{debug, info, warn};

use super::persistence::{Persistence, DOCUMENTS_KEY};
use super::seed::seed_documents;
use super::StoreError;

pub struct DocumentStore {
    /// Most recently created first.
    documents: Vec<Document>,
    persistence: Persistence,
    last_issued_millis: i64,
}

impl DocumentStore {
    /// Load the collection. Absent or corrupt data is replaced by the seed
    /// set, which is written back immediately.
    pub fn load(persistence: Persistence, now: DateTime<Utc>) -> Self {
        let documents = match persistence.load::<Vec<Document>>(DOCUMENTS_KEY) {
            Some(documents) => drop_duplicate_ids(documents),
            None => {
                let seeded = seed_documents(now);
                if let Err(error) = persistence.save(DOCUMENTS_KEY, &seeded) {
                    warn!(%error, "failed to persist seed documents");
                }
                info!(count = seeded.len(), "seeded document store");
                seeded
            }
        };

        Self { documents, persistence, last_issued_millis: 0 }
    }

    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn find(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Mutable access for roster and presence changes. Callers persist with
    /// [`DocumentStore::persist`] afterwards.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Document> {
        self.documents.iter_mut().find(|doc| doc.id == id)
    }

    pub fn documents_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.documents.iter_mut()
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Create an empty document with `creator` as its only collaborator and
    /// prepend it to the collection.
    pub fn create(&mut self, creator: User, now: DateTime<Utc>) -> Result<&Document, StoreError> {
        let id = self.next_id(now);
        self.documents.insert(0, Document::new(id, creator, now));

        if let Err(error) = self.persist() {
            self.documents.remove(0);
            return Err(error);
        }

        debug!(doc_id = %self.documents[0].id, "created document");
        Ok(&self.documents[0])
    }

    /// Commit `doc`: bump the version, stamp `lastModified` and persist.
    ///
    /// The new version is derived from the stored entry, not from `doc`, and
    /// `lastModified` never moves backwards.
    pub fn save(&mut self, mut doc: Document, now: DateTime<Utc>) -> Result<&Document, StoreError> {
        let Some(index) = self.position(&doc.id) else {
            return Err(StoreError::NotFound(doc.id));
        };

        let stored = &self.documents[index];
        doc.version = stored.version + 1;
        doc.last_modified = now.max(stored.last_modified);

        let previous = std::mem::replace(&mut self.documents[index], doc);
        if let Err(error) = self.persist() {
            self.documents[index] = previous;
            return Err(error);
        }

        let saved = &self.documents[index];
        debug!(doc_id = %saved.id, version = saved.version, "saved document");
        Ok(saved)
    }

    /// Remove a document. Returns `false` without touching storage if the id
    /// is unknown.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let removed = self.documents.remove(index);
        if let Err(error) = self.persist() {
            self.documents.insert(index, removed);
            return Err(error);
        }

        debug!(doc_id = %id, "deleted document");
        Ok(true)
    }

    /// Write the collection through without a version bump.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.persistence.save(DOCUMENTS_KEY, &self.documents)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id == id)
    }

    /// Time-based id, bumped past anything already issued or stored.
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis().max(self.last_issued_millis + 1);
        while self.find(&format!("doc-{millis}")).is_some() {
            millis += 1;
        }
        self.last_issued_millis = millis;
        format!("doc-{millis}")
    }
}

fn drop_duplicate_ids(documents: Vec<Document>) -> Vec<Document> {
    let total = documents.len();
    let mut seen = HashSet::new();
    let unique: Vec<Document> =
        documents.into_iter().filter(|doc| seen.insert(doc.id.clone())).collect();

    if unique.len() != total {
        warn!(dropped = total - unique.len(), "dropped documents with duplicate ids");
    }
    unique
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::store::kv::MemoryKvStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn creator() -> User {
        User {
            id: "user-tess".into(),
            name: "Tess".into(),
            color: "#3b82f6".into(),
            is_online: true,
            last_seen: t0(),
            cursor_position: 0,
        }
    }

    fn empty_store() -> (DocumentStore, MemoryKvStore) {
        let kv = MemoryKvStore::new().with_entry(DOCUMENTS_KEY, "[]");
        (DocumentStore::load(Persistence::new(kv.clone()), t0()), kv)
    }

    fn stored_documents(kv: &MemoryKvStore) -> Vec<Document> {
        serde_json::from_str(&kv.raw(DOCUMENTS_KEY).unwrap()).unwrap()
    }

    #[test]
    fn create_starts_empty_with_creator_only() {
        let (mut store, kv) = empty_store();
        let doc = store.create(creator(), t0()).unwrap().clone();

        assert_eq!(doc.content, "");
        assert_eq!(doc.version, 1);
        assert_eq!(doc.collaborators, vec![creator()]);
        assert!(doc.id.starts_with("doc-"));
        assert_eq!(stored_documents(&kv), vec![doc]);
    }

    #[test]
    fn create_prepends_and_ids_stay_unique_within_the_same_millisecond() {
        let (mut store, _) = empty_store();
        let first = store.create(creator(), t0()).unwrap().id.clone();
        let second = store.create(creator(), t0()).unwrap().id.clone();

        assert_ne!(first, second);
        let ids: Vec<_> = store.list().iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn save_bumps_version_and_timestamp() {
        let (mut store, kv) = empty_store();
        let mut doc = store.create(creator(), t0()).unwrap().clone();

        doc.content = "hello".into();
        let later = t0() + Duration::seconds(5);
        let saved = store.save(doc, later).unwrap().clone();

        assert_eq!(saved.version, 2);
        assert_eq!(saved.last_modified, later);
        assert_eq!(stored_documents(&kv)[0].content, "hello");
    }

    #[test]
    fn save_never_moves_last_modified_backwards() {
        let (mut store, _) = empty_store();
        let doc = store.create(creator(), t0()).unwrap().clone();

        let saved = store.save(doc, t0() - Duration::seconds(30)).unwrap();
        assert_eq!(saved.last_modified, t0());
        assert_eq!(saved.version, 2);
    }

    #[test]
    fn save_ignores_stale_caller_version() {
        let (mut store, _) = empty_store();
        let stale = store.create(creator(), t0()).unwrap().clone();
        store.save(stale.clone(), t0()).unwrap();

        let saved = store.save(stale, t0()).unwrap();
        assert_eq!(saved.version, 3);
    }

    #[test]
    fn save_unknown_document_is_rejected() {
        let (mut store, _) = empty_store();
        let orphan = Document::new("doc-orphan".into(), creator(), t0());
        let err = store.save(orphan, t0()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "doc-orphan"));
    }

    #[test]
    fn find_missing_is_none_without_mutation() {
        let (mut store, kv) = empty_store();
        store.create(creator(), t0()).unwrap();
        let before = kv.raw(DOCUMENTS_KEY);

        assert!(store.find("doc-missing").is_none());
        assert_eq!(kv.raw(DOCUMENTS_KEY), before);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_removes_and_persists() {
        let (mut store, kv) = empty_store();
        let id = store.create(creator(), t0()).unwrap().id.clone();

        assert!(store.delete(&id).unwrap());
        assert!(store.find(&id).is_none());
        assert!(stored_documents(&kv).is_empty());
    }

    #[test]
    fn delete_missing_is_a_silent_no_op() {
        let (mut store, kv) = empty_store();
        store.create(creator(), t0()).unwrap();
        let before = kv.raw(DOCUMENTS_KEY);

        assert!(!store.delete("doc-missing").unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(kv.raw(DOCUMENTS_KEY), before);
    }

    #[test]
    fn absent_storage_is_seeded_and_written_back() {
        let kv = MemoryKvStore::new();
        let store = DocumentStore::load(Persistence::new(kv.clone()), t0());

        assert_eq!(store.list(), seed_documents(t0()).as_slice());
        assert_eq!(stored_documents(&kv), seed_documents(t0()));
    }

    #[test]
    fn corrupt_storage_is_seeded_and_written_back() {
        let kv = MemoryKvStore::new().with_entry(DOCUMENTS_KEY, "{{{ definitely not json");
        let store = DocumentStore::load(Persistence::new(kv.clone()), t0());

        assert_eq!(store.list(), seed_documents(t0()).as_slice());
        assert_eq!(stored_documents(&kv), seed_documents(t0()));
    }

    #[test]
    fn empty_collection_is_not_reseeded() {
        let (store, _) = empty_store();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn duplicate_ids_in_storage_keep_first_occurrence() {
        let mut first = Document::new("doc-1".into(), creator(), t0());
        first.title = "first".into();
        let mut second = first.clone();
        second.title = "second".into();
        let raw = serde_json::to_string(&vec![first, second]).unwrap();

        let kv = MemoryKvStore::new().with_entry(DOCUMENTS_KEY, &raw);
        let store = DocumentStore::load(Persistence::new(kv), t0());

        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].title, "first");
    }

    #[test]
    fn failed_writes_roll_back_memory() {
        let (mut store, kv) = empty_store();
        let doc = store.create(creator(), t0()).unwrap().clone();
        kv.set_fail_writes(true);

        assert!(store.create(creator(), t0()).is_err());
        assert_eq!(store.len(), 1);

        let mut edited = doc.clone();
        edited.content = "lost".into();
        assert!(store.save(edited, t0()).is_err());
        assert_eq!(store.find(&doc.id), Some(&doc));

        assert!(store.delete(&doc.id).is_err());
        assert_eq!(store.list(), &[doc.clone()]);
        assert_eq!(stored_documents(&kv), vec![doc]);
    }
}
