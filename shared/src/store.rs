//! The authoritative record collection.
//!
//! [`RecordStore`] holds the ordered records and is the only type that can
//! change them. [`StoreHandle`] is the shared owner handed to collaborators;
//! [`WeakStore`] lets an in-flight load notice that the owner is gone.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::debug;

use crate::model::{Record, RecordFields, RecordId, RecordPatch};
use crate::DEFAULT_LOCAL_ID_PREFIX;

#[derive(Debug)]
pub struct RecordStore {
    records: Vec<Record>,
    revision: u64,
    id_prefix: String,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self::with_id_prefix(DEFAULT_LOCAL_ID_PREFIX)
    }

    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            revision: 0,
            id_prefix: prefix.into(),
        }
    }

    /// Creates a local record at the front of the collection.
    pub fn add(&mut self, fields: RecordFields) -> RecordId {
        let id = RecordId::generate_local(&self.id_prefix);
        self.records.insert(0, Record::local(id.clone(), fields));
        self.bump();
        debug!(record_id = %id, total = self.records.len(), "record added");
        id
    }

    /// Merges `patch` into the record with `id`. Unknown ids are a silent
    /// no-op; the return value says whether a record was found.
    pub fn patch(&mut self, id: impl AsRef<str>, patch: RecordPatch) -> bool {
        let id = id.as_ref();
        let Some(record) = self.records.iter_mut().find(|r| r.id().as_str() == id) else {
            debug!(record_id = id, "patch ignored: no such record");
            return false;
        };
        record.apply_patch(patch);
        self.bump();
        debug!(record_id = id, "record patched");
        true
    }

    /// Removes the record with `id`, if present. Idempotent.
    pub fn remove(&mut self, id: impl AsRef<str>) -> Option<Record> {
        let id = id.as_ref();
        let Some(index) = self.position(id) else {
            debug!(record_id = id, "remove ignored: no such record");
            return None;
        };
        let removed = self.records.remove(index);
        self.bump();
        debug!(record_id = id, total = self.records.len(), "record removed");
        Some(removed)
    }

    /// Discards the collection and installs `records` in the given order.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = Record>) {
        let previous = self.records.len();
        self.records = records.into_iter().collect();
        self.bump();
        debug!(previous, total = self.records.len(), "collection replaced");
    }

    /// Owned copy of the collection in order.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.clone()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn find(&self, id: impl AsRef<str>) -> Option<&Record> {
        let id = id.as_ref();
        self.records.iter().find(|r| r.id().as_str() == id)
    }

    pub fn contains(&self, id: impl AsRef<str>) -> bool {
        self.find(id).is_some()
    }

    pub fn local_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_local())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Increases on every change to the collection, never otherwise.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id().as_str() == id)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Shared owner of a [`RecordStore`].
///
/// Every store operation completes before releasing the lock, so a poisoned
/// lock still guards a consistent collection and is recovered.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    inner: Arc<RwLock<RecordStore>>,
}

impl StoreHandle {
    pub fn new(store: RecordStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&RecordStore) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut RecordStore) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn add(&self, fields: RecordFields) -> RecordId {
        self.write(|store| store.add(fields))
    }

    pub fn patch(&self, id: impl AsRef<str>, patch: RecordPatch) -> bool {
        self.write(|store| store.patch(id, patch))
    }

    pub fn remove(&self, id: impl AsRef<str>) -> Option<Record> {
        self.write(|store| store.remove(id))
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.read(RecordStore::snapshot)
    }

    pub fn find(&self, id: impl AsRef<str>) -> Option<Record> {
        self.read(|store| store.find(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.read(RecordStore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(RecordStore::is_empty)
    }

    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Non-owning reference to a store; upgrading fails once every
/// [`StoreHandle`] has been dropped.
#[derive(Debug, Clone)]
pub struct WeakStore {
    inner: Weak<RwLock<RecordStore>>,
}

impl WeakStore {
    pub fn upgrade(&self) -> Option<StoreHandle> {
        self.inner.upgrade().map(|inner| StoreHandle { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, AddressPatch, Company, CompanyPatch, Origin};
    use proptest::prelude::*;

    fn fields(name: &str, email: &str) -> RecordFields {
        RecordFields {
            name: name.into(),
            email: email.into(),
            ..RecordFields::default()
        }
    }

    fn remote(id: u64, name: &str) -> Record {
        Record::remote(
            id,
            RecordFields {
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: "555-0100".into(),
                website: "example.com".into(),
                company: Company {
                    name: format!("{name} Ltd"),
                    catch_phrase: "Synergy".into(),
                    bs: "scale".into(),
                },
                address: Address {
                    street: "Main St".into(),
                    suite: "Apt. 1".into(),
                    city: "Springfield".into(),
                    zipcode: "12345".into(),
                },
            },
        )
    }

    fn seeded() -> RecordStore {
        let mut store = RecordStore::new();
        store.replace_all(vec![remote(1, "Ann"), remote(2, "Bob"), remote(3, "Cy")]);
        store
    }

    #[test]
    fn add_prepends_a_local_record() {
        let mut store = seeded();
        let id = store.add(fields("Dee", "dee@example.com"));

        assert_eq!(store.len(), 4);
        let first = &store.records()[0];
        assert_eq!(first.id(), &id);
        assert_eq!(first.origin(), Origin::Local);
        assert!(id.as_str().starts_with("local-"));
        assert_eq!(first.company, Company::default());
        assert_eq!(first.address, Address::default());
    }

    #[test]
    fn add_does_not_deduplicate() {
        let mut store = RecordStore::new();
        let a = store.add(fields("Same", "same@example.com"));
        let b = store.add(fields("Same", "same@example.com"));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn custom_prefix_is_used_for_new_ids() {
        let mut store = RecordStore::with_id_prefix("tmp_");
        let id = store.add(fields("Ann", "a@b.co"));
        assert!(id.as_str().starts_with("tmp_"));
    }

    #[test]
    fn patch_matches_numeric_ids_by_string() {
        let mut store = seeded();
        assert!(store.patch(RecordId::from(2u64), RecordPatch::default().name("Robert")));
        assert_eq!(store.find("2").unwrap().name, "Robert");
    }

    #[test]
    fn patch_merges_nested_objects() {
        let mut store = seeded();
        let patch = RecordPatch::default()
            .company(CompanyPatch {
                name: Some("New Co".into()),
                ..CompanyPatch::default()
            })
            .address(AddressPatch {
                city: Some("Shelbyville".into()),
                ..AddressPatch::default()
            });
        store.patch("1", patch);

        let record = store.find("1").unwrap();
        assert_eq!(record.company.name, "New Co");
        assert_eq!(record.company.catch_phrase, "Synergy");
        assert_eq!(record.address.city, "Shelbyville");
        assert_eq!(record.address.street, "Main St");
        assert_eq!(record.address.zipcode, "12345");
    }

    #[test]
    fn patch_unknown_id_changes_nothing() {
        let mut store = seeded();
        let before = store.snapshot();
        let revision = store.revision();

        assert!(!store.patch("missing", RecordPatch::default().name("X")));

        assert_eq!(store.snapshot(), before);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = seeded();
        assert!(store.remove("2").is_some());
        assert!(store.remove("2").is_none());
        assert_eq!(store.len(), 2);
        assert!(!store.contains("2"));
    }

    #[test]
    fn replace_all_discards_local_records() {
        let mut store = seeded();
        store.add(fields("Local", "l@example.com"));
        store.replace_all(vec![remote(9, "Zed")]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].id().as_str(), "9");
        assert_eq!(store.local_records().count(), 0);
    }

    #[test]
    fn snapshot_is_detached_from_the_store() {
        let store = seeded();
        let mut copy = store.snapshot();
        copy[0].name = "Changed".into();
        copy.clear();
        assert_eq!(store.records()[0].name, "Ann");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn revision_tracks_real_changes_only() {
        let mut store = RecordStore::new();
        assert_eq!(store.revision(), 0);
        store.add(fields("A", "a@b.co"));
        assert_eq!(store.revision(), 1);
        store.remove("nope");
        assert_eq!(store.revision(), 1);
        store.replace_all(Vec::new());
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn handle_clones_share_one_store() {
        let handle = StoreHandle::default();
        let other = handle.clone();
        let id = handle.add(fields("A", "a@b.co"));
        assert_eq!(other.find(&id).map(|r| r.name), Some("A".to_string()));
    }

    #[test]
    fn weak_store_dies_with_its_owners() {
        let handle = StoreHandle::default();
        let weak = handle.downgrade();
        assert!(weak.upgrade().is_some());

        drop(handle);

        assert!(weak.upgrade().is_none());
    }

    proptest! {
        #[test]
        fn every_add_lands_at_index_zero(names in proptest::collection::vec("[a-z]{1,8}", 1..20)) {
            let mut store = seeded();
            for name in &names {
                let id = store.add(fields(name, "x@y.z"));
                prop_assert_eq!(store.records()[0].id(), &id);
            }
            prop_assert_eq!(store.len(), 3 + names.len());
        }

        #[test]
        fn repeated_remove_shrinks_by_at_most_one(id in "[0-9]{1,2}", times in 1usize..5) {
            let mut store = seeded();
            let before = store.len();
            for _ in 0..times {
                store.remove(&id);
            }
            prop_assert!(before - store.len() <= 1);
        }
    }
}
