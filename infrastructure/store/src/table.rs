use anyhow::bail;
use dashmap::{mapref::entry::Entry, DashMap};
use domain_snapshot::{exception::SnapshotException, model::entity::Object};
use uuid::Uuid;

/// One kind of object, keyed by `namespace/name`.
///
/// Every write bumps `resource_version`, and [`Table::update`] only accepts an
/// object whose version is still current, the same optimistic concurrency an
/// API server offers.
pub struct Table<T> {
    rows: DashMap<String, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }
}

impl<T: Object> Table<T> {
    pub fn get(&self, key: &str) -> Option<T> {
        self.rows.get(key).map(|row| row.value().clone())
    }

    /// Every object, ordered by key.
    pub fn list(&self) -> Vec<T> {
        let mut all: Vec<T> = self.rows.iter().map(|row| row.value().clone()).collect();
        all.sort_by_key(|o| o.metadata().key());
        all
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stores a new object, assigning a uid if it has none.
    pub fn create(&self, mut object: T) -> anyhow::Result<T> {
        let key = object.metadata().key();
        match self.rows.entry(key) {
            Entry::Occupied(entry) => bail!("{} {} already exists.", T::KIND, entry.key()),
            Entry::Vacant(entry) => {
                let meta = object.metadata_mut();
                if meta.uid.is_nil() {
                    meta.uid = Uuid::new_v4();
                }
                meta.resource_version = 1;
                entry.insert(object.clone());
                Ok(object)
            }
        }
    }

    /// Stores `object` whatever its version, replacing any existing one.
    pub fn put(&self, mut object: T) -> T {
        let key = object.metadata().key();
        match self.rows.entry(key) {
            Entry::Occupied(mut current) => {
                let existing = current.get().metadata();
                let (uid, version) = (existing.uid, existing.resource_version);
                let meta = object.metadata_mut();
                if meta.uid.is_nil() {
                    meta.uid = uid;
                }
                meta.resource_version = version + 1;
                current.insert(object.clone());
            }
            Entry::Vacant(vacant) => {
                let meta = object.metadata_mut();
                if meta.uid.is_nil() {
                    meta.uid = Uuid::new_v4();
                }
                meta.resource_version = meta.resource_version.max(1);
                vacant.insert(object.clone());
            }
        }
        object
    }

    /// Replaces the stored object if `object` carries its current version.
    ///
    /// Fails with [`SnapshotException::NotFound`] or
    /// [`SnapshotException::Conflict`] wrapped in `anyhow`.
    pub fn update(&self, object: &T) -> anyhow::Result<T> {
        let key = object.metadata().key();
        let Some(mut current) = self.rows.get_mut(&key) else {
            return Err(SnapshotException::not_found(T::KIND, key).into());
        };
        let version = current.metadata().resource_version;
        if object.metadata().resource_version != version {
            return Err(SnapshotException::conflict(T::KIND, key).into());
        }
        let mut updated = object.clone();
        let meta = updated.metadata_mut();
        meta.uid = current.metadata().uid;
        meta.resource_version = version + 1;
        *current = updated.clone();
        Ok(updated)
    }

    pub fn remove(&self, key: &str) -> Option<T> {
        self.rows.remove(key).map(|(_, object)| object)
    }
}
