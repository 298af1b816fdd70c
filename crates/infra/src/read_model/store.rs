use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::RwLock;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadModelError {
    #[error("read model store lock poisoned")]
    Poisoned,
}

/// Key/value store abstraction for disposable read models.
///
/// Stands in for whatever persistence layer locates a projection instance by
/// aggregate id. Values are whole snapshots; writers replace them wholesale.
/// Every operation reports storage failures; a write that returns `Ok` is
/// visible to the next read.
pub trait ReadModelStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Result<Option<V>, ReadModelError>;
    fn upsert(&self, key: K, value: V) -> Result<(), ReadModelError>;
    fn list(&self) -> Result<Vec<V>, ReadModelError>;
    /// Swap the whole content for `entries` in one step (rebuild support).
    fn replace_all(&self, entries: Vec<(K, V)>) -> Result<(), ReadModelError>;
}

impl<K, V, S> ReadModelStore<K, V> for Arc<S>
where
    S: ReadModelStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Result<Option<V>, ReadModelError> {
        (**self).get(key)
    }

    fn upsert(&self, key: K, value: V) -> Result<(), ReadModelError> {
        (**self).upsert(key, value)
    }

    fn list(&self) -> Result<Vec<V>, ReadModelError> {
        (**self).list()
    }

    fn replace_all(&self, entries: Vec<(K, V)>) -> Result<(), ReadModelError> {
        (**self).replace_all(entries)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug)]
pub struct InMemoryReadModelStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryReadModelStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryReadModelStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ReadModelStore<K, V> for InMemoryReadModelStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Result<Option<V>, ReadModelError> {
        let map = self.inner.read().map_err(|_| ReadModelError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn upsert(&self, key: K, value: V) -> Result<(), ReadModelError> {
        let mut map = self.inner.write().map_err(|_| ReadModelError::Poisoned)?;
        map.insert(key, value);
        Ok(())
    }

    fn list(&self) -> Result<Vec<V>, ReadModelError> {
        let map = self.inner.read().map_err(|_| ReadModelError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }

    fn replace_all(&self, entries: Vec<(K, V)>) -> Result<(), ReadModelError> {
        let fresh: HashMap<K, V> = entries.into_iter().collect();
        let mut map = self.inner.write().map_err(|_| ReadModelError::Poisoned)?;
        *map = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poison<K, V>(store: &InMemoryReadModelStore<K, V>)
    where
        K: Send + Sync,
        V: Send + Sync,
    {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = store.inner.write().unwrap();
                    panic!("poison read model");
                })
                .join();
        });
    }

    #[test]
    fn upsert_replaces_existing_value() {
        let store = InMemoryReadModelStore::new();
        store.upsert("a", 1).unwrap();
        store.upsert("a", 2).unwrap();
        assert_eq!(store.get(&"a").unwrap(), Some(2));
        assert_eq!(store.list().unwrap(), vec![2]);
    }

    #[test]
    fn replace_all_swaps_the_whole_content() {
        let store: Arc<InMemoryReadModelStore<u8, u8>> = Arc::new(InMemoryReadModelStore::new());
        store.upsert(1, 1).unwrap();
        store.upsert(2, 2).unwrap();

        store.replace_all(vec![(3, 30)]).unwrap();
        assert_eq!(store.get(&1).unwrap(), None);
        assert_eq!(store.list().unwrap(), vec![30]);

        store.replace_all(Vec::new()).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn poisoned_store_reports_instead_of_dropping_writes() {
        let store: InMemoryReadModelStore<u8, u8> = InMemoryReadModelStore::new();
        poison(&store);

        assert_eq!(store.upsert(1, 1), Err(ReadModelError::Poisoned));
        assert_eq!(store.get(&1), Err(ReadModelError::Poisoned));
        assert_eq!(store.list(), Err(ReadModelError::Poisoned));
        assert_eq!(store.replace_all(vec![(1, 1)]), Err(ReadModelError::Poisoned));
    }
}
