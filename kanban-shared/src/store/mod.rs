/// Record stores
///
/// Each entity type lives in its own collection: a flat list of records that is
/// read and written as a whole. Handlers talk to a collection through the
/// [`RecordStore`] trait, so the backing storage can be swapped without touching
/// them.
///
/// # Backends
///
/// - [`JsonFile`]: one pretty-printed JSON array per collection on disk
/// - [`Memory`]: a `Vec` held in process, used by tests
///
/// # Consistency
///
/// [`Collection`] holds a per-collection async mutex for the whole
/// read-modify-write cycle of every operation, so concurrent requests inside
/// one process cannot lose each other's updates. Nothing guards against a
/// second process writing the same file.
///
/// # Ids
///
/// Ids are assigned as `max(existing ids, highest id issued so far) + 1`,
/// starting at 1. The high-water mark is kept by the backend when it can
/// persist one ([`JsonFile`] does), so an id freed by deleting the newest record
/// is never handed out again, even after a restart. A collection whose ids
/// reach `i64::MAX` refuses further appends with [`StoreError::IdsExhausted`].
///
/// # Example
///
/// ```
/// use kanban_shared::models::user::{CreateUser, User};
/// use kanban_shared::store::{MemoryStore, RecordStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let users = MemoryStore::<User>::in_memory();
/// let ana = users
///     .append(CreateUser {
///         nome: "Ana Silva".to_string(),
///         email: "ana@x.com".to_string(),
///     })
///     .await?;
/// assert_eq!(ana.id, 1);
/// # Ok(())
/// # }
/// ```

pub mod json_file;
pub mod memory;

pub use json_file::JsonFile;
pub use memory::Memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// A record that can be kept in a collection
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Creation payload, everything but the id
    type Draft: Send + 'static;

    /// Collection name, used in logs and error messages
    const COLLECTION: &'static str;

    fn id(&self) -> i64;

    /// Builds the stored record from its creation payload
    fn from_draft(id: i64, draft: Self::Draft) -> Self;
}

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a list of records
    #[error("{} does not contain a valid {collection} collection: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No id is left above the highest one issued
    #[error("no ids left in the {collection} collection")]
    IdsExhausted { collection: &'static str },

    /// Records could not be encoded
    #[error("failed to encode {collection}: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// In-place change applied to one record
pub type Change<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Predicate marking an existing record as conflicting with a new one
pub type Conflict<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Collection of records of one type
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Returns every record, in insertion order
    async fn list(&self) -> StoreResult<Vec<T>>;

    /// Looks a record up by id
    async fn find(&self, id: i64) -> StoreResult<Option<T>> {
        Ok(self.list().await?.into_iter().find(|r| r.id() == id))
    }

    /// Assigns the next id to `draft` and stores it
    async fn append(&self, draft: T::Draft) -> StoreResult<T>;

    /// Like [`append`](Self::append), but stores nothing and returns `None`
    /// when any existing record matches `conflict`
    ///
    /// The check and the insert happen under the same lock.
    async fn append_unique(&self, draft: T::Draft, conflict: Conflict<T>)
        -> StoreResult<Option<T>>;

    /// Overwrites the whole collection
    async fn replace_all(&self, records: Vec<T>) -> StoreResult<()>;

    /// Applies `change` to the record with `id` and persists the collection
    ///
    /// Returns the updated record, or `None` when no record has that id.
    async fn modify(&self, id: i64, change: Change<T>) -> StoreResult<Option<T>>;

    /// Deletes the record with `id`, returning it
    async fn remove(&self, id: i64) -> StoreResult<Option<T>>;
}

/// Where a collection keeps its records
#[async_trait]
pub trait Backend<T: Record>: Send + Sync {
    /// Loads every record
    async fn read(&self) -> StoreResult<Vec<T>>;

    /// Replaces every record
    async fn write(&self, records: &[T]) -> StoreResult<()>;

    /// Highest id ever issued, for backends that keep one
    async fn read_high_water(&self) -> StoreResult<i64> {
        Ok(0)
    }

    async fn write_high_water(&self, _id: i64) -> StoreResult<()> {
        Ok(())
    }
}

/// [`RecordStore`] over any [`Backend`]
pub struct Collection<T: Record, B: Backend<T>> {
    backend: B,
    /// Highest id handed out so far; also serializes every operation
    high_water: Mutex<i64>,
    _records: PhantomData<fn() -> T>,
}

/// Collection persisted as a JSON file
pub type JsonFileStore<T> = Collection<T, JsonFile>;

/// Collection held in memory
pub type MemoryStore<T> = Collection<T, Memory<T>>;

impl<T: Record, B: Backend<T>> Collection<T, B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            high_water: Mutex::new(0),
            _records: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reserves the next id; caller holds the lock
    async fn issue_id(&self, high_water: &mut i64, records: &[T]) -> StoreResult<i64> {
        let stored = self.backend.read_high_water().await?;
        let max = records.iter().map(Record::id).max().unwrap_or(0);
        let next = max
            .max(*high_water)
            .max(stored)
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted {
                collection: T::COLLECTION,
            })?;

        self.backend.write_high_water(next).await?;
        *high_water = next;
        Ok(next)
    }
}

#[async_trait]
impl<T: Record, B: Backend<T>> RecordStore<T> for Collection<T, B> {
    async fn list(&self) -> StoreResult<Vec<T>> {
        let _guard = self.high_water.lock().await;
        self.backend.read().await
    }

    async fn append(&self, draft: T::Draft) -> StoreResult<T> {
        let mut high_water = self.high_water.lock().await;
        let mut records = self.backend.read().await?;

        let id = self.issue_id(&mut high_water, &records).await?;
        let record = T::from_draft(id, draft);
        records.push(record.clone());
        self.backend.write(&records).await?;

        tracing::debug!(collection = T::COLLECTION, id = record.id(), "record appended");
        Ok(record)
    }

    async fn append_unique(
        &self,
        draft: T::Draft,
        conflict: Conflict<T>,
    ) -> StoreResult<Option<T>> {
        let mut high_water = self.high_water.lock().await;
        let mut records = self.backend.read().await?;

        if records.iter().any(|r| conflict(r)) {
            tracing::debug!(collection = T::COLLECTION, "append rejected by conflict check");
            return Ok(None);
        }

        let id = self.issue_id(&mut high_water, &records).await?;
        let record = T::from_draft(id, draft);
        records.push(record.clone());
        self.backend.write(&records).await?;

        tracing::debug!(collection = T::COLLECTION, id = record.id(), "record appended");
        Ok(Some(record))
    }

    async fn replace_all(&self, records: Vec<T>) -> StoreResult<()> {
        let mut high_water = self.high_water.lock().await;
        let max = records.iter().map(Record::id).max().unwrap_or(0);
        let stored = self.backend.read_high_water().await?;
        if max > stored {
            self.backend.write_high_water(max).await?;
        }
        *high_water = (*high_water).max(max);
        self.backend.write(&records).await?;

        tracing::debug!(collection = T::COLLECTION, count = records.len(), "collection replaced");
        Ok(())
    }

    async fn modify(&self, id: i64, change: Change<T>) -> StoreResult<Option<T>> {
        let _guard = self.high_water.lock().await;
        let mut records = self.backend.read().await?;

        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        change(record);
        let updated = record.clone();
        self.backend.write(&records).await?;

        tracing::debug!(collection = T::COLLECTION, id, "record updated");
        Ok(Some(updated))
    }

    async fn remove(&self, id: i64) -> StoreResult<Option<T>> {
        let _guard = self.high_water.lock().await;
        let mut records = self.backend.read().await?;

        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let removed = records.remove(pos);
        self.backend.write(&records).await?;

        tracing::debug!(collection = T::COLLECTION, id, "record removed");
        Ok(Some(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{CreateTask, Prioridade, Status, Task};
    use crate::models::user::{CreateUser, User};
    use std::sync::Arc;

    fn draft(descricao: &str) -> CreateTask {
        CreateTask {
            descricao: descricao.to_string(),
            setor: "TI".to_string(),
            usuario: 1,
            prioridade: Prioridade::Media,
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let store = MemoryStore::<Task>::in_memory();
        let first = store.append(draft("Primeira tarefa")).await.unwrap();
        let second = store.append(draft("Segunda tarefa")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ids_continue_from_existing_maximum() {
        let existing = Task {
            id: 41,
            descricao: "Importada".to_string(),
            setor: "TI".to_string(),
            usuario: 1,
            prioridade: Prioridade::Alta,
            status: Status::Pronto,
        };
        let store = MemoryStore::with_records(vec![existing]);
        let task = store.append(draft("Nova tarefa")).await.unwrap();
        assert_eq!(task.id, 42);
    }

    #[tokio::test]
    async fn test_append_fails_when_ids_are_exhausted() {
        let last = Task {
            id: i64::MAX,
            descricao: "Última".to_string(),
            setor: "TI".to_string(),
            usuario: 1,
            prioridade: Prioridade::Baixa,
            status: Status::AFazer,
        };
        let store = MemoryStore::with_records(vec![last]);

        let err = store.append(draft("Sem espaço")).await.unwrap_err();
        assert!(matches!(err, StoreError::IdsExhausted { collection: "tasks" }));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_newest_id_is_not_reused() {
        let store = MemoryStore::<Task>::in_memory();
        store.append(draft("Primeira tarefa")).await.unwrap();
        let second = store.append(draft("Segunda tarefa")).await.unwrap();

        store.remove(second.id).await.unwrap();
        let third = store.append(draft("Terceira tarefa")).await.unwrap();

        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_modify_and_remove_unknown_id() {
        let store = MemoryStore::<Task>::in_memory();
        store.append(draft("Primeira tarefa")).await.unwrap();

        let updated = store
            .modify(99, Box::new(|t: &mut Task| t.status = Status::Pronto))
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(store.remove(99).await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap()[0].status, Status::AFazer);
    }

    #[tokio::test]
    async fn test_modify_persists_change() {
        let store = MemoryStore::<Task>::in_memory();
        let task = store.append(draft("Primeira tarefa")).await.unwrap();

        let updated = store
            .modify(task.id, Box::new(|t: &mut Task| t.status = Status::Fazendo))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, Status::Fazendo);
        assert_eq!(store.find(task.id).await.unwrap().unwrap().status, Status::Fazendo);
    }

    #[tokio::test]
    async fn test_append_unique_rejects_conflicts() {
        let store = MemoryStore::<User>::in_memory();
        let ana = || CreateUser {
            nome: "Ana Silva".to_string(),
            email: "ana@x.com".to_string(),
        };
        let same_email = |email: &'static str| -> Conflict<User> {
            Box::new(move |u: &User| u.email == email)
        };

        assert!(store.append_unique(ana(), same_email("ana@x.com")).await.unwrap().is_some());
        assert!(store.append_unique(ana(), same_email("ana@x.com")).await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(MemoryStore::<Task>::in_memory());
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(draft(&format!("Tarefa {i:02}"))).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut ids: Vec<i64> = store.list().await.unwrap().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_replace_all_raises_high_water() {
        let store = MemoryStore::<Task>::in_memory();
        let mut task = store.append(draft("Primeira tarefa")).await.unwrap();
        task.id = 10;
        store.replace_all(vec![task]).await.unwrap();
        store.replace_all(Vec::new()).await.unwrap();

        let next = store.append(draft("Depois da limpeza")).await.unwrap();
        assert_eq!(next.id, 11);
    }
}
