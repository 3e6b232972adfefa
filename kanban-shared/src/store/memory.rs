/// In-memory backend
///
/// Keeps records in a `Vec`. Nothing survives the process; used by tests and
/// throwaway servers.

use super::{Backend, Collection, Record, StoreResult};
use async_trait::async_trait;
use std::sync::RwLock;

/// Backend holding records in process memory
pub struct Memory<T> {
    records: RwLock<Vec<T>>,
}

impl<T> Memory<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl<T> Default for Memory<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl<T: Record> Backend<T> for Memory<T> {
    async fn read(&self) -> StoreResult<Vec<T>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.clone())
    }

    async fn write(&self, records: &[T]) -> StoreResult<()> {
        let mut stored = self.records.write().unwrap_or_else(|e| e.into_inner());
        *stored = records.to_vec();
        Ok(())
    }
}

impl<T: Record> Collection<T, Memory<T>> {
    /// Empty in-memory collection
    pub fn in_memory() -> Self {
        Self::new(Memory::default())
    }

    /// In-memory collection seeded with `records`
    pub fn with_records(records: Vec<T>) -> Self {
        Self::new(Memory::new(records))
    }
}
