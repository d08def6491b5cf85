//! In-process implementation of the URL store.

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::entities::{CreateOutcome, NewUrlRecord, UrlRecord, UrlRecordPatch};
use crate::domain::repositories::UrlStore;
use crate::error::AppError;

/// URL store backed by a concurrent hash map.
///
/// `create_if_absent` runs under the map's per-shard lock, which makes it
/// atomic per key. Records live only as long as the process; this backs
/// development runs without a database and the test suite.
#[derive(Default)]
pub struct MemoryUrlStore {
    records: DashMap<String, UrlRecord>,
}

impl MemoryUrlStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlStore for MemoryUrlStore {
    async fn get(&self, key: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn create_if_absent(&self, record: NewUrlRecord) -> Result<CreateOutcome, AppError> {
        match self.records.entry(record.key.clone()) {
            Entry::Occupied(existing) => Ok(CreateOutcome::Exists(existing.get().clone())),
            Entry::Vacant(slot) => {
                let created = UrlRecord::from(record);
                slot.insert(created.clone());
                Ok(CreateOutcome::Created(created))
            }
        }
    }

    async fn update(&self, key: &str, patch: UrlRecordPatch) -> Result<(), AppError> {
        if let Some(mut record) = self.records.get_mut(key) {
            record.apply(&patch);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.records.remove(key).is_some())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError> {
        let mut records: Vec<UrlRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });

        Ok(records
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(i64::try_from(self.records.len()).unwrap_or(i64::MAX))
    }
}
