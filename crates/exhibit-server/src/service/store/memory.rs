use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MetadataStore, NewObjectRecord, ObjectRecord, StoreResult, TRACING_TARGET};

/// In-process [`MetadataStore`] backed by a vector.
///
/// Records created within the same timestamp tick keep their insertion order,
/// so listing stays newest first without relying on clock resolution.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<(u64, ObjectRecord)>,
    next_seq: u64,
}

impl MemoryMetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn create(&self, new_record: NewObjectRecord) -> StoreResult<ObjectRecord> {
        let now = Timestamp::now();
        let record = ObjectRecord {
            id: Uuid::new_v4(),
            title: new_record.title,
            description: new_record.description,
            image_url: new_record.image_url,
            image_key: new_record.image_key,
            content_type: new_record.content_type,
            size_bytes: new_record.size_bytes,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.inner.write().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.rows.push((seq, record.clone()));

        tracing::trace!(target: TRACING_TARGET, object_id = %record.id, "memory row inserted");
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<ObjectRecord>> {
        let state = self.inner.read().await;
        let mut rows: Vec<_> = state.rows.iter().collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        Ok(rows.into_iter().map(|(_, record)| record.clone()).collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ObjectRecord>> {
        let state = self.inner.read().await;
        let record = state
            .rows
            .iter()
            .find(|(_, record)| record.id == id)
            .map(|(_, record)| record.clone());

        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.inner.write().await;
        let before = state.rows.len();
        state.rows.retain(|(_, record)| record.id != id);

        Ok(state.rows.len() < before)
    }
}
