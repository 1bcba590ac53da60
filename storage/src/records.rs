use argonath_core::auth::{ensure_subject, AuthzError};
use argonath_core::error::{ArgonathError, ErrorCode};
use argonath_core::model::{MindMapRecord, MindMapUpdate, NewMindMap};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("mind map {0} not found")]
    NotFound(String),
    #[error("authorization error: {0}")]
    Unauthorized(#[from] AuthzError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl ArgonathError for RecordError {
    fn error_code(&self) -> ErrorCode {
        match self {
            RecordError::NotFound(_) => ErrorCode::NotFound,
            RecordError::Unauthorized(err) => err.error_code(),
            RecordError::Unavailable(_) => ErrorCode::Unavailable,
            RecordError::Io(_) | RecordError::Serialization(_) => ErrorCode::Internal,
        }
    }
}

/// Row storage for saved mind maps on the hosted backend.
///
/// Implementations assign `id` and `created_at`, list newest first and refuse
/// deletes from anyone but the creator.
#[async_trait]
pub trait MindMapBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<MindMapRecord>, RecordError>;

    async fn get(&self, id: &str) -> Result<MindMapRecord, RecordError>;

    async fn insert(&self, record: NewMindMap) -> Result<MindMapRecord, RecordError>;

    async fn update(&self, id: &str, update: MindMapUpdate)
        -> Result<MindMapRecord, RecordError>;

    async fn delete(&self, id: &str, requested_by: &str) -> Result<(), RecordError>;
}

fn apply_update(record: &mut MindMapRecord, update: MindMapUpdate) {
    record.data = update.data;
    record.classification = update.classification;
    if let Some(name) = update.name {
        record.name = name;
    }
}

/// Ties on `created_at` fall back to insertion sequence, then id, so the
/// order never depends on directory iteration.
fn sort_newest_first(rows: &mut [(u64, MindMapRecord)]) {
    rows.sort_by(|(seq_a, a), (seq_b, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| seq_b.cmp(seq_a))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[derive(Default)]
pub struct InMemoryMindMapBackend {
    rows: DashMap<String, (u64, MindMapRecord)>,
    sequence: AtomicU64,
}

impl InMemoryMindMapBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row as-is, e.g. one written by another client.
    pub fn seed(&self, record: MindMapRecord) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.rows.insert(record.id.clone(), (seq, record));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl MindMapBackend for InMemoryMindMapBackend {
    async fn list(&self) -> Result<Vec<MindMapRecord>, RecordError> {
        let mut rows: Vec<(u64, MindMapRecord)> = self
            .rows
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut rows);
        Ok(rows.into_iter().map(|(_, record)| record).collect())
    }

    async fn get(&self, id: &str) -> Result<MindMapRecord, RecordError> {
        self.rows
            .get(id)
            .map(|entry| entry.value().1.clone())
            .ok_or_else(|| RecordError::NotFound(id.to_string()))
    }

    async fn insert(&self, record: NewMindMap) -> Result<MindMapRecord, RecordError> {
        let record = MindMapRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: record.name,
            classification: record.classification,
            creator: record.creator,
            data: record.data,
            created_at: Utc::now(),
        };
        self.seed(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        update: MindMapUpdate,
    ) -> Result<MindMapRecord, RecordError> {
        let mut entry = self
            .rows
            .get_mut(id)
            .ok_or_else(|| RecordError::NotFound(id.to_string()))?;
        apply_update(&mut entry.value_mut().1, update);
        Ok(entry.value().1.clone())
    }

    async fn delete(&self, id: &str, requested_by: &str) -> Result<(), RecordError> {
        let creator = self
            .rows
            .get(id)
            .map(|entry| entry.value().1.creator.clone())
            .ok_or_else(|| RecordError::NotFound(id.to_string()))?;
        ensure_subject(requested_by, &creator)?;
        self.rows.remove(id);
        Ok(())
    }
}

/// One JSON document per mind map inside a directory. Writes go to a temp
/// file first and are renamed into place.
pub struct FsMindMapBackend {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl FsMindMapBackend {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            sequence: AtomicU64::new(0),
        }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, RecordError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(RecordError::NotFound(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    async fn write_record(&self, record: &MindMapRecord) -> Result<(), RecordError> {
        if !fs::try_exists(&self.dir).await? {
            fs::create_dir_all(&self.dir).await?;
        }

        let path = self.path_for(&record.id)?;
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let tmp_path = path.with_extension(format!("json.{seq}.tmp"));

        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(&tmp_path, bytes).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn read_record(&self, id: &str) -> Result<MindMapRecord, RecordError> {
        let path = self.path_for(id)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(RecordError::NotFound(id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl MindMapBackend for FsMindMapBackend {
    async fn list(&self) -> Result<Vec<MindMapRecord>, RecordError> {
        if !fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.dir).await?;
        let mut rows = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<MindMapRecord>(&bytes) {
                Ok(record) => rows.push((0, record)),
                Err(err) => warn!(path = %path.display(), "skipping unreadable mind map row: {}", err),
            }
        }

        sort_newest_first(&mut rows);
        Ok(rows.into_iter().map(|(_, record)| record).collect())
    }

    async fn get(&self, id: &str) -> Result<MindMapRecord, RecordError> {
        self.read_record(id).await
    }

    async fn insert(&self, record: NewMindMap) -> Result<MindMapRecord, RecordError> {
        let record = MindMapRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: record.name,
            classification: record.classification,
            creator: record.creator,
            data: record.data,
            created_at: Utc::now(),
        };
        self.write_record(&record).await?;
        debug!(record_id = %record.id, "mind map row written");
        Ok(record)
    }

    async fn update(
        &self,
        id: &str,
        update: MindMapUpdate,
    ) -> Result<MindMapRecord, RecordError> {
        let mut record = self.read_record(id).await?;
        apply_update(&mut record, update);
        self.write_record(&record).await?;
        Ok(record)
    }

    async fn delete(&self, id: &str, requested_by: &str) -> Result<(), RecordError> {
        let record = self.read_record(id).await?;
        ensure_subject(requested_by, &record.creator)?;
        fs::remove_file(self.path_for(id)?).await?;
        Ok(())
    }
}
