use async_trait::async_trait;
use quire_common::RemoteError;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::directive::{BatchReply, Directive, DirectiveReply};
use crate::snapshot::DocumentSnapshot;

/// Remote document backend
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the current state of a document
    async fn read(&self, id: &str) -> Result<DocumentSnapshot, RemoteError>;

    /// Apply directives atomically, in order
    async fn batch_update(
        &self,
        id: &str,
        directives: &[Directive],
    ) -> Result<BatchReply, RemoteError>;
}

/// In-memory store for testing.
///
/// Serves fixed snapshots and records every batch it receives without applying
/// it. Named ranges get sequential ids.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, DocumentSnapshot>>,
    batches: Mutex<Vec<(String, Vec<Directive>)>>,
    reads: Mutex<usize>,
    fail_next: Mutex<Option<RemoteError>>,
    next_range_id: Mutex<usize>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(id: impl Into<String>, snapshot: DocumentSnapshot) -> Self {
        let mut documents = HashMap::new();
        documents.insert(id.into(), snapshot);
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    /// Replace what the next read returns
    pub async fn put(&self, id: impl Into<String>, snapshot: DocumentSnapshot) {
        self.documents.lock().await.insert(id.into(), snapshot);
    }

    /// Make the next batch fail with `error`
    pub async fn fail_next(&self, error: RemoteError) {
        *self.fail_next.lock().await = Some(error);
    }

    /// Every accepted batch, oldest first
    pub async fn batches(&self) -> Vec<(String, Vec<Directive>)> {
        self.batches.lock().await.clone()
    }

    pub async fn read_count(&self) -> usize {
        *self.reads.lock().await
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, id: &str) -> Result<DocumentSnapshot, RemoteError> {
        *self.reads.lock().await += 1;
        self.documents
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::Rejected(format!("document {} not found", id)))
    }

    async fn batch_update(
        &self,
        id: &str,
        directives: &[Directive],
    ) -> Result<BatchReply, RemoteError> {
        if let Some(error) = self.fail_next.lock().await.take() {
            return Err(error);
        }

        let mut next_range_id = self.next_range_id.lock().await;
        let replies = directives
            .iter()
            .map(|directive| match directive {
                Directive::CreateNamedRange { .. } => {
                    *next_range_id += 1;
                    DirectiveReply::NamedRange {
                        id: format!("range.{}", next_range_id),
                    }
                }
                _ => DirectiveReply::Empty,
            })
            .collect();

        debug!(document = %id, count = directives.len(), "Recorded batch");
        self.batches
            .lock()
            .await
            .push((id.to_string(), directives.to_vec()));

        Ok(BatchReply { replies })
    }
}
