use async_trait::async_trait;
use quire_common::RemoteError;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::directive::SheetDirective;
use crate::snapshot::SpreadsheetSnapshot;

/// Remote spreadsheet backend
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read every tab with its cell data
    async fn read(&self, id: &str) -> Result<SpreadsheetSnapshot, RemoteError>;

    /// Apply directives atomically, in order
    async fn batch_update(&self, id: &str, directives: &[SheetDirective]) -> Result<(), RemoteError>;
}

/// In-memory store for testing; records batches without applying them
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    spreadsheets: Mutex<HashMap<String, SpreadsheetSnapshot>>,
    batches: Mutex<Vec<(String, Vec<SheetDirective>)>>,
    fail_next: Mutex<Option<RemoteError>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spreadsheet(id: impl Into<String>, snapshot: SpreadsheetSnapshot) -> Self {
        let mut spreadsheets = HashMap::new();
        spreadsheets.insert(id.into(), snapshot);
        Self {
            spreadsheets: Mutex::new(spreadsheets),
            ..Self::default()
        }
    }

    /// Make the next batch fail with `error`
    pub async fn fail_next(&self, error: RemoteError) {
        *self.fail_next.lock().await = Some(error);
    }

    pub async fn batches(&self) -> Vec<(String, Vec<SheetDirective>)> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn read(&self, id: &str) -> Result<SpreadsheetSnapshot, RemoteError> {
        self.spreadsheets
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::Rejected(format!("spreadsheet {} not found", id)))
    }

    async fn batch_update(&self, id: &str, directives: &[SheetDirective]) -> Result<(), RemoteError> {
        if let Some(error) = self.fail_next.lock().await.take() {
            return Err(error);
        }
        debug!(spreadsheet = %id, count = directives.len(), "Recorded batch");
        self.batches
            .lock()
            .await
            .push((id.to_string(), directives.to_vec()));
        Ok(())
    }
}
