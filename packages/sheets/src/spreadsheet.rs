use quire_common::{EditError, EditResult, QuireConfig};
use tracing::{info, instrument};

use crate::sheet::Sheet;
use crate::snapshot::{SheetSnapshot, SpreadsheetSnapshot};
use crate::store::SheetStore;

/// A loaded spreadsheet; hands out one [`Sheet`] per tab
#[derive(Debug)]
pub struct Spreadsheet<S: SheetStore> {
    id: String,
    store: S,
    config: QuireConfig,
    snapshot: SpreadsheetSnapshot,
}

impl<S: SheetStore> Spreadsheet<S> {
    pub async fn load(store: S, id: &str) -> EditResult<Self> {
        Self::load_with_config(store, id, QuireConfig::default()).await
    }

    #[instrument(skip_all, fields(spreadsheet = %id))]
    pub async fn load_with_config(store: S, id: &str, config: QuireConfig) -> EditResult<Self> {
        let snapshot = store.read(id).await?;
        info!(sheets = snapshot.sheets.len(), "Loaded spreadsheet");
        Ok(Self {
            id: id.to_string(),
            store,
            config,
            snapshot,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.snapshot.title.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Titles of every tab, in order
    pub fn sheet_titles(&self) -> Vec<&str> {
        self.snapshot.sheets.iter().map(|sheet| sheet.title.as_str()).collect()
    }

    fn find(&self, name: &str) -> EditResult<&SheetSnapshot> {
        self.snapshot.sheet(name).ok_or_else(|| {
            EditError::structural(format!("spreadsheet {} has no {} sheet", self.id, name))
        })
    }

    /// Editable view of the named tab
    pub fn sheet(&self, name: &str) -> EditResult<Sheet<'_, S>> {
        Sheet::new(&self.store, &self.id, self.find(name)?, &self.config, true)
    }

    /// Read-only view of the named tab
    pub fn snapshot(&self, name: &str) -> EditResult<Sheet<'_, S>> {
        Sheet::new(&self.store, &self.id, self.find(name)?, &self.config, false)
    }
}
