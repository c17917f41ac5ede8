use std::path::{Path, PathBuf};

use tracing::info;

pub mod config;
pub mod error;
pub mod model;
pub mod refresh;
pub mod storage;
pub mod types;

use config::Settings;
use error::Result;
use model::Model;
use refresh::{FieldUpdater, Progress, TableReport};
use storage::{Catalog, DiskStorage, StorageEngine};
use types::Row;

pub use error::{DenormalError, StorageError};

const CATALOG_FILE: &str = "catalog.json";
const SETTINGS_FILE: &str = "settings.json";

/// A database directory: model catalog, settings and table rows.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    catalog: Catalog,
    settings: Settings,
    storage: DiskStorage,
}

impl Database {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let storage = DiskStorage::open(&path)?;
        let catalog = Catalog::load_from_path(&path.join(CATALOG_FILE))?;
        let settings = Settings::load_from_path(&path.join(SETTINGS_FILE))?;
        for model in catalog.models() {
            storage.bootstrap_table(model.name(), &model.schema)?;
        }
        info!(
            path = %path.display(),
            models = catalog.models().len(),
            "database opened"
        );
        Ok(Self {
            path,
            catalog,
            settings,
            storage,
        })
    }

    /// Registers a model and creates its table.
    pub fn create_model(&mut self, model: Model) -> Result<()> {
        let mut catalog = self.catalog.clone();
        catalog.add_model(model.clone())?;
        self.storage.create_table(model.name(), &model.schema)?;
        catalog.save_to_path(&self.path.join(CATALOG_FILE))?;
        self.catalog = catalog;
        Ok(())
    }

    pub fn insert(&self, table: &str, row: Row) -> Result<i64> {
        Ok(self.storage.insert(table, row)?)
    }

    /// Recomputes the given `table.column` targets for every row, in one
    /// transaction, using this database's chunk size.
    pub fn update_fields<'p, S: AsRef<str>>(
        &self,
        targets: &[S],
        progress: Option<&mut (dyn Progress + 'p)>,
    ) -> Result<Vec<TableReport>> {
        FieldUpdater::new(&self.storage, &self.catalog)
            .with_chunk_size(self.settings.chunk_size)
            .run(targets, progress)
    }

    pub fn models(&self) -> &[Model] {
        self.catalog.models()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &DiskStorage {
        &self.storage
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn save_settings(&self) -> Result<()> {
        Ok(self.settings.save_to_path(&self.path.join(SETTINGS_FILE))?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
