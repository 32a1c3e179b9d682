//! Test fixture for fncache integration tests
//!
//! Uses only the public `CatalogManager` API.

use fncache::{
    CacheArg, CatalogConfig, CatalogManager, ColumnType, DependencyDeletePolicy,
    FunctionCacheCatalogEntry, NewFunctionCache, RowId, StorageType,
};
use std::path::PathBuf;

/// On-disk catalog in a temporary directory
pub struct TestFixture {
    catalog: Option<CatalogManager>,
    config: CatalogConfig,
    db_path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TestFixture {
    /// Empty durable catalog with the default delete policy
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_policy(DependencyDeletePolicy::Detach)
    }

    pub fn with_policy(
        policy: DependencyDeletePolicy,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let _ = env_logger::builder().is_test(true).try_init();

        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir.path().join("fncache_test");
        let mut config = CatalogConfig::durable().with_dependency_delete_policy(policy);
        if !cfg!(feature = "sled-backend") {
            config.storage_type = StorageType::Memory;
            config.flush_on_write = false;
        }
        let catalog = CatalogManager::open(&db_path, config.clone())?;

        Ok(Self {
            catalog: Some(catalog),
            config,
            db_path,
            _temp_dir: temp_dir,
        })
    }

    pub fn catalog(&self) -> &CatalogManager {
        match &self.catalog {
            Some(catalog) => catalog,
            None => panic!("catalog is closed"),
        }
    }

    /// Close the catalog and open it again from disk
    pub fn reopen(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(catalog) = self.catalog.take() {
            catalog.flush()?;
            drop(catalog);
        }
        self.catalog = Some(CatalogManager::open(&self.db_path, self.config.clone())?);
        Ok(())
    }

    pub fn function(&self, name: &str) -> RowId {
        self.catalog()
            .insert_function_catalog_entry(name, &format!("functions/{}.py", name), "Filter", "")
            .unwrap()
            .row_id
    }

    pub fn column(&self, table_id: RowId, name: &str) -> RowId {
        self.catalog()
            .insert_column_catalog_entry(table_id, name, ColumnType::NdArray, false)
            .unwrap()
            .row_id
    }

    /// Cache over the given columns, depending on each of them
    pub fn cache_over_columns(
        &self,
        name: &str,
        function_id: RowId,
        columns: &[RowId],
    ) -> FunctionCacheCatalogEntry {
        let mut new = NewFunctionCache::new(
            name,
            function_id,
            format!("/tmp/fncache/{}", name),
            columns.iter().map(|id| CacheArg::column(*id)).collect::<Vec<_>>(),
        );
        for id in columns {
            new = new.depends_on_column(*id);
        }
        self.catalog()
            .insert_function_cache_catalog_entry(new)
            .unwrap()
    }
}
