use std::path::PathBuf;

/// Alternate backend handle for the object store adapter. Only the
/// git-shaped backend is implemented; this is the hook the core's
/// configuration surface names for a future non-`gix` adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectStoreBackend {
    #[default]
    Gix,
}

const DEFAULT_INDEX_NAME: &str = "default";

/// Options recognized by the core: `storage_path`, `object_store_backend`,
/// `index_name`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub storage_path: PathBuf,
    pub object_store_backend: ObjectStoreBackend,
    pub index_name: Option<String>,
}

impl StoreConfig {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            object_store_backend: ObjectStoreBackend::default(),
            index_name: None,
        }
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn with_object_store_backend(mut self, backend: ObjectStoreBackend) -> Self {
        self.object_store_backend = backend;
        self
    }

    /// Path to the `DocumentIndex` file under `storage_path`.
    pub fn index_file_path(&self) -> PathBuf {
        self.storage_path.join("index")
    }

    /// The configured default search index name, or the built-in default.
    pub fn index_name(&self) -> &str {
        self.index_name.as_deref().unwrap_or(DEFAULT_INDEX_NAME)
    }
}
