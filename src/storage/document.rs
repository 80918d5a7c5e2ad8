use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Utc};
use rand::RngCore;

use super::config::StoreConfig;
use super::errors::{StorageError, StorageResult};
use super::index::DocumentIndex;
use super::objectstore::ObjectStore;
use super::revision::Revision;
use super::revisions::{state_ref, RevisionCollection, ROOT_REF};
use super::search::{AttributeMapping, IndexEvent, NoopSearchProvider, SearchProvider};
use crate::common::{Content, Identity};

const DEFAULT_STATE: &str = "master";
const DEFAULT_TYPE: &str = "document";
const ROOT_AUTHOR_NAME: &str = "The Colonel";
const ROOT_AUTHOR_EMAIL: &str = "colonel@example.com";
const ROOT_MESSAGE: &str = "First Commit";

/// 128 bits of randomness, hex-encoded, as a document's default id.
pub fn random_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Aggregate root: one document, backed by one per-document object store,
/// with an in-memory buffer of unsaved content edits.
pub struct Document {
    id: String,
    doc_type: String,
    storage_root: PathBuf,
    index_name: String,
    store: OnceLock<Arc<ObjectStore>>,
    content: Mutex<Content>,
    index: Arc<DocumentIndex>,
    search: Arc<dyn SearchProvider>,
    index_ensured: OnceLock<()>,
}

impl Document {
    pub fn new(storage_root: impl Into<PathBuf>, index: Arc<DocumentIndex>) -> Self {
        Self::with_id(storage_root, random_id(), DEFAULT_TYPE, index, None)
    }

    pub fn with_id(
        storage_root: impl Into<PathBuf>,
        id: impl Into<String>,
        doc_type: impl Into<String>,
        index: Arc<DocumentIndex>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        Self::with_config(
            &StoreConfig::new(storage_root.into()),
            id,
            doc_type,
            index,
            search,
        )
    }

    /// Construct a document honoring the core's configuration surface:
    /// `storage_path` and `index_name` from `config` are applied directly;
    /// `object_store_backend` is carried on `config` as the hook for a
    /// future non-`gix` adapter, but [`ObjectStore`] is the only backend
    /// this crate implements today.
    pub fn with_config(
        config: &StoreConfig,
        id: impl Into<String>,
        doc_type: impl Into<String>,
        index: Arc<DocumentIndex>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        Self {
            id: id.into(),
            doc_type: doc_type.into(),
            storage_root: config.storage_path.clone(),
            index_name: config.index_name().to_string(),
            store: OnceLock::new(),
            content: Mutex::new(Content::map()),
            index,
            search: search.unwrap_or_else(|| Arc::new(NoopSearchProvider)),
            index_ensured: OnceLock::new(),
        }
    }

    /// Open an existing document by id. Returns `None` rather than raising
    /// if no store exists for it yet.
    pub fn open(
        storage_root: impl Into<PathBuf>,
        id: impl Into<String>,
        doc_type: impl Into<String>,
        index: Arc<DocumentIndex>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> StorageResult<Option<Self>> {
        Self::open_with_config(
            &StoreConfig::new(storage_root.into()),
            id,
            doc_type,
            index,
            search,
        )
    }

    pub fn open_with_config(
        config: &StoreConfig,
        id: impl Into<String>,
        doc_type: impl Into<String>,
        index: Arc<DocumentIndex>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> StorageResult<Option<Self>> {
        let id = id.into();
        let path = config.storage_path.join(&id);
        if !path.exists() {
            return Ok(None);
        }
        let doc = Self::with_config(config, id, doc_type, index, search);
        let store = Arc::new(ObjectStore::open(doc.path())?);
        let _ = doc.store.set(store);
        Ok(Some(doc))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    fn path(&self) -> PathBuf {
        self.storage_root.join(&self.id)
    }

    /// Lazily initialize the per-document object store on first use.
    fn object_store(&self) -> StorageResult<Arc<ObjectStore>> {
        if let Some(store) = self.store.get() {
            return Ok(store.clone());
        }
        let store = Arc::new(ObjectStore::init(self.path())?);
        let _ = self.store.set(store.clone());
        Ok(store)
    }

    pub fn revisions(&self) -> StorageResult<RevisionCollection> {
        Ok(RevisionCollection::new(self.object_store()?))
    }

    /// Read a git config value for this document's repository (e.g.
    /// `user.name`), used by the CLI to resolve a default author.
    pub fn get_config(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.object_store()?.get_config(key))
    }

    pub fn content(&self) -> Content {
        self.content.lock().unwrap().clone()
    }

    pub fn set_content(&self, content: Content) {
        *self.content.lock().unwrap() = content;
    }

    fn ensure_root(
        &self,
        store: &Arc<ObjectStore>,
        collection: &RevisionCollection,
        timestamp: DateTime<Utc>,
    ) -> StorageResult<Revision> {
        if let Some(root) = collection.root_revision()? {
            return Ok(root);
        }
        let root_author = Identity::new(ROOT_AUTHOR_NAME, ROOT_AUTHOR_EMAIL);
        let empty = Content::map();
        let json = empty
            .to_json()
            .map_err(|e| StorageError::invalid_content(e.to_string()))?;
        let tree = store.write_content_tree(json.as_bytes())?;
        let commit_id = store.write_commit(tree, vec![], &root_author, ROOT_MESSAGE, timestamp)?;
        store.update_ref(ROOT_REF, commit_id, None, "root")?;
        Ok(Revision::from_written(
            store.clone(),
            commit_id,
            commit_id,
            empty,
            root_author,
            ROOT_MESSAGE.to_string(),
            timestamp,
            None,
            None,
        ))
    }

    /// Idempotently ensure the configured search index exists for this
    /// document's type, once per `Document` value.
    fn ensure_index(&self) {
        if self.index_ensured.get().is_some() {
            return;
        }
        if let Err(err) =
            self.search
                .ensure_index(&self.index_name, &self.doc_type, &AttributeMapping::new())
        {
            log::warn!(
                "ensure_index failed for index '{}' type '{}': {err}",
                self.index_name,
                self.doc_type
            );
        }
        let _ = self.index_ensured.set(());
    }

    fn notify(&self, revision: &Revision, state: &str, event: IndexEvent) {
        self.ensure_index();
        if let Err(err) = self
            .search
            .index(&self.id, &self.doc_type, revision, state, event)
        {
            log::warn!(
                "search indexing failed for document {} revision {}: {err}",
                self.id,
                revision.id()
            );
        }
    }

    /// Equivalent to `save_in("master", ..)`.
    pub fn save(
        &self,
        author: Identity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> StorageResult<Revision> {
        self.save_in(DEFAULT_STATE, author, message, timestamp)
    }

    pub fn save_in(
        &self,
        state: &str,
        author: Identity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> StorageResult<Revision> {
        let store = self.object_store()?;
        let collection = RevisionCollection::new(store.clone());
        let root = self.ensure_root(&store, &collection, timestamp)?;
        let previous = collection.by_state(state)?.unwrap_or_else(|| root.clone());

        let content = self.content();
        let content_json = content
            .to_json()
            .map_err(|e| StorageError::invalid_content(e.to_string()))?;
        let tree = store.write_content_tree(content_json.as_bytes())?;
        let message = message.into();
        let previous_id = previous.oid();
        let commit_id =
            store.write_commit(tree, vec![previous_id], &author, &message, timestamp)?;

        store
            .update_ref(&state_ref(state), commit_id, Some(previous_id), "save")
            .map_err(|err| {
                log::debug!(
                    "CAS lost on branch '{state}' for document {}: {err}",
                    self.id
                );
                StorageError::concurrent_write(state)
            })?;

        let revision = Revision::from_written(
            store.clone(),
            root.oid(),
            commit_id,
            content,
            author,
            message,
            timestamp,
            Some(previous_id),
            None,
        );

        self.index.register(&self.id, &self.doc_type)?;
        self.notify(&revision, state, IndexEvent::save(state));

        Ok(revision)
    }

    /// Copy the tip of `from` onto `to`, recording provenance. Content is
    /// never re-serialized: the new commit reuses the origin's tree id
    /// verbatim.
    pub fn promote(
        &self,
        from: &str,
        to: &str,
        author: Identity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> StorageResult<Revision> {
        let store = self.object_store()?;
        let collection = RevisionCollection::new(store.clone());
        let origin = collection
            .by_state(from)?
            .ok_or_else(|| StorageError::missing_source(from))?;
        let root = self.ensure_root(&store, &collection, timestamp)?;
        let previous = collection.by_state(to)?.unwrap_or_else(|| root.clone());

        let origin_content = origin.content()?;
        let tree = store.tree_of_commit(origin.oid())?;
        let message = message.into();
        let previous_id = previous.oid();
        let origin_id = origin.oid();
        let commit_id = store.write_commit(
            tree,
            vec![previous_id, origin_id],
            &author,
            &message,
            timestamp,
        )?;

        store
            .update_ref(&state_ref(to), commit_id, Some(previous_id), "promote")
            .map_err(|err| {
                log::debug!(
                    "CAS lost on branch '{to}' for document {}: {err}",
                    self.id
                );
                StorageError::concurrent_write(to)
            })?;

        let revision = Revision::from_written(
            store.clone(),
            root.oid(),
            commit_id,
            origin_content,
            author,
            message,
            timestamp,
            Some(previous_id),
            Some(origin_id),
        );

        self.notify(&revision, to, IndexEvent::promotion(to));

        Ok(revision)
    }

    /// Walk `previous` from a state's tip (or an explicit revision id) back
    /// to the root. Lazy and non-restartable: each call to `next()` forces
    /// at most one commit load, suspending there per spec section 5, rather
    /// than loading the whole chain up front.
    pub fn history(&self, state_or_id: &str) -> StorageResult<History> {
        let collection = self.revisions()?;
        let start = match collection.by_state(state_or_id)? {
            Some(rev) => Some(rev),
            None => collection.by_id(state_or_id)?,
        };
        Ok(History { current: start })
    }
}

/// A lazy, finite, non-restartable walk of a document's `previous` chain,
/// yielded one loaded revision at a time.
pub struct History {
    current: Option<Revision>,
}

impl Iterator for History {
    type Item = StorageResult<Revision>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        match current.previous() {
            Ok(prev) => {
                self.current = prev;
                Some(Ok(current))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use tempfile::TempDir;

    pub fn setup_document() -> (TempDir, Document) {
        let dir = TempDir::new().expect("create temp dir");
        let index = Arc::new(DocumentIndex::new(dir.path().join("index")));
        let doc = Document::with_id(dir.path(), "doc-1", "document", index, None);
        (dir, doc)
    }

    pub fn author(name: &str, email: &str) -> Identity {
        Identity::new(name, email)
    }
}
