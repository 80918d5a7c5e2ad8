use std::collections::BTreeMap;

use super::errors::StorageResult;
use super::revision::Revision;

/// A back-end-specific field type descriptor, used by
/// `SearchProvider::ensure_index`'s mapping argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Keyword,
    Number,
    Boolean,
    Date,
}

pub type AttributeMapping = BTreeMap<String, FieldType>;

/// The write operation that triggered a notification to the search
/// provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEventKind {
    Save,
    Promotion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEvent {
    pub name: IndexEventKind,
    pub to: String,
}

impl IndexEvent {
    pub fn save(to: impl Into<String>) -> Self {
        Self {
            name: IndexEventKind::Save,
            to: to.into(),
        }
    }

    pub fn promotion(to: impl Into<String>) -> Self {
        Self {
            name: IndexEventKind::Promotion,
            to: to.into(),
        }
    }
}

/// A single indexed entry as returned by `list`/`search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub id: String,
    pub state: String,
    pub revision_id: String,
}

/// A pluggable sink documents push revisions to after every successful
/// state update. The core only requires that indexing calls happen at the
/// points named by `Document::save_in`/`Document::promote`; `list`/`search`
/// are read paths delegated entirely to the provider.
pub trait SearchProvider: Send + Sync {
    fn ensure_index(
        &self,
        index_name: &str,
        type_name: &str,
        mapping: &AttributeMapping,
    ) -> StorageResult<()>;

    fn index(
        &self,
        document_id: &str,
        document_type: &str,
        revision: &Revision,
        state: &str,
        event: IndexEvent,
    ) -> StorageResult<()>;

    fn list(&self, document_type: &str) -> StorageResult<Vec<IndexedDocument>>;

    fn search(&self, query: &str) -> StorageResult<Vec<IndexedDocument>>;
}

/// The explicit no-op implementation: lets `Document`'s notification points
/// always hold a provider rather than an `Option<Box<dyn SearchProvider>>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSearchProvider;

impl SearchProvider for NoopSearchProvider {
    fn ensure_index(&self, _: &str, _: &str, _: &AttributeMapping) -> StorageResult<()> {
        Ok(())
    }

    fn index(&self, _: &str, _: &str, _: &Revision, _: &str, _: IndexEvent) -> StorageResult<()> {
        Ok(())
    }

    fn list(&self, _: &str) -> StorageResult<Vec<IndexedDocument>> {
        Ok(Vec::new())
    }

    fn search(&self, _: &str) -> StorageResult<Vec<IndexedDocument>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::sync::Mutex;

    /// An in-memory search provider double, used by `Document` tests to
    /// assert on what got indexed without standing up a real back-end.
    #[derive(Default)]
    pub struct RecordingSearchProvider {
        pub events: Mutex<Vec<(String, IndexEvent)>>,
    }

    impl SearchProvider for RecordingSearchProvider {
        fn ensure_index(&self, _: &str, _: &str, _: &AttributeMapping) -> StorageResult<()> {
            Ok(())
        }

        fn index(
            &self,
            document_id: &str,
            _document_type: &str,
            _revision: &Revision,
            _state: &str,
            event: IndexEvent,
        ) -> StorageResult<()> {
            self.events
                .lock()
                .unwrap()
                .push((document_id.to_string(), event));
            Ok(())
        }

        fn list(&self, _: &str) -> StorageResult<Vec<IndexedDocument>> {
            Ok(Vec::new())
        }

        fn search(&self, _: &str) -> StorageResult<Vec<IndexedDocument>> {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_provider_never_fails() {
        let provider = NoopSearchProvider;
        assert!(provider.ensure_index("idx", "document", &AttributeMapping::new()).is_ok());
        assert!(provider.list("document").unwrap().is_empty());
        assert!(provider.search("q").unwrap().is_empty());
    }
}
