pub mod config;
pub mod document;
pub mod errors;
pub mod index;
pub mod objectstore;
pub mod revision;
pub mod revisions;
pub mod search;

pub use config::{ObjectStoreBackend, StoreConfig};
pub use document::{Document, History};
pub use errors::{GitError, StorageError, StorageResult};
pub use index::DocumentIndex;
pub use objectstore::ObjectStore;
pub use revision::{Revision, RevisionType};
pub use revisions::RevisionCollection;
pub use search::{NoopSearchProvider, SearchProvider};
