use thiserror::Error;

/// Errors from the git-shaped object store layer.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("repository not found at path: {path}")]
    RepositoryNotFound { path: String },

    #[error("failed to initialize repository: {message}")]
    InitializationFailed { message: String },

    #[error("object not found: {oid}")]
    ObjectNotFound { oid: String },

    #[error("reference not found: {ref_name}")]
    ReferenceNotFound { ref_name: String },

    #[error("reference update failed: {ref_name} - {message}")]
    ReferenceUpdateFailed { ref_name: String, message: String },

    #[error("concurrent update to reference: {ref_name}")]
    ConcurrentRefUpdate { ref_name: String },

    #[error("tree entry not found: {name}")]
    TreeEntryNotFound { name: String },

    #[error("commit parsing failed: {message}")]
    CommitParsingFailed { message: String },

    #[error("git operation failed: {operation} - {message}")]
    OperationFailed { operation: String, message: String },
}

impl GitError {
    pub fn object_not_found(oid: impl AsRef<str>) -> Self {
        GitError::ObjectNotFound {
            oid: oid.as_ref().to_string(),
        }
    }

    pub fn reference_not_found(ref_name: impl AsRef<str>) -> Self {
        GitError::ReferenceNotFound {
            ref_name: ref_name.as_ref().to_string(),
        }
    }

    pub fn operation_failed(operation: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        GitError::OperationFailed {
            operation: operation.as_ref().to_string(),
            message: message.as_ref().to_string(),
        }
    }
}

impl From<gix::open::Error> for GitError {
    fn from(err: gix::open::Error) -> Self {
        GitError::RepositoryNotFound {
            path: err.to_string(),
        }
    }
}

impl From<gix::init::Error> for GitError {
    fn from(err: gix::init::Error) -> Self {
        GitError::InitializationFailed {
            message: err.to_string(),
        }
    }
}

impl From<gix::object::find::existing::Error> for GitError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        GitError::ObjectNotFound {
            oid: err.to_string(),
        }
    }
}

impl From<gix::reference::edit::Error> for GitError {
    fn from(err: gix::reference::edit::Error) -> Self {
        GitError::ReferenceUpdateFailed {
            ref_name: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<gix::object::write::Error> for GitError {
    fn from(err: gix::object::write::Error) -> Self {
        GitError::OperationFailed {
            operation: "write_object".to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by the document/revision core.
///
/// `NotFound` (spec section 7) is represented by `Option` at call sites
/// rather than raised (`Document::open`, `RevisionCollection` lookups), so
/// it does not appear as a variant here; every other kind does.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("git error: {0}")]
    Git(#[from] GitError),

    #[error("promotion source '{from}' has no tip")]
    MissingSource { from: String },

    #[error("concurrent write on branch '{state}': ref was updated by another writer")]
    ConcurrentWrite { state: String },

    #[error("corrupt object {oid}: {message}")]
    Corruption { oid: String, message: String },

    #[error("indexing failed for revision {revision}: {message}")]
    IndexingFailed { revision: String, message: String },

    #[error("content cannot be serialized: {message}")]
    InvalidContent { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn missing_source(from: impl AsRef<str>) -> Self {
        StorageError::MissingSource {
            from: from.as_ref().to_string(),
        }
    }

    pub fn concurrent_write(state: impl AsRef<str>) -> Self {
        StorageError::ConcurrentWrite {
            state: state.as_ref().to_string(),
        }
    }

    pub fn corruption(oid: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        StorageError::Corruption {
            oid: oid.as_ref().to_string(),
            message: message.as_ref().to_string(),
        }
    }

    pub fn indexing_failed(revision: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        StorageError::IndexingFailed {
            revision: revision.as_ref().to_string(),
            message: message.as_ref().to_string(),
        }
    }

    pub fn invalid_content(message: impl AsRef<str>) -> Self {
        StorageError::InvalidContent {
            message: message.as_ref().to_string(),
        }
    }
}

pub type GitResult<T> = Result<T, GitError>;
pub type StorageResult<T> = Result<T, StorageError>;
