use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use super::errors::{StorageError, StorageResult};
use super::objectstore::ObjectStore;
use crate::common::{Content, Identity};

/// Derived revision kind, per the commit's parent count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionType {
    /// No parents: the document's root revision.
    Orphan,
    /// One parent: an ordinary save on a state branch.
    Save,
    /// Two parents: a promotion, carrying `previous` and `origin`.
    Promotion,
}

struct Loaded {
    content: Content,
    author: Identity,
    message: String,
    timestamp: DateTime<Utc>,
    previous_id: Option<gix::ObjectId>,
    origin_id: Option<gix::ObjectId>,
}

/// One immutable node in a document's revision DAG.
///
/// Holds a non-owning handle to the document's object store (an `Arc`, not a
/// back-reference to the owning `Document`) so a `Revision` can outlive the
/// call that produced it without co-owning the document itself. Constructed
/// from a bare id, a `Revision` touches the store only when a non-`id`
/// accessor is first called; the result is cached in `loaded`.
#[derive(Clone)]
pub struct Revision {
    id: gix::ObjectId,
    store: Arc<ObjectStore>,
    root_id: gix::ObjectId,
    state: Option<String>,
    loaded: Arc<OnceLock<Loaded>>,
}

impl PartialEq for Revision {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Revision {}

impl Revision {
    /// Construct a lazy revision bound to an already-written commit. Does
    /// not touch the store.
    pub fn from_id(store: Arc<ObjectStore>, root_id: gix::ObjectId, id: gix::ObjectId) -> Self {
        Self {
            id,
            store,
            root_id,
            state: None,
            loaded: Arc::new(OnceLock::new()),
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Construct and eagerly load a freshly written commit's data, so the
    /// newly returned revision doesn't immediately re-read what the caller
    /// just wrote.
    pub fn from_written(
        store: Arc<ObjectStore>,
        root_id: gix::ObjectId,
        id: gix::ObjectId,
        content: Content,
        author: Identity,
        message: String,
        timestamp: DateTime<Utc>,
        previous_id: Option<gix::ObjectId>,
        origin_id: Option<gix::ObjectId>,
    ) -> Self {
        let revision = Self::from_id(store, root_id, id);
        let _ = revision.loaded.set(Loaded {
            content,
            author,
            message,
            timestamp,
            previous_id,
            origin_id,
        });
        revision
    }

    fn load(&self) -> StorageResult<&Loaded> {
        if let Some(loaded) = self.loaded.get() {
            return Ok(loaded);
        }
        log::debug!("lazily loading commit {}", self.id);
        let commit = self.store.read_commit(self.id)?;
        let bytes = self.store.read_content_blob(commit.tree)?;
        let text = std::str::from_utf8(&bytes).map_err(|e| {
            StorageError::corruption(self.id.to_string(), format!("non-utf8 content: {e}"))
        })?;
        let content = Content::from_json(text).map_err(|e| {
            StorageError::corruption(self.id.to_string(), format!("invalid content json: {e}"))
        })?;
        let previous_id = commit.parents.first().copied();
        let origin_id = commit.parents.get(1).copied();
        let loaded = Loaded {
            content,
            author: commit.author,
            message: commit.message,
            timestamp: commit.timestamp,
            previous_id,
            origin_id,
        };
        let _ = self.loaded.set(loaded);
        Ok(self.loaded.get().expect("just set"))
    }

    /// The commit id as a hex string. Never touches the store.
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub(crate) fn oid(&self) -> gix::ObjectId {
        self.id
    }

    /// The traversal hint: the state branch this revision was reached
    /// through, if any. Not part of identity.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn content(&self) -> StorageResult<Content> {
        Ok(self.load()?.content.clone())
    }

    pub fn author(&self) -> StorageResult<Identity> {
        Ok(self.load()?.author.clone())
    }

    pub fn message(&self) -> StorageResult<String> {
        Ok(self.load()?.message.clone())
    }

    pub fn timestamp(&self) -> StorageResult<DateTime<Utc>> {
        Ok(self.load()?.timestamp)
    }

    /// The parent on the same branch before this write, if any.
    pub fn previous(&self) -> StorageResult<Option<Revision>> {
        let previous_id = self.load()?.previous_id;
        Ok(previous_id.map(|id| {
            let state = self.state.clone();
            let rev = Revision::from_id(self.store.clone(), self.root_id, id);
            match state {
                Some(s) => rev.with_state(s),
                None => rev,
            }
        }))
    }

    /// The source revision a promotion copied content from, if this
    /// revision is a promotion.
    pub fn origin(&self) -> StorageResult<Option<Revision>> {
        let origin_id = self.load()?.origin_id;
        Ok(origin_id.map(|id| Revision::from_id(self.store.clone(), self.root_id, id)))
    }

    /// `true` iff this revision is the document's designated root. Never
    /// touches the store: the root id is known at construction time.
    pub fn is_root(&self) -> bool {
        self.id == self.root_id
    }

    pub fn revision_type(&self) -> StorageResult<RevisionType> {
        let loaded = self.load()?;
        Ok(match (loaded.previous_id, loaded.origin_id) {
            (None, _) => RevisionType::Orphan,
            (Some(_), None) => RevisionType::Save,
            (Some(_), Some(_)) => RevisionType::Promotion,
        })
    }

    /// Walk `previous` from this revision until `other` is reached (or the
    /// chain is exhausted). `true` if `self` is `other` or an ancestor of it.
    fn is_ancestor_of_or_equal(&self, other: &Revision) -> StorageResult<bool> {
        let mut current = Some(other.clone());
        while let Some(rev) = current {
            if rev.id == self.id {
                return Ok(true);
            }
            current = rev.previous()?;
        }
        Ok(false)
    }

    /// Whether some revision on `state` was promoted from this revision or
    /// a descendant of it that is still reachable (i.e. not superseded by a
    /// later save before the promotion happened).
    ///
    /// Walks `state`'s history backwards; for every promotion commit found
    /// there, checks whether `self` is an ancestor-or-equal of that
    /// promotion's `origin`.
    pub fn has_been_promoted_to(&self, state: &str) -> StorageResult<bool> {
        let ref_name = format!("refs/heads/{state}");
        let Some(tip_id) = self.store.resolve_ref(&ref_name)? else {
            return Ok(false);
        };
        let mut current = Some(Revision::from_id(self.store.clone(), self.root_id, tip_id));
        while let Some(rev) = current {
            if rev.revision_type()? == RevisionType::Promotion {
                if let Some(origin) = rev.origin()? {
                    if self.is_ancestor_of_or_equal(&origin)? {
                        return Ok(true);
                    }
                }
            }
            current = rev.previous()?;
        }
        Ok(false)
    }
}
