use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use gix::objs::tree::{Entry, EntryKind};
use gix::refs::transaction::PreviousValue;

use super::errors::{GitError, GitResult};
use crate::common::Identity;

/// The single file every revision's tree carries: the serialized `Content`
/// for that revision, per spec section 6 ("Commit payload").
pub const CONTENT_BLOB_NAME: &str = "content";

/// A parsed git commit, as needed to reconstruct a [`crate::storage::revision::Revision`].
#[derive(Debug, Clone)]
pub struct CommitData {
    pub tree: gix::ObjectId,
    pub parents: Vec<gix::ObjectId>,
    pub author: Identity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A git-shaped, content-addressed object store for a single document.
///
/// Wraps a bare `gix::Repository` behind a mutex: spec section 5 requires
/// single-writer-per-document discipline, and a mutex is the simplest way
/// to serialize the read-modify-CAS-write sequence each write performs.
pub struct ObjectStore {
    repo: Mutex<gix::Repository>,
    path: PathBuf,
}

impl ObjectStore {
    /// Open an existing bare repository. Fails with `RepositoryNotFound` if
    /// absent (mapped to spec's `NotFound` by callers).
    pub fn open<P: AsRef<Path>>(path: P) -> GitResult<Self> {
        let repo = gix::open(path.as_ref())?;
        Ok(Self {
            repo: Mutex::new(repo),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Idempotently initialize a bare repository, creating it if absent.
    pub fn init<P: AsRef<Path>>(path: P) -> GitResult<Self> {
        match Self::open(path.as_ref()) {
            Ok(store) => Ok(store),
            Err(_) => {
                let repo = gix::init_bare(path.as_ref())?;
                Ok(Self {
                    repo: Mutex::new(repo),
                    path: path.as_ref().to_path_buf(),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_repo<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&gix::Repository) -> T,
    {
        let repo = self.repo.lock().unwrap_or_else(|e| e.into_inner());
        f(&repo)
    }

    pub fn write_blob(&self, bytes: &[u8]) -> GitResult<gix::ObjectId> {
        self.with_repo(|repo| Ok(repo.write_blob(bytes)?.detach()))
    }

    /// Build the one-entry tree every revision commit carries: a single
    /// `content` blob holding serialized `Content`.
    pub fn write_content_tree(&self, content_json: &[u8]) -> GitResult<gix::ObjectId> {
        let blob = self.write_blob(content_json)?;
        self.with_repo(|repo| {
            let tree = gix::objs::Tree {
                entries: vec![Entry {
                    mode: EntryKind::Blob.into(),
                    filename: CONTENT_BLOB_NAME.into(),
                    oid: blob,
                }],
            };
            Ok(repo.write_object(&tree)?.detach())
        })
    }

    /// Read the `content` blob out of a revision's tree.
    pub fn read_content_blob(&self, tree_id: gix::ObjectId) -> GitResult<Vec<u8>> {
        self.with_repo(|repo| {
            let tree_data = repo.find_object(tree_id)?;
            let tree = gix::objs::TreeRef::from_bytes(&tree_data.data)
                .map_err(|e| GitError::CommitParsingFailed {
                    message: e.to_string(),
                })?;
            let entry = tree
                .entries
                .iter()
                .find(|e| e.filename == CONTENT_BLOB_NAME.as_bytes())
                .ok_or_else(|| GitError::TreeEntryNotFound {
                    name: CONTENT_BLOB_NAME.to_string(),
                })?;
            let blob_data = repo.find_object(entry.oid)?;
            Ok(blob_data.data.to_vec())
        })
    }

    /// Write a commit object. `parents` is `[]`, `[previous]`, or
    /// `[previous, origin]` per spec section 6.
    pub fn write_commit(
        &self,
        tree: gix::ObjectId,
        parents: Vec<gix::ObjectId>,
        author: &Identity,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> GitResult<gix::ObjectId> {
        self.with_repo(|repo| {
            let time = gix::date::Time::new(timestamp.timestamp(), 0);
            let signature = gix::actor::Signature {
                name: author.name.as_str().into(),
                email: author.email.as_str().into(),
                time,
            };
            let commit = gix::objs::Commit {
                tree,
                parents: parents.into(),
                author: signature.clone(),
                committer: signature,
                encoding: None,
                message: message.into(),
                extra_headers: vec![],
            };
            Ok(repo.write_object(&commit)?.detach())
        })
    }

    pub fn read_commit(&self, id: gix::ObjectId) -> GitResult<CommitData> {
        self.with_repo(|repo| {
            let data = repo
                .find_object(id)
                .map_err(|_| GitError::object_not_found(id.to_string()))?;
            let commit = gix::objs::CommitRef::from_bytes(&data.data).map_err(|e| {
                GitError::CommitParsingFailed {
                    message: e.to_string(),
                }
            })?;
            let author = Identity::new(
                &commit.author.name.to_string(),
                &commit.author.email.to_string(),
            );
            let author_time = commit.author.time().map_err(|e| GitError::CommitParsingFailed {
                message: e.to_string(),
            })?;
            let timestamp =
                DateTime::<Utc>::from_timestamp(author_time.seconds, 0).unwrap_or_else(Utc::now);
            Ok(CommitData {
                tree: commit.tree(),
                parents: commit.parents().collect(),
                author,
                message: commit.message().to_string(),
                timestamp,
            })
        })
    }

    /// The tree id of an already-written commit, used by `promote` to reuse
    /// the origin's tree verbatim rather than re-serializing content.
    pub fn tree_of_commit(&self, id: gix::ObjectId) -> GitResult<gix::ObjectId> {
        Ok(self.read_commit(id)?.tree)
    }

    pub fn resolve_ref(&self, name: &str) -> GitResult<Option<gix::ObjectId>> {
        self.with_repo(|repo| match repo.find_reference(name) {
            Ok(mut reference) => reference
                .peel_to_id_in_place()
                .map(|id| Some(id.detach()))
                .map_err(|e| GitError::operation_failed("resolve_ref", e.to_string())),
            Err(gix::reference::find::existing::Error::NotFound) => Ok(None),
            Err(e) => Err(GitError::operation_failed("resolve_ref", e.to_string())),
        })
    }

    /// CAS ref update: succeeds only if the ref's current value matches
    /// `expect_previous` (or the ref doesn't exist yet, when
    /// `expect_previous` is `None`). Any precondition violation — a stale
    /// tip, or the ref springing into existence before we got to create it —
    /// is a concurrent write from this writer's point of view.
    pub fn update_ref(
        &self,
        name: &str,
        id: gix::ObjectId,
        expect_previous: Option<gix::ObjectId>,
        message: &str,
    ) -> GitResult<()> {
        self.with_repo(|repo| {
            let previous = match expect_previous {
                Some(prev) => PreviousValue::ExistingMustMatch(gix::refs::Target::Object(prev)),
                None => PreviousValue::MustNotExist,
            };
            repo.reference(name, id, previous, message.to_string())
                .map(|_| ())
                .map_err(|_| GitError::ConcurrentRefUpdate {
                    ref_name: name.to_string(),
                })
        })
    }

    /// Read a git config value, the way the teacher resolves `user.name`/
    /// `user.email` for author defaults.
    pub fn get_config(&self, key: &str) -> Option<String> {
        self.with_repo(|repo| {
            repo.config_snapshot()
                .string(key)
                .map(|v| v.to_string())
        })
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use tempfile::TempDir;

    pub fn setup_temp_store() -> (TempDir, ObjectStore) {
        let dir = TempDir::new().expect("create temp dir");
        let store = ObjectStore::init(dir.path()).expect("init object store");
        (dir, store)
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::setup_temp_store;
    use super::*;
    use crate::common::Identity;

    fn author() -> Identity {
        Identity::new("Test User", "test@example.com")
    }

    #[test]
    fn write_and_read_content_round_trips() {
        let (_dir, store) = setup_temp_store();
        let tree = store.write_content_tree(br#"{"title":"hi"}"#).unwrap();
        let bytes = store.read_content_blob(tree).unwrap();
        assert_eq!(bytes, br#"{"title":"hi"}"#);
    }

    #[test]
    fn write_commit_and_read_back() {
        let (_dir, store) = setup_temp_store();
        let tree = store.write_content_tree(b"{}").unwrap();
        let ts = Utc::now();
        let commit = store
            .write_commit(tree, vec![], &author(), "First Commit", ts)
            .unwrap();
        let data = store.read_commit(commit).unwrap();
        assert_eq!(data.tree, tree);
        assert!(data.parents.is_empty());
        assert_eq!(data.author.name, "Test User");
        assert_eq!(data.message, "First Commit");
    }

    #[test]
    fn ref_cas_rejects_stale_previous() {
        let (_dir, store) = setup_temp_store();
        let tree = store.write_content_tree(b"{}").unwrap();
        let ts = Utc::now();
        let c1 = store
            .write_commit(tree, vec![], &author(), "m1", ts)
            .unwrap();
        store
            .update_ref("refs/heads/master", c1, None, "save")
            .unwrap();

        let c2 = store
            .write_commit(tree, vec![c1], &author(), "m2", ts)
            .unwrap();
        // Correct CAS succeeds.
        store
            .update_ref("refs/heads/master", c2, Some(c1), "save")
            .unwrap();

        let c3 = store
            .write_commit(tree, vec![c1], &author(), "m3", ts)
            .unwrap();
        // Stale CAS (still expects c1, but tip is now c2) fails.
        let err = store.update_ref("refs/heads/master", c3, Some(c1), "save");
        assert!(err.is_err());
        assert_eq!(store.resolve_ref("refs/heads/master").unwrap(), Some(c2));
    }

    #[test]
    fn resolve_ref_missing_is_none() {
        let (_dir, store) = setup_temp_store();
        assert_eq!(store.resolve_ref("refs/heads/nope").unwrap(), None);
    }
}
