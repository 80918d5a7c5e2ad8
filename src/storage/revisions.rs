use std::sync::Arc;

use super::errors::StorageResult;
use super::objectstore::ObjectStore;
use super::revision::Revision;

/// The dedicated ref the document's root revision is pinned under.
pub const ROOT_REF: &str = "refs/tags/root";

pub fn state_ref(state: &str) -> String {
    format!("refs/heads/{state}")
}

/// Accessor over a single document's revisions, indexed by commit id or by
/// state branch name.
pub struct RevisionCollection {
    store: Arc<ObjectStore>,
}

impl RevisionCollection {
    pub fn new(store: Arc<ObjectStore>) -> Self {
        Self { store }
    }

    /// The document's designated root revision, or `None` if the document
    /// has never been written.
    pub fn root_revision(&self) -> StorageResult<Option<Revision>> {
        match self.store.resolve_ref(ROOT_REF)? {
            Some(id) => Ok(Some(Revision::from_id(self.store.clone(), id, id))),
            None => Ok(None),
        }
    }

    pub(crate) fn root_id(&self) -> StorageResult<Option<gix::ObjectId>> {
        Ok(self.store.resolve_ref(ROOT_REF)?)
    }

    /// A lazy revision bound to an arbitrary commit id, or `None` if the
    /// document has no root yet (nothing could exist before that) or the id
    /// is not a valid hex object id.
    pub fn by_id(&self, id: &str) -> StorageResult<Option<Revision>> {
        let Some(root_id) = self.root_id()? else {
            return Ok(None);
        };
        let oid = match gix::ObjectId::from_hex(id.as_bytes()) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        Ok(Some(Revision::from_id(self.store.clone(), root_id, oid)))
    }

    /// The revision at a state branch's current tip, carrying that state as
    /// its traversal hint, or `None` if the branch doesn't exist.
    pub fn by_state(&self, state: &str) -> StorageResult<Option<Revision>> {
        let Some(root_id) = self.root_id()? else {
            return Ok(None);
        };
        match self.store.resolve_ref(&state_ref(state))? {
            Some(id) => Ok(Some(
                Revision::from_id(self.store.clone(), root_id, id).with_state(state),
            )),
            None => Ok(None),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::super::objectstore::test_helpers::setup_temp_store;
    use super::*;
    use crate::common::{Content, Identity};

    #[test]
    fn root_revision_absent_before_any_write() {
        let (_dir, store) = setup_temp_store();
        let collection = RevisionCollection::new(Arc::new(store));
        assert!(collection.root_revision().unwrap().is_none());
        assert!(collection.by_state("master").unwrap().is_none());
    }

    #[test]
    fn by_state_after_write() {
        let (_dir, store) = setup_temp_store();
        let store = Arc::new(store);
        let ts = chrono::Utc::now();
        let author = Identity::new("A", "a@x");
        let tree = store
            .write_content_tree(Content::map().to_json().unwrap().as_bytes())
            .unwrap();
        let root = store
            .write_commit(tree, vec![], &author, "First Commit", ts)
            .unwrap();
        store.update_ref(ROOT_REF, root, None, "root").unwrap();
        store
            .update_ref(&state_ref("master"), root, None, "save")
            .unwrap();

        let collection = RevisionCollection::new(store);
        let root_rev = collection.root_revision().unwrap().unwrap();
        assert!(root_rev.is_root());
        let tip = collection.by_state("master").unwrap().unwrap();
        assert_eq!(tip.id(), root_rev.id());
        assert_eq!(tip.state(), Some("master"));
    }
}
