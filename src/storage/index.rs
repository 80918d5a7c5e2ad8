use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use super::errors::StorageResult;

/// Process-wide registry of `(document id, document type)` pairs, persisted
/// as a flat file under the storage root. Writers take an advisory OS file
/// lock for the duration of the read-modify-write; readers are lock-free.
pub struct DocumentIndex {
    path: PathBuf,
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let mut parts = line.splitn(2, '\t');
    let id = parts.next()?.to_string();
    let doc_type = parts.next()?.to_string();
    Some((id, doc_type))
}

impl DocumentIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Idempotently register `(id, type)`. Re-registering the same id
    /// updates its type in place rather than appending a duplicate row.
    pub fn register(&self, id: &str, doc_type: &str) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let result = (|| -> StorageResult<()> {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;

            let mut entries: Vec<(String, String)> =
                contents.lines().filter_map(parse_line).collect();
            match entries.iter_mut().find(|(eid, _)| eid == id) {
                Some(entry) => entry.1 = doc_type.to_string(),
                None => entries.push((id.to_string(), doc_type.to_string())),
            }

            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            for (id, doc_type) in &entries {
                writeln!(file, "{id}\t{doc_type}")?;
            }
            file.flush()?;
            Ok(())
        })();

        let _ = FileExt::unlock(&file);
        result
    }

    /// A consistent historical snapshot of all registered documents.
    /// Lock-free: readers never block a writer nor each other.
    pub fn documents(&self) -> StorageResult<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(contents.lines().filter_map(parse_line).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn register_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let index = DocumentIndex::new(dir.path().join("index"));
        index.register("doc-1", "document").unwrap();
        index.register("doc-1", "document").unwrap();
        index.register("doc-2", "note").unwrap();

        let docs = index.documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.contains(&("doc-1".to_string(), "document".to_string())));
        assert!(docs.contains(&("doc-2".to_string(), "note".to_string())));
    }

    #[test]
    fn re_registering_updates_type_in_place() {
        let dir = TempDir::new().unwrap();
        let index = DocumentIndex::new(dir.path().join("index"));
        index.register("doc-1", "document").unwrap();
        index.register("doc-1", "note").unwrap();

        let docs = index.documents().unwrap();
        assert_eq!(docs, vec![("doc-1".to_string(), "note".to_string())]);
    }

    #[test]
    fn documents_empty_before_any_registration() {
        let dir = TempDir::new().unwrap();
        let index = DocumentIndex::new(dir.path().join("index"));
        assert!(index.documents().unwrap().is_empty());
    }
}
