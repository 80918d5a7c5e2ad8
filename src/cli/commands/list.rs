use anyhow::Result;
use clap::Args;

use crate::storage::{DocumentIndex, StoreConfig};

#[derive(Args)]
pub struct ListArgs {
    /// Filter by document type
    #[arg(short, long)]
    pub r#type: Option<String>,
}

pub fn handle_list(config: StoreConfig, args: ListArgs) -> Result<()> {
    let index = DocumentIndex::new(config.index_file_path());
    let documents = index.documents()?;

    for (id, doc_type) in documents {
        if let Some(filter) = &args.r#type {
            if &doc_type != filter {
                continue;
            }
        }
        println!("{} [{}]", id, doc_type);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn list_empty_storage_succeeds() {
        let dir = TempDir::new().unwrap();
        let result = handle_list(StoreConfig::new(dir.path()), ListArgs { r#type: None });
        assert!(result.is_ok());
    }
}
