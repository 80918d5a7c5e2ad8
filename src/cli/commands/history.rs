use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::format_revision_compact;
use crate::storage::{Document, DocumentIndex, StoreConfig};

#[derive(Args)]
pub struct HistoryArgs {
    /// Document id
    pub id: String,

    /// State branch to walk from (default: master, unless --revision is given)
    #[arg(long, conflicts_with = "revision")]
    pub state: Option<String>,

    /// Exact revision id to walk from
    #[arg(long)]
    pub revision: Option<String>,
}

pub fn handle_history(config: StoreConfig, args: HistoryArgs) -> Result<()> {
    let index = std::sync::Arc::new(DocumentIndex::new(config.index_file_path()));
    let document = Document::open_with_config(&config, &args.id, "document", index, None)
        .context("failed to open document")?
        .with_context(|| format!("document '{}' does not exist", args.id))?;

    let state_or_id = args
        .revision
        .or(args.state)
        .unwrap_or_else(|| "master".to_string());

    for revision in document.history(&state_or_id)? {
        println!("{}", format_revision_compact(&revision?)?);
    }
    Ok(())
}
