use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::format_revision_detailed;
use crate::storage::{Document, DocumentIndex, StoreConfig};

#[derive(Args)]
pub struct ShowArgs {
    /// Document id
    pub id: String,

    /// State branch to show the tip of (default: master, unless --revision is given)
    #[arg(long, conflicts_with = "revision")]
    pub state: Option<String>,

    /// Exact revision id to show
    #[arg(long)]
    pub revision: Option<String>,
}

pub fn handle_show(config: StoreConfig, args: ShowArgs) -> Result<()> {
    let index = std::sync::Arc::new(DocumentIndex::new(config.index_file_path()));
    let document = Document::open_with_config(&config, &args.id, "document", index, None)
        .context("failed to open document")?
        .with_context(|| format!("document '{}' does not exist", args.id))?;

    let revisions = document.revisions()?;
    let state_or_id = args
        .revision
        .or(args.state)
        .unwrap_or_else(|| "master".to_string());

    let revision = revisions
        .by_state(&state_or_id)?
        .or(revisions.by_id(&state_or_id)?)
        .with_context(|| format!("no revision found for '{}'", state_or_id))?;

    print!("{}", format_revision_detailed(&revision)?);
    Ok(())
}
