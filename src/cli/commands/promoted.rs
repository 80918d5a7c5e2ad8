use anyhow::{Context, Result};
use clap::Args;

use crate::storage::{Document, DocumentIndex, StoreConfig};

#[derive(Args)]
pub struct PromotedArgs {
    /// Document id
    pub id: String,

    /// Revision id to check
    #[arg(long)]
    pub revision: String,

    /// State branch to check promotion into
    #[arg(long)]
    pub to: String,
}

pub fn handle_promoted(config: StoreConfig, args: PromotedArgs) -> Result<()> {
    let index = std::sync::Arc::new(DocumentIndex::new(config.index_file_path()));
    let document = Document::open_with_config(&config, &args.id, "document", index, None)
        .context("failed to open document")?
        .with_context(|| format!("document '{}' does not exist", args.id))?;

    let revisions = document.revisions()?;
    let revision = revisions
        .by_id(&args.revision)?
        .with_context(|| format!("no revision '{}' found", args.revision))?;

    println!("{}", revision.has_been_promoted_to(&args.to)?);
    Ok(())
}
