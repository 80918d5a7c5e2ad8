use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::success_message;
use crate::common::{EnvProvider, SystemEnvProvider};
use crate::storage::{Document, DocumentIndex, StoreConfig};

use super::get_author_identity;

#[derive(Args)]
pub struct PromoteArgs {
    /// Document id
    pub id: String,

    /// Source state branch
    #[arg(long)]
    pub from: String,

    /// Destination state branch
    #[arg(long)]
    pub to: String,

    /// Commit message
    #[arg(long)]
    pub message: Option<String>,

    /// Author name (defaults to git config)
    #[arg(long)]
    pub author_name: Option<String>,

    /// Author email (defaults to git config)
    #[arg(long)]
    pub author_email: Option<String>,
}

pub fn handle_promote(config: StoreConfig, args: PromoteArgs) -> Result<()> {
    handle_promote_with_env(config, args, SystemEnvProvider)
}

pub fn handle_promote_with_env(
    config: StoreConfig,
    args: PromoteArgs,
    env_provider: impl EnvProvider,
) -> Result<()> {
    let index = std::sync::Arc::new(DocumentIndex::new(config.index_file_path()));
    let document = Document::open_with_config(&config, &args.id, "document", index, None)
        .context("failed to open document")?
        .with_context(|| format!("document '{}' does not exist", args.id))?;

    let author = get_author_identity(args.author_name, args.author_email, &document, env_provider)?;
    let message = args.message.unwrap_or_else(|| format!("promote to {}", args.to));

    let revision = document.promote(&args.from, &args.to, author, message, chrono::Utc::now())?;

    println!(
        "{}",
        success_message(&format!(
            "Promoted document {} from {} to {} as revision {}",
            args.id,
            args.from,
            args.to,
            revision.id()
        ))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::save::{SaveArgs, handle_save_with_env};
    use super::*;
    use crate::common::MockEnvProvider;
    use tempfile::TempDir;

    #[test]
    fn promote_without_document_fails() {
        let dir = TempDir::new().unwrap();
        let args = PromoteArgs {
            id: "doc-1".to_string(),
            from: "master".to_string(),
            to: "published".to_string(),
            message: None,
            author_name: Some("A".to_string()),
            author_email: Some("a@x".to_string()),
        };

        let result = handle_promote_with_env(StoreConfig::new(dir.path()), args, MockEnvProvider::new());
        assert!(result.is_err());
    }

    #[test]
    fn promote_after_save_succeeds() {
        let dir = TempDir::new().unwrap();
        handle_save_with_env(
            StoreConfig::new(dir.path()),
            SaveArgs {
                id: "doc-1".to_string(),
                content: r#"{"n":1}"#.to_string(),
                state: None,
                message: None,
                author_name: Some("A".to_string()),
                author_email: Some("a@x".to_string()),
            },
            MockEnvProvider::new(),
        )
        .unwrap();

        let args = PromoteArgs {
            id: "doc-1".to_string(),
            from: "master".to_string(),
            to: "published".to_string(),
            message: None,
            author_name: Some("A".to_string()),
            author_email: Some("a@x".to_string()),
        };
        let result = handle_promote_with_env(StoreConfig::new(dir.path()), args, MockEnvProvider::new());
        assert!(result.is_ok());
    }
}
