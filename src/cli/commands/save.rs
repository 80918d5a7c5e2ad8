use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::success_message;
use crate::common::{Content, EnvProvider, SystemEnvProvider};
use crate::storage::{Document, DocumentIndex, StoreConfig};

use super::get_author_identity;

#[derive(Args)]
pub struct SaveArgs {
    /// Document id
    pub id: String,

    /// Content as a JSON value
    pub content: String,

    /// State branch to save to (default: master)
    #[arg(long)]
    pub state: Option<String>,

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

pub fn handle_save(config: StoreConfig, args: SaveArgs) -> Result<()> {
    handle_save_with_env(config, args, SystemEnvProvider)
}

pub fn handle_save_with_env(
    config: StoreConfig,
    args: SaveArgs,
    env_provider: impl EnvProvider,
) -> Result<()> {
    let index = std::sync::Arc::new(DocumentIndex::new(config.index_file_path()));
    let document = Document::with_config(&config, &args.id, "document", index, None);

    let content =
        Content::from_json(&args.content).context("content must be valid JSON")?;
    document.set_content(content);

    let author = get_author_identity(args.author_name, args.author_email, &document, env_provider)?;
    let state = args.state.unwrap_or_else(|| "master".to_string());
    let message = args.message.unwrap_or_else(|| "save".to_string());

    let revision = document.save_in(&state, author, message, chrono::Utc::now())?;

    println!(
        "{}",
        success_message(&format!(
            "Saved document {} to {} as revision {}",
            args.id,
            state,
            revision.id()
        ))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MockEnvProvider;
    use tempfile::TempDir;

    #[test]
    fn save_creates_document_and_reports_revision() {
        let dir = TempDir::new().unwrap();
        let args = SaveArgs {
            id: "doc-1".to_string(),
            content: r#"{"title":"hi"}"#.to_string(),
            state: None,
            message: Some("initial".to_string()),
            author_name: Some("A".to_string()),
            author_email: Some("a@x".to_string()),
        };

        let result = handle_save_with_env(StoreConfig::new(dir.path()), args, MockEnvProvider::new());
        assert!(result.is_ok());
        assert!(dir.path().join("doc-1").exists());
    }

    #[test]
    fn save_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let args = SaveArgs {
            id: "doc-1".to_string(),
            content: "not json".to_string(),
            state: None,
            message: None,
            author_name: Some("A".to_string()),
            author_email: Some("a@x".to_string()),
        };

        let result = handle_save_with_env(StoreConfig::new(dir.path()), args, MockEnvProvider::new());
        assert!(result.is_err());
    }
}
