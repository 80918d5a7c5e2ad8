use anyhow::Result;
use clap::{Parser, Subcommand};

mod history;
mod list;
mod promote;
mod promoted;
mod save;
mod show;

pub use history::{HistoryArgs, handle_history};
pub use list::{ListArgs, handle_list};
pub use promote::{PromoteArgs, handle_promote};
pub use promoted::{PromotedArgs, handle_promoted};
pub use save::{SaveArgs, handle_save};
pub use show::{ShowArgs, handle_show};

use crate::common::{EnvProvider, Identity};
use crate::storage::{Document, StoreConfig};

#[derive(Parser)]
#[command(name = "content-store")]
#[command(about = "A versioned structured-content store with a publishing pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Storage root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub storage_path: Option<std::path::PathBuf>,

    /// Default search index name (defaults to "default")
    #[arg(long, global = true)]
    pub index_name: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save content to a state branch, creating the document if needed
    Save(SaveArgs),
    /// Copy a state branch's tip onto another state, preserving provenance
    Promote(PromoteArgs),
    /// Show one revision's content and metadata
    Show(ShowArgs),
    /// Walk the previous-chain from a state's tip (or a revision id)
    History(HistoryArgs),
    /// List all registered documents
    List(ListArgs),
    /// Check whether a revision has been promoted to a state
    Promoted(PromotedArgs),
}

pub fn run_command(cli: Cli) -> Result<()> {
    let storage_path = cli
        .storage_path
        .unwrap_or_else(|| std::env::current_dir().unwrap());
    let mut config = StoreConfig::new(storage_path);
    if let Some(index_name) = cli.index_name {
        config = config.with_index_name(index_name);
    }

    match cli.command {
        Commands::Save(args) => handle_save(config, args),
        Commands::Promote(args) => handle_promote(config, args),
        Commands::Show(args) => handle_show(config, args),
        Commands::History(args) => handle_history(config, args),
        Commands::List(args) => handle_list(config, args),
        Commands::Promoted(args) => handle_promoted(config, args),
    }
}

/// Resolve an author from explicit CLI flags, falling back to
/// `GIT_AUTHOR_NAME`/`GIT_AUTHOR_EMAIL`, then the document's own git config,
/// then a last-resort default.
pub(crate) fn get_author_identity(
    name: Option<String>,
    email: Option<String>,
    document: &Document,
    env_provider: impl EnvProvider,
) -> Result<Identity> {
    let name = name.unwrap_or_else(|| {
        env_provider
            .get_var("GIT_AUTHOR_NAME")
            .or_else(|| document.get_config("user.name").ok().flatten())
            .or_else(|| env_provider.get_var("USER"))
            .unwrap_or_else(|| "Unknown".to_string())
    });

    let email = email.unwrap_or_else(|| {
        env_provider
            .get_var("GIT_AUTHOR_EMAIL")
            .or_else(|| document.get_config("user.email").ok().flatten())
            .unwrap_or_else(|| "unknown@localhost".to_string())
    });

    Ok(Identity::new(&name, &email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MockEnvProvider;
    use crate::storage::DocumentIndex;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn get_author_identity_prefers_explicit_args() {
        let dir = TempDir::new().unwrap();
        let index = Arc::new(DocumentIndex::new(dir.path().join("index")));
        let document = Document::with_id(dir.path(), "doc-1", "document", index, None);
        let mock_env = MockEnvProvider::new();

        let identity = get_author_identity(
            Some("Explicit".to_string()),
            Some("explicit@example.com".to_string()),
            &document,
            mock_env,
        )
        .unwrap();

        assert_eq!(identity.name, "Explicit");
        assert_eq!(identity.email, "explicit@example.com");
    }

    #[test]
    fn get_author_identity_falls_back_to_env() {
        let dir = TempDir::new().unwrap();
        let index = Arc::new(DocumentIndex::new(dir.path().join("index")));
        let document = Document::with_id(dir.path(), "doc-1", "document", index, None);
        let mock_env = MockEnvProvider::with_git_author("Env User", "env@example.com");

        let identity = get_author_identity(None, None, &document, mock_env).unwrap();

        assert_eq!(identity.name, "Env User");
        assert_eq!(identity.email, "env@example.com");
    }

    #[test]
    fn get_author_identity_last_resort_default() {
        let dir = TempDir::new().unwrap();
        let index = Arc::new(DocumentIndex::new(dir.path().join("index")));
        let document = Document::with_id(dir.path(), "doc-1", "document", index, None);
        let mock_env = MockEnvProvider::new();

        let identity = get_author_identity(None, None, &document, mock_env).unwrap();

        assert_eq!(identity.name, "Unknown");
        assert_eq!(identity.email, "unknown@localhost");
    }
}
