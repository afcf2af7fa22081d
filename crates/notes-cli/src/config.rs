use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

use crate::storage::FileStore;

/// What to do when a local draft is newer than the server copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePolicy {
    Ask,
    Always,
    Never,
}

impl FromStr for RestorePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "always" | "yes" => Ok(Self::Always),
            "never" | "no" => Ok(Self::Never),
            other => anyhow::bail!("unknown draft restore policy '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub username: Option<String>,
    pub draft_dir: PathBuf,
    pub restore_drafts: RestorePolicy,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let draft_dir = match env::var("NOTES_DRAFT_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => FileStore::default_dir()?,
        };

        Ok(Self {
            server_url: env::var("NOTES_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            username: env::var("NOTES_USERNAME").ok().filter(|u| !u.is_empty()),
            draft_dir,
            restore_drafts: env::var("NOTES_RESTORE_DRAFTS")
                .unwrap_or_else(|_| "ask".to_string())
                .parse()
                .context("NOTES_RESTORE_DRAFTS")?,
        })
    }
}
