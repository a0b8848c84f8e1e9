use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::parser::{DEFAULT_FILENAME, parse_word_file};
use crate::remote::WordListClient;
use crate::word::WordItem;

/// Where a word list is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordSource {
    File(PathBuf),
    Url(String),
}

impl WordSource {
    pub fn from_arg(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    pub async fn load(&self, client: &WordListClient) -> Result<Vec<WordItem>> {
        match self {
            Self::File(path) => read_word_list_from_file(path),
            Self::Url(url) => client.fetch(url).await,
        }
    }
}

impl std::fmt::Display for WordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

pub fn read_word_list_from_file(path: &Path) -> Result<Vec<WordItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read word list at {}", path.display()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

    let words = parse_word_file(&raw, &filename);
    tracing::debug!("parsed {} words from {}", words.len(), path.display());
    Ok(words)
}
