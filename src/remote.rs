use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::parser::{DEFAULT_FILENAME, parse_word_file};
use crate::word::WordItem;

/// Downloads word lists published over HTTP.
#[derive(Debug)]
pub struct WordListClient {
    http: Client,
}

impl WordListClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client for word list downloads")?;

        Ok(Self { http })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<WordItem>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("word list download failed with HTTP {status}: {body}");
        }

        let content = response
            .text()
            .await
            .with_context(|| format!("failed to read word list body from {url}"))?;

        let filename = filename_hint(url);
        let words = parse_word_file(&content, &filename);
        tracing::debug!("parsed {} words from {} as {}", words.len(), url, filename);
        Ok(words)
    }
}

/// Last path segment of `url` when it looks like a file name, else the default.
fn filename_hint(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    path.split('/')
        .skip(1)
        .filter(|segment| !segment.is_empty())
        .last()
        .filter(|segment| segment.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_uses_last_path_segment() {
        assert_eq!(filename_hint("https://example.com/lists/words.csv"), "words.csv");
        assert_eq!(filename_hint("https://example.com/a/b.TXT?raw=1#top"), "b.TXT");
        assert_eq!(filename_hint("http://example.com/dir/list.csv/"), "list.csv");
    }

    #[test]
    fn hint_falls_back_to_default() {
        assert_eq!(filename_hint("https://example.com"), DEFAULT_FILENAME);
        assert_eq!(filename_hint("https://example.com/"), DEFAULT_FILENAME);
        assert_eq!(filename_hint("https://example.com/raw/abc123"), DEFAULT_FILENAME);
        assert_eq!(filename_hint("https://example.com/?file=x.csv"), DEFAULT_FILENAME);
    }

    #[test]
    fn host_is_never_taken_as_filename() {
        assert_eq!(filename_hint("https://words.example.com"), DEFAULT_FILENAME);
    }
}
