//! Line-oriented parser for study lists.
//!
//! Two dialects are understood, picked from the filename:
//!
//! ```text
//! # list.csv                # anything else (list.txt, remote.txt, ...)
//! word,meaning              hello=greeting
//! cat,animal                foo_bar=baz qux
//! ```
//!
//! Parsing is best effort: blank, header and malformed lines are dropped
//! without an error.

use crate::word::WordItem;

/// Filename used when a list has no name of its own, e.g. a remote download.
pub const DEFAULT_FILENAME: &str = "remote.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFileFormat {
    /// `word,meaning` with an optional header row.
    Csv,
    /// `word=meaning`.
    Txt,
}

impl WordFileFormat {
    /// Any filename not ending in `.csv` (case-insensitive) is read as text.
    pub fn from_filename(filename: &str) -> Self {
        if filename.to_lowercase().ends_with(".csv") {
            Self::Csv
        } else {
            Self::Txt
        }
    }

    pub fn delimiter(self) -> char {
        match self {
            Self::Csv => ',',
            Self::Txt => '=',
        }
    }
}

/// Replace underscores with spaces and trim the result.
pub fn normalize_word(text: &str) -> String {
    text.replace('_', " ").trim().to_string()
}

/// Parse raw list content into word records, in input order.
pub fn parse_word_file(content: &str, filename: &str) -> Vec<WordItem> {
    let format = WordFileFormat::from_filename(filename);
    let delimiter = format.delimiter();

    // Spreadsheet exports often start with a UTF-8 byte order mark.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !(format == WordFileFormat::Csv && is_csv_header(line)))
        .filter_map(|line| {
            let item = parse_line(line, delimiter);
            if item.is_none() {
                tracing::trace!("dropping malformed line: {}", line);
            }
            item
        })
        .collect()
}

fn parse_line(line: &str, delimiter: char) -> Option<WordItem> {
    let (word, meaning) = line.split_once(delimiter)?;
    let word = normalize_word(word);
    let meaning = meaning.trim();

    if word.is_empty() || meaning.is_empty() {
        return None;
    }

    Some(WordItem::new(word, meaning))
}

/// Matches `word,meaning` or `wordmeaning`, ignoring ASCII case.
fn is_csv_header(line: &str) -> bool {
    let Some(rest) = strip_prefix_ignore_case(line, "word") else {
        return false;
    };
    let rest = rest.strip_prefix(',').unwrap_or(rest);
    rest.eq_ignore_ascii_case("meaning")
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}
