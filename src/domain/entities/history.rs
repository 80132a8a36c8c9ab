//! Per-user conversion history.

use crate::error::StorageError;

const ENTRY_SEPARATOR: char = '|';
const PAIR_SEPARATOR: char = ' ';

const ESCAPED_PERCENT: &str = "%25";
const ESCAPED_SEPARATOR: &str = "%7C";

fn escape_url(url: &str) -> String {
    url.replace('%', ESCAPED_PERCENT)
        .replace(ENTRY_SEPARATOR, ESCAPED_SEPARATOR)
}

fn unescape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with(ESCAPED_PERCENT) {
            out.push('%');
            rest = &tail[ESCAPED_PERCENT.len()..];
        } else if tail.starts_with(ESCAPED_SEPARATOR) {
            out.push(ENTRY_SEPARATOR);
            rest = &tail[ESCAPED_SEPARATOR.len()..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// A conversion attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub short_code: String,
    pub original_url: String,
}

impl HistoryEntry {
    pub fn new(short_code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
        }
    }
}

/// Insertion-ordered set of history entries.
///
/// Dedup is on the `(short_code, original_url)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry unless the same pair is already present.
    ///
    /// Returns `true` if the entry was added.
    pub fn insert(&mut self, entry: HistoryEntry) -> bool {
        if self.contains(&entry.short_code, &entry.original_url) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn contains(&self, short_code: &str, original_url: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.short_code == short_code && e.original_url == original_url)
    }

    /// Returns true if any entry carries the given short code.
    pub fn contains_code(&self, short_code: &str) -> bool {
        self.entries.iter().any(|e| e.short_code == short_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }

    /// Serializes the history into the single-column blob format.
    ///
    /// Entries are joined by `|`, each one rendered as `"<code> <url>"`. In the
    /// URL, `%` is written as `%25` and `|` as `%7C`.
    pub fn to_blob(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "{}{}{}",
                    e.short_code,
                    PAIR_SEPARATOR,
                    escape_url(&e.original_url)
                )
            })
            .collect::<Vec<_>>()
            .join(&ENTRY_SEPARATOR.to_string())
    }

    /// Parses a blob produced by [`History::to_blob`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidData`] if a pair has no separator.
    pub fn from_blob(blob: &str) -> Result<Self, StorageError> {
        let mut history = History::new();
        if blob.is_empty() {
            return Ok(history);
        }

        for pair in blob.split(ENTRY_SEPARATOR) {
            let (code, url) = pair.split_once(PAIR_SEPARATOR).ok_or_else(|| {
                StorageError::InvalidData(format!("malformed history pair: {pair:?}"))
            })?;
            history.insert(HistoryEntry::new(code, unescape_url(url)));
        }

        Ok(history)
    }
}

impl FromIterator<HistoryEntry> for History {
    fn from_iter<T: IntoIterator<Item = HistoryEntry>>(iter: T) -> Self {
        let mut history = History::new();
        for entry in iter {
            history.insert(entry);
        }
        history
    }
}

impl IntoIterator for History {
    type Item = HistoryEntry;
    type IntoIter = std::vec::IntoIter<HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates_pairs() {
        let mut history = History::new();

        assert!(history.insert(HistoryEntry::new("1389853602", "yandex.com")));
        assert!(!history.insert(HistoryEntry::new("1389853602", "yandex.com")));
        assert!(history.insert(HistoryEntry::new("3201241320", "ya.ru")));

        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_insert_keeps_order() {
        let history: History = [
            HistoryEntry::new("2177322106", "stackoverflow.com"),
            HistoryEntry::new("294555335", "go.dev"),
        ]
        .into_iter()
        .collect();

        let codes: Vec<_> = history.iter().map(|e| e.short_code.as_str()).collect();
        assert_eq!(codes, ["2177322106", "294555335"]);
    }

    #[test]
    fn test_blob_format() {
        let history: History = [
            HistoryEntry::new("1389853602", "yandex.com"),
            HistoryEntry::new("3201241320", "ya.ru"),
        ]
        .into_iter()
        .collect();

        let blob = history.to_blob();
        assert_eq!(blob, "1389853602 yandex.com|3201241320 ya.ru");
        assert_eq!(History::from_blob(&blob).unwrap(), history);
    }

    #[test]
    fn test_blob_escapes_separator() {
        let history: History = [
            HistoryEntry::new("1", "http://x.example/?a=1|2"),
            HistoryEntry::new("2", "http://x.example/?q=50%25|%7C"),
            HistoryEntry::new("3", "http://x.example/a b"),
        ]
        .into_iter()
        .collect();

        let blob = history.to_blob();
        assert_eq!(blob.matches(ENTRY_SEPARATOR).count(), 2);
        assert_eq!(History::from_blob(&blob).unwrap(), history);
    }

    #[test]
    fn test_blob_keeps_unescaped_percent() {
        let history = History::from_blob("1 http://x.example/?q=100%").unwrap();
        assert!(history.contains("1", "http://x.example/?q=100%"));
    }

    #[test]
    fn test_empty_blob_is_empty_history() {
        let history = History::from_blob("").unwrap();
        assert!(history.is_empty());
        assert_eq!(History::new().to_blob(), "");
    }

    #[test]
    fn test_malformed_blob() {
        let result = History::from_blob("1389853602yandex.com");
        assert!(matches!(result, Err(StorageError::InvalidData(_))));
    }
}
