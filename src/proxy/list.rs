//! The proxy list file: newline-delimited `host:port` entries
//!
//! Blank lines and `#` comments are ignored when loading and preserved when
//! rewriting. Rewrites go through a temp file in the same directory followed
//! by a rename, and are serialized behind an async mutex so concurrent
//! checks never interleave a read-modify-write cycle.

use crate::error::{Result, ShelfgrabError};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;

/// A single `host:port` proxy entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyEntry {
    pub host: String,
    pub port: u16,
}

impl ProxyEntry {
    /// Parse one list line. Anything after the first whitespace is treated
    /// as an annotation and ignored.
    pub fn parse(line: usize, raw: &str) -> Result<Self> {
        let invalid = || ShelfgrabError::InvalidProxyEntry {
            line,
            content: raw.trim().to_string(),
        };

        let token = raw.trim().split_whitespace().next().ok_or_else(invalid)?;
        let (host, port) = token.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ProxyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// The list file plus the lock shielding its rewrites.
pub struct ProxyFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ProxyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries. Malformed lines are skipped with a warning so one
    /// bad line never aborts a whole run.
    pub fn load(&self) -> Result<Vec<ProxyEntry>> {
        let text = fs::read_to_string(&self.path).map_err(|e| ShelfgrabError::ProxyFile {
            path: self.path.clone(),
            source: e,
        })?;

        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match ProxyEntry::parse(idx + 1, trimmed) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("{}, skipping", e),
            }
        }
        Ok(entries)
    }

    /// Drop every line carrying `entry` from the file.
    pub async fn remove(&self, entry: &ProxyEntry) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.rewrite(entry, false)
    }

    /// Re-append `entry` at the end of the file, removing older copies.
    pub async fn mark_good(&self, entry: &ProxyEntry) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.rewrite(entry, true)
    }

    fn line_matches(line: &str, needle: &str) -> bool {
        line.trim().split_whitespace().next() == Some(needle)
    }

    fn rewrite(&self, entry: &ProxyEntry, append: bool) -> Result<()> {
        let text = fs::read_to_string(&self.path).map_err(|e| ShelfgrabError::ProxyFile {
            path: self.path.clone(),
            source: e,
        })?;

        let needle = entry.to_string();
        let mut lines: Vec<&str> = text
            .lines()
            .filter(|line| !Self::line_matches(line, &needle))
            .collect();
        if append {
            lines.push(&needle);
        }

        let mut output = lines.join("\n");
        output.push('\n');

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            ShelfgrabError::ProxyFile {
                path: self.path.clone(),
                source: e,
            }
        })?;
        tmp.write_all(output.as_bytes())
            .map_err(|e| ShelfgrabError::ProxyFile {
                path: self.path.clone(),
                source: e,
            })?;
        tmp.persist(&self.path)
            .map_err(|e| ShelfgrabError::ProxyFile {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_list(contents: &str) -> (tempfile::TempDir, ProxyFile) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("socks5.txt");
        fs::write(&path, contents).expect("write list");
        (dir, ProxyFile::new(path))
    }

    #[test]
    fn parses_host_and_port() {
        let entry = ProxyEntry::parse(1, "127.0.0.1:1080").unwrap();
        assert_eq!(entry.host, "127.0.0.1");
        assert_eq!(entry.port, 1080);
        assert_eq!(entry.to_string(), "127.0.0.1:1080");
    }

    #[test]
    fn ignores_trailing_annotations() {
        let entry = ProxyEntry::parse(1, "10.0.0.1:9050  fast exit").unwrap();
        assert_eq!(entry.to_string(), "10.0.0.1:9050");
    }

    #[test]
    fn rejects_malformed_lines() {
        for raw in ["no-port-here", "host:", ":1080", "host:notaport", "host:99999"] {
            let err = ProxyEntry::parse(7, raw).unwrap_err();
            match err {
                ShelfgrabError::InvalidProxyEntry { line, .. } => assert_eq!(line, 7),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn load_skips_comments_blanks_and_garbage() {
        let (_dir, file) = temp_list(
            "# pool A\n\n1.1.1.1:1080\nnot a proxy\n2.2.2.2:9050\n   \n# tail\n",
        );
        let entries = file.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].to_string(), "1.1.1.1:1080");
        assert_eq!(entries[1].to_string(), "2.2.2.2:9050");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let file = ProxyFile::new("/nonexistent/socks5.txt");
        assert!(file.load().is_err());
    }

    #[tokio::test]
    async fn remove_drops_only_the_entry_and_keeps_comments() {
        let (_dir, file) = temp_list("# pool A\n1.1.1.1:1080\n2.2.2.2:9050\n1.1.1.1:1080\n");
        let entry = ProxyEntry::parse(1, "1.1.1.1:1080").unwrap();

        file.remove(&entry).await.unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "# pool A\n2.2.2.2:9050\n");
    }

    #[tokio::test]
    async fn mark_good_moves_entry_to_the_end_without_duplicating() {
        let (_dir, file) = temp_list("1.1.1.1:1080\n2.2.2.2:9050\n");
        let entry = ProxyEntry::parse(1, "1.1.1.1:1080").unwrap();

        file.mark_good(&entry).await.unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "2.2.2.2:9050\n1.1.1.1:1080\n");
        assert_eq!(file.load().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn survivor_count_matches_failures() {
        let (_dir, file) = temp_list("1.1.1.1:1080\n2.2.2.2:9050\n3.3.3.3:4145\n");
        let entries = file.load().unwrap();
        assert_eq!(entries.len(), 3);

        // Simulate one failure and two successes.
        file.remove(&entries[1]).await.unwrap();
        file.mark_good(&entries[0]).await.unwrap();
        file.mark_good(&entries[2]).await.unwrap();

        let survivors = file.load().unwrap();
        assert_eq!(survivors.len(), 2);
        assert!(!survivors.contains(&entries[1]));
    }
}
