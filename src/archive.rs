//! Source archive access.
//!
//! An archive is a directory with one sub-directory per mailing list; each
//! list directory holds one raw message per file next to a few bookkeeping
//! entries written by the archiver, which are never messages.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Entries of a list directory that are never messages.
pub const BOOKKEEPING_ENTRIES: [&str; 4] =
    ["__last_article_number", "__errors", "errors.md", "errors.txt"];

/// Whether a directory entry name is archiver bookkeeping rather than a message.
pub fn is_bookkeeping(name: &str) -> bool {
    name.starts_with('.') || BOOKKEEPING_ENTRIES.contains(&name)
}

/// Whether a list filter selects every list: empty, or containing `ALL`.
pub fn selects_all(filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|l| l.eq_ignore_ascii_case("all"))
}

/// Read-only view of a source archive root.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn list_dir(&self, list: &str) -> PathBuf {
        self.root.join(list)
    }

    /// Every mailing list in the archive, sorted by name.
    pub fn lists(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| Error::io(&self.root, e))?;
        let mut lists = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.root, e))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_dir && !name.starts_with('.') {
                lists.push(name);
            }
        }
        lists.sort();
        Ok(lists)
    }

    /// Resolve a list filter against the archive.
    ///
    /// An empty filter or one containing `ALL` selects every list. Requested
    /// lists missing from the archive are warned about and dropped, repeated
    /// names are kept once in first-seen order; it is an error if nothing
    /// remains.
    pub fn select_lists(&self, filter: &[String]) -> Result<Vec<String>> {
        let available = self.lists()?;
        let selected: Vec<String> = if selects_all(filter) {
            available
        } else {
            let mut selected: Vec<String> = Vec::new();
            for list in filter {
                if selected.contains(list) {
                    debug!(list = %list, "List requested twice, keeping one");
                } else if available.contains(list) {
                    selected.push(list.clone());
                } else {
                    warn!(list = %list, "Requested list not found in archive, skipping");
                }
            }
            selected
        };

        if selected.is_empty() {
            return Err(Error::NoListsSelected(self.root.clone()));
        }
        Ok(selected)
    }

    /// Message file names of a list, bookkeeping excluded.
    ///
    /// Article-number names sort numerically and come first; any other names
    /// follow in lexicographic order.
    pub fn message_files(&self, list: &str) -> Result<Vec<String>> {
        let dir = self.list_dir(list);
        if !dir.is_dir() {
            return Err(Error::SourceNotFound(dir));
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))? {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_bookkeeping(&name) {
                debug!(list, file = %name, "Skipping bookkeeping entry");
                continue;
            }
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                names.push(name);
            }
        }

        names.sort_by_cached_key(|name| match name.parse::<u64>() {
            Ok(n) => (0, n, String::new()),
            Err(_) => (1, 0, name.clone()),
        });
        Ok(names)
    }

    /// Raw bytes of one message file.
    pub fn read_message(&self, list: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.list_dir(list).join(name);
        std::fs::read(&path).map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Archive) {
        let dir = tempfile::tempdir().unwrap();
        for (path, contents) in files {
            let path = dir.path().join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
        let archive = Archive::new(dir.path());
        (dir, archive)
    }

    #[test]
    fn test_message_files_sorted_and_filtered() {
        let (_dir, archive) = archive_with(&[
            ("netdev/10", "x"),
            ("netdev/9", "x"),
            ("netdev/100", "x"),
            ("netdev/__last_article_number", "100"),
            ("netdev/errors.md", "x"),
            ("netdev/.hidden", "x"),
            ("netdev/extra.eml", "x"),
        ]);
        assert_eq!(
            archive.message_files("netdev").unwrap(),
            vec!["9", "10", "100", "extra.eml"]
        );
    }

    #[test]
    fn test_missing_list_dir() {
        let (_dir, archive) = archive_with(&[("netdev/1", "x")]);
        assert!(matches!(
            archive.message_files("nope"),
            Err(Error::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_select_lists() {
        let (_dir, archive) = archive_with(&[("b-list/1", "x"), ("a-list/1", "x")]);
        assert_eq!(archive.select_lists(&[]).unwrap(), vec!["a-list", "b-list"]);
        assert_eq!(
            archive.select_lists(&["ALL".into()]).unwrap(),
            vec!["a-list", "b-list"]
        );
        assert_eq!(
            archive
                .select_lists(&["b-list".into(), "missing".into()])
                .unwrap(),
            vec!["b-list"]
        );
        assert!(matches!(
            archive.select_lists(&["missing".into()]),
            Err(Error::NoListsSelected(_))
        ));
    }

    #[test]
    fn test_select_lists_once_each() {
        let (_dir, archive) = archive_with(&[("b-list/1", "x"), ("a-list/1", "x")]);
        assert_eq!(
            archive
                .select_lists(&["b-list".into(), "a-list".into(), "b-list".into()])
                .unwrap(),
            vec!["b-list", "a-list"]
        );
    }
}
