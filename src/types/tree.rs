//! Tree - Directory structure representation

use super::{EntryKind, TreeEntry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scanned directory tree
///
/// Entries are keyed by relative path. `BTreeMap` ordering on paths compares
/// component by component, so every directory sorts before its descendants
/// and iteration is a top-down walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Map: relative_path → TreeEntry
    pub entries: BTreeMap<PathBuf, TreeEntry>,

    /// Aggregate statistics
    pub total_size: u64,
    pub total_files: usize,
    pub total_dirs: usize,
    /// Broken links and other entries that are neither files nor directories
    pub total_special: usize,

    /// Scan metadata
    pub scan_duration: Duration,
    pub root_path: PathBuf,
}

impl Tree {
    /// Create a new empty Tree
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            entries: BTreeMap::new(),
            total_size: 0,
            total_files: 0,
            total_dirs: 0,
            total_special: 0,
            scan_duration: Duration::from_secs(0),
            root_path,
        }
    }

    /// Insert an entry into the tree
    ///
    /// Updates aggregate statistics. If the path already exists, the old entry
    /// is replaced and statistics are adjusted.
    pub fn insert(&mut self, entry: TreeEntry) {
        if let Some(old) = self.entries.remove(&entry.path) {
            self.forget(&old);
        }

        match entry.kind {
            _ if entry.is_special => self.total_special += 1,
            EntryKind::File => {
                self.total_files += 1;
                self.total_size += entry.size;
            }
            EntryKind::Directory => self.total_dirs += 1,
        }
        self.entries.insert(entry.path.clone(), entry);
    }

    fn forget(&mut self, old: &TreeEntry) {
        match old.kind {
            _ if old.is_special => self.total_special = self.total_special.saturating_sub(1),
            EntryKind::File => {
                self.total_files = self.total_files.saturating_sub(1);
                self.total_size = self.total_size.saturating_sub(old.size);
            }
            EntryKind::Directory => self.total_dirs = self.total_dirs.saturating_sub(1),
        }
    }

    /// Get an entry by relative path
    pub fn get(&self, path: &Path) -> Option<&TreeEntry> {
        self.entries.get(path)
    }

    /// Check if a relative path exists in the tree
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Kind of the entry at `path`, if any
    pub fn kind_of(&self, path: &Path) -> Option<EntryKind> {
        self.entries.get(path).map(|entry| entry.kind)
    }

    /// Kind of the entry at `path` if it is one the replica reproduces
    ///
    /// Special entries report `None`: the replica never holds a counterpart.
    pub fn mirrored_kind(&self, path: &Path) -> Option<EntryKind> {
        self.entries
            .get(path)
            .filter(|entry| !entry.is_special)
            .map(|entry| entry.kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries top-down (parents before children)
    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.values()
    }

    /// Iterator over just the relative paths
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.keys()
    }

    /// Set the scan duration after scanning completes
    pub fn set_scan_duration(&mut self, duration: Duration) {
        self.scan_duration = duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64) -> TreeEntry {
        TreeEntry::file(PathBuf::from(name), size)
    }

    fn dir(name: &str) -> TreeEntry {
        TreeEntry::directory(PathBuf::from(name))
    }

    #[test]
    fn test_new_tree() {
        let root = PathBuf::from("/test/root");
        let tree = Tree::new(root.clone());

        assert_eq!(tree.root_path, root);
        assert_eq!(tree.total_size, 0);
        assert_eq!(tree.total_files, 0);
        assert_eq!(tree.total_dirs, 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_insert_counts_files_and_dirs() {
        let mut tree = Tree::new(PathBuf::from("/root"));
        tree.insert(dir("a"));
        tree.insert(file("a/one.txt", 100));
        tree.insert(file("two.txt", 200));

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.total_files, 2);
        assert_eq!(tree.total_dirs, 1);
        assert_eq!(tree.total_size, 300);
        assert_eq!(tree.kind_of(Path::new("a")), Some(EntryKind::Directory));
        assert_eq!(tree.kind_of(Path::new("two.txt")), Some(EntryKind::File));
        assert_eq!(tree.kind_of(Path::new("missing")), None);
    }

    #[test]
    fn test_replacing_entry_adjusts_statistics() {
        let mut tree = Tree::new(PathBuf::from("/root"));
        tree.insert(file("x", 1000));
        tree.insert(file("x", 2000));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.total_files, 1);
        assert_eq!(tree.total_size, 2000);

        tree.insert(dir("x"));
        assert_eq!(tree.total_files, 0);
        assert_eq!(tree.total_dirs, 1);
        assert_eq!(tree.total_size, 0);
    }

    #[test]
    fn test_special_entries_are_counted_apart() {
        let mut tree = Tree::new(PathBuf::from("/root"));
        tree.insert(file("a.txt", 10));
        tree.insert(TreeEntry::special(PathBuf::from("pipe")));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.total_files, 1);
        assert_eq!(tree.total_special, 1);
        assert_eq!(tree.total_size, 10);

        assert_eq!(tree.kind_of(Path::new("pipe")), Some(EntryKind::File));
        assert_eq!(tree.mirrored_kind(Path::new("pipe")), None);
        assert_eq!(tree.mirrored_kind(Path::new("a.txt")), Some(EntryKind::File));

        tree.insert(file("pipe", 3));
        assert_eq!(tree.total_special, 0);
        assert_eq!(tree.total_files, 2);
    }

    #[test]
    fn test_iteration_is_top_down() {
        let mut tree = Tree::new(PathBuf::from("/root"));
        tree.insert(file("a.txt", 1));
        tree.insert(file("a/b/c.txt", 1));
        tree.insert(dir("a/b"));
        tree.insert(dir("a"));
        tree.insert(file("a/z.txt", 1));

        let order: Vec<_> = tree.paths().map(|p| p.to_string_lossy().into_owned()).collect();
        let position = |name: &str| order.iter().position(|p| p == name).expect("present");

        assert!(position("a") < position("a/b"));
        assert!(position("a/b") < position("a/b/c.txt"));
        assert!(position("a") < position("a/z.txt"));
    }

    #[test]
    fn test_scan_duration() {
        let mut tree = Tree::new(PathBuf::from("/root"));
        tree.set_scan_duration(Duration::from_millis(1500));
        assert_eq!(tree.scan_duration, Duration::from_millis(1500));
    }
}
