//! Sequential directory walker

use crate::config::Config;
use crate::types::{SyncError, Tree, TreeEntry};
use ignore::overrides::{Override, OverrideBuilder};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Scan a directory and build a Tree
///
/// Walks `root_path` recursively and records every file and directory below
/// it, keyed by path relative to the root. The root itself is not recorded.
///
/// Symbolic links are not descended into. A link is recorded with the kind of
/// its target (file or directory). Broken links and special files (sockets,
/// pipes, devices) are recorded as special entries so they can be pruned from
/// a replica; they are never opened.
///
/// # Errors
/// * Invalid exclude patterns return `SyncError::Config`
/// * A missing root or unreadable directory returns `SyncError::Walk`
/// * Metadata failures return the mapped IO error for that path
pub fn scan_tree(root_path: &Path, config: &Config) -> Result<Tree, SyncError> {
    let start_time = Instant::now();
    let mut tree = Tree::new(root_path.to_path_buf());

    let overrides = build_overrides(root_path, &config.exclude_patterns)?;

    // Mirror everything: hidden files and ignore files are ordinary entries here.
    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false)
        .follow_links(false)
        .overrides(overrides)
        .build();

    for result in walker {
        let entry = result.map_err(|e| walk_error(root_path, e))?;

        if entry.depth() == 0 {
            continue;
        }

        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };

        let relative_path = match entry.path().strip_prefix(root_path) {
            Ok(p) => p.to_path_buf(),
            Err(_) => {
                tracing::warn!(
                    "skipping {}: not below scan root {}",
                    entry.path().display(),
                    root_path.display()
                );
                continue;
            }
        };

        let metadata = if file_type.is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::trace!("dangling symbolic link {}: {}", entry.path().display(), e);
                    None
                }
            }
        } else {
            let m = fs::symlink_metadata(entry.path())
                .map_err(|e| SyncError::from_io(entry.path(), e))?;
            Some(m)
        };

        let tree_entry = match metadata {
            Some(m) if m.is_dir() => TreeEntry::directory(relative_path),
            Some(m) if m.is_file() => TreeEntry::file(relative_path, m.len()),
            _ => TreeEntry::special(relative_path),
        };

        let tree_entry = if file_type.is_symlink() {
            tree_entry.via_symlink()
        } else {
            tree_entry
        };

        tree.insert(tree_entry);
    }

    tree.set_scan_duration(start_time.elapsed());
    tracing::debug!(
        "scanned {}: {} files, {} directories, {} special, {} bytes in {:?}",
        root_path.display(),
        tree.total_files,
        tree.total_dirs,
        tree.total_special,
        tree.total_size,
        tree.scan_duration
    );

    Ok(tree)
}

/// Build ignore overrides that exclude every pattern in `patterns`
fn build_overrides(root_path: &Path, patterns: &[String]) -> Result<Override, SyncError> {
    let mut override_builder = OverrideBuilder::new(root_path);

    for pattern in patterns {
        // The ignore crate's OverrideBuilder uses ! for exclusion
        let exclude_pattern = format!("!{}", pattern);
        override_builder.add(&exclude_pattern).map_err(|e| {
            SyncError::Config(format!("Invalid exclude pattern '{}': {}", pattern, e))
        })?;
    }

    override_builder
        .build()
        .map_err(|e| SyncError::Config(format!("Failed to build exclude overrides: {}", e)))
}

fn walk_error(root_path: &Path, error: ignore::Error) -> SyncError {
    SyncError::Walk {
        path: root_path.to_path_buf(),
        message: error.to_string(),
    }
}
