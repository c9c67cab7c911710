//! Tree data model: entries, the flattened tree, and the counters derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Classification of a remote entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PathType {
    File,
    Directory,
    /// Neither file nor directory (symlinks, devices, unrecognised listings).
    Unknown,
}

/// One remote path and its type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    pub path: String,
    pub kind: PathType,
}

impl PathEntry {
    pub fn new(path: impl Into<String>, kind: PathType) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self::new(path, PathType::File)
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self::new(path, PathType::Directory)
    }

    pub fn unknown(path: impl Into<String>) -> Self {
        Self::new(path, PathType::Unknown)
    }
}

/// Depth-first, pre-order enumeration of a remote hierarchy.
///
/// The first entry is the root directory. A directory always precedes its
/// children.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Tree {
    entries: Vec<PathEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PathEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root(&self) -> Option<&PathEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// Tally entries by type.
    pub fn stats(&self) -> TreeStats {
        TreeStats::from_entries(&self.entries)
    }
}

impl From<Vec<PathEntry>> for Tree {
    fn from(entries: Vec<PathEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a PathEntry;
    type IntoIter = std::slice::Iter<'a, PathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Per-type counts over a tree.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub dir_count: usize,
    pub file_count: usize,
    pub unknown_count: usize,
}

impl TreeStats {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a PathEntry>) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            match entry.kind {
                PathType::Directory => stats.dir_count += 1,
                PathType::File => stats.file_count += 1,
                PathType::Unknown => stats.unknown_count += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.dir_count + self.file_count + self.unknown_count
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories, {} files, {} unknown type",
            self.dir_count, self.file_count, self.unknown_count
        )
    }
}

/// Final counters of one mirror run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MirrorResult {
    pub dir_count: usize,
    pub file_count: usize,
    pub unknown_count: usize,
    pub failed_file_count: usize,
}

impl MirrorResult {
    pub fn new(stats: TreeStats, failed_file_count: usize) -> Self {
        debug_assert!(failed_file_count <= stats.file_count);
        Self {
            dir_count: stats.dir_count,
            file_count: stats.file_count,
            unknown_count: stats.unknown_count,
            failed_file_count,
        }
    }

    pub fn ok_file_count(&self) -> usize {
        self.file_count - self.failed_file_count
    }
}

impl fmt::Display for MirrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories, {}({} failed) files, {} unknown type",
            self.dir_count, self.file_count, self.failed_file_count, self.unknown_count
        )
    }
}

/// Join a directory and an entry name in the remote (`/`-separated) namespace.
pub fn join_remote(dir: &str, name: &str) -> String {
    if dir.is_empty() || name.starts_with('/') {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Map a remote path under `local_root`.
///
/// Leading `/` and `\` are dropped, so `/a/b/c.txt` and `a/b/c.txt` land in
/// the same place. `.` and `..` segments are discarded: nothing the server
/// names can escape the root.
pub fn local_path_for(local_root: &Path, remote_path: &str) -> PathBuf {
    let mut local = local_root.to_path_buf();
    for segment in remote_path.split(['/', '\\']) {
        match Path::new(segment).components().next() {
            Some(Component::Normal(part)) => local.push(part),
            _ => continue,
        }
    }
    local
}
