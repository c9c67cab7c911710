//! Remote tree enumeration.
//!
//! Expands a remote directory into a flat, depth-first, pre-order `Tree`.
//! Traversal uses an explicit stack of pending listings instead of native
//! recursion, and refuses to descend past `max_depth`.
//!
//! Any listing failure aborts the walk: a partial tree is never returned.

use crate::mirror::error::{MirrorError, Result};
use crate::mirror::listing::{parse_listing, ListingRecord};
use crate::mirror::session::RemoteSession;
use crate::mirror::types::{join_remote, PathEntry, PathType, Tree};

/// Default limit on directory nesting below the root.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A directory whose listing is partly consumed.
struct Frame {
    dir: String,
    depth: usize,
    pending: std::vec::IntoIter<ListingRecord>,
}

#[derive(Debug, Clone, Copy)]
pub struct TreeWalker {
    max_depth: usize,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TreeWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Enumerate `remote_dir`.
    ///
    /// When `is_root` is set and `remote_dir` is empty or `"."`, the root is
    /// resolved to the server's working directory first. The returned tree
    /// always starts with the (resolved) root as a directory.
    pub async fn walk<S>(&self, session: &mut S, remote_dir: &str, is_root: bool) -> Result<Tree>
    where
        S: RemoteSession + ?Sized,
    {
        let root = if is_root && (remote_dir.is_empty() || remote_dir == ".") {
            session
                .working_directory()
                .await
                .map_err(|source| MirrorError::Enumeration {
                    path: remote_dir.to_string(),
                    source,
                })?
        } else {
            remote_dir.to_string()
        };
        log::debug!("Walking remote tree at '{}'", root);

        let mut tree = Tree::new();
        tree.push(PathEntry::directory(root.clone()));
        let records = list(session, &root).await?;
        let mut stack = vec![Frame {
            dir: root,
            depth: 0,
            pending: records.into_iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(record) = frame.pending.next() else {
                stack.pop();
                continue;
            };
            let child = join_remote(&frame.dir, &record.name);

            match record.kind() {
                PathType::File => tree.push(PathEntry::file(child)),
                PathType::Directory if record.is_self_or_parent() => continue,
                PathType::Directory => {
                    let depth = frame.depth + 1;
                    if depth > self.max_depth {
                        return Err(MirrorError::DepthExceeded {
                            path: child,
                            limit: self.max_depth,
                        });
                    }
                    tree.push(PathEntry::directory(child.clone()));
                    let records = list(session, &child).await?;
                    stack.push(Frame {
                        dir: child,
                        depth,
                        pending: records.into_iter(),
                    });
                }
                PathType::Unknown => {
                    log::debug!("Unclassified entry '{}' ({})", child, record.attribute);
                    tree.push(PathEntry::unknown(child));
                }
            }
        }

        Ok(tree)
    }
}

async fn list<S>(session: &mut S, dir: &str) -> Result<Vec<ListingRecord>>
where
    S: RemoteSession + ?Sized,
{
    let lines = session
        .list_directory(dir)
        .await
        .map_err(|source| MirrorError::Enumeration {
            path: dir.to_string(),
            source,
        })?;
    Ok(parse_listing(&lines))
}
