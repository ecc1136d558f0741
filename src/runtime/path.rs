//! Path utility functions for normalization, containment and staging roots.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Check if a path is under a given directory by comparing normalized path components.
///
/// `/usr/share/../../etc/passwd` is NOT under `/usr/share`.
pub fn is_path_under(path: &Path, dir: &Path) -> bool {
    let normalized_path = normalize_path(path);
    let normalized_dir = normalize_path(dir);

    let path_components: Vec<_> = normalized_path.components().collect();
    let dir_components: Vec<_> = normalized_dir.components().collect();

    if path_components.len() < dir_components.len() {
        return false;
    }

    dir_components
        .iter()
        .zip(path_components.iter())
        .all(|(d, p)| d == p)
}

/// Place an absolute system path under a staging root, DESTDIR-style.
///
/// `/usr/share/licenses/viu/LICENSE` under `/tmp/stage` becomes
/// `/tmp/stage/usr/share/licenses/viu/LICENSE`. Returns `None` when the
/// result would escape the root once `..` components are resolved.
pub fn rebase_under(root: &Path, path: &Path) -> Option<PathBuf> {
    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    let rebased = normalize_path(&root.join(relative));
    is_path_under(&rebased, root).then_some(rebased)
}
