//! Path handling for file and folder keys.
//!
//! Paths are normalized lexically; nothing here touches the file system.
//! A store may carry a working folder ([`working_folder`]); file keys resolve
//! relative values against it when read, and hand them back relative to it
//! when [`use_relative_paths`] is set.

use std::path::{Component, Path, PathBuf};

use optreg_store::{Key, Store};

/// Name of the working-folder key.
pub const WORKING_FOLDER: &str = "current_folder_path";

/// Name of the relative-paths switch.
pub const USE_RELATIVE_PATHS: &str = "use_relative_paths";

/// Folder that relative file values are resolved against. Unset by default.
pub fn working_folder() -> Key<Option<PathBuf>> {
    Key::new(WORKING_FOLDER).with_default_value(None)
}

/// Whether file values are reported relative to the working folder.
pub fn use_relative_paths() -> Key<bool> {
    Key::new(USE_RELATIVE_PATHS)
        .with_default_value(false)
        .with_codec(crate::codecs::bool_codec())
}

/// Drop `.` components and fold `..` into the preceding component where
/// there is one.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Render a path with `/` separators.
pub fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Get-interceptor for file keys.
///
/// Empty paths pass through. Without a working folder the value is only
/// normalized. With one, relative values are joined onto it, and the
/// result is made relative again when relative paths are requested.
pub fn resolve_path(path: PathBuf, store: &Store) -> PathBuf {
    if path.as_os_str().is_empty() {
        return path;
    }
    let Some(base) = store.get(&working_folder()).ok().flatten() else {
        return normalize_path(&path);
    };

    let base = normalize_path(&base);
    let absolute = normalize_path(&base.join(&path));
    if !store.get(&use_relative_paths()).unwrap_or(false) {
        return absolute;
    }
    match absolute.strip_prefix(&base) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => absolute,
    }
}
