use directories::BaseDirs;
use std::env;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Unable to determine the current working directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Unable to expand '~' in '{0}': no home directory is known for the current user")]
    HomeDir(PathBuf),
}

/// Standardizes a file path.
///
/// Relative paths are anchored at the current working directory, and the empty
/// path is the current working directory itself. The longest prefix that exists
/// on disk is canonicalized (resolving symlinks before any `..` that follows
/// them); the remainder is normalized lexically, so the target does not need
/// to exist.
///
/// # Errors
///
/// Returns [`PathError::CurrentDir`] if the working directory cannot be read.
pub fn set_pathspec(fpath: impl AsRef<Path>) -> Result<PathBuf, PathError> {
    let fpath = fpath.as_ref();
    let absolute = if fpath.is_absolute() {
        fpath.to_path_buf()
    } else {
        let cwd = env::current_dir().map_err(PathError::CurrentDir)?;
        if fpath.as_os_str().is_empty() {
            cwd
        } else {
            cwd.join(fpath)
        }
    };
    Ok(resolve_components(&absolute))
}

/// Same as [`set_pathspec`], treating `None` as the current working directory.
pub fn set_optional_pathspec<P: AsRef<Path>>(fpath: Option<P>) -> Result<PathBuf, PathError> {
    match fpath {
        Some(p) => set_pathspec(p),
        None => set_pathspec(""),
    }
}

/// Expands a leading `~` to the user's home directory and standardizes the result.
pub fn expand_user(path: impl AsRef<Path>) -> Result<PathBuf, PathError> {
    let path = path.as_ref();
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let home = BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .ok_or_else(|| PathError::HomeDir(path.to_path_buf()))?;
            set_pathspec(home.join(components.as_path()))
        }
        _ => set_pathspec(path),
    }
}

/// Walks `path` one component at a time. While every prefix exists it is
/// canonicalized, so `..` applies to the symlink target. After the first
/// missing component the rest is folded lexically.
fn resolve_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut on_disk = true;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, so `/..` stays `/`.
                out.pop();
            }
            Component::Normal(name) => {
                out.push(name);
                if on_disk {
                    match out.canonicalize() {
                        Ok(canonical) => out = canonical,
                        Err(_) => on_disk = false,
                    }
                }
            }
        }
    }
    out
}
