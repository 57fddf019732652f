use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/dailynews/).
///
/// Returns `None` when `HOME` is not set.
pub fn config_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join("dailynews"))
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths that do not start with `~`, or `~user` forms, are returned as-is, as
/// is everything when `HOME` is unset.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths_unchanged() {
        assert_eq!(expand_home(Path::new("out/news.json")), PathBuf::from("out/news.json"));
        assert_eq!(expand_home(Path::new("/tmp/news.json")), PathBuf::from("/tmp/news.json"));
        assert_eq!(expand_home(Path::new("~user/x")), PathBuf::from("~user/x"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        assert_eq!(
            expand_home(Path::new("~/daily/news.json")),
            PathBuf::from(home).join("daily/news.json")
        );
    }
}
