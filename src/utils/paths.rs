use std::path::{Component, Path, PathBuf};

/// Clean one line of the tracked-paths list.
///
/// Surrounding whitespace and trailing separators are removed. Returns `None`
/// for lines that are blank afterwards, which includes separator-only lines.
#[must_use]
pub fn trim_root_line(line: &str) -> Option<&str> {
    let trimmed = line
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c == '\\' || c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Removes `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root (or above the start of a relative path).
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                }
            }
            Component::Normal(name) => {
                normalized.push(name);
                depth += 1;
            }
        }
    }

    normalized
}

/// Resolve `path` against `base` when relative, then normalize lexically.
#[must_use]
pub fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Repository-relative form of a source path.
///
/// Drops the volume designator and root, keeping the remaining components
/// verbatim. Only normal components survive, so the result can never escape
/// the repository root.
#[must_use]
pub fn repo_relative(source: &Path) -> PathBuf {
    normalize_lexically(source)
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// File name for the diff fragment of `source`.
///
/// Every `:`, `\`, `/` and `.` is replaced by `_`, then `.htm` is appended.
#[must_use]
pub fn fragment_file_name(source: &Path) -> String {
    let mut name: String = source
        .to_string_lossy()
        .chars()
        .map(|c| match c {
            ':' | '\\' | '/' | '.' => '_',
            other => other,
        })
        .collect();
    name.push_str(".htm");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_root_line() {
        assert_eq!(trim_root_line("  /etc/app/  \n"), Some("/etc/app"));
        assert_eq!(trim_root_line("C:\\data\\\\"), Some("C:\\data"));
        assert_eq!(trim_root_line("/"), None);
        assert_eq!(trim_root_line("   "), None);
        assert_eq!(trim_root_line("\\\\"), None);
        assert_eq!(trim_root_line("srv/app / \t"), Some("srv/app"));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/srv/./app/../etc/hosts")),
            PathBuf::from("/srv/etc/hosts")
        );
        assert_eq!(
            normalize_lexically(Path::new("/../../etc")),
            PathBuf::from("/etc")
        );
        assert_eq!(normalize_lexically(Path::new("../a/b")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_make_absolute() {
        let base = Path::new("/home/user/tracking");
        assert_eq!(
            make_absolute(Path::new("../configs/app.toml"), base),
            PathBuf::from("/home/user/configs/app.toml")
        );
        assert_eq!(
            make_absolute(Path::new("/etc/hosts"), base),
            PathBuf::from("/etc/hosts")
        );
    }

    #[test]
    fn test_repo_relative_strips_root() {
        assert_eq!(
            repo_relative(Path::new("/etc/app/app.conf")),
            PathBuf::from("etc/app/app.conf")
        );
        assert_eq!(
            repo_relative(Path::new("/etc/../../secret")),
            PathBuf::from("secret")
        );
    }

    #[test]
    fn test_fragment_file_name() {
        assert_eq!(
            fragment_file_name(Path::new("/etc/app/app.conf")),
            "_etc_app_app_conf.htm"
        );
        assert_eq!(
            fragment_file_name(Path::new("C:\\data\\a.txt")),
            "C__data_a_txt.htm"
        );
    }
}
