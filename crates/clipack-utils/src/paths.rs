//! Path security checks for extract and pack.
//!
//! Every bundle entry and every enumerated file passes through
//! [`check_path_security`] before the filesystem is touched.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::io;

use crate::error::{ClipackError, FileOperation, SecurityError};

// ============================================================================
// Security Options and Verdict
// ============================================================================

/// Configuration for path validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityOptions {
    /// Whether symbolic links are accepted below the base directory
    pub allow_symlinks: bool,
}

impl SecurityOptions {
    /// Create a permissive config that allows symlinks
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            allow_symlinks: true,
        }
    }
}

/// Outcome of a successful path check.
///
/// A verdict is only produced when the path is acceptable; violations are
/// reported as [`SecurityError`]s instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityVerdict {
    pub is_valid: bool,
    /// The path relative to the base directory after `.`/`..` collapsing.
    pub normalized_path: Utf8PathBuf,
    /// Absolute, lexically normalized location inside the base directory.
    pub full_path: Utf8PathBuf,
    pub violations: Vec<String>,
}

// ============================================================================
// Path Checks
// ============================================================================

/// Check that `relative_path` stays inside `base_dir` and, unless allowed,
/// does not pass through a symbolic link.
///
/// The base directory does not need to exist; extraction targets usually
/// do not. Components that do not exist yet are not symlinks.
///
/// # Errors
///
/// - [`SecurityError::DirectoryTraversal`] when the path resolves outside `base_dir`
/// - [`SecurityError::SymlinkNotAllowed`] when an existing component is a symlink
/// - [`SecurityError::NotAFilePath`] when the path resolves to `base_dir` itself
/// - [`ClipackError::FileOperation`] when a component cannot be inspected
///
/// # Example
///
/// ```rust
/// use camino::Utf8Path;
/// use clipack_utils::paths::{SecurityOptions, check_path_security};
///
/// let base = Utf8Path::new("/tmp/clipack-doc-out");
/// let verdict = check_path_security("./src/../lib/a.ts", base, SecurityOptions::default()).unwrap();
/// assert_eq!(verdict.normalized_path, "lib/a.ts");
///
/// assert!(check_path_security("../escape.ts", base, SecurityOptions::default()).is_err());
/// ```
pub fn check_path_security(
    relative_path: &str,
    base_dir: &Utf8Path,
    options: SecurityOptions,
) -> Result<SecurityVerdict, ClipackError> {
    let base = absolute_base(base_dir)?;
    let candidate = normalize_lexically(&base.join(normalize_lexically(Utf8Path::new(relative_path))));

    let offset = match candidate.strip_prefix(&base) {
        Ok(offset) => offset.to_path_buf(),
        Err(_) => {
            return Err(SecurityError::DirectoryTraversal {
                path: relative_path.to_string(),
            }
            .into());
        }
    };

    if offset.as_str().is_empty() {
        return Err(SecurityError::NotAFilePath {
            path: relative_path.to_string(),
        }
        .into());
    }

    if !options.allow_symlinks {
        check_symlinks_below(&base, &offset, relative_path)?;
    }

    Ok(SecurityVerdict {
        is_valid: true,
        normalized_path: offset,
        full_path: candidate,
        violations: Vec::new(),
    })
}

fn absolute_base(base_dir: &Utf8Path) -> Result<Utf8PathBuf, ClipackError> {
    let absolute = std::path::absolute(base_dir.as_std_path())
        .map_err(|e| ClipackError::file_op(FileOperation::Stat, base_dir, e))?;
    let absolute = Utf8PathBuf::from_path_buf(absolute).map_err(|p| {
        ClipackError::file_op(
            FileOperation::Stat,
            p.display(),
            io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
        )
    })?;
    Ok(normalize_lexically(&absolute))
}

/// Walk each component of `offset` under `base` without following links.
fn check_symlinks_below(
    base: &Utf8Path,
    offset: &Utf8Path,
    original: &str,
) -> Result<(), ClipackError> {
    let mut current = base.to_path_buf();

    for component in offset.components() {
        current.push(component);

        match current.symlink_metadata() {
            Ok(metadata) if metadata.is_symlink() => {
                return Err(SecurityError::SymlinkNotAllowed {
                    path: original.to_string(),
                }
                .into());
            }
            Ok(_) => {}
            // Nothing below a missing component can exist yet.
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Ok(());
            }
            Err(e) => return Err(ClipackError::file_op(FileOperation::Stat, &current, e)),
        }
    }

    Ok(())
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// Leading `..` segments of a relative path are kept; `..` directly under
/// a root is dropped.
#[must_use]
pub fn normalize_lexically(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    parts.iter().map(|c| c.as_str()).collect()
}

/// Create a directory and all parents, treating "already exists" as success.
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_normalize_lexically() {
        let cases = [
            ("a/b/../c", "a/c"),
            ("./a/./b", "a/b"),
            ("../a", "../a"),
            ("a/../../b", "../b"),
            ("/a/../../b", "/b"),
            ("a/b/..", "a"),
            (".", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(
                normalize_lexically(Utf8Path::new(input)),
                Utf8PathBuf::from(expected),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_accepts_nested_relative_path() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);

        let verdict =
            check_path_security("src/utils/a.ts", &base, SecurityOptions::default()).unwrap();
        assert!(verdict.is_valid);
        assert!(verdict.violations.is_empty());
        assert_eq!(verdict.normalized_path, "src/utils/a.ts");
        assert!(verdict.full_path.starts_with(&base));
    }

    #[test]
    fn test_accepts_inner_parent_segments() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);

        let verdict =
            check_path_security("src/../lib/./b.ts", &base, SecurityOptions::default()).unwrap();
        assert_eq!(verdict.normalized_path, "lib/b.ts");
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);

        for path in ["../evil.ts", "a/../../evil.ts", "../../etc/passwd"] {
            let err = check_path_security(path, &base, SecurityOptions::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Security, "path: {path}");
            match err {
                ClipackError::Security(SecurityError::DirectoryTraversal { path: reported }) => {
                    assert_eq!(reported, path);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_absolute_path_outside_base() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);

        let err =
            check_path_security("/etc/passwd", &base, SecurityOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ClipackError::Security(SecurityError::DirectoryTraversal { .. })
        ));
    }

    #[test]
    fn test_rejects_paths_naming_the_base() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);

        for path in [".", "", "src/..", "a/./..", "./"] {
            let err = check_path_security(path, &base, SecurityOptions::permissive()).unwrap_err();
            assert_eq!(err.to_exit_code().as_i32(), 77, "path: {path:?}");
            match err {
                ClipackError::Security(SecurityError::NotAFilePath { path: reported }) => {
                    assert_eq!(reported, path);
                }
                other => panic!("unexpected error for {path:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_base_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir).join("not-created-yet");

        let verdict = check_path_security("a.ts", &base, SecurityOptions::default()).unwrap();
        assert_eq!(verdict.normalized_path, "a.ts");
    }

    #[test]
    fn test_relative_base_is_resolved() {
        let verdict =
            check_path_security("a.ts", Utf8Path::new("some/out"), SecurityOptions::default())
                .unwrap();
        assert!(verdict.full_path.is_absolute());
        assert!(verdict.full_path.ends_with("some/out/a.ts"));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlinked_file() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);
        std::fs::write(base.join("real.ts"), "x").unwrap();
        std::os::unix::fs::symlink(base.join("real.ts"), base.join("link.ts")).unwrap();

        let err = check_path_security("link.ts", &base, SecurityOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ClipackError::Security(SecurityError::SymlinkNotAllowed { .. })
        ));
        assert_eq!(err.to_exit_code().as_i32(), 77);
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlinked_parent_directory() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);
        std::os::unix::fs::symlink(outside.path(), base.join("escape")).unwrap();

        let err = check_path_security("escape/new.ts", &base, SecurityOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ClipackError::Security(SecurityError::SymlinkNotAllowed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_allow_symlinks_accepts_link() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);
        std::fs::write(base.join("real.ts"), "x").unwrap();
        std::os::unix::fs::symlink(base.join("real.ts"), base.join("link.ts")).unwrap();

        let verdict = check_path_security("link.ts", &base, SecurityOptions::permissive()).unwrap();
        assert!(verdict.is_valid);
    }

    #[test]
    fn test_path_under_regular_file_is_not_a_violation() {
        let dir = TempDir::new().unwrap();
        let base = utf8_dir(&dir);
        std::fs::write(base.join("file.ts"), "x").unwrap();

        // The later write fails; the security check itself passes.
        let verdict =
            check_path_security("file.ts/child.ts", &base, SecurityOptions::default()).unwrap();
        assert_eq!(verdict.normalized_path, "file.ts/child.ts");
    }

    #[test]
    fn test_ensure_dir_all_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir_all(&nested).unwrap();
        ensure_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_relative() -> impl Strategy<Value = String> {
            proptest::collection::vec(
                prop_oneof![
                    Just("..".to_string()),
                    Just(".".to_string()),
                    "[a-z]{1,6}",
                ],
                1..8,
            )
            .prop_map(|parts| parts.join("/"))
        }

        proptest! {
            /// Accepted paths resolve strictly below the base; rejected ones climb above it or name it.
            #[test]
            fn prop_verdict_stays_under_base(relative in arb_relative()) {
                let base = Utf8Path::new("/clipack-prop/base");
                match check_path_security(&relative, base, SecurityOptions::permissive()) {
                    Ok(verdict) => {
                        prop_assert!(verdict.full_path.starts_with(base));
                        prop_assert!(verdict.full_path != base);
                        prop_assert!(!verdict.normalized_path.as_str().is_empty());
                        prop_assert!(!verdict.normalized_path.as_str().contains(".."));
                    }
                    Err(err) => {
                        prop_assert_eq!(err.kind(), ErrorKind::Security);
                        let normalized = normalize_lexically(Utf8Path::new(&relative));
                        prop_assert!(
                            normalized.starts_with("..") || normalized.as_str().is_empty()
                        );
                    }
                }
            }
        }
    }
}
