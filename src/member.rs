use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{Result, SilhouetteError};

pub const PROFILE_PREFIX: &str = "profile";
pub const PROFILE_EXTENSION: &str = ".png";
pub const SILHOUETTE_FILE_NAME: &str = "silhouette.png";

/// One subdirectory of the root, named after the member it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDirectory {
    path: PathBuf,
}

impl MemberDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    pub fn silhouette_path(&self) -> PathBuf {
        self.path.join(SILHOUETTE_FILE_NAME)
    }

    /// Files matching `profile*.png`, sorted by file name.
    pub fn profile_candidates(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.path).map_err(|e| SilhouetteError::FileSystem {
            path: self.path.clone(),
            operation: "メンバーディレクトリ一覧取得".to_string(),
            source: e,
        })?;

        let mut candidates = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| SilhouetteError::FileSystem {
                    path: self.path.clone(),
                    operation: "メンバーディレクトリ項目読み込み".to_string(),
                    source: e,
                })?
                .path();
            if path.is_file() && path.file_name().is_some_and(is_profile_candidate) {
                candidates.push(path);
            }
        }

        candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(candidates)
    }

    /// The lexicographically first candidate, if any.
    pub fn select_profile_image(&self) -> Result<Option<PathBuf>> {
        Ok(self.profile_candidates()?.into_iter().next())
    }
}

/// Case-sensitive `profile*.png` match on a bare file name. Non-UTF-8 names
/// are compared byte-wise.
pub fn is_profile_candidate(file_name: &OsStr) -> bool {
    let name = file_name.as_encoded_bytes();
    name.len() >= PROFILE_PREFIX.len() + PROFILE_EXTENSION.len()
        && name.starts_with(PROFILE_PREFIX.as_bytes())
        && name.ends_with(PROFILE_EXTENSION.as_bytes())
}

/// Lazily yields the immediate subdirectories of `root` in file-name order.
///
/// Plain files are skipped. A failure to list `root` itself comes out as a
/// fatal `RootUnreadable`; failures on single entries are plain
/// `FileSystem` errors.
pub fn member_directories(root: &Path) -> impl Iterator<Item = Result<MemberDirectory>> {
    let root = root.to_path_buf();
    WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.path().is_dir() => {
                Some(Ok(MemberDirectory::new(entry.into_path())))
            }
            Ok(_) => None,
            Err(err) => Some(Err(walk_error(&root, err))),
        })
}

fn walk_error(root: &Path, err: walkdir::Error) -> SilhouetteError {
    let depth = err.depth();
    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));

    if depth == 0 {
        SilhouetteError::RootUnreadable { path, source }
    } else {
        SilhouetteError::FileSystem {
            path,
            operation: "メンバー項目読み込み".to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_profile_pattern() {
        let test_cases = vec![
            ("profile.png", true),
            ("profile1.png", true),
            ("profile_a.png", true),
            ("profile-smiling.png", true),
            ("Profile.png", false),
            ("profile1.PNG", false),
            ("profile1.jpg", false),
            ("my_profile.png", false),
            ("profile", false),
            ("profile.pn", false),
            ("silhouette.png", false),
        ];

        for (name, expected) in test_cases {
            assert_eq!(
                is_profile_candidate(OsStr::new(name)),
                expected,
                "pattern mismatch for {name}"
            );
        }
    }

    #[test]
    fn test_candidates_sorted_by_name() -> Result<()> {
        let temp_dir = TempDir::new()?;
        for name in ["profile2.png", "profile1.png", "notes.txt", "silhouette.png"] {
            fs::write(temp_dir.path().join(name), b"")?;
        }
        fs::create_dir(temp_dir.path().join("profile0.png"))?;

        let member = MemberDirectory::new(temp_dir.path());
        let names = member
            .profile_candidates()?
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["profile1.png", "profile2.png"]);
        assert_eq!(
            member.select_profile_image()?,
            Some(temp_dir.path().join("profile1.png"))
        );
        Ok(())
    }

    #[test]
    fn test_select_underscore_suffixes() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("profile_b.png"), b"")?;
        fs::write(temp_dir.path().join("profile_a.png"), b"")?;

        let member = MemberDirectory::new(temp_dir.path());
        assert_eq!(
            member.select_profile_image()?,
            Some(temp_dir.path().join("profile_a.png"))
        );
        Ok(())
    }

    #[test]
    fn test_no_candidates() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("Profile.png"), b"")?;

        let member = MemberDirectory::new(temp_dir.path());
        assert_eq!(member.select_profile_image()?, None);
        Ok(())
    }

    #[test]
    fn test_member_directories_skip_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir(temp_dir.path().join("bob"))?;
        fs::create_dir(temp_dir.path().join("alice"))?;
        fs::create_dir_all(temp_dir.path().join("alice").join("nested"))?;
        fs::write(temp_dir.path().join("readme.txt"), b"")?;

        let members = member_directories(temp_dir.path())
            .map(|m| m.map(|m| m.name()))
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(members, vec!["alice", "bob"]);
        Ok(())
    }

    #[test]
    fn test_unlistable_root_is_reported() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let gone = temp_dir.path().join("gone");

        let results = member_directories(&gone).collect::<Vec<_>>();

        assert_eq!(results.len(), 1);
        let err = results[0].as_ref().unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, SilhouetteError::RootUnreadable { path, .. } if *path == gone));
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_profile_name() -> Result<()> {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"profile\xff.png");
        assert!(is_profile_candidate(name));
        assert!(!is_profile_candidate(OsStr::from_bytes(b"\xffprofile.png")));

        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join(name), b"")?;
        fs::write(temp_dir.path().join("profile_z.png"), b"")?;

        let member = MemberDirectory::new(temp_dir.path());
        assert_eq!(member.profile_candidates()?.len(), 2);
        assert_eq!(
            member.select_profile_image()?,
            Some(temp_dir.path().join("profile_z.png"))
        );
        Ok(())
    }

    #[test]
    fn test_silhouette_path() {
        let member = MemberDirectory::new("assets/member/alice");
        assert_eq!(member.name(), "alice");
        assert_eq!(
            member.silhouette_path(),
            Path::new("assets/member/alice/silhouette.png")
        );
    }
}
