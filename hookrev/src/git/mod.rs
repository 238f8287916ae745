//! Git integration for hookrev.
//!
//! `git2::Repository` is not `Sync`, so nothing here holds one across calls:
//! each operation opens the repository from its path on the thread that runs
//! it. The review worker calls into [`staged::GitStaged`] from the blocking
//! pool; commit and hook installation run on the main thread.

pub mod commit;
pub mod hook;
pub mod staged;

use std::path::{Path, PathBuf};

use git2::Repository;

/// Finds the repository containing `start` and returns its working directory.
///
/// Bare repositories have no working directory and are rejected.
pub fn discover_workdir(start: &Path) -> Result<PathBuf, git2::Error> {
    let repo = Repository::discover(start)?;
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| git2::Error::from_str("bare repositories are not supported"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        testutil::init_repo(dir.path());
        let sub = dir.path().join("src");
        std::fs::create_dir(&sub).unwrap();

        let workdir = discover_workdir(&sub).unwrap();
        assert_eq!(
            workdir.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn outside_a_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_workdir(dir.path()).is_err());
    }
}
