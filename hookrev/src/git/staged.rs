//! `StagedSource` over a real repository index.

use std::path::{Path, PathBuf};

use git2::{Diff, DiffFormat, DiffOptions, Repository};
use hookrev_core::{SourceError, StagedSource};

/// Reads the index of the repository at `workdir`.
///
/// Holds only the path; every call opens the repository afresh so the value
/// is `Send + Sync` and can be handed to the review worker.
#[derive(Debug, Clone)]
pub struct GitStaged {
    workdir: PathBuf,
}

impl GitStaged {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self { workdir: workdir.into() }
    }

    fn open(&self) -> Result<Repository, SourceError> {
        Repository::open(&self.workdir).map_err(SourceError::new)
    }
}

/// Index against `HEAD`, or against the empty tree on an unborn branch.
fn staged_diff_of(repo: &Repository) -> Result<Diff<'_>, git2::Error> {
    let head_tree = match repo.head() {
        Ok(head) => Some(head.peel_to_tree()?),
        Err(e) if matches!(e.code(), git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound) => {
            None
        }
        Err(e) => return Err(e),
    };
    let mut opts = DiffOptions::new();
    repo.diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
}

impl StagedSource for GitStaged {
    fn list_staged_filenames(&self) -> Result<Vec<String>, SourceError> {
        let repo = self.open()?;
        let diff = staged_diff_of(&repo).map_err(SourceError::new)?;
        let names = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect();
        Ok(names)
    }

    fn staged_diff(&self) -> Result<String, SourceError> {
        let repo = self.open()?;
        let diff = staged_diff_of(&repo).map_err(SourceError::new)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                origin @ ('+' | '-' | ' ') => text.push(origin),
                _ => {}
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(SourceError::new)?;
        Ok(text)
    }

    fn staged_file_content(&self, filename: &str) -> Result<String, SourceError> {
        let repo = self.open()?;
        let index = repo.index().map_err(SourceError::new)?;
        let Some(entry) = index.get_path(Path::new(filename), 0) else {
            return Ok(String::new());
        };
        let blob = repo.find_blob(entry.id).map_err(SourceError::new)?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testutil::{commit_all, init_repo, stage};

    #[test]
    fn nothing_staged_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "a.py", "x = 1\n");
        commit_all(&repo, "init");

        let source = GitStaged::new(dir.path());
        assert!(source.list_staged_filenames().unwrap().is_empty());
        assert!(source.staged_diff().unwrap().is_empty());
    }

    #[test]
    fn unborn_branch_diffs_against_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "new.py", "print('hi')\n");

        let source = GitStaged::new(dir.path());
        assert_eq!(source.list_staged_filenames().unwrap(), ["new.py"]);
        let diff = source.staged_diff().unwrap();
        assert!(diff.contains("+print('hi')"), "{diff}");
    }

    #[test]
    fn diff_and_content_reflect_the_index_not_the_worktree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "app.py", "import os\n");
        commit_all(&repo, "init");
        stage(&repo, "app.py", "import os\nos.system(cmd)\n");
        // Unstaged edit on top must not show up.
        std::fs::write(dir.path().join("app.py"), "import os\nos.system(cmd)\nrm()\n").unwrap();

        let source = GitStaged::new(dir.path());
        assert_eq!(source.list_staged_filenames().unwrap(), ["app.py"]);

        let diff = source.staged_diff().unwrap();
        assert!(diff.contains("diff --git a/app.py b/app.py"));
        assert!(diff.contains("+os.system(cmd)"));
        assert!(diff.contains(" import os"));
        assert!(!diff.contains("rm()"));

        assert_eq!(source.staged_file_content("app.py").unwrap(), "import os\nos.system(cmd)\n");
    }

    #[test]
    fn staged_deletion_has_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "gone.py", "x = 1\n");
        commit_all(&repo, "init");

        let mut index = repo.index().unwrap();
        index.remove_path(Path::new("gone.py")).unwrap();
        index.write().unwrap();

        let source = GitStaged::new(dir.path());
        assert_eq!(source.list_staged_filenames().unwrap(), ["gone.py"]);
        assert_eq!(source.staged_file_content("gone.py").unwrap(), "");
    }

    #[test]
    fn missing_repository_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = GitStaged::new(dir.path().join("nowhere"));
        assert!(source.list_staged_filenames().is_err());
    }
}
