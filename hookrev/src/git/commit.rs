//! Commit creation from the current index.
//!
//! Used by standalone review sessions. Hooks are not run: the review that
//! just happened is the check.

use std::path::Path;

use git2::{Oid, Repository};

/// Commits the index of the repository at `workdir` on top of `HEAD` (or as
/// the root commit on an unborn branch). Author and committer come from the
/// repository's git config.
pub fn commit_index(workdir: &Path, message: &str) -> Result<Oid, git2::Error> {
    let message = message.trim();
    if message.is_empty() {
        return Err(git2::Error::from_str("commit message is empty"));
    }

    let repo = Repository::open(workdir)?;
    let signature = repo.signature()?;
    let mut index = repo.index()?;
    let tree = repo.find_tree(index.write_tree()?)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch || e.code() == git2::ErrorCode::NotFound => None,
        Err(e) => return Err(e),
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
    tracing::info!(%oid, "commit created");
    Ok(oid)
}

/// First seven hex digits, as git prints them.
pub fn short_id(oid: Oid) -> String {
    oid.to_string().chars().take(7).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testutil::{commit_all, init_repo, stage};

    #[test]
    fn creates_root_commit_on_unborn_branch() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "a.py", "x = 1\n");

        let oid = commit_index(dir.path(), "Add a.py\n").unwrap();
        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.message(), Some("Add a.py"));
        assert_eq!(commit.parent_count(), 0);
        assert_eq!(repo.head().unwrap().target(), Some(oid));
    }

    #[test]
    fn commits_on_top_of_head() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "a.py", "x = 1\n");
        commit_all(&repo, "init");
        let before = repo.head().unwrap().target().unwrap();

        stage(&repo, "a.py", "x = 2\n");
        let oid = commit_index(dir.path(), "Bump x").unwrap();
        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.parent_id(0).unwrap(), before);
        assert_eq!(commit.author().email(), Some("test@example.com"));
    }

    #[test]
    fn empty_message_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        stage(&repo, "a.py", "x = 1\n");
        assert!(commit_index(dir.path(), "   \n").is_err());
        assert!(repo.head().is_err());
    }

    #[test]
    fn short_id_is_seven_chars() {
        let oid = Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(short_id(oid), "0123456");
    }
}
