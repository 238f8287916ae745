//! Pre-commit hook installation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::Repository;

const HOOK_NAME: &str = "pre-commit";
const BACKUP_SUFFIX: &str = ".backup";
/// Marks hooks written by hookrev.
const MARKER: &str = "# hookrev pre-commit hook";

#[derive(Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { hook: PathBuf, backup: Option<PathBuf> },
    /// A hook exists and `force` was not given; nothing was written.
    AlreadyPresent(PathBuf),
}

/// The hook script. Git runs hooks without a terminal on stdin, so the
/// interactive review reattaches `/dev/tty` when there is one and otherwise
/// falls back to the non-interactive path.
pub fn hook_script(program: &Path) -> String {
    let program = program.display().to_string().replace('"', "\\\"");
    format!(
        "#!/bin/sh\n\
         {MARKER}\n\
         if [ -t 2 ] && (exec </dev/tty) 2>/dev/null; then\n\
         \x20   exec \"{program}\" hook </dev/tty\n\
         fi\n\
         exec \"{program}\" hook\n"
    )
}

/// Installs the hook into the repository containing `start`.
///
/// An existing hook is left alone unless `force` is set, in which case it is
/// first copied to `pre-commit.backup`.
pub fn install(start: &Path, program: &Path, force: bool) -> Result<InstallOutcome> {
    let repo = Repository::discover(start)
        .with_context(|| format!("{} is not inside a git repository", start.display()))?;
    let hooks_dir = repo.path().join("hooks");
    std::fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("creating {}", hooks_dir.display()))?;

    let hook = hooks_dir.join(HOOK_NAME);
    let mut backup = None;
    if hook.exists() {
        if !force {
            return Ok(InstallOutcome::AlreadyPresent(hook));
        }
        let backup_path = hooks_dir.join(format!("{HOOK_NAME}{BACKUP_SUFFIX}"));
        std::fs::copy(&hook, &backup_path)
            .with_context(|| format!("backing up {}", hook.display()))?;
        backup = Some(backup_path);
    }

    std::fs::write(&hook, hook_script(program))
        .with_context(|| format!("writing {}", hook.display()))?;
    make_executable(&hook)?;
    tracing::info!(hook = %hook.display(), "pre-commit hook installed");
    Ok(InstallOutcome::Installed { hook, backup })
}

/// True when the repository's pre-commit hook was written by hookrev.
pub fn is_installed(workdir: &Path) -> bool {
    Repository::open(workdir)
        .ok()
        .and_then(|repo| std::fs::read_to_string(repo.path().join("hooks").join(HOOK_NAME)).ok())
        .is_some_and(|script| script.contains(MARKER))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testutil::init_repo;

    const PROGRAM: &str = "/usr/local/bin/hookrev";

    #[test]
    fn installs_into_fresh_repository() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());

        let outcome = install(dir.path(), Path::new(PROGRAM), false).unwrap();
        let hook = dir.path().join(".git/hooks/pre-commit");
        assert_eq!(outcome, InstallOutcome::Installed { hook: hook.clone(), backup: None });

        let script = std::fs::read_to_string(&hook).unwrap();
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("exec \"/usr/local/bin/hookrev\" hook </dev/tty"));
        assert!(is_installed(dir.path()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&hook).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn existing_hook_is_kept_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let hook = dir.path().join(".git/hooks/pre-commit");
        std::fs::create_dir_all(hook.parent().unwrap()).unwrap();
        std::fs::write(&hook, "#!/bin/sh\nmake lint\n").unwrap();

        let outcome = install(dir.path(), Path::new(PROGRAM), false).unwrap();
        assert_eq!(outcome, InstallOutcome::AlreadyPresent(hook.clone()));
        assert_eq!(std::fs::read_to_string(&hook).unwrap(), "#!/bin/sh\nmake lint\n");
        assert!(!is_installed(dir.path()));
    }

    #[test]
    fn force_backs_up_the_previous_hook() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let hook = dir.path().join(".git/hooks/pre-commit");
        std::fs::create_dir_all(hook.parent().unwrap()).unwrap();
        std::fs::write(&hook, "#!/bin/sh\nmake lint\n").unwrap();

        let outcome = install(dir.path(), Path::new(PROGRAM), true).unwrap();
        let backup = dir.path().join(".git/hooks/pre-commit.backup");
        assert_eq!(outcome, InstallOutcome::Installed { hook: hook.clone(), backup: Some(backup.clone()) });
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "#!/bin/sh\nmake lint\n");
        assert!(is_installed(dir.path()));
    }

    #[test]
    fn outside_a_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(install(dir.path(), Path::new(PROGRAM), false).is_err());
    }
}
